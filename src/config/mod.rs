/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量和启动前验证
use crate::impl_default;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod simulation;
pub mod spawn;
pub mod threading;

pub use simulation::{SimulationConfig, MAX_CAPACITY};
pub use spawn::{SpawnConfig, ValueRange};
pub use threading::{default_worker_threads, ThreadingConfig};

/// 引擎配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 默认查找的配置文件
const CONFIG_CANDIDATES: [&str; 2] = ["particles.toml", "particles.json"];

/// 引擎主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 模拟配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 生成配置
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// 多线程配置
    #[serde(default)]
    pub threading: ThreadingConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// 从任意键值来源覆盖配置，无法解析的值被忽略
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(capacity) = lookup("PARTICLES_CAPACITY").and_then(|v| v.parse().ok()) {
            self.simulation.capacity = capacity;
        }
        if let Some(seed) = lookup("PARTICLES_SEED").and_then(|v| v.parse().ok()) {
            self.simulation.seed = Some(seed);
        }
        if let Some(seconds) = lookup("PARTICLES_RUN_SECONDS").and_then(|v| v.parse().ok()) {
            self.simulation.run_seconds = seconds;
        }
        if let Some(workers) = lookup("PARTICLES_WORKER_THREADS").and_then(|v| v.parse().ok()) {
            self.threading.worker_threads = workers;
        }
        if let Some(interval) = lookup("PARTICLES_SPAWN_INTERVAL").and_then(|v| v.parse().ok()) {
            self.spawn.interval = interval;
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;
        self.spawn.validate()?;
        self.threading.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./particles.toml
    /// 2. ./particles.json
    /// 3. 使用默认配置
    ///
    /// 返回配置以及实际使用的文件路径。文件存在但无法解析时返回错误。
    pub fn load_or_default() -> ConfigResult<(Self, Option<PathBuf>)> {
        for candidate in CONFIG_CANDIDATES {
            let path = PathBuf::from(candidate);
            if !path.is_file() {
                continue;
            }
            let config = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => Self::from_json_file(&path)?,
                _ => Self::from_toml_file(&path)?,
            };
            return Ok((config, Some(path)));
        }

        Ok((Self::default(), None))
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 优先）
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
