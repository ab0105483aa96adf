use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 性能分析器 - 按名称记录各阶段耗时
///
/// 作用域名称使用 `&'static str`，每帧记录不产生分配。
#[derive(Default)]
pub struct Profiler {
    scopes: HashMap<&'static str, ScopeStats>,
    current_scope: Option<(&'static str, Instant)>,
}

/// 作用域统计信息
#[derive(Debug, Clone)]
pub struct ScopeStats {
    pub name: &'static str,
    pub total_time: Duration,
    pub call_count: u64,
    pub min_time: Duration,
    pub max_time: Duration,
}

impl ScopeStats {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            total_time: Duration::ZERO,
            call_count: 0,
            min_time: Duration::MAX,
            max_time: Duration::ZERO,
        }
    }

    fn record(&mut self, duration: Duration) {
        self.total_time += duration;
        self.call_count += 1;
        self.min_time = self.min_time.min(duration);
        self.max_time = self.max_time.max(duration);
    }

    pub fn average_time(&self) -> Duration {
        if self.call_count > 0 {
            self.total_time.div_f64(self.call_count as f64)
        } else {
            Duration::ZERO
        }
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一个性能测量作用域
    ///
    /// 如果上一个作用域尚未结束，会先将其结束。
    pub fn begin_scope(&mut self, name: &'static str) {
        self.end_scope();
        self.current_scope = Some((name, Instant::now()));
    }

    /// 结束当前作用域
    pub fn end_scope(&mut self) {
        if let Some((name, start)) = self.current_scope.take() {
            self.record(name, start.elapsed());
        }
    }

    /// 直接记录一次测量结果
    pub fn record(&mut self, name: &'static str, duration: Duration) {
        self.scopes
            .entry(name)
            .or_insert_with(|| ScopeStats::new(name))
            .record(duration);
    }

    /// 创建RAII作用域守卫
    pub fn scope(&mut self, name: &'static str) -> ProfileScope<'_> {
        ProfileScope::new(self, name)
    }

    /// 获取作用域统计信息
    pub fn get_stats(&self, name: &str) -> Option<&ScopeStats> {
        self.scopes.get(name)
    }

    /// 获取所有统计信息（按总耗时降序）
    pub fn all_stats(&self) -> Vec<&ScopeStats> {
        let mut stats: Vec<_> = self.scopes.values().collect();
        stats.sort_by(|a, b| b.total_time.cmp(&a.total_time));
        stats
    }

    /// 清空所有统计信息
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.current_scope = None;
    }

    /// 通过tracing输出性能报告
    pub fn log_report(&self) {
        for stat in self.all_stats() {
            tracing::info!(
                target: "profiling",
                "{}: {} calls, total: {:?}, avg: {:?}, min: {:?}, max: {:?}",
                stat.name,
                stat.call_count,
                stat.total_time,
                stat.average_time(),
                stat.min_time,
                stat.max_time
            );
        }
    }
}

/// 性能测量作用域守卫 - 使用RAII自动测量
pub struct ProfileScope<'a> {
    profiler: &'a mut Profiler,
}

impl<'a> ProfileScope<'a> {
    pub fn new(profiler: &'a mut Profiler, name: &'static str) -> Self {
        profiler.begin_scope(name);
        Self { profiler }
    }
}

impl<'a> Drop for ProfileScope<'a> {
    fn drop(&mut self) {
        self.profiler.end_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_profiler() {
        let mut profiler = Profiler::new();

        profiler.begin_scope("test_scope");
        thread::sleep(Duration::from_millis(10));
        profiler.end_scope();

        profiler.begin_scope("test_scope");
        thread::sleep(Duration::from_millis(20));
        profiler.end_scope();

        let stats = profiler.get_stats("test_scope").unwrap();
        assert_eq!(stats.call_count, 2);
        assert!(stats.total_time >= Duration::from_millis(30));
        assert!(stats.min_time >= Duration::from_millis(10));
        assert!(stats.max_time >= Duration::from_millis(20));
    }

    #[test]
    fn test_profile_scope() {
        let mut profiler = Profiler::new();

        {
            let _scope = profiler.scope("auto_scope");
            thread::sleep(Duration::from_millis(5));
        } // 作用域结束时自动调用end_scope

        let stats = profiler.get_stats("auto_scope").unwrap();
        assert_eq!(stats.call_count, 1);
    }

    #[test]
    fn test_begin_closes_previous_scope() {
        let mut profiler = Profiler::new();
        profiler.begin_scope("first");
        profiler.begin_scope("second");
        profiler.end_scope();

        assert_eq!(profiler.get_stats("first").unwrap().call_count, 1);
        assert_eq!(profiler.get_stats("second").unwrap().call_count, 1);
    }

    #[test]
    fn test_average_time() {
        let mut profiler = Profiler::new();
        profiler.record("phase", Duration::from_millis(10));
        profiler.record("phase", Duration::from_millis(30));

        let stats = profiler.get_stats("phase").unwrap();
        assert_eq!(stats.average_time(), Duration::from_millis(20));
        assert_eq!(stats.min_time, Duration::from_millis(10));
        assert_eq!(stats.max_time, Duration::from_millis(30));
    }
}
