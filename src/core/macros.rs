//! 核心宏定义
//!
//! 提供统一的宏来减少配置结构体的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use particle_engine::impl_default;
///
/// struct EmitterLimits {
///     max_per_frame: u32,
///     label: String,
/// }
///
/// impl_default!(EmitterLimits {
///     max_per_frame: 64,
///     label: String::from("default"),
/// });
///
/// assert_eq!(EmitterLimits::default().max_per_frame, 64);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
