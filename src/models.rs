// models.rs - 作为模块目录入口文件（Rust 2018+ 风格）
pub mod config;
pub mod metric_value;
pub mod record;
pub mod utils;

// 重新导出常用类型
pub use config::{ColorConfig, Config, ElementsConfig, FetchConfig, KeybindingsConfig};
pub use metric_value::MetricValue;
pub use record::{ExperimentRecord, RunRow};
