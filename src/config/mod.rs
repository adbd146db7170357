//! 配置管理模块
//!
//! 提供环境变量与TOML配置文件的加载和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{load_dotenv, ConfigLoader, EnvConfigLoader, TomlConfigLoader};
pub use types::{
    validate_config, Config, FetchFailurePolicy, RunConfig, TeamsConfig, WordPressConfig,
};
