//! 配置加载器实现
//!
//! 支持两种配置来源：
//! - 环境变量（可由 `.env` 文件补充），这是默认方式
//! - TOML 配置文件，支持 `${VAR}` 形式的环境变量替换

use crate::config::types::{validate_config, Config, RunConfig, TeamsConfig, WordPressConfig};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// WordPress 站点URL
pub const ENV_BASE_URL: &str = "WP_BASE_URL";
/// WordPress 用户名
pub const ENV_USER: &str = "WP_USER";
/// WordPress 应用程序密码
pub const ENV_APPLICATION_PASSWORD: &str = "WP_APPLICATION_PASSWORD";
/// Teams webhook URL
pub const ENV_WEBHOOK_URL: &str = "MS_TEAMS_WEBHOOK_URL";

const ENV_LOOKBACK_HOURS: &str = "POST_NOTIFIER_LOOKBACK_HOURS";
const ENV_DELIVERY_DELAY: &str = "POST_NOTIFIER_DELIVERY_DELAY_SECONDS";
const ENV_REQUEST_TIMEOUT: &str = "POST_NOTIFIER_REQUEST_TIMEOUT_SECONDS";
const ENV_RESOLVE_AUTHORS: &str = "POST_NOTIFIER_RESOLVE_AUTHORS";
const ENV_FETCH_FAILURE_POLICY: &str = "POST_NOTIFIER_FETCH_FAILURE_POLICY";
const ENV_DRY_RUN: &str = "POST_NOTIFIER_DRY_RUN";

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 加载并验证配置
    async fn load(&self) -> Result<Config>;

    /// 验证配置
    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 从当前目录向上查找并加载 `.env` 文件
///
/// 已存在的环境变量不会被覆盖。找不到文件不是错误。
///
/// # 返回
/// * `Result<Option<PathBuf>>` - 加载的文件路径（如果有）
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => {
            log::debug!("已加载 .env 文件: {}", path.display());
            Ok(Some(path))
        }
        Err(e) if e.not_found() => {
            log::debug!("未找到 .env 文件，仅使用进程环境变量");
            Ok(None)
        }
        Err(e) => Err(ConfigError::ParseError(format!(".env 文件解析失败: {e}")).into()),
    }
}

/// 环境变量配置加载器
#[derive(Debug, Clone, Default)]
pub struct EnvConfigLoader;

impl EnvConfigLoader {
    /// 创建新的环境变量配置加载器
    pub fn new() -> Self {
        Self
    }

    /// 通过查找函数构建配置
    ///
    /// # 参数
    /// * `lookup` - 变量名到取值的查找函数
    ///
    /// # 返回
    /// * `Result<Config>` - 构建的配置或错误
    pub fn load_with<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let wordpress = WordPressConfig {
            base_url: required_var(&lookup, ENV_BASE_URL)?,
            username: required_var(&lookup, ENV_USER)?,
            application_password: required_var(&lookup, ENV_APPLICATION_PASSWORD)?,
        };
        let teams = TeamsConfig {
            webhook_url: required_var(&lookup, ENV_WEBHOOK_URL)?,
        };

        let defaults = RunConfig::default();
        let run = RunConfig {
            lookback_hours: optional_var(&lookup, ENV_LOOKBACK_HOURS)?
                .unwrap_or(defaults.lookback_hours),
            delivery_delay_seconds: optional_var(&lookup, ENV_DELIVERY_DELAY)?
                .unwrap_or(defaults.delivery_delay_seconds),
            request_timeout_seconds: optional_var(&lookup, ENV_REQUEST_TIMEOUT)?
                .unwrap_or(defaults.request_timeout_seconds),
            resolve_authors: optional_var(&lookup, ENV_RESOLVE_AUTHORS)?
                .unwrap_or(defaults.resolve_authors),
            fetch_failure_policy: optional_var(&lookup, ENV_FETCH_FAILURE_POLICY)?
                .unwrap_or(defaults.fetch_failure_policy),
            dry_run: optional_var(&lookup, ENV_DRY_RUN)?.unwrap_or(defaults.dry_run),
        };

        let config = Config {
            wordpress,
            teams,
            run,
        };
        self.validate(&config)?;
        Ok(config)
    }
}

#[async_trait]
impl ConfigLoader for EnvConfigLoader {
    async fn load(&self) -> Result<Config> {
        let config = self.load_with(|name| std::env::var(name).ok())?;
        log::debug!("已从环境变量加载配置: {:?}", config);
        Ok(config)
    }
}

fn required_var<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar {
            var: name.to_string(),
        }
        .into()),
    }
}

fn optional_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| {
                ConfigError::InvalidVar {
                    var: name.to_string(),
                    value,
                }
                .into()
            }),
        _ => Ok(None),
    }
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 配置文件路径
    path: PathBuf,
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new<P: AsRef<Path>>(path: P, enable_env_substitution: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            enable_env_substitution,
        }
    }

    /// 从字符串加载配置
    pub fn load_from_string(&self, content: &str) -> Result<Config> {
        let config = self.parse_toml(content)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut missing = None;
        let result = env_var_regex.replace_all(content, |captures: &regex::Captures| {
            let var_name = &captures[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarError { var }.into()),
            None => Ok(result.into_owned()),
        }
    }

    fn parse_toml(&self, content: &str) -> Result<Config> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: Config = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(config)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {}", e)))?;

        let config = self.load_from_string(&content)?;

        log::info!("成功加载配置文件: {}", self.path.display());
        log::debug!("配置内容: {:?}", config);

        Ok(config)
    }
}
