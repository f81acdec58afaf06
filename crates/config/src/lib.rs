//! custody-config - 配置加载库
//!
//! 配置按以下顺序合并（后者覆盖前者）：
//! 1. 内置默认值
//! 2. TOML 配置文件（`GATEWAY_CONFIG`，默认 `config/gateway.toml`，可不存在）
//! 3. `GATEWAY_` 前缀的环境变量，`__` 作为层级分隔符（如 `GATEWAY_SERVER__PORT`）
//! 4. `CUSTODY_BACKED`，覆盖 custody 服务地址

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// custody 服务的默认地址
pub const DEFAULT_CUSTODY_ENDPOINT: &str = "custody-service.backend:5001";

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "config/gateway.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid custody endpoint '{0}': {1}")]
    InvalidEndpoint(String, &'static str),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// custody 服务客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyConfig {
    /// 服务地址，可以不带 scheme
    pub endpoint: String,
    /// 单次调用超时，未设置时不限时
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CUSTODY_ENDPOINT.to_string(),
            timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

impl CustodyConfig {
    /// 规范化后的 URI，没有 scheme 时补 `http://`
    pub fn endpoint_uri(&self) -> String {
        let endpoint = self.endpoint.trim();
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// 网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub app_env: String,
    pub server: ServerConfig,
    pub custody: CustodyConfig,
    pub telemetry: TelemetryConfig,
    /// 为空时 CORS 放行所有来源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            server: ServerConfig::default(),
            custody: CustodyConfig::default(),
            telemetry: TelemetryConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("GATEWAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// 构建 Figment，不做提取
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("GATEWAY_").split("__"))
            .merge(
                Env::raw()
                    .only(&["CUSTODY_BACKED"])
                    .map(|_| "custody.endpoint".into()),
            )
    }

    /// 校验 custody 地址
    ///
    /// 通道是明文 HTTP/2，不支持 https。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.custody.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::InvalidEndpoint(
                self.custody.endpoint.clone(),
                "endpoint must not be empty",
            ));
        }
        if !self.custody.endpoint_uri().starts_with("http://") {
            return Err(ConfigError::InvalidEndpoint(
                self.custody.endpoint.clone(),
                "only plaintext http endpoints are supported",
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
