//! クライアント設定
//!
//! ```toml
//! host = "192.168.68.1"
//! username = "admin"     # 省略時 admin
//! timeout_secs = 10      # 省略時 10
//! verify_tls = true      # 省略時 true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DecoError;

fn default_username() -> String {
    deco_session::DEFAULT_USERNAME.to_string()
}

fn default_timeout_secs() -> u64 {
    deco_transport::DEFAULT_TIMEOUT.as_secs()
}

fn default_verify_tls() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoConfig {
    /// ルーターのホスト名または IP（スキームなし）
    pub host: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl DecoConfig {
    pub fn new(host: impl Into<String>) -> Self {
        DecoConfig {
            host: host.into(),
            username: default_username(),
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
        }
    }

    /// TOML 文字列から読み込んで検証する
    pub fn from_toml_str(text: &str) -> Result<Self, DecoError> {
        let config: DecoConfig =
            toml::from_str(text).map_err(|e| DecoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        if self.host.trim().is_empty() {
            return Err(DecoError::Config("host must not be empty".into()));
        }
        if self.host.contains("://") {
            return Err(DecoError::Config("host must not include a scheme".into()));
        }
        if self.username.is_empty() {
            return Err(DecoError::Config("username must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(DecoError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
