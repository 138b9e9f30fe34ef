//! リクエスト本文とエンドポイント表

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::DecoError;

/// 暗号化前のリクエスト本文 `{"operation": .., "params": ..}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestBody {
    /// `{"operation":"read"}`
    pub fn read() -> Self {
        RequestBody {
            operation: "read".into(),
            params: None,
        }
    }

    pub fn read_with(params: Value) -> Self {
        RequestBody {
            operation: "read".into(),
            params: Some(params),
        }
    }

    /// 指定ノードの再起動。MAC アドレスは大文字に揃える
    pub fn reboot<S: AsRef<str>>(macs: &[S]) -> Self {
        let mac_list: Vec<Value> = macs
            .iter()
            .map(|mac| json!({ "mac": mac.as_ref().to_uppercase() }))
            .collect();
        RequestBody {
            operation: "reboot".into(),
            params: Some(json!({ "mac_list": mac_list })),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DecoError> {
        serde_json::to_vec(self).map_err(|e| DecoError::Encode(e.to_string()))
    }
}

/// `;stok=<token>` に続くモジュールパスと `form` の組
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub module: &'static str,
    pub form: &'static str,
}

impl Endpoint {
    pub const fn new(module: &'static str, form: &'static str) -> Self {
        Endpoint { module, form }
    }
}

pub mod endpoints {
    use super::Endpoint;

    pub const DEVICE_LIST: Endpoint = Endpoint::new("/admin/device", "device_list");
    pub const MODEL: Endpoint = Endpoint::new("/admin/device", "model");
    pub const REBOOT: Endpoint = Endpoint::new("/admin/device", "system");
    pub const CLIENT_LIST: Endpoint = Endpoint::new("/admin/client", "client_list");
    pub const PERFORMANCE: Endpoint = Endpoint::new("/admin/network", "performance");
    pub const WAN: Endpoint = Endpoint::new("/admin/network", "wan_ipv4");
    pub const LAN: Endpoint = Endpoint::new("/admin/network", "lan_ip");
    pub const INTERNET: Endpoint = Endpoint::new("/admin/network", "internet");
    pub const FIRMWARE: Endpoint = Endpoint::new("/admin/firmware", "upgrade");
    pub const WLAN: Endpoint = Endpoint::new("/admin/wireless", "wlan");
    pub const ADVANCED_SETTINGS: Endpoint = Endpoint::new("/admin/wireless", "power");
    pub const ENVIRONMENT: Endpoint = Endpoint::new("/admin/system", "envar");
    pub const STATUS: Endpoint = Endpoint::new("/admin/status", "all");
}
