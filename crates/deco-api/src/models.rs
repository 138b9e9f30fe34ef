//! 応答ペイロードの型
//!
//! ファームウェアによって欠けるフィールドがあるので、すべて既定値付きで読み込む。

use serde::{Deserialize, Serialize};

// ============================================================================
// デバイス（メッシュノード）
// ============================================================================

/// `admin/device?form=device_list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceListResult {
    pub device_list: Vec<DeviceInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub device_ip: String,
    pub device_id: String,
    pub device_type: String,
    pub device_model: String,
    pub nickname: String,
    pub custom_nickname: Option<String>,
    pub mac: String,
    /// `master` または `slave`
    pub role: String,
    pub software_ver: String,
    pub hardware_ver: String,
    pub inet_status: String,
    pub inet_error_msg: String,
    pub group_status: String,
    pub connection_type: Vec<String>,
    pub signal_level: Option<SignalLevel>,
}

/// バンドごとのバックホール信号レベル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalLevel {
    pub band2_4: String,
    pub band5: String,
}

// ============================================================================
// クライアント
// ============================================================================

/// `admin/client?form=client_list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientListResult {
    pub client_list: Vec<ClientInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    /// 受信時は Base64。`DecoClient::client_list` が復号して返す
    pub name: String,
    pub mac: String,
    pub ip: String,
    pub online: bool,
    pub client_mesh: bool,
    pub client_type: String,
    pub connection_type: String,
    pub interface: String,
    pub wire_type: String,
    pub access_host: String,
    pub owner_id: String,
    pub space_id: String,
    pub enable_priority: bool,
    pub remain_time: i64,
    pub up_speed: f64,
    pub down_speed: f64,
}

// ============================================================================
// ネットワーク
// ============================================================================

/// `admin/network?form=performance`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceResult {
    /// 0.0 〜 1.0
    pub cpu_usage: f64,
    /// 0.0 〜 1.0
    pub mem_usage: f64,
}

/// `admin/network?form=wan_ipv4`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanResult {
    pub wan: WanInfo,
    pub lan: LanInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanInfo {
    pub ip_info: IpInfo,
    pub dial_type: String,
    pub enable_auto_dns: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanInfo {
    pub ip_info: IpInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpInfo {
    pub ip: String,
    pub mask: String,
    pub mac: String,
    pub gateway: String,
    pub dns1: String,
    pub dns2: String,
}

/// `admin/network?form=internet`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternetResult {
    pub ipv4: InternetStatus,
    pub ipv6: InternetStatus,
    pub link_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternetStatus {
    pub dial_type: String,
    pub inet_status: String,
    pub error_code: i64,
    pub connected_time: i64,
    pub auto_detect_type: String,
}

// ============================================================================
// 無線
// ============================================================================

/// `admin/wireless?form=wlan`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WlanResult {
    pub band2_4: WlanBand,
    pub band5_1: Option<WlanBand>,
    pub is_eg: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WlanBand {
    pub host: WlanNetwork,
    pub guest: WlanNetwork,
    pub backhaul: Backhaul,
}

/// `ssid` と `password` は受信時 Base64。`DecoClient::wlan` が復号して返す
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WlanNetwork {
    pub ssid: String,
    pub enable: bool,
    pub password: Option<String>,
    pub channel: Option<i64>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backhaul {
    pub channel: i64,
}

/// `admin/wireless?form=power`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettingsResult {
    pub support_dfs: bool,
}
