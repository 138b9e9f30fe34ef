//! 型付きクライアント
//!
//! 各メソッドは「読み取り要求 → 暗号化エンベロープ → 構造的分類 → 型付きペイロード」を
//! 1 往復で行う。セッションのロックは往復が終わるまで保持する。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use deco_session::SessionManager;
use deco_transport::{send_encrypted, DecoTransport, HttpTransport};

use crate::config::DecoConfig;
use crate::error::DecoError;
use crate::models::{
    AdvancedSettingsResult, ClientListResult, DeviceListResult, InternetResult,
    PerformanceResult, WanResult, WlanResult,
};
use crate::request::{endpoints, Endpoint, RequestBody};
use crate::response::{decode, Outcome, ResponseOutcome};

/// Deco ルーター 1 台分のクライアント
///
/// `T` はテストで偽ルーターに差し替えるためのトランスポート。
pub struct DecoClient<T = HttpTransport> {
    manager: SessionManager<T>,
}

impl DecoClient<HttpTransport> {
    /// 既定設定（admin / 10 秒 / TLS 検証あり）で作る
    pub fn new(host: &str) -> Result<Self, DecoError> {
        Self::from_config(&DecoConfig::new(host))
    }

    pub fn from_config(config: &DecoConfig) -> Result<Self, DecoError> {
        config.validate()?;
        let transport = HttpTransport::new(&config.host, config.timeout(), config.verify_tls)?;
        Ok(Self::with_transport(transport, config.username.clone()))
    }
}

impl<T> DecoClient<T>
where
    T: DecoTransport,
{
    pub fn with_transport(transport: T, username: impl Into<String>) -> Self {
        DecoClient {
            manager: SessionManager::new(transport, username),
        }
    }

    pub fn transport(&self) -> &T {
        self.manager.transport()
    }

    // ========================================================================
    // 認証
    // ========================================================================

    /// ログインしてセッションを張る。成功なら `true`
    ///
    /// 失敗理由はログにだけ出す。理由が必要なら [`DecoClient::try_authenticate`] を使う。
    pub async fn authenticate(&self, password: &str) -> bool {
        match self.try_authenticate(password).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "authentication failed");
                false
            }
        }
    }

    /// ログインしてセッションを張る
    ///
    /// 既存のセッションは破棄され、鍵・トークン・シーケンス番号はすべて作り直される。
    pub async fn try_authenticate(&self, password: &str) -> Result<(), DecoError> {
        self.manager.authenticate(password).await?;
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.manager.is_authenticated().await
    }

    /// ローカルのセッション状態を捨てる。ルーター側には何も送らない
    pub async fn logout(&self) {
        self.manager.invalidate().await;
    }

    // ========================================================================
    // 型付き要求
    // ========================================================================

    /// メッシュノードの一覧
    pub async fn device_list(&self) -> Result<Outcome<DeviceListResult>, DecoError> {
        self.read(endpoints::DEVICE_LIST).await
    }

    /// 接続中クライアントの一覧
    ///
    /// `name` は Base64 で届くので復号して返す。復号できない名前は受け取ったまま残す。
    pub async fn client_list(&self) -> Result<Outcome<ClientListResult>, DecoError> {
        let body = RequestBody::read_with(json!({ "device_mac": "default" }));
        let outcome: Outcome<ClientListResult> =
            self.request(endpoints::CLIENT_LIST, &body).await?;
        Ok(outcome.map(|mut response| {
            if let Some(result) = response.result.as_mut() {
                decode_client_names(result);
            }
            response
        }))
    }

    /// CPU / メモリ使用率
    pub async fn performance(&self) -> Result<Outcome<PerformanceResult>, DecoError> {
        self.read(endpoints::PERFORMANCE).await
    }

    pub async fn wan(&self) -> Result<Outcome<WanResult>, DecoError> {
        self.read(endpoints::WAN).await
    }

    pub async fn lan(&self) -> Result<Outcome<Value>, DecoError> {
        self.read(endpoints::LAN).await
    }

    pub async fn internet(&self) -> Result<Outcome<InternetResult>, DecoError> {
        self.read(endpoints::INTERNET).await
    }

    pub async fn firmware(&self) -> Result<Outcome<Value>, DecoError> {
        self.read(endpoints::FIRMWARE).await
    }

    /// 無線設定
    ///
    /// host / guest の `ssid` と `password` は Base64 で届くので復号して返す。
    pub async fn wlan(&self) -> Result<Outcome<WlanResult>, DecoError> {
        let outcome: Outcome<WlanResult> = self.read(endpoints::WLAN).await?;
        Ok(outcome.map(|mut response| {
            if let Some(result) = response.result.as_mut() {
                decode_wlan_fields(result);
            }
            response
        }))
    }

    pub async fn advanced_settings(&self) -> Result<Outcome<AdvancedSettingsResult>, DecoError> {
        self.read(endpoints::ADVANCED_SETTINGS).await
    }

    pub async fn model(&self) -> Result<Outcome<Value>, DecoError> {
        self.read(endpoints::MODEL).await
    }

    pub async fn environment(&self) -> Result<Outcome<Value>, DecoError> {
        self.read(endpoints::ENVIRONMENT).await
    }

    pub async fn status(&self) -> Result<Outcome<Value>, DecoError> {
        self.read(endpoints::STATUS).await
    }

    /// 指定した MAC アドレスのノードを再起動する
    pub async fn reboot<S: AsRef<str>>(&self, macs: &[S]) -> Result<Outcome<Value>, DecoError> {
        self.request(endpoints::REBOOT, &RequestBody::reboot(macs)).await
    }

    /// 任意のモジュール・form に任意の本文を送る
    ///
    /// `module` は `/admin/device` のように先頭にスラッシュを付ける。
    pub async fn custom(
        &self,
        module: &str,
        form: &str,
        body: &[u8],
    ) -> Result<ResponseOutcome<Value>, DecoError> {
        let value = self.send(module, form, body).await?;
        Ok(crate::response::classify(value))
    }

    // ========================================================================
    // 内部
    // ========================================================================

    async fn read<R>(&self, endpoint: Endpoint) -> Result<Outcome<R>, DecoError>
    where
        R: DeserializeOwned,
    {
        self.request(endpoint, &RequestBody::read()).await
    }

    async fn request<R>(&self, endpoint: Endpoint, body: &RequestBody) -> Result<Outcome<R>, DecoError>
    where
        R: DeserializeOwned,
    {
        let bytes = body.to_bytes()?;
        let value = self.send(endpoint.module, endpoint.form, &bytes).await?;
        let outcome = decode(value)?;
        if let ResponseOutcome::Failure(err) = &outcome {
            warn!(form = endpoint.form, errorcode = %err.errorcode, "router returned error response");
        }
        Ok(outcome)
    }

    async fn send(&self, module: &str, form: &str, body: &[u8]) -> Result<Value, DecoError> {
        let guard = self.manager.lock().await;
        let session = guard.as_ref().ok_or(DecoError::NotAuthenticated)?;

        debug!(module, form, "encrypted request");
        let value = send_encrypted(
            self.manager.transport(),
            &session.signing_context(),
            &session.path(module),
            form,
            body,
            false,
        )
        .await?;
        Ok(value)
    }
}

/// Base64 → UTF-8。どちらかに失敗したら `None`
fn decode_base64_text(raw: &str) -> Option<String> {
    STANDARD
        .decode(raw.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

fn decode_client_names(result: &mut ClientListResult) {
    for client in &mut result.client_list {
        match decode_base64_text(&client.name) {
            Some(name) => client.name = name,
            None => warn!(mac = %client.mac, "client name is not base64, keeping raw value"),
        }
    }
}

fn decode_wlan_fields(result: &mut WlanResult) {
    let bands = std::iter::once(("band2_4", &mut result.band2_4))
        .chain(result.band5_1.as_mut().map(|band| ("band5_1", band)));
    for (band_name, band) in bands {
        for (network_name, network) in [("host", &mut band.host), ("guest", &mut band.guest)] {
            match decode_base64_text(&network.ssid) {
                Some(ssid) => network.ssid = ssid,
                None => warn!(
                    band = band_name,
                    network = network_name,
                    "ssid is not base64, keeping raw value"
                ),
            }
            if let Some(password) = network.password.as_mut() {
                match decode_base64_text(password) {
                    Some(decoded) => *password = decoded,
                    None => warn!(
                        band = band_name,
                        network = network_name,
                        "wlan password is not base64, keeping raw value"
                    ),
                }
            }
        }
    }
}
