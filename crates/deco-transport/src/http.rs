//! HTTP トランスポート
//!
//! [`DecoTransport`] はエンベロープとネットワークの境界。テストでは
//! 秘密鍵を持つ偽ルーターに差し替える。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::error::TransportError;

/// リクエストタイムアウトの既定値
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// ルーターの管理 API が置かれているパス
const LUCI_BASE_PATH: &str = "/cgi-bin/luci/";

/// ルーターとの送受信
#[async_trait]
pub trait DecoTransport: Send + Sync {
    /// ホストに平文の GET を送り、HTTP 200 が返れば `true`
    async fn probe(&self) -> Result<bool, TransportError>;

    /// `<base>/<path>?form=<form>` に本文を POST し、応答本文を返す
    ///
    /// `path` は `;stok=<token>/<module>` の形。
    ///
    /// [`HttpTransport`] は reqwest が必ず付ける `Accept: */*` を外せない。
    /// 実機のクライアントは `Accept` を送らないので、この点だけ送信内容が異なる。
    async fn post(&self, path: &str, form: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// `reqwest` による HTTP/1.1 トランスポート
///
/// クライアントごとに cookie jar を 1 つ持ち、セッション中の呼び出しで共有する。
pub struct HttpTransport {
    host: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// # 引数
    /// - `host`: ルーターのホスト名または IP（スキームなし）
    /// - `timeout`: 1 リクエストあたりのタイムアウト
    /// - `verify_tls`: `false` なら証明書を検証しない（HTTPS 経由の場合のみ意味を持つ）
    pub fn new(host: &str, timeout: Duration, verify_tls: bool) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(HttpTransport {
            host: host.to_string(),
            base_url: format!("http://{}{}", host, LUCI_BASE_PATH),
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl DecoTransport for HttpTransport {
    async fn probe(&self) -> Result<bool, TransportError> {
        let response = self
            .client
            .get(format!("http://{}", self.host))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Ok(response.status() == StatusCode::OK)
    }

    async fn post(&self, path: &str, form: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!(%url, form, body_len = body.len(), "POST");

        // 本文はフォーム形式だが、ルーターは application/json を要求する
        let response = self
            .client
            .post(url)
            .query(&[("form", form)])
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Http(err.to_string())
    }
}
