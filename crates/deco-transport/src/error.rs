//! deco-transport エラー型

use deco_crypto::CryptoError;
use thiserror::Error;

/// HTTP 層のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 接続失敗などのネットワークエラー
    #[error("HTTP request failed: {0}")]
    Http(String),
    /// リクエストがタイムアウトした
    #[error("HTTP request timed out")]
    Timeout,
    /// 2xx 以外のステータス
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// 署名付き暗号化エンベロープのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// リクエスト側の暗号化（AES / RSA）に失敗
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// 送受信に失敗
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// 応答の Base64 / AES / JSON デコードに失敗
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// deco-transport の Result 型
pub type Result<T> = core::result::Result<T, EnvelopeError>;
