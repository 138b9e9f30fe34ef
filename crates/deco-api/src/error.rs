//! deco-api エラー型

use deco_crypto::CryptoError;
use deco_session::HandshakeError;
use deco_transport::{EnvelopeError, TransportError};
use thiserror::Error;

/// 呼び出し側に返すエラー
///
/// 型付き要求の失敗はセッションを壊さない。同じセッションで再試行してよい。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoError {
    /// ホストに到達できない
    #[error("host unreachable: {0}")]
    HostUnreachable(String),
    /// ルーターが返した RSA 鍵を解析できない
    #[error("failed to parse RSA key: {0}")]
    KeyParse(String),
    /// RSA / AES による暗号化に失敗
    #[error("encryption failed: {0}")]
    Encryption(String),
    /// ネットワークエラー
    #[error("transport error: {0}")]
    Transport(String),
    /// リクエストがタイムアウトした
    #[error("request timed out")]
    Timeout,
    /// 応答の Base64 / 復号 / JSON 解析に失敗
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// ルーターが構造的なエラー応答（`{errorcode, success}`）を返した
    #[error("router rejected request: errorcode={errorcode}")]
    Protocol { errorcode: String },
    /// 成功形の応答だが `error_code` が 0 以外
    #[error("router returned error_code {0}")]
    Domain(i64),
    /// ハンドシェイク完了前に型付き要求を呼んだ
    #[error("not authenticated")]
    NotAuthenticated,
    /// ハンドシェイクが鍵取得・ログインの段階で拒否された
    #[error("handshake failed: {0}")]
    Handshake(String),
    /// 設定値が不正
    #[error("invalid configuration: {0}")]
    Config(String),
    /// リクエスト本文を JSON にできない
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl From<CryptoError> for DecoError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyParse(reason) => DecoError::KeyParse(reason),
            CryptoError::InvalidBase64 | CryptoError::DecryptionFailed => {
                DecoError::Decode(err.to_string())
            }
            other => DecoError::Encryption(other.to_string()),
        }
    }
}

impl From<TransportError> for DecoError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => DecoError::Timeout,
            other => DecoError::Transport(other.to_string()),
        }
    }
}

impl From<EnvelopeError> for DecoError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Crypto(e) => e.into(),
            EnvelopeError::Transport(e) => e.into(),
            EnvelopeError::Decode(reason) => DecoError::Decode(reason),
        }
    }
}

impl From<HandshakeError> for DecoError {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::HostUnreachable(reason) => DecoError::HostUnreachable(reason),
            HandshakeError::Crypto(e) => e.into(),
            HandshakeError::Envelope(e) => e.into(),
            other => DecoError::Handshake(other.to_string()),
        }
    }
}
