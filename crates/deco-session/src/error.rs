//! deco-session エラー型

use deco_crypto::CryptoError;
use deco_transport::EnvelopeError;
use thiserror::Error;

/// ハンドシェイクの終端エラー
///
/// どのステップで失敗しても、その試行のセッション状態はすべて破棄される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// ホストに到達できない（ハンドシェイクは開始しない）
    #[error("host unreachable: {0}")]
    HostUnreachable(String),
    /// 鍵取得（form=keys / form=auth）がエラーコードを返した
    #[error("key retrieval (form={form}) failed with error_code {error_code}")]
    KeyRetrieval { form: &'static str, error_code: i64 },
    /// ログインがエラーコードを返した
    #[error("login rejected with error_code {0}")]
    LoginRejected(i64),
    /// ログインは成功したがトークンが発行されなかった
    #[error("no token issued")]
    NoToken,
    /// 応答の構造が想定と異なる
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// 鍵の構築・暗号化に失敗
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// エンベロープ（送受信・復号）に失敗
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}
