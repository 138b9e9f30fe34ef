//! 認証済みセッション
//!
//! 1 回のハンドシェイクで一緒に作られ、一緒に破棄される値の集まり。

use core::fmt;

use deco_crypto::{CredentialFingerprint, PublicKey, SymmetricSessionKey};
use deco_transport::{authenticated_path, SigningContext};

/// ハンドシェイクの状態
///
/// ```text
/// Unauthenticated → ProbingHost → KeysRetrieved → LoggingIn → Authenticated
///                        ↘              ↘              ↘
///                                     Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Unauthenticated,
    ProbingHost,
    KeysRetrieved,
    LoggingIn,
    Authenticated,
    /// この試行は終了。再試行は新しい状態から始める
    Failed,
}

/// 認証済みセッション
///
/// トークン・AES 鍵・セッション RSA 鍵・フィンガープリント・シーケンス番号を所有し、
/// エンベロープには [`Session::signing_context`] で参照だけを貸す。
pub struct Session {
    token: String,
    aes: SymmetricSessionKey,
    fingerprint: CredentialFingerprint,
    rsa: PublicKey,
    /// ログイン時に受け取った値をセッション中ずっと使う
    sequence: i64,
}

impl Session {
    pub(crate) fn new(
        token: String,
        aes: SymmetricSessionKey,
        fingerprint: CredentialFingerprint,
        rsa: PublicKey,
        sequence: i64,
    ) -> Self {
        Session {
            token,
            aes,
            fingerprint,
            rsa,
            sequence,
        }
    }

    /// セッショントークン（stok）
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// 署名付き呼び出し 1 回分の鍵とシーケンス番号
    pub fn signing_context(&self) -> SigningContext<'_> {
        SigningContext {
            aes: &self.aes,
            fingerprint: &self.fingerprint,
            rsa: &self.rsa,
            sequence: self.sequence,
        }
    }

    /// `;stok=<token><module>`
    pub fn path(&self, module: &str) -> String {
        authenticated_path(&self.token, module)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
