//! 認証情報フィンガープリント
//!
//! `MD5(username ++ password)` の小文字 16 進数。すべての sign 文字列に
//! `h=<fingerprint>` として含まれる。

use md5::{Digest, Md5};

/// 認証情報のフィンガープリント（32 文字の小文字 16 進数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFingerprint(String);

impl CredentialFingerprint {
    /// ユーザー名とパスワードを連結して MD5 を取る
    pub fn compute(username: &str, password: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(username.as_bytes());
        hasher.update(password.as_bytes());
        CredentialFingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CredentialFingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
