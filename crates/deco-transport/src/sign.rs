//! sign 文字列の組み立てと RSA 暗号化
//!
//! ## sign の形式
//!
//! ```text
//! ログイン:   k=<aes key>&i=<aes iv>&h=<fingerprint>&s=<seq + len(data)>
//! それ以外:   h=<fingerprint>&s=<seq + len(data)>
//! ```
//!
//! ## 分割
//!
//! ルーターの鍵は 512bit（64 バイト）で、PKCS#1 v1.5 の 1 ブロックに入る平文は
//! 64 - 11 = 53 バイト。53 文字を超える sign は `[0..53]` と `[53..]` に分けて
//! それぞれ暗号化し、16 進数を連結する。

use deco_crypto::{CredentialFingerprint, CryptoError, PublicKey, SymmetricSessionKey};

/// sign を分割する閾値（文字数）
///
/// ルーター側の鍵長に結びついた固定値。鍵から動的に求めてはいけない。
pub const SIGN_SPLIT_THRESHOLD: usize = 53;

/// sign 文字列を組み立てる
///
/// `login_key` が `Some` のときはログイン用の sign（AES 鍵と IV を含む）になる。
///
/// # エラー
/// - `CryptoError::KeyNotPrintable`: AES 鍵が sign に埋め込めない
pub fn build_sign_text(
    fingerprint: &CredentialFingerprint,
    length: i64,
    login_key: Option<&SymmetricSessionKey>,
) -> Result<String, CryptoError> {
    match login_key {
        Some(aes) => Ok(format!(
            "k={}&i={}&h={}&s={}",
            aes.key_text()?,
            aes.iv_text()?,
            fingerprint,
            length
        )),
        None => Ok(format!("h={}&s={}", fingerprint, length)),
    }
}

/// sign を閾値で分割する。分割不要なら後半は `None`
pub fn split_sign(sign: &str) -> (&str, Option<&str>) {
    if sign.len() > SIGN_SPLIT_THRESHOLD && sign.is_char_boundary(SIGN_SPLIT_THRESHOLD) {
        let (first, second) = sign.split_at(SIGN_SPLIT_THRESHOLD);
        (first, Some(second))
    } else {
        (sign, None)
    }
}

/// sign を RSA 暗号化する（必要なら 2 ブロックに分割）
pub fn encrypt_sign(sign: &str, key: &PublicKey) -> Result<String, CryptoError> {
    match split_sign(sign) {
        (whole, None) => key.encrypt_hex(whole),
        (first, Some(second)) => {
            tracing::debug!(
                sign_len = sign.len(),
                "sign exceeds {} chars, encrypting as two blocks",
                SIGN_SPLIT_THRESHOLD
            );
            let mut out = key.encrypt_hex(first)?;
            out.push_str(&key.encrypt_hex(second)?);
            Ok(out)
        }
    }
}
