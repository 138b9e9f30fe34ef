//! 暗号エラー型

use thiserror::Error;

/// 暗号操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// PKCS7 パディング対象が空
    #[error("invalid PKCS7 data (empty or not padded)")]
    EmptyPlaintext,
    /// ブロックサイズが不正（0 または 255 超）
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),
    /// Base64 デコードに失敗
    #[error("invalid Base64 encoding")]
    InvalidBase64,
    /// AES 復号に失敗（パディング不正、ブロック長不正を含む）
    #[error("AES decryption failed")]
    DecryptionFailed,
    /// RSA / AES 暗号化に失敗
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    /// RSA 公開鍵（modulus / exponent）の解析に失敗
    #[error("failed to parse RSA public key: {0}")]
    KeyParse(String),
    /// OS の乱数源が利用できない
    #[error("system random source unavailable")]
    RandomUnavailable,
    /// セッション鍵が印字可能な ASCII ではない（sign に埋め込めない）
    #[error("session key is not printable ASCII")]
    KeyNotPrintable,
}

/// deco-crypto の Result 型
pub type Result<T> = core::result::Result<T, CryptoError>;
