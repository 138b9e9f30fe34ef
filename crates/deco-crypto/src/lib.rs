//! # deco-crypto
//!
//! Deco ローカル管理 API で使われる暗号プリミティブ。
//!
//! ## 使われ方
//!
//! ```text
//! リクエスト本文:
//!   JSON → PKCS7(16) → AES-128-CBC(session key, iv) → Base64   = data
//!
//! sign:
//!   "h=<MD5(user ++ pass)>&s=<seq + len(data)>"
//!   → RSA PKCS#1 v1.5（ルーターのセッション鍵、512bit）→ 16 進数 = sign
//!
//! ログインパスワード:
//!   password → RSA PKCS#1 v1.5（ルーターのパスワード鍵）→ 16 進数
//! ```
//!
//! sign の分割（53 文字ごと）はプロトコル側の責務で、`deco-transport` が担当する。

mod asymmetric;
mod error;
mod fingerprint;
mod symmetric;

pub use asymmetric::{PublicKey, PKCS1_V15_OVERHEAD};
pub use error::{CryptoError, Result};
pub use fingerprint::CredentialFingerprint;
pub use symmetric::{pkcs7_pad, SymmetricSessionKey, AES_BLOCK_SIZE, SESSION_KEY_LEN};
