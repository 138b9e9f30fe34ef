//! # deco-transport
//!
//! Deco 管理 API の署名付き暗号化エンベロープと HTTP トランスポート。
//!
//! ## Wire Format
//!
//! ```text
//! POST http://<host>/cgi-bin/luci/;stok=<token>/<module>?form=<form>
//! Content-Type: application/json        ← 本文はフォーム形式だが固定
//! Accept-Encoding: gzip
//!
//! sign=<urlencode(rsa_hex[ + rsa_hex])>&data=<urlencode(base64(aes(body)))>
//! ```
//!
//! 応答は `{"data": "<base64>"}`。`data` をセッションの AES 鍵で復号すると JSON になる。

pub mod envelope;
pub mod error;
pub mod http;
pub mod sign;

pub use envelope::{open, seal, send_encrypted, send_plain, SealedRequest, SigningContext};
pub use error::{EnvelopeError, Result, TransportError};
pub use http::{DecoTransport, HttpTransport, DEFAULT_TIMEOUT};
pub use sign::{build_sign_text, encrypt_sign, split_sign, SIGN_SPLIT_THRESHOLD};

/// ログイン前の呼び出しに使うパス（トークンは空）
pub const LOGIN_PATH: &str = ";stok=/login";

/// 認証済み呼び出しのパス `;stok=<token><module>` を組み立てる
///
/// `module` は `/admin/device` のように `/` で始まる。
pub fn authenticated_path(token: &str, module: &str) -> String {
    format!(";stok={}{}", token, module)
}
