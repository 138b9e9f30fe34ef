//! 署名付き暗号化エンベロープ
//!
//! 1 回の呼び出しごとの処理（状態は持たない）:
//!
//! ```text
//! Build    : body → AES-128-CBC → Base64                         = data
//! Sign     : length = seq + len(data)
//!            sign 文字列 → RSA（53 文字超なら 2 ブロック）→ 16 進数 = sign
//! Assemble : "sign=" + urlencode(sign) + "&data=" + urlencode(data)
//! Send     : POST <base>/;stok=<token>/<module>?form=<form>
//! Unwrap   : {"data": "<base64>"} → AES 復号 → JSON
//! ```

use deco_crypto::{CredentialFingerprint, PublicKey, SymmetricSessionKey};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{EnvelopeError, Result};
use crate::http::DecoTransport;
use crate::sign::{build_sign_text, encrypt_sign};

/// 署名に必要なセッション状態への参照
///
/// `Session` が所有する値を 1 回の呼び出しの間だけ借りる。
#[derive(Debug, Clone, Copy)]
pub struct SigningContext<'a> {
    /// セッションの AES 鍵
    pub aes: &'a SymmetricSessionKey,
    /// MD5(username ++ password)
    pub fingerprint: &'a CredentialFingerprint,
    /// sign を暗号化するセッション RSA 鍵
    pub rsa: &'a PublicKey,
    /// ルーターが発行したシーケンス番号
    pub sequence: i64,
}

/// 組み立て済みの POST ペイロード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRequest {
    /// RSA 暗号化された sign（16 進数、1 または 2 ブロック）
    pub sign: String,
    /// AES 暗号化された本文（Base64）
    pub data: String,
}

impl SealedRequest {
    /// `sign=<...>&data=<...>` 形式のリクエスト本文
    pub fn to_form_body(&self) -> Vec<u8> {
        format!(
            "sign={}&data={}",
            urlencoding::encode(&self.sign),
            urlencoding::encode(&self.data)
        )
        .into_bytes()
    }
}

#[derive(Deserialize)]
struct EncryptedResponse {
    data: String,
}

/// Build + Sign: 本文を暗号化し、sign を付ける
///
/// # 引数
/// - `ctx`: セッションの鍵とシーケンス番号
/// - `body`: 平文の JSON 本文
/// - `is_login`: ログイン呼び出しなら sign に AES 鍵と IV を含める
pub fn seal(ctx: &SigningContext<'_>, body: &[u8], is_login: bool) -> Result<SealedRequest> {
    let data = ctx.aes.encrypt(body)?;
    let length = ctx.sequence + data.len() as i64;

    let login_key = if is_login { Some(ctx.aes) } else { None };
    let sign_text = build_sign_text(ctx.fingerprint, length, login_key)?;
    let sign = encrypt_sign(&sign_text, ctx.rsa)?;

    Ok(SealedRequest { sign, data })
}

/// Unwrap: 応答の `data` を復号して JSON として解析する
///
/// `data` を持たない平文のエラーオブジェクト（`{"errorcode": .., "success": false}`）は
/// 復号せずそのまま返し、分類は呼び出し側に任せる。
pub fn open(aes: &SymmetricSessionKey, response: &[u8]) -> Result<Value> {
    let outer: Value = serde_json::from_slice(response)
        .map_err(|e| EnvelopeError::Decode(format!("response is not JSON: {}", e)))?;

    if outer.get("data").is_none() && is_plain_error(&outer) {
        return Ok(outer);
    }

    let encrypted: EncryptedResponse = serde_json::from_value(outer)
        .map_err(|e| EnvelopeError::Decode(format!("missing data field: {}", e)))?;
    let plaintext = aes
        .decrypt(&encrypted.data)
        .map_err(|e| EnvelopeError::Decode(e.to_string()))?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| EnvelopeError::Decode(format!("decrypted payload is not JSON: {}", e)))
}

/// 暗号化 POST を 1 往復する（Build → Sign → Assemble → Send → Unwrap）
pub async fn send_encrypted<T>(
    transport: &T,
    ctx: &SigningContext<'_>,
    path: &str,
    form: &str,
    body: &[u8],
    is_login: bool,
) -> Result<Value>
where
    T: DecoTransport + ?Sized,
{
    let sealed = seal(ctx, body, is_login)?;
    let response = transport.post(path, form, sealed.to_form_body()).await?;
    open(ctx.aes, &response)
}

/// 暗号化しない POST（ログイン前の鍵取得用）。応答は平文の JSON
pub async fn send_plain<T>(transport: &T, path: &str, form: &str, body: &[u8]) -> Result<Value>
where
    T: DecoTransport + ?Sized,
{
    let response = transport.post(path, form, body.to_vec()).await?;
    serde_json::from_slice(&response)
        .map_err(|e| EnvelopeError::Decode(format!("response is not JSON: {}", e)))
}

fn is_plain_error(value: &Value) -> bool {
    matches!(value.get("errorcode"), Some(Value::String(_)))
        && matches!(value.get("success"), Some(Value::Bool(_)))
}
