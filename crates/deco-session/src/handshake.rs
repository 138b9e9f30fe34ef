//! ログインハンドシェイク
//!
//! ## 手順
//!
//! ```text
//! 1. GET http://<host>                         到達確認（失敗なら即終了）
//! 2. AES 鍵生成 + MD5(username ++ password)
//!    POST ;stok=/login?form=keys  (平文)        → password 鍵 [n, e]
//!    POST ;stok=/login?form=auth  (平文)        → session 鍵 [n, e], seq
//! 3. password を password 鍵で RSA 暗号化し "&confirm=true" を付ける
//!    POST ;stok=/login?form=login (暗号化、sign に k/i を含む、session 鍵 + seq)
//! 4. result.stok をトークンとして保持
//! ```

use deco_crypto::{CredentialFingerprint, PublicKey, SymmetricSessionKey};
use deco_transport::{send_encrypted, send_plain, DecoTransport, SigningContext, LOGIN_PATH};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::HandshakeError;
use crate::session::{HandshakeState, Session};

/// ログインパスワードの末尾に付ける確認サフィックス
pub const CONFIRM_SUFFIX: &str = "&confirm=true";

const FORM_KEYS: &str = "keys";
const FORM_AUTH: &str = "auth";
const FORM_LOGIN: &str = "login";

#[derive(Deserialize)]
struct KeyResponse<T> {
    error_code: i64,
    result: Option<T>,
}

#[derive(Deserialize)]
struct PasswordKeyResult {
    password: Vec<String>,
}

#[derive(Deserialize)]
struct SessionKeyResult {
    key: Vec<String>,
    seq: i64,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    error_code: i64,
    result: Option<LoginResult>,
}

#[derive(Deserialize)]
struct LoginResult {
    stok: Option<String>,
}

/// 1 回分のハンドシェイク
///
/// 試行ごとに新しく作る。失敗した `Handshake` を再利用してはいけない。
pub struct Handshake<'a, T: ?Sized> {
    transport: &'a T,
    username: &'a str,
    state: HandshakeState,
}

impl<'a, T> Handshake<'a, T>
where
    T: DecoTransport + ?Sized,
{
    pub fn new(transport: &'a T, username: &'a str) -> Self {
        Handshake {
            transport,
            username,
            state: HandshakeState::Unauthenticated,
        }
    }

    /// 現在の状態
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// ハンドシェイクを最後まで実行し、認証済みセッションを返す
    ///
    /// # エラー
    /// どのステップで失敗しても状態は `Failed` になり、途中で作った鍵はすべて破棄される。
    pub async fn run(&mut self, password: &str) -> Result<Session, HandshakeError> {
        if self.state != HandshakeState::Unauthenticated {
            return Err(HandshakeError::MalformedResponse(
                "handshake already attempted".into(),
            ));
        }

        match self.drive(password).await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(state = ?self.state, error = %e, "handshake failed");
                self.transition(HandshakeState::Failed);
                Err(e)
            }
        }
    }

    async fn drive(&mut self, password: &str) -> Result<Session, HandshakeError> {
        self.transition(HandshakeState::ProbingHost);
        match self.transport.probe().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(HandshakeError::HostUnreachable(
                    "probe did not return HTTP 200".into(),
                ))
            }
            Err(e) => return Err(HandshakeError::HostUnreachable(e.to_string())),
        }

        let aes = SymmetricSessionKey::generate()?;
        let fingerprint = CredentialFingerprint::compute(self.username, password);

        let password_key = self.fetch_password_key().await?;
        let (session_key, sequence) = self.fetch_session_key().await?;
        self.transition(HandshakeState::KeysRetrieved);

        let encrypted_password = password_key.encrypt_hex(password)?;
        drop(password_key);

        self.transition(HandshakeState::LoggingIn);
        let body = json!({
            "params": { "password": format!("{}{}", encrypted_password, CONFIRM_SUFFIX) },
            "operation": "login",
        })
        .to_string();

        let ctx = SigningContext {
            aes: &aes,
            fingerprint: &fingerprint,
            rsa: &session_key,
            sequence,
        };
        let response = send_encrypted(
            self.transport,
            &ctx,
            LOGIN_PATH,
            FORM_LOGIN,
            body.as_bytes(),
            true,
        )
        .await?;

        let login: LoginResponse = parse(response)?;
        if login.error_code != 0 {
            return Err(HandshakeError::LoginRejected(login.error_code));
        }
        let token = login
            .result
            .and_then(|r| r.stok)
            .filter(|t| !t.is_empty())
            .ok_or(HandshakeError::NoToken)?;

        info!(token_len = token.len(), "login succeeded, session token issued");
        self.transition(HandshakeState::Authenticated);
        Ok(Session::new(token, aes, fingerprint, session_key, sequence))
    }

    /// form=keys: パスワード暗号化用の RSA 鍵
    async fn fetch_password_key(&self) -> Result<PublicKey, HandshakeError> {
        let response: KeyResponse<PasswordKeyResult> = self.fetch_keys(FORM_KEYS).await?;
        let result = response
            .result
            .ok_or_else(|| HandshakeError::MalformedResponse("keys: missing result".into()))?;
        let key = build_key(&result.password, FORM_KEYS)?;
        debug!(key_bytes = key.size(), "password key retrieved");
        Ok(key)
    }

    /// form=auth: sign 暗号化用の RSA 鍵とシーケンス番号
    async fn fetch_session_key(&self) -> Result<(PublicKey, i64), HandshakeError> {
        let response: KeyResponse<SessionKeyResult> = self.fetch_keys(FORM_AUTH).await?;
        let result = response
            .result
            .ok_or_else(|| HandshakeError::MalformedResponse("auth: missing result".into()))?;
        let key = build_key(&result.key, FORM_AUTH)?;
        debug!(key_bytes = key.size(), seq = result.seq, "session key retrieved");
        Ok((key, result.seq))
    }

    async fn fetch_keys<R>(&self, form: &'static str) -> Result<KeyResponse<R>, HandshakeError>
    where
        R: DeserializeOwned,
    {
        let read_body = json!({ "operation": "read" }).to_string();
        let value = send_plain(self.transport, LOGIN_PATH, form, read_body.as_bytes()).await?;
        let response: KeyResponse<R> = parse(value)?;
        if response.error_code != 0 {
            return Err(HandshakeError::KeyRetrieval {
                form,
                error_code: response.error_code,
            });
        }
        Ok(response)
    }

    fn transition(&mut self, next: HandshakeState) {
        debug!(from = ?self.state, to = ?next, "handshake state");
        self.state = next;
    }
}

fn build_key(pair: &[String], form: &str) -> Result<PublicKey, HandshakeError> {
    match pair {
        [modulus, exponent, ..] => Ok(PublicKey::from_hex(modulus, exponent)?),
        _ => Err(HandshakeError::MalformedResponse(format!(
            "{}: expected [modulus, exponent]",
            form
        ))),
    }
}

fn parse<R: DeserializeOwned>(value: Value) -> Result<R, HandshakeError> {
    serde_json::from_value(value).map_err(|e| HandshakeError::MalformedResponse(e.to_string()))
}
