//! 偽ルーターを相手にしたクライアント全体の結合テスト
//!
//! 偽ルーターは RSA 秘密鍵を持ち、実機と同じ手順で sign と data を検証する。

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::{Digest, Md5};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use serde_json::{json, Value};

use deco_api::{DecoClient, DecoError, DecoTransport, ResponseOutcome, TransportError};
use deco_crypto::SymmetricSessionKey;

const USERNAME: &str = "admin";
const PASSWORD: &str = "correct horse";
const SEQUENCE: i64 = 7;
const LOGIN_PATH: &str = ";stok=/login";

// ============================================================================
// 偽ルーター
// ============================================================================

#[derive(Default)]
struct Behavior {
    unreachable: bool,
    keys_error_code: i64,
    auth_error_code: i64,
    omit_token: bool,
    login_timeout: bool,
}

#[derive(Default)]
struct RouterState {
    aes: Option<SymmetricSessionKey>,
    token: Option<String>,
    logins: usize,
    login_key_texts: Vec<String>,
    /// (path, form)
    calls: Vec<(String, String)>,
    /// 認証済み要求の復号済み本文（form ごと）
    bodies: HashMap<String, Value>,
}

struct FakeRouter {
    password_key: RsaPrivateKey,
    session_key: RsaPrivateKey,
    behavior: Behavior,
    state: Mutex<RouterState>,
}

impl FakeRouter {
    fn new(behavior: Behavior) -> Self {
        FakeRouter {
            password_key: RsaPrivateKey::new(&mut OsRng, 512).unwrap(),
            session_key: RsaPrivateKey::new(&mut OsRng, 512).unwrap(),
            behavior,
            state: Mutex::new(RouterState::default()),
        }
    }

    fn forms(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(_, form)| form.clone())
            .collect()
    }

    fn paths(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn body(&self, form: &str) -> Option<Value> {
        self.state.lock().unwrap().bodies.get(form).cloned()
    }

    fn public_pair(key: &RsaPrivateKey) -> Vec<String> {
        vec![key.n().to_str_radix(16), key.e().to_str_radix(16)]
    }

    fn fingerprint(password: &[u8]) -> String {
        let mut hasher = Md5::new();
        hasher.update(USERNAME.as_bytes());
        hasher.update(password);
        hex::encode(hasher.finalize())
    }

    /// `sign=..&data=..` を分解し、sign を復号して s を検証する
    fn open_form(&self, body: &[u8]) -> (HashMap<String, String>, String) {
        let text = String::from_utf8(body.to_vec()).unwrap();
        let mut fields = HashMap::new();
        for pair in text.split('&') {
            let (name, value) = pair.split_once('=').unwrap();
            fields.insert(name.to_string(), urlencoding::decode(value).unwrap().into_owned());
        }
        let sign_hex = &fields["sign"];
        let data = fields["data"].clone();

        let raw = hex::decode(sign_hex).unwrap();
        let sign: String = raw
            .chunks(64)
            .map(|block| {
                String::from_utf8(self.session_key.decrypt(Pkcs1v15Encrypt, block).unwrap())
                    .unwrap()
            })
            .collect();

        let parts: HashMap<String, String> = sign
            .split('&')
            .map(|kv| {
                let (k, v) = kv.split_once('=').unwrap();
                (k.to_string(), v.to_string())
            })
            .collect();

        assert_eq!(parts["s"], (SEQUENCE + data.len() as i64).to_string());
        (parts, data)
    }

    fn seal(aes: &SymmetricSessionKey, value: &Value) -> Vec<u8> {
        let data = aes.encrypt(value.to_string().as_bytes()).unwrap();
        json!({ "data": data }).to_string().into_bytes()
    }

    fn login(&self, body: &[u8]) -> Vec<u8> {
        let (sign, data) = self.open_form(body);
        let key: [u8; 16] = sign["k"].as_bytes().try_into().unwrap();
        let iv: [u8; 16] = sign["i"].as_bytes().try_into().unwrap();
        let aes = SymmetricSessionKey::from_parts(key, iv);

        let request: Value = serde_json::from_slice(&aes.decrypt(&data).unwrap()).unwrap();
        assert_eq!(request["operation"], "login");
        let password_field = request["params"]["password"].as_str().unwrap();
        let cipher_hex = password_field.strip_suffix("&confirm=true").unwrap();
        let password = self
            .password_key
            .decrypt(Pkcs1v15Encrypt, &hex::decode(cipher_hex).unwrap())
            .unwrap();

        assert_eq!(sign["h"], Self::fingerprint(&password));

        let mut state = self.state.lock().unwrap();
        state.login_key_texts.push(sign["k"].clone());

        let response = if password != PASSWORD.as_bytes() {
            json!({ "error_code": -5002 })
        } else if self.behavior.omit_token {
            json!({ "error_code": 0, "result": {} })
        } else {
            let token = format!("abc{}", 123 + state.logins);
            state.logins += 1;
            state.token = Some(token.clone());
            json!({ "error_code": 0, "result": { "stok": token } })
        };
        state.aes = Some(aes.clone());
        Self::seal(&aes, &response)
    }

    fn authenticated(&self, path: &str, form: &str, body: &[u8]) -> Vec<u8> {
        let (sign, data) = self.open_form(body);
        assert!(!sign.contains_key("k"));
        assert_eq!(sign["h"], Self::fingerprint(PASSWORD.as_bytes()));

        let mut state = self.state.lock().unwrap();
        let token = state.token.clone().unwrap();
        assert!(path.starts_with(&format!(";stok={}/", token)));

        let aes = state.aes.clone().unwrap();
        let request: Value = serde_json::from_slice(&aes.decrypt(&data).unwrap()).unwrap();
        state.bodies.insert(form.to_string(), request);

        let response = match form {
            "device_list" => json!({
                "error_code": 0,
                "result": { "device_list": [
                    { "mac": "AA-BB-CC-DD-EE-FF", "role": "master", "nickname": "living" }
                ]}
            }),
            "client_list" => json!({
                "error_code": 0,
                "result": { "client_list": [
                    { "name": STANDARD.encode("my-phone"), "mac": "11-22-33-44-55-66", "online": true },
                    { "name": "%%raw%%", "mac": "11-22-33-44-55-67", "online": false }
                ]}
            }),
            "performance" => json!({ "error_code": 0, "result": { "cpu_usage": 0.25, "mem_usage": 0.5 } }),
            "upgrade" => json!({ "error_code": -1 }),
            "wlan" => json!({
                "error_code": 0,
                "result": {
                    "band2_4": {
                        "host": { "ssid": STANDARD.encode("home"), "password": STANDARD.encode("pw123"), "enable": true },
                        "guest": { "ssid": STANDARD.encode("home-guest"), "enable": false },
                        "backhaul": { "channel": 6 }
                    },
                    "band5_1": {
                        "host": { "ssid": "%%raw%%", "password": STANDARD.encode("pw5"), "enable": true },
                        "guest": { "ssid": STANDARD.encode("guest5"), "enable": false },
                        "backhaul": { "channel": 44 }
                    },
                    "is_eg": false
                }
            }),
            // 暗号化されない構造的エラー
            "all" => return br#"{"errorcode":"-1","success":false}"#.to_vec(),
            _ => json!({ "error_code": 0, "result": {} }),
        };
        Self::seal(&aes, &response)
    }
}

#[async_trait]
impl DecoTransport for FakeRouter {
    async fn probe(&self) -> Result<bool, TransportError> {
        Ok(!self.behavior.unreachable)
    }

    async fn post(&self, path: &str, form: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push((path.to_string(), form.to_string()));

        if path != LOGIN_PATH {
            return Ok(self.authenticated(path, form, &body));
        }

        let response = match form {
            "keys" => {
                assert_eq!(body, br#"{"operation":"read"}"#);
                json!({
                    "error_code": self.behavior.keys_error_code,
                    "result": { "password": Self::public_pair(&self.password_key) }
                })
            }
            "auth" => json!({
                "error_code": self.behavior.auth_error_code,
                "result": { "key": Self::public_pair(&self.session_key), "seq": SEQUENCE }
            }),
            "login" if self.behavior.login_timeout => return Err(TransportError::Timeout),
            "login" => return Ok(self.login(&body)),
            other => panic!("unexpected login form {}", other),
        };
        Ok(response.to_string().into_bytes())
    }
}

fn client(behavior: Behavior) -> DecoClient<FakeRouter> {
    DecoClient::with_transport(FakeRouter::new(behavior), USERNAME)
}

// ============================================================================
// ハンドシェイク
// ============================================================================

#[tokio::test]
async fn test_end_to_end_login_and_device_list() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);
    assert!(client.is_authenticated().await);

    let outcome = client.device_list().await.unwrap();
    let devices = outcome.into_result().unwrap().unwrap();
    assert_eq!(devices.device_list.len(), 1);
    assert_eq!(devices.device_list[0].role, "master");

    let router = client.transport();
    assert_eq!(router.forms(), vec!["keys", "auth", "login", "device_list"]);
    assert!(router.paths()[3].contains(";stok=abc123/"));
    assert_eq!(router.paths()[3], ";stok=abc123/admin/device");
}

#[tokio::test]
async fn test_keys_failure_stops_before_login() {
    let client = client(Behavior {
        keys_error_code: 1,
        ..Default::default()
    });
    assert!(!client.authenticate(PASSWORD).await);
    assert!(!client.is_authenticated().await);
    assert_eq!(client.transport().forms(), vec!["keys"]);
}

#[tokio::test]
async fn test_auth_failure_stops_before_login() {
    let client = client(Behavior {
        auth_error_code: -40401,
        ..Default::default()
    });
    let result = client.try_authenticate(PASSWORD).await;
    assert!(matches!(result, Err(DecoError::Handshake(_))));
    assert_eq!(client.transport().forms(), vec!["keys", "auth"]);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let client = client(Behavior::default());
    assert!(!client.authenticate("wrong").await);
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_missing_token_fails_login() {
    let client = client(Behavior {
        omit_token: true,
        ..Default::default()
    });
    let result = client.try_authenticate(PASSWORD).await;
    assert!(matches!(result, Err(DecoError::Handshake(_))));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_unreachable_host_sends_nothing() {
    let client = client(Behavior {
        unreachable: true,
        ..Default::default()
    });
    let result = client.try_authenticate(PASSWORD).await;
    assert!(matches!(result, Err(DecoError::HostUnreachable(_))));
    assert!(client.transport().forms().is_empty());
}

#[tokio::test]
async fn test_login_timeout_leaves_no_session() {
    let client = client(Behavior {
        login_timeout: true,
        ..Default::default()
    });
    let result = client.try_authenticate(PASSWORD).await;
    assert_eq!(result, Err(DecoError::Timeout));
    assert!(!client.is_authenticated().await);
    assert_eq!(client.transport().forms(), vec!["keys", "auth", "login"]);
    assert_eq!(client.device_list().await.unwrap_err(), DecoError::NotAuthenticated);
}

#[tokio::test]
async fn test_request_during_handshake_waits_or_fails_fast() {
    let client = client(Behavior::default());
    let (authenticated, devices) = tokio::join!(client.authenticate(PASSWORD), client.device_list());
    assert!(authenticated);

    let router = client.transport();
    let calls = router.state.lock().unwrap().calls.clone();
    let device_calls: Vec<_> = calls.iter().filter(|(_, form)| form == "device_list").collect();
    match devices {
        Ok(outcome) => {
            assert!(outcome.is_success());
            assert_eq!(device_calls.len(), 1);
            assert_eq!(device_calls[0].0, ";stok=abc123/admin/device");
            // ハンドシェイクの途中に割り込んでいない
            let forms: Vec<&str> = calls.iter().map(|(_, form)| form.as_str()).collect();
            assert_eq!(forms, vec!["keys", "auth", "login", "device_list"]);
        }
        Err(e) => {
            assert_eq!(e, DecoError::NotAuthenticated);
            assert!(device_calls.is_empty());
        }
    }
}

#[tokio::test]
async fn test_reauthentication_rebuilds_session() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);
    assert!(client.authenticate(PASSWORD).await);

    client.performance().await.unwrap();

    let router = client.transport();
    let state = router.state.lock().unwrap();
    assert_eq!(state.logins, 2);
    assert_ne!(state.login_key_texts[0], state.login_key_texts[1]);
    let last = &state.calls.last().unwrap().0;
    assert_eq!(last, ";stok=abc124/admin/network");
}

// ============================================================================
// 型付き要求
// ============================================================================

#[tokio::test]
async fn test_requests_require_session() {
    let client = client(Behavior::default());
    assert_eq!(client.device_list().await.unwrap_err(), DecoError::NotAuthenticated);
    assert!(client.transport().forms().is_empty());

    assert!(client.authenticate(PASSWORD).await);
    client.logout().await;
    assert!(!client.is_authenticated().await);
    assert_eq!(client.status().await.unwrap_err(), DecoError::NotAuthenticated);
}

#[tokio::test]
async fn test_client_names_are_decoded() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);

    let clients = client
        .client_list()
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .unwrap();
    assert_eq!(clients.client_list[0].name, "my-phone");
    assert_eq!(clients.client_list[1].name, "%%raw%%");

    assert_eq!(
        client.transport().body("client_list").unwrap(),
        json!({ "operation": "read", "params": { "device_mac": "default" } })
    );
}

#[tokio::test]
async fn test_wlan_fields_are_decoded() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);

    let wlan = client.wlan().await.unwrap().into_result().unwrap().unwrap();
    assert_eq!(wlan.band2_4.host.ssid, "home");
    assert_eq!(wlan.band2_4.host.password.as_deref(), Some("pw123"));
    assert_eq!(wlan.band2_4.guest.ssid, "home-guest");
    assert!(wlan.band2_4.guest.password.is_none());

    let band5 = wlan.band5_1.unwrap();
    assert_eq!(band5.host.ssid, "%%raw%%");
    assert_eq!(band5.host.password.as_deref(), Some("pw5"));
    assert_eq!(band5.guest.ssid, "guest5");
    assert_eq!(band5.backhaul.channel, 44);
}

#[tokio::test]
async fn test_structural_failure_is_classified() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);

    let outcome = client.status().await.unwrap();
    match &outcome {
        ResponseOutcome::Failure(err) => {
            assert_eq!(err.errorcode, "-1");
            assert!(!err.success);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        outcome.into_result(),
        Err(DecoError::Protocol {
            errorcode: "-1".into()
        })
    );

    // 失敗してもセッションはそのまま使える
    let perf = client.performance().await.unwrap().into_result().unwrap().unwrap();
    assert_eq!(perf.cpu_usage, 0.25);
}

#[tokio::test]
async fn test_nonzero_error_code_is_success_shape() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);

    let outcome = client.firmware().await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.into_result(), Err(DecoError::Domain(-1)));
}

#[tokio::test]
async fn test_reboot_body() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);

    client.reboot(&["aa-bb-cc-dd-ee-ff"]).await.unwrap();
    assert_eq!(
        client.transport().body("system").unwrap(),
        json!({ "operation": "reboot", "params": { "mac_list": [{ "mac": "AA-BB-CC-DD-EE-FF" }] } })
    );
    assert_eq!(
        client.transport().paths().last().unwrap(),
        ";stok=abc123/admin/device"
    );
}

#[tokio::test]
async fn test_custom_request() {
    let client = client(Behavior::default());
    assert!(client.authenticate(PASSWORD).await);

    let outcome = client
        .custom("/admin/system", "envar", br#"{"operation":"read"}"#)
        .await
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(
        client.transport().body("envar").unwrap(),
        json!({ "operation": "read" })
    );
}
