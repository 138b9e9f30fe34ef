//! セッションマネージャー
//!
//! セッション状態（トークン・鍵・シーケンス番号）と cookie jar を持つトランスポートは
//! 全呼び出しで共有される可変資源なので、1 つの非同期ミューテックスで直列化する。
//!
//! - ハンドシェイクは常に高々 1 つ
//! - ハンドシェイク中に来た要求はロック待ちになる
//! - 認証済みの要求同士も送受信の間はロックを保持したまま進む

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use deco_transport::DecoTransport;

use crate::error::HandshakeError;
use crate::handshake::Handshake;
use crate::session::Session;

/// 管理 API の既定ユーザー名
pub const DEFAULT_USERNAME: &str = "admin";

/// 1 台のルーターに対するセッションの所有者
pub struct SessionManager<T> {
    transport: T,
    username: String,
    session: Mutex<Option<Session>>,
}

impl<T> SessionManager<T>
where
    T: DecoTransport,
{
    pub fn new(transport: T, username: impl Into<String>) -> Self {
        SessionManager {
            transport,
            username: username.into(),
            session: Mutex::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// ハンドシェイクを実行してセッションを張り直す
    ///
    /// 既存のセッションは試行の前に破棄される。失敗時はセッションなしの状態で終わる。
    pub async fn authenticate(&self, password: &str) -> Result<(), HandshakeError> {
        let mut slot = self.session.lock().await;
        *slot = None;

        let mut handshake = Handshake::new(&self.transport, &self.username);
        let session = handshake.run(password).await?;
        info!(
            username = %self.username,
            sequence = session.sequence(),
            "session established"
        );
        *slot = Some(session);

        Ok(())
    }

    /// セッションのロックを取る
    ///
    /// ガードを持っている間、他の要求とハンドシェイクは待たされる。
    pub async fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// ローカルのセッション状態をすべて捨てる（ネットワーク通信はしない）
    pub async fn invalidate(&self) {
        *self.session.lock().await = None;
    }
}
