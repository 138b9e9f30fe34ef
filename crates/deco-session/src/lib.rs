//! # deco-session
//!
//! Deco ルーターへのログインハンドシェイクと、認証済みセッションの所有・直列化。
//!
//! ## セッションのライフサイクル
//!
//! ```text
//! SessionManager::authenticate(password)
//!   ├── 既存セッションを破棄
//!   ├── Handshake::run  (probe → keys → auth → login)
//!   └── 成功: Session { stok, AES 鍵, session RSA 鍵, MD5 指紋, seq } を保持
//!       失敗: セッションなし（部分的な状態は残さない）
//! ```
//!
//! シーケンス番号はログイン時に受け取った値を、そのセッションの全呼び出しで使い回す。
//! ルーター側の増分規則は観測されていないため推測しない。

mod error;
mod handshake;
mod manager;
mod session;

pub use error::HandshakeError;
pub use handshake::{Handshake, CONFIRM_SUFFIX};
pub use manager::{SessionManager, DEFAULT_USERNAME};
pub use session::{HandshakeState, Session};
