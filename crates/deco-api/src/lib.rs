//! # deco-api
//!
//! Deco メッシュルーターのローカル管理 API クライアント。
//!
//! ```no_run
//! # async fn run() -> Result<(), deco_api::DecoError> {
//! use deco_api::DecoClient;
//!
//! let client = DecoClient::new("192.168.68.1")?;
//! if client.authenticate("password").await {
//!     let devices = client.device_list().await?.into_result()?;
//!     println!("{:?}", devices);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## レイヤー
//!
//! | crate            | 役割                                            |
//! |------------------|-------------------------------------------------|
//! | `deco-crypto`    | AES-128-CBC / RSA PKCS#1 v1.5 / MD5             |
//! | `deco-transport` | sign 生成、暗号化エンベロープ、HTTP              |
//! | `deco-session`   | ログインハンドシェイクとセッション状態           |
//! | `deco-api`       | 型付き要求、応答の分類、設定                     |

mod client;
mod config;
mod error;
pub mod models;
mod request;
mod response;

pub use client::DecoClient;
pub use config::DecoConfig;
pub use error::DecoError;
pub use request::{endpoints, Endpoint, RequestBody};
pub use response::{classify, decode, DecoResponse, ErrorResponse, Outcome, ResponseOutcome};

pub use deco_transport::{DecoTransport, HttpTransport, TransportError};
