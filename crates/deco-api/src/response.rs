//! 応答の構造的分類
//!
//! 復号した JSON が文字列の `errorcode` と真偽値の `success` を両方持つときだけ
//! `Failure`。それ以外はすべて `Success` として型付きペイロードに読み込む。
//! `Success` の `error_code` が 0 以外でもトランスポート層の失敗ではないので、
//! 判断は呼び出し側（または [`ResponseOutcome::into_result`]）に任せる。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecoError;

/// 構造的なエラー応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errorcode: String,
    pub success: bool,
}

/// 成功形の応答 `{error_code, result}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoResponse<T> {
    #[serde(default)]
    pub error_code: i64,
    pub result: Option<T>,
}

/// 分類済みの応答
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome<T> {
    Success(T),
    Failure(ErrorResponse),
}

/// 型付き要求の戻り値
pub type Outcome<T> = ResponseOutcome<DecoResponse<T>>;

impl<T> ResponseOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::Success(_))
    }

    pub fn map<U, F>(self, f: F) -> ResponseOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            ResponseOutcome::Success(value) => ResponseOutcome::Success(f(value)),
            ResponseOutcome::Failure(err) => ResponseOutcome::Failure(err),
        }
    }
}

impl<T> ResponseOutcome<DecoResponse<T>> {
    /// `Failure` → `DecoError::Protocol`、`error_code != 0` → `DecoError::Domain`
    pub fn into_result(self) -> Result<Option<T>, DecoError> {
        match self {
            ResponseOutcome::Failure(err) => Err(DecoError::Protocol {
                errorcode: err.errorcode,
            }),
            ResponseOutcome::Success(response) if response.error_code != 0 => {
                Err(DecoError::Domain(response.error_code))
            }
            ResponseOutcome::Success(response) => Ok(response.result),
        }
    }
}

/// 構造だけを見て分類する
pub fn classify(value: Value) -> ResponseOutcome<Value> {
    match (value.get("errorcode"), value.get("success")) {
        (Some(Value::String(errorcode)), Some(Value::Bool(success))) => {
            ResponseOutcome::Failure(ErrorResponse {
                errorcode: errorcode.clone(),
                success: *success,
            })
        }
        _ => ResponseOutcome::Success(value),
    }
}

/// 分類したうえで `Success` を型付きペイロードに読み込む
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<Outcome<T>, DecoError> {
    match classify(value) {
        ResponseOutcome::Failure(err) => Ok(ResponseOutcome::Failure(err)),
        ResponseOutcome::Success(value) => serde_json::from_value(value)
            .map(ResponseOutcome::Success)
            .map_err(|e| DecoError::Decode(e.to_string())),
    }
}
