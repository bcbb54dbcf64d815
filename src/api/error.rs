use reqwest::StatusCode;
use thiserror::Error;

use crate::api::Endpoint;

/// 一次請求失敗的原因。
///
/// 逾時、斷線與伺服器錯誤不另外區分，對呼叫端而言都是同一種失敗。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to request {endpoint}: {source}")]
    Request {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with status {status}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
    },
    #[error("failed to parse {endpoint} response JSON: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiError::Request { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => *endpoint,
        }
    }
}
