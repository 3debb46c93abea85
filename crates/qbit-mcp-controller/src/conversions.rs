//! Classification of WebUI responses into typed results.

use serde::de::DeserializeOwned;

use qbit_mcp_types::QbitError;

use crate::ops::ApiResponse;

/// The WebUI signals success with exactly 200; everything else is a failure carrying the body.
pub(crate) fn ensure_ok(response: ApiResponse) -> Result<ApiResponse, QbitError> {
    if response.status == 200 {
        Ok(response)
    } else {
        Err(QbitError::Status {
            code: response.status,
            body: response.body.trim().to_string(),
        })
    }
}

/// Decode a JSON body.
pub(crate) fn decode_json<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, QbitError> {
    serde_json::from_str(&response.body).map_err(|e| QbitError::Decode(e.to_string()))
}

/// Plain-text body with surrounding whitespace removed.
pub(crate) fn trimmed_text(response: ApiResponse) -> String {
    response.body.trim().to_string()
}
