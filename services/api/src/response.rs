//! Uniform response envelope
//!
//! Every JSON response has the shape `{status, message, data}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: bool,
    pub message: String,
    pub data: T,
}

/// Build a successful envelope response
pub fn success<T: Serialize>(code: StatusCode, message: impl Into<String>, data: T) -> Response {
    let body = Envelope {
        status: true,
        message: message.into(),
        data,
    };
    (code, Json(body)).into_response()
}

/// Build a failed envelope response
pub fn failure(code: StatusCode, message: impl Into<String>, data: Value) -> Response {
    let body = Envelope {
        status: false,
        message: message.into(),
        data,
    };
    (code, Json(body)).into_response()
}

/// The empty `data` object
pub fn no_data() -> Value {
    json!({})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let envelope = Envelope {
            status: true,
            message: "ok".to_string(),
            data: json!({ "userId": 1 }),
        };

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": true, "message": "ok", "data": { "userId": 1 } })
        );
    }

    #[test]
    fn test_failure_sets_status_code() {
        let response = failure(StatusCode::NOT_FOUND, "Product not found", no_data());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
