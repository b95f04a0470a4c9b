//! Response builders for API Gateway proxy responses.

use serde_json::{Value, json};

/// Returns a response with a JSON body.
#[must_use]
pub fn json_response(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "body": body.to_string()
    })
}

/// Returns a response whose body is `{"message": ...}`.
#[must_use]
pub fn message_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, &json!({ "message": message }))
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, &json!({ "error": message }))
}
