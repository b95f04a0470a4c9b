use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::errors::GenieError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Case-insensitive header lookup; API Gateway v2 lowercases header names.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// `rawPath` for HTTP API events, `path` for REST API events.
pub fn request_path(payload: &Value) -> Option<&str> {
    v_str(payload, &["rawPath"]).or_else(|| v_str(payload, &["path"]))
}

pub fn request_method(payload: &Value) -> Option<&str> {
    v_str(payload, &["requestContext", "http", "method"])
        .or_else(|| v_str(payload, &["httpMethod"]))
}

/// The request body as text, base64-decoded when the event says so.
/// A missing body is treated as empty.
pub fn request_body(payload: &Value) -> Result<String, GenieError> {
    let body = match payload.get("body") {
        None | Some(Value::Null) => return Ok(String::new()),
        Some(Value::String(s)) => s,
        Some(_) => return Err(GenieError::ParseError("Invalid body format".to_string())),
    };

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !encoded {
        return Ok(body.clone());
    }

    let bytes = BASE64
        .decode(body)
        .map_err(|e| GenieError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes).map_err(|e| GenieError::ParseError(format!("Body is not UTF-8: {e}")))
}
