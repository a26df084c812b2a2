use crate::jsonrpc::Method;
use anyhow::{Result, bail};
use serde_json::{Value, json};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
    Notification,
}

fn has_version(message: &Value) -> bool {
    message.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
}

fn is_valid_id(id: &Value) -> bool {
    id.is_i64() || id.is_u64() || id.is_string()
}

/// A minimal envelope check: a JSON object claiming protocol version 2.0.
pub fn check_message(message: &Value) -> bool {
    message.is_object() && has_version(message)
}

/// Requests carry a string `method` and an int-or-string `id`.
pub fn check_request(message: &Value) -> bool {
    if !message.is_object() || !has_version(message) {
        return false;
    }
    if !message.get("method").is_some_and(Value::is_string) {
        return false;
    }
    message.get("id").is_some_and(is_valid_id)
}

/// Responses carry `result` or `error`, and the `id` of the request.
pub fn check_response(message: &Value) -> bool {
    if !message.is_object() || !has_version(message) {
        return false;
    }
    if message.get("result").is_none() && message.get("error").is_none() {
        return false;
    }
    message.get("id").is_some_and(is_valid_id)
}

/// Notifications carry a string `method`, no `id`, and optionally
/// object-or-array `params`.
pub fn check_notification(message: &Value) -> bool {
    if !message.is_object() || !has_version(message) {
        return false;
    }
    if !message.get("method").is_some_and(Value::is_string) {
        return false;
    }
    if message.get("id").is_some() {
        return false;
    }
    match message.get("params") {
        None => true,
        Some(params) => params.is_object() || params.is_array(),
    }
}

/// Classifies a message, trying request, then response, then notification.
pub fn message_type(message: &Value) -> Option<MessageType> {
    if !check_message(message) {
        return None;
    }
    if check_request(message) {
        Some(MessageType::Request)
    } else if check_response(message) {
        Some(MessageType::Response)
    } else if check_notification(message) {
        Some(MessageType::Notification)
    } else {
        None
    }
}

/// Builds a request. The id defaults to the method code from the protocol
/// table, params to an empty object.
pub fn make_request(method: Method, id: Option<Value>, params: Option<Value>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method.name(),
        "id": id.unwrap_or_else(|| json!(method.code())),
        "params": params.unwrap_or_else(|| json!({})),
    })
}

pub fn make_notification(method: Method, params: Option<Value>) -> Value {
    let mut message = json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method.name(),
    });
    if let Some(params) = params {
        message["params"] = params;
    }
    message
}

pub fn make_response(id: Value, result: Option<Value>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result.unwrap_or(Value::Null),
    })
}

pub fn make_error(code: i64, message: &str, id: Option<Value>, data: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "error": error,
        "id": id.unwrap_or(Value::Null),
    })
}

/// Parses a raw frame into a JSON-RPC message, rejecting anything that is
/// not a version-2.0 envelope.
pub fn parse_message(raw: &str) -> Result<Value> {
    let message: Value = serde_json::from_str(raw.trim())?;
    if !check_message(&message) {
        bail!("invalid JSON-RPC message: {message}");
    }
    Ok(message)
}
