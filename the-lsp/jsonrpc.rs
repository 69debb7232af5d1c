//! JSON-RPC 2.0 envelopes exchanged with a language server.

use serde::{
  Deserialize,
  Serialize,
};
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
  #[default]
  #[serde(rename = "2.0")]
  V2,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
  Null,
  Number(u64),
  String(String),
}

impl Id {
  pub fn as_number(&self) -> Option<u64> {
    match self {
      Self::Number(id) => Some(*id),
      Self::String(id) => id.parse().ok(),
      Self::Null => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
  #[serde(default)]
  pub jsonrpc: Version,
  pub id:      Id,
  pub method:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub params:  Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
  #[serde(default)]
  pub jsonrpc: Version,
  pub method:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub params:  Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
  pub code:    i64,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  #[serde(default)]
  pub jsonrpc: Version,
  pub id:      Id,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result:  Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<ResponseError>,
}

/// Any message on the wire. Requests are tried before notifications so an
/// `id` is never dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
  Request(Request),
  Notification(Notification),
  Response(Response),
}

impl Message {
  pub fn request(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
    Self::Request(Request {
      jsonrpc: Version::V2,
      id: Id::Number(id),
      method: method.into(),
      params,
    })
  }

  pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
    Self::Notification(Notification {
      jsonrpc: Version::V2,
      method: method.into(),
      params,
    })
  }

  pub fn response(id: Id, result: Value) -> Self {
    Self::Response(Response {
      jsonrpc: Version::V2,
      id,
      result: Some(result),
      error: None,
    })
  }

  pub fn error_response(id: Id, code: i64, message: impl Into<String>) -> Self {
    Self::Response(Response {
      jsonrpc: Version::V2,
      id,
      result: None,
      error: Some(ResponseError {
        code,
        message: message.into(),
      }),
    })
  }

  pub fn method(&self) -> Option<&str> {
    match self {
      Self::Request(request) => Some(&request.method),
      Self::Notification(notification) => Some(&notification.method),
      Self::Response(_) => None,
    }
  }
}
