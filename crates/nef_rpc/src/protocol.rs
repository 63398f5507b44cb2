//! Wire envelope for worker method calls.
//!
//! One `CallRequest` travels per request frame and one `CallReply` per reply
//! frame. Messages are protobuf-encoded with `prost`.

use bytes::Bytes;
use prost::Message;
use std::collections::BTreeMap;

/// A single method call addressed to `worker`.
#[derive(Clone, PartialEq, Message)]
pub struct CallRequest {
    /// Correlation id echoed back in the reply.
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub worker: String,
    #[prost(string, tag = "3")]
    pub method: String,
    #[prost(btree_map = "string, message", tag = "4")]
    pub arguments: BTreeMap<String, Value>,
    /// Liveness frame sent while a reply is outstanding. Never answered.
    #[prost(bool, tag = "5")]
    pub heartbeat: bool,
}

/// The outcome of a call.
#[derive(Clone, PartialEq, Message)]
pub struct CallReply {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(enumeration = "ReplyStatus", tag = "2")]
    pub status: i32,
    #[prost(message, optional, tag = "3")]
    pub payload: Option<Value>,
    /// Human-readable error message; empty on success.
    #[prost(string, tag = "4")]
    pub error: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ReplyStatus {
    Ok = 0,
    NoWorker = 1,
    NoMethod = 2,
    Decode = 3,
    Application = 4,
    Internal = 5,
}

/// An argument or payload value.
#[derive(Clone, PartialEq, Message)]
pub struct Value {
    #[prost(oneof = "value::Kind", tags = "1, 2, 3, 4")]
    pub kind: Option<value::Kind>,
}

pub mod value {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(string, tag = "1")]
        Text(String),
        #[prost(bytes = "vec", tag = "2")]
        Blob(Vec<u8>),
        #[prost(sint64, tag = "3")]
        Integer(i64),
        #[prost(bool, tag = "4")]
        Flag(bool),
    }
}

use value::Kind;

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some(Kind::Text(text.into())),
        }
    }

    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: Some(Kind::Blob(bytes.into())),
        }
    }

    pub fn integer(n: i64) -> Self {
        Self {
            kind: Some(Kind::Integer(n)),
        }
    }

    pub fn flag(b: bool) -> Self {
        Self {
            kind: Some(Kind::Flag(b)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            Some(Kind::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn into_text(self) -> Result<String, Self> {
        match self.kind {
            Some(Kind::Text(s)) => Ok(s),
            kind => Err(Self { kind }),
        }
    }

    /// Raw bytes of a text or blob value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            Some(Kind::Text(s)) => Some(s.as_bytes()),
            Some(Kind::Blob(b)) => Some(b),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, Self> {
        match self.kind {
            Some(Kind::Text(s)) => Ok(s.into_bytes()),
            Some(Kind::Blob(b)) => Ok(b),
            kind => Err(Self { kind }),
        }
    }

    /// Text when `bytes` is valid UTF-8, blob otherwise.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Value::text(text),
            Err(e) => Value::blob(e.into_bytes()),
        }
    }

    /// Short name of the carried kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            Some(Kind::Text(_)) => "text",
            Some(Kind::Blob(_)) => "blob",
            Some(Kind::Integer(_)) => "integer",
            Some(Kind::Flag(_)) => "flag",
            None => "empty",
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::flag(b)
    }
}

/// Named arguments of a call, kept in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    inner: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any earlier value with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn into_inner(self) -> BTreeMap<String, Value> {
        self.inner
    }
}

impl From<BTreeMap<String, Value>> for Arguments {
    fn from(inner: BTreeMap<String, Value>) -> Self {
        Self { inner }
    }
}

impl CallRequest {
    pub fn new(
        id: impl Into<String>,
        worker: impl Into<String>,
        method: impl Into<String>,
        arguments: Arguments,
    ) -> Self {
        Self {
            id: id.into(),
            worker: worker.into(),
            method: method.into(),
            arguments: arguments.into_inner(),
            heartbeat: false,
        }
    }

    pub fn new_heartbeat(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            heartbeat: true,
            ..Default::default()
        }
    }
}

impl CallReply {
    pub fn ok(id: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            id: id.into(),
            status: ReplyStatus::Ok as i32,
            payload,
            error: String::new(),
        }
    }

    pub fn failed(id: impl Into<String>, status: ReplyStatus, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status as i32,
            payload: None,
            error: error.into(),
        }
    }
}

/// Encode a message into a single frame.
pub fn encode_frame<M: Message>(msg: &M) -> Bytes {
    Bytes::from(msg.encode_to_vec())
}

/// Decode a message from a single frame.
pub fn decode_frame<M: Message + Default>(frame: &[u8]) -> Result<M, prost::DecodeError> {
    M::decode(frame)
}
