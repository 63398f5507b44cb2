use crate::error::RpcClientError;
use crate::protocol::{CallReply, ReplyStatus, Value};

/// The successful outcome of a call.
///
/// Methods that only acknowledge carry no payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    payload: Option<Value>,
}

impl Reply {
    pub(crate) fn from_wire(reply: CallReply) -> Result<Self, RpcClientError> {
        match ReplyStatus::try_from(reply.status) {
            Ok(ReplyStatus::Ok) => Ok(Reply {
                payload: reply.payload,
            }),
            Ok(status) => Err(RpcClientError::Remote {
                status,
                message: reply.error,
            }),
            Err(_) => Err(RpcClientError::Remote {
                status: ReplyStatus::Internal,
                message: format!("unknown reply status {}: {}", reply.status, reply.error),
            }),
        }
    }

    pub fn is_void(&self) -> bool {
        self.payload.is_none()
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<Value> {
        self.payload
    }

    /// Take the payload as text.
    pub fn into_text(self) -> Result<String, RpcClientError> {
        match self.payload {
            Some(value) => value.into_text().map_err(|other| RpcClientError::UnexpectedPayload {
                expected: "text",
                actual: other.kind_name(),
            }),
            None => Err(RpcClientError::UnexpectedPayload {
                expected: "text",
                actual: "void",
            }),
        }
    }

    /// Take a text or blob payload as raw bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>, RpcClientError> {
        match self.payload {
            Some(value) => value.into_bytes().map_err(|other| RpcClientError::UnexpectedPayload {
                expected: "text or blob",
                actual: other.kind_name(),
            }),
            None => Err(RpcClientError::UnexpectedPayload {
                expected: "text or blob",
                actual: "void",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_reply_with_text() {
        let reply = Reply::from_wire(CallReply::ok("a", Some(Value::text("key=value\n")))).unwrap();
        assert!(!reply.is_void());
        assert_eq!(reply.into_text().unwrap(), "key=value\n");
    }

    #[test]
    fn test_ok_reply_void() {
        let reply = Reply::from_wire(CallReply::ok("a", None)).unwrap();
        assert!(reply.is_void());
        assert!(matches!(
            reply.into_text(),
            Err(RpcClientError::UnexpectedPayload { actual: "void", .. })
        ));
    }

    #[test]
    fn test_error_status_becomes_remote_error() {
        let err = Reply::from_wire(CallReply::failed(
            "a",
            ReplyStatus::NoWorker,
            "unknown worker 'sysconfig2'",
        ))
        .unwrap_err();
        match err {
            RpcClientError::Remote { status, message } => {
                assert_eq!(status, ReplyStatus::NoWorker);
                assert_eq!(message, "unknown worker 'sysconfig2'");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status_is_not_success() {
        let mut wire = CallReply::ok("a", Some(Value::text("x")));
        wire.status = 99;
        assert!(matches!(
            Reply::from_wire(wire),
            Err(RpcClientError::Remote {
                status: ReplyStatus::Internal,
                ..
            })
        ));
    }

    #[test]
    fn test_blob_payload_as_bytes() {
        let wire = CallReply::ok("a", Some(Value::blob(vec![0x6b, 0xeb])));
        let reply = Reply::from_wire(wire).unwrap();
        assert_eq!(reply.into_bytes().unwrap(), vec![0x6b, 0xeb]);

        let void = Reply::from_wire(CallReply::ok("a", None)).unwrap();
        assert!(matches!(
            void.into_bytes(),
            Err(RpcClientError::UnexpectedPayload { actual: "void", .. })
        ));
    }

    #[test]
    fn test_non_text_payload_rejected() {
        let reply = Reply::from_wire(CallReply::ok("a", Some(Value::integer(3)))).unwrap();
        assert!(matches!(
            reply.into_text(),
            Err(RpcClientError::UnexpectedPayload { actual: "integer", .. })
        ));
    }
}
