use bytes::Bytes;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use zeromq::ZmqMessage;

use crate::protocol::{CallReply, encode_frame};

/// A request as read off a ROUTER socket.
///
/// Frames are `[peer identity, (empty delimiter)?, body]`. The delimiter is
/// present when the peer is a REQ socket and must be echoed in the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcInbound {
    pub peer: Bytes,
    pub delimited: bool,
    pub body: Bytes,
}

impl RpcInbound {
    /// Split a received multipart message. Returns `None` when the message
    /// has no body frame.
    pub fn from_message(message: ZmqMessage) -> Option<Self> {
        let mut frames = message.into_vecdeque();
        let peer = frames.pop_front()?;
        let delimited = frames.front().is_some_and(|f| f.is_empty()) && frames.len() > 1;
        if delimited {
            frames.pop_front();
        }
        let body = frames.pop_front()?;
        Some(Self {
            peer,
            delimited,
            body,
        })
    }
}

/// A reply waiting to be written back to the peer that sent the request.
#[derive(Debug)]
pub struct Outgoing {
    peer: Bytes,
    delimited: bool,
    body: Bytes,
}

impl Outgoing {
    pub fn into_message(self) -> ZmqMessage {
        let mut frames = VecDeque::with_capacity(3);
        frames.push_back(self.peer);
        if self.delimited {
            frames.push_back(Bytes::new());
        }
        frames.push_back(self.body);
        // Never empty: the peer frame is always present.
        ZmqMessage::try_from(frames).unwrap_or_else(|_| ZmqMessage::from(Bytes::new()))
    }

    pub fn peer(&self) -> &Bytes {
        &self.peer
    }
}

/// Queue for replies produced by call tasks.
///
/// The socket loop owns the only ROUTER socket, so handlers hand their
/// encoded replies over this channel instead of writing directly.
#[derive(Debug, Clone)]
pub struct RpcOutbound {
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl RpcOutbound {
    pub fn new(tx: mpsc::UnboundedSender<Outgoing>) -> Self {
        Self { tx }
    }

    /// Queue `reply` for the peer of `inbound`. Returns `false` when the
    /// socket loop has already shut down.
    pub fn reply(&self, inbound: &RpcInbound, reply: &CallReply) -> bool {
        self.tx
            .send(Outgoing {
                peer: inbound.peer.clone(),
                delimited: inbound.delimited,
                body: encode_frame(reply),
            })
            .is_ok()
    }
}
