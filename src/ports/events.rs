//! Inbound event port.
//!
//! The host environment delivers already-parsed requests together with a
//! responder that accepts the eventual response exactly once. There is no
//! listening socket on this side; events arrive from the embedding process.
use bytes::Bytes;
use http::{Request, Response};

/// Accepts the response for one inbound event.
///
/// Consumed on use, so a response can be delivered at most once per event.
pub trait EventResponder: Send {
    fn respond(self: Box<Self>, response: Response<Bytes>);
}

/// One intercepted request plus the channel to answer it on.
pub struct FetchEvent {
    pub request: Request<Bytes>,
    pub responder: Box<dyn EventResponder>,
}

impl FetchEvent {
    pub fn new(request: Request<Bytes>, responder: Box<dyn EventResponder>) -> Self {
        Self { request, responder }
    }
}
