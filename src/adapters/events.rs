//! Channel-backed event responder.
use bytes::Bytes;
use http::{Request, Response};
use tokio::sync::oneshot;

use crate::ports::events::{EventResponder, FetchEvent};

/// Delivers the response over a oneshot channel to a host awaiting it.
pub struct ChannelResponder {
    sender: oneshot::Sender<Response<Bytes>>,
}

impl ChannelResponder {
    pub fn new(sender: oneshot::Sender<Response<Bytes>>) -> Self {
        Self { sender }
    }
}

impl EventResponder for ChannelResponder {
    fn respond(self: Box<Self>, response: Response<Bytes>) {
        // A dropped receiver means nobody is waiting anymore.
        let _ = self.sender.send(response);
    }
}

/// Build a fetch event plus the receiver its response will arrive on.
pub fn channel_event(request: Request<Bytes>) -> (FetchEvent, oneshot::Receiver<Response<Bytes>>) {
    let (sender, receiver) = oneshot::channel();
    let event = FetchEvent::new(request, Box::new(ChannelResponder::new(sender)));
    (event, receiver)
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn test_response_arrives_on_the_channel() {
        let request = Request::builder()
            .uri("http://example.com/")
            .body(Bytes::new())
            .unwrap();
        let (event, receiver) = channel_event(request);

        event.responder.respond(
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Bytes::new())
                .unwrap(),
        );

        assert_eq!(receiver.await.unwrap().status(), StatusCode::NO_CONTENT);
    }
}
