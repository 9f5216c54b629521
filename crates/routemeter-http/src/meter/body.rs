//! Response body wrapper that counts bytes on their way to the client.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::StatusCode;
use bytes::Buf;
use http_body::{Body, Frame, SizeHint};

use routemeter_core::{Observation, Outcome, RouteIdentity};

use super::Recorder;

struct Pending {
    route: RouteIdentity,
    started: Instant,
    recorder: Recorder,
}

/// Transparent body wrapper.
///
/// Every frame of the inner body is passed through untouched. Data frames add
/// their length to `bytes_written`; an error frame adds nothing and is
/// returned as is. The observation is submitted exactly once, at end of
/// stream or on drop, whichever comes first.
pub struct ObservedBody<B> {
    inner: B,
    status: u16,
    bytes_written: u64,
    pending: Option<Pending>,
}

impl<B> ObservedBody<B> {
    /// Status starts as `200 OK` until `with_status` says otherwise.
    pub fn new(inner: B, route: RouteIdentity, started: Instant, recorder: Recorder) -> Self {
        Self {
            inner,
            status: StatusCode::OK.as_u16(),
            bytes_written: 0,
            pending: Some(Pending {
                route,
                started,
                recorder,
            }),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status.as_u16();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn finish(&mut self) {
        let Some(p) = self.pending.take() else {
            return;
        };
        let outcome = Outcome {
            status: self.status,
            bytes_written: self.bytes_written,
        };
        p.recorder.submit(Observation::new(p.route, outcome, p.started.elapsed()));
    }
}

impl<B> Body for ObservedBody<B>
where
    B: Body + Unpin,
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes_written += data.remaining() as u64;
                }
            }
            Poll::Ready(None) => this.finish(),
            Poll::Ready(Some(Err(_))) | Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for ObservedBody<B> {
    fn drop(&mut self) {
        self.finish();
    }
}
