//! Streaming ping transcript from the emulation agent.
//!
//! The agent answers `ping_between_hosts_stream` with a `text/event-stream`
//! body that stays open while ping runs. [`PingLines`] turns the body into
//! a sequence of text lines. Dropping it (or calling
//! [`close`](PingLines::close)) drops the response, which closes the
//! underlying connection.
//!
//! Deciding *when* to stop (sentinel phrases) is the caller's business.

use std::fmt;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::debug;

use crate::agent::sse::SseDecoder;
use crate::error::Error;

/// Line-by-line reader over an open ping event stream.
pub struct PingLines {
    body: Option<BoxStream<'static, Result<Vec<u8>, reqwest::Error>>>,
    decoder: SseDecoder,
}

impl fmt::Debug for PingLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PingLines")
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl PingLines {
    pub(crate) fn new(resp: reqwest::Response) -> Self {
        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();
        Self {
            body: Some(body),
            decoder: SseDecoder::new(),
        }
    }

    /// Wait for the next line.
    ///
    /// Returns `None` once the agent closes the stream and every buffered
    /// line has been delivered. A transport failure mid-stream yields one
    /// `Err` and the reader is then exhausted.
    pub async fn next_line(&mut self) -> Option<Result<String, Error>> {
        loop {
            if let Some(line) = self.decoder.next_event() {
                return Some(Ok(line));
            }

            let body = self.body.as_mut()?;
            match body.next().await {
                Some(Ok(chunk)) => self.decoder.push(&chunk),
                Some(Err(e)) => {
                    self.body = None;
                    return Some(Err(Error::Stream(e.to_string())));
                }
                None => {
                    self.body = None;
                    self.decoder.finish();
                }
            }
        }
    }

    /// Whether the connection is still open.
    pub fn is_open(&self) -> bool {
        self.body.is_some()
    }

    /// Close the stream now, discarding anything not yet read.
    pub fn close(mut self) {
        if self.body.take().is_some() {
            debug!("closing ping stream");
        }
    }
}
