//! Status line streaming
//!
//! Every user-visible progress line flows through a `StatusSink` so the
//! chat surface can render operations as they happen instead of waiting
//! for the final result. Timestamps ride along for the transcript view.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub at: DateTime<Utc>,
    pub line: String,
}

/// Cloneable sender half, handed to every component that reports progress.
#[derive(Clone)]
pub struct StatusSink {
    tx: mpsc::UnboundedSender<StatusUpdate>,
}

impl StatusSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatusUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn push(&self, line: impl Into<String>) {
        // The chat listener may already be gone during shutdown.
        let _ = self.tx.send(StatusUpdate { at: Utc::now(), line: line.into() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pushed_lines_arrive_in_order() {
        let (sink, mut rx) = StatusSink::channel();
        sink.push("first");
        sink.push("second");

        assert_eq!(rx.recv().await.unwrap().line, "first");
        assert_eq!(rx.recv().await.unwrap().line, "second");
    }

    #[tokio::test]
    async fn push_survives_a_dropped_receiver() {
        let (sink, rx) = StatusSink::channel();
        drop(rx);
        sink.push("nobody listening");
    }
}
