//! Background task turning inbound messages into transcript lines.
//!
//! The receiver never touches UI state. It classifies each inbound message,
//! formats it, and posts a [`ReceivedLine`] onto the notification queue; the
//! dispatch loop is the only writer of the message store.

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{InboundMessage, PeerId, ReceivedLine};

/// Spawns the receiver task.
#[derive(Debug)]
pub struct MessageReceiver {
    inbound: mpsc::UnboundedReceiver<InboundMessage>,
    local_user: PeerId,
    notify: mpsc::UnboundedSender<ReceivedLine>,
}

impl MessageReceiver {
    /// Create a receiver reading `inbound` and posting onto `notify`.
    pub fn new(
        inbound: mpsc::UnboundedReceiver<InboundMessage>,
        local_user: PeerId,
        notify: mpsc::UnboundedSender<ReceivedLine>,
    ) -> Self {
        Self { inbound, local_user, notify }
    }

    /// Start the task on the current tokio runtime.
    pub fn spawn(self) -> ReceiverHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(self.run(shutdown_rx));
        ReceiverHandle { shutdown: Some(shutdown_tx), join }
    }

    /// Runs until cancelled, or until the inbound stream or the notification
    /// queue closes.
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::debug!("receiver cancelled");
                    break;
                },

                message = self.inbound.recv() => {
                    let Some(message) = message else {
                        tracing::debug!("inbound stream closed");
                        break;
                    };

                    let Some(line) = ReceivedLine::from_inbound(&message, &self.local_user) else {
                        tracing::trace!(from = %message.from, "skipping empty message");
                        continue;
                    };

                    if self.notify.send(line).is_err() {
                        tracing::debug!("notification queue closed");
                        break;
                    }
                },
            }
        }
    }
}

/// Cancellation handle for a running receiver.
///
/// Dropping the handle also cancels the task, without waiting for it.
#[derive(Debug)]
pub struct ReceiverHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl ReceiverHandle {
    /// Signal cancellation and wait for the task to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already have exited on its own.
            let _ = shutdown.send(());
        }

        if let Err(e) = (&mut self.join).await {
            tracing::warn!("receiver task failed: {e}");
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(from: &str, to: &str, name: &str, content: &str) -> InboundMessage {
        InboundMessage {
            from: from.into(),
            to: to.into(),
            from_display_name: name.into(),
            sub_sender_display_name: String::new(),
            content: content.into(),
            is_group: false,
        }
    }

    fn start() -> (
        mpsc::UnboundedSender<InboundMessage>,
        mpsc::UnboundedReceiver<ReceivedLine>,
        ReceiverHandle,
    ) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let handle = MessageReceiver::new(inbound_rx, "@me".into(), notify_tx).spawn();
        (inbound_tx, notify_rx, handle)
    }

    #[tokio::test]
    async fn posts_formatted_lines_in_order() {
        let (inbound, mut lines, handle) = start();

        inbound.send(message("@bob", "@me", "Bob", "first")).unwrap();
        inbound.send(message("@bob", "@me", "Bob", "second")).unwrap();

        let first = lines.recv().await.unwrap();
        let second = lines.recv().await.unwrap();
        assert_eq!(first.session_key.as_str(), "@bob");
        assert_eq!(first.line, "Bob said: first");
        assert_eq!(second.line, "Bob said: second");

        handle.stop().await;
    }

    #[tokio::test]
    async fn skips_empty_content() {
        let (inbound, mut lines, handle) = start();

        inbound.send(message("@bob", "@me", "Bob", "")).unwrap();
        inbound.send(message("@bob", "@me", "Bob", "after")).unwrap();

        assert_eq!(lines.recv().await.unwrap().line, "Bob said: after");
        handle.stop().await;
    }

    #[tokio::test]
    async fn own_echo_files_under_destination() {
        let (inbound, mut lines, handle) = start();

        inbound.send(message("@me", "@carol", "Me", "from my phone")).unwrap();

        let line = lines.recv().await.unwrap();
        assert_eq!(line.session_key.as_str(), "@carol");
        assert_eq!(line.line, "me said: from my phone");
        handle.stop().await;
    }

    #[tokio::test]
    async fn stop_cancels_idle_task() {
        let (_inbound, mut lines, handle) = start();

        handle.stop().await;

        // Notification sender dropped with the task.
        assert!(lines.recv().await.is_none());
    }

    #[tokio::test]
    async fn exits_when_inbound_closes() {
        let (inbound, mut lines, handle) = start();
        drop(inbound);

        assert!(lines.recv().await.is_none());
        assert!(handle.join.await.is_ok());
    }
}
