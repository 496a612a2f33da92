//! Generic runtime for application orchestration.
//!
//! The Runtime drives the dispatch loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`MessagingBackend`]: chat service snapshots and channels
//! - [`MessageReceiver`]: background inbound formatting
//! - [`Driver`]: platform-specific render surface
//!
//! # Event priority
//!
//! Each cycle waits on four sources. When several are ready at once they are
//! taken in this order:
//! 1. backend closure signal
//! 2. render-surface input (keyboard, resize)
//! 3. receiver notifications
//! 4. the periodic refresh timer
//!
//! Sends suspend the loop: no other source is serviced until the correlated
//! response arrives, the backend closes, or the send timeout elapses. The
//! timeout also bounds the wait for room in the outbound queue.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, MissedTickBehavior},
};

use crate::{
    App, AppAction, AppEvent, BackendChannels, ContactDirectory, ContactList, Driver,
    MessageReceiver, MessagingBackend, OutboundMessage, Peer, PeerId, ReceivedLine, RuntimeError,
    SendOutcome, SendResponse, TransportError,
};

/// Runtime tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Period of the chat-peer refresh.
    pub refresh_interval: Duration,
    /// How long a send waits for its response.
    pub send_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { refresh_interval: Duration::from_secs(20), send_timeout: Duration::from_secs(10) }
    }
}

/// Backend endpoints the dispatch loop reads from.
struct Link {
    outbound: mpsc::Sender<OutboundMessage>,
    responses: mpsc::Receiver<SendResponse>,
    closed: oneshot::Receiver<TransportError>,
    notifications: mpsc::UnboundedReceiver<ReceivedLine>,
    receiver_open: bool,
}

/// Generic runtime that orchestrates App, Backend, and Driver.
///
/// # Type Parameters
///
/// - `D`: Render surface driver
/// - `B`: Messaging backend
pub struct Runtime<D, B>
where
    D: Driver,
    B: MessagingBackend,
{
    driver: D,
    backend: B,
    app: App,
    config: RuntimeConfig,
}

impl<D, B> Runtime<D, B>
where
    D: Driver,
    B: MessagingBackend,
{
    /// Create a new runtime with the given driver and backend.
    pub fn new(driver: D, backend: B, config: RuntimeConfig) -> Self {
        Self { driver, backend, app: App::new(), config }
    }

    /// Run the session until quit or backend closure.
    ///
    /// Always stops the backend, the receiver task, and the driver before
    /// returning, whether the session ended normally or with an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails, a startup backend call fails, or
    /// the backend channels were already taken.
    pub async fn run(&mut self) -> Result<(), RuntimeError> {
        let result = match self.backend.take_channels() {
            Some(channels) => self.run_session(channels).await,
            None => Err(RuntimeError::ChannelsUnavailable),
        };

        self.backend.stop();
        self.driver.stop();
        result
    }

    async fn run_session(&mut self, channels: BackendChannels) -> Result<(), RuntimeError> {
        let BackendChannels { inbound, outbound, responses, closed } = channels;

        let (cols, rows) = self.driver.size();
        let _ = self.app.handle(AppEvent::Resize(cols, rows));
        let local_user = self.load().await?;

        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let receiver = MessageReceiver::new(inbound, local_user, notify_tx).spawn();

        let mut link =
            Link { outbound, responses, closed, notifications: notify_rx, receiver_open: true };
        let result = self.dispatch_loop(&mut link).await;

        receiver.stop().await;
        result
    }

    /// Fetch the startup snapshot and hand it to the App.
    ///
    /// Returns the local user's id.
    async fn load(&mut self) -> Result<PeerId, RuntimeError> {
        let contacts = self.backend.contact_list().await.map_err(RuntimeError::backend)?;
        let local_user = self.backend.local_user().await.map_err(RuntimeError::backend)?;
        let (directory, chat_peers) = self.snapshot(contacts).await?;

        tracing::debug!(user = %local_user.id, chats = chat_peers.len(), "startup snapshot");
        let id = local_user.id.clone();
        let actions = self.app.handle(AppEvent::Loaded { local_user, directory, chat_peers });
        self.process_actions_sync(actions)?;
        Ok(id)
    }

    /// Fetch chat peers and metadata, and rebuild the directory.
    async fn snapshot(
        &mut self,
        contacts: ContactList,
    ) -> Result<(Arc<ContactDirectory>, Vec<Peer>), RuntimeError> {
        let chat_peers = self.backend.chat_peers().await.map_err(RuntimeError::backend)?;
        let metadata = self.backend.peer_metadata().await.map_err(RuntimeError::backend)?;
        let directory = ContactDirectory::build(contacts, metadata);
        Ok((Arc::new(directory), chat_peers))
    }

    async fn dispatch_loop(&mut self, link: &mut Link) -> Result<(), RuntimeError> {
        let period = self.config.refresh_interval;
        let mut refresh = tokio::time::interval_at(Instant::now() + period, period);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                biased;

                reason = &mut link.closed => Some(closed_event(reason)),

                event = self.driver.next_event() => {
                    match event.map_err(RuntimeError::driver)? {
                        Some(event) => Some(event),
                        None => {
                            tracing::debug!("input stream ended");
                            return Ok(());
                        },
                    }
                },

                line = link.notifications.recv(), if link.receiver_open => {
                    if line.is_none() {
                        tracing::warn!("receiver stopped, inbound messages no longer delivered");
                        link.receiver_open = false;
                    }
                    line.map(AppEvent::LineReceived)
                },

                _ = refresh.tick() => Some(AppEvent::RefreshDue),
            };

            let Some(event) = event else {
                continue;
            };

            let actions = self.app.handle(event);
            if self.process_actions(actions, link).await? {
                return Ok(());
            }
        }
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<AppAction>,
        link: &mut Link,
    ) -> Result<bool, RuntimeError> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => {
                        self.driver.render(&self.app).map_err(RuntimeError::driver)?;
                    },
                    AppAction::RenderTranscript => {
                        self.driver.render_transcript(&self.app).map_err(RuntimeError::driver)?;
                    },
                    AppAction::Clear => self.driver.clear().map_err(RuntimeError::driver)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Refresh => {
                        let contacts = self.app.directory().contacts().clone();
                        match self.snapshot(contacts).await {
                            Ok((directory, chat_peers)) => {
                                let event = AppEvent::Refreshed { directory, chat_peers };
                                pending_actions.extend(self.app.handle(event));
                            },
                            Err(e) => {
                                tracing::warn!("refresh failed: {e}");
                                self.app.set_status(format!("Refresh failed: {e}"));
                                pending_actions.push(AppAction::Render);
                            },
                        }
                    },
                    AppAction::Send(message) => {
                        let event = self.send(message, link).await;
                        pending_actions.extend(self.app.handle(event));
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process actions that need no backend access.
    fn process_actions_sync(&mut self, actions: Vec<AppAction>) -> Result<(), RuntimeError> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app).map_err(RuntimeError::driver)?,
                AppAction::RenderTranscript => {
                    self.driver.render_transcript(&self.app).map_err(RuntimeError::driver)?;
                },
                AppAction::Clear => self.driver.clear().map_err(RuntimeError::driver)?,
                AppAction::Refresh | AppAction::Send(_) | AppAction::Quit => {
                    tracing::warn!("Unexpected action during startup: {:?}", action);
                },
            }
        }
        Ok(())
    }

    /// Submit a message and wait for its correlated response.
    async fn send(&mut self, message: OutboundMessage, link: &mut Link) -> AppEvent {
        let local_id = message.local_id;
        tracing::debug!(to = %message.to, %local_id, "sending message");

        // One deadline covers queueing and the response wait.
        let deadline = tokio::time::sleep(self.config.send_timeout);
        tokio::pin!(deadline);

        let permit = tokio::select! {
            biased;

            reason = &mut link.closed => return closed_event(reason),

            permit = link.outbound.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    return AppEvent::BackendClosed {
                        reason: TransportError::OutboundClosed.to_string(),
                    };
                },
            },

            () = &mut deadline => {
                tracing::warn!(%local_id, "outbound queue full, send timed out");
                return AppEvent::SendFinished { local_id, outcome: SendOutcome::TimedOut };
            },
        };
        permit.send(message);

        loop {
            tokio::select! {
                biased;

                reason = &mut link.closed => return closed_event(reason),

                response = link.responses.recv() => match response {
                    Some(response) if response.local_id == local_id => {
                        let outcome = if response.success {
                            SendOutcome::Delivered
                        } else {
                            SendOutcome::Rejected
                        };
                        return AppEvent::SendFinished { local_id, outcome };
                    },
                    Some(response) => {
                        tracing::warn!(
                            expected = %local_id,
                            got = %response.local_id,
                            "skipping uncorrelated send response"
                        );
                    },
                    None => {
                        return AppEvent::BackendClosed {
                            reason: "response stream closed".to_string(),
                        };
                    },
                },

                () = &mut deadline => {
                    tracing::warn!(%local_id, "send timed out");
                    return AppEvent::SendFinished { local_id, outcome: SendOutcome::TimedOut };
                },
            }
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a reference to the Backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn closed_event(signal: Result<TransportError, oneshot::error::RecvError>) -> AppEvent {
    let reason = match signal {
        Ok(TransportError::Closed { reason }) => reason,
        Ok(other) => other.to_string(),
        Err(_) => "backend dropped its closure signal".to_string(),
    };
    AppEvent::BackendClosed { reason }
}
