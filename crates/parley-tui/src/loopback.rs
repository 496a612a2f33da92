//! In-process loopback backend.
//!
//! Serves a fixed roster from a tokio task so the client runs without a chat
//! service. Sends are acknowledged immediately, the addressed peer answers
//! after a short delay, and group members chat among themselves now and then.
//! Nothing leaves the process.

use std::{sync::Arc, time::Duration};

use parley_app::{
    BackendChannels, ContactList, InboundMessage, MessagingBackend, OutboundMessage, Peer, PeerId,
    SendResponse, TransportError,
};
use rand::seq::IndexedRandom;
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::AbortHandle,
    time::MissedTickBehavior,
};

const OUTBOUND_CAPACITY: usize = 32;

const LOCAL_USER: (&str, &str) = ("@me", "You");

const MEMBERS: [(&str, &str); 5] = [
    ("@ada", "Ada Lovelace"),
    ("@grace", "Grace Hopper"),
    ("@linus", "Linus"),
    ("@margaret", "Margaret Hamilton"),
    ("@ken", "Ken"),
];

const GROUPS: [(&str, &str, &[&str]); 2] = [
    ("@@compilers", "Compilers Reading Group", &["@ada", "@grace", "@ken"]),
    ("@@apollo", "Apollo Alumni", &["@margaret", "@grace", "@linus"]),
];

const REPLIES: [&str; 5] = [
    "sounds good",
    "let me check and get back to you",
    "ha, fair point",
    "can we talk about this tomorrow?",
    "on it",
];

const CHATTER: [&str; 5] = [
    "anyone around?",
    "pushed the fix, please review",
    "coffee at 3?",
    "the build is green again",
    "reading the new paper tonight",
];

/// Loopback timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopbackConfig {
    /// Delay before the addressed peer answers.
    pub reply_delay: Duration,
    /// Period of unsolicited group messages.
    pub chatter_interval: Duration,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self { reply_delay: Duration::from_millis(800), chatter_interval: Duration::from_secs(45) }
    }
}

/// Fixed roster served by the loopback.
#[derive(Debug)]
struct Roster {
    local_user: Peer,
    contacts: ContactList,
}

impl Roster {
    fn standard() -> Self {
        let members = MEMBERS.iter().map(|(id, name)| Peer::individual(*id, *name)).collect();
        let groups = GROUPS
            .iter()
            .map(|(id, name, members)| {
                let count = u32::try_from(members.len() + 1).unwrap_or(u32::MAX);
                Peer::group(*id, *name, count)
            })
            .collect();

        Self {
            local_user: Peer::individual(LOCAL_USER.0, LOCAL_USER.1),
            contacts: ContactList { members, groups },
        }
    }

    fn peer(&self, id: &PeerId) -> Option<&Peer> {
        self.contacts.members.iter().chain(&self.contacts.groups).find(|p| &p.id == id)
    }

    fn all(&self) -> Vec<Peer> {
        self.contacts.members.iter().chain(&self.contacts.groups).cloned().collect()
    }
}

/// Backend answering from an in-process task.
///
/// Must be created inside a tokio runtime.
pub struct LoopbackBackend {
    roster: Arc<Roster>,
    recent: Arc<Mutex<Vec<PeerId>>>,
    channels: Option<BackendChannels>,
    abort_handle: AbortHandle,
}

impl LoopbackBackend {
    /// Start the loopback task.
    pub fn spawn(config: LoopbackConfig) -> Self {
        let roster = Arc::new(Roster::standard());

        let recent: Vec<PeerId> = [MEMBERS[0].0, GROUPS[0].0, MEMBERS[1].0]
            .into_iter()
            .map(PeerId::from)
            .collect();
        let recent = Arc::new(Mutex::new(recent));

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (responses_tx, responses_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (closed_tx, closed_rx) = oneshot::channel();

        let task = Loopback {
            roster: Arc::clone(&roster),
            recent: Arc::clone(&recent),
            config,
            inbound: inbound_tx,
            responses: responses_tx,
        };
        let handle = tokio::spawn(task.serve(outbound_rx, closed_tx));

        Self {
            roster,
            recent,
            channels: Some(BackendChannels {
                inbound: inbound_rx,
                outbound: outbound_tx,
                responses: responses_rx,
                closed: closed_rx,
            }),
            abort_handle: handle.abort_handle(),
        }
    }
}

impl MessagingBackend for LoopbackBackend {
    type Error = TransportError;

    async fn contact_list(&mut self) -> Result<ContactList, Self::Error> {
        Ok(self.roster.contacts.clone())
    }

    async fn local_user(&mut self) -> Result<Peer, Self::Error> {
        Ok(self.roster.local_user.clone())
    }

    async fn chat_peers(&mut self) -> Result<Vec<Peer>, Self::Error> {
        let recent = self.recent.lock().await;
        Ok(recent.iter().filter_map(|id| self.roster.peer(id)).cloned().collect())
    }

    async fn peer_metadata(&mut self) -> Result<Vec<Peer>, Self::Error> {
        Ok(self.roster.all())
    }

    fn take_channels(&mut self) -> Option<BackendChannels> {
        self.channels.take()
    }

    fn stop(&mut self) {
        self.abort_handle.abort();
    }
}

/// State owned by the loopback task.
struct Loopback {
    roster: Arc<Roster>,
    recent: Arc<Mutex<Vec<PeerId>>>,
    config: LoopbackConfig,
    inbound: mpsc::UnboundedSender<InboundMessage>,
    responses: mpsc::Sender<SendResponse>,
}

impl Loopback {
    async fn serve(
        self,
        mut outbound: mpsc::Receiver<OutboundMessage>,
        closed: oneshot::Sender<TransportError>,
    ) {
        let period = self.config.chatter_interval;
        let mut chatter = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        chatter.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                message = outbound.recv() => {
                    let Some(message) = message else { break };
                    if !self.accept(message).await {
                        break;
                    }
                },

                _ = chatter.tick() => {
                    if let Some(message) = self.chatter() {
                        self.touch(&message.from).await;
                        if self.inbound.send(message).is_err() {
                            break;
                        }
                    }
                },
            }
        }

        // Receiver may already be gone during shutdown.
        let _ = closed.send(TransportError::Closed { reason: "loopback stopped".to_string() });
    }

    /// Acknowledge a send and schedule the reply. Returns `false` once the
    /// client side is gone.
    async fn accept(&self, message: OutboundMessage) -> bool {
        let known = self.roster.peer(&message.to).is_some();
        if known {
            self.touch(&message.to).await;
        }

        let response = SendResponse { local_id: message.local_id, success: known };
        if self.responses.send(response).await.is_err() {
            return false;
        }
        if !known {
            tracing::debug!(to = %message.to, "loopback rejected send to unknown peer");
            return true;
        }

        if let Some(reply) = self.reply(&message) {
            let inbound = self.inbound.clone();
            let delay = self.config.reply_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                // Dropped if the session ended meanwhile.
                let _ = inbound.send(reply);
            });
        }
        true
    }

    /// Move `peer` to the front of the recent-chats list.
    async fn touch(&self, peer: &PeerId) {
        let mut recent = self.recent.lock().await;
        recent.retain(|p| p != peer);
        recent.insert(0, peer.clone());
    }

    fn reply(&self, message: &OutboundMessage) -> Option<InboundMessage> {
        let peer = self.roster.peer(&message.to)?;
        let mut rng = rand::rng();
        let content = (*REPLIES.choose(&mut rng)?).to_string();

        let sub_sender = if peer.id.is_group() {
            let members = GROUPS.iter().find(|(id, _, _)| *id == peer.id.as_str())?.2;
            let member = PeerId::from(*members.choose(&mut rng)?);
            self.roster.peer(&member)?.display_name.clone()
        } else {
            String::new()
        };

        Some(InboundMessage {
            from: peer.id.clone(),
            to: self.roster.local_user.id.clone(),
            from_display_name: peer.display_name.clone(),
            sub_sender_display_name: sub_sender,
            content,
            is_group: peer.id.is_group(),
        })
    }

    fn chatter(&self) -> Option<InboundMessage> {
        let mut rng = rand::rng();
        let (group_id, group_name, members) = GROUPS.choose(&mut rng)?;
        let member = PeerId::from(*members.choose(&mut rng)?);
        let speaker = self.roster.peer(&member)?.display_name.clone();

        Some(InboundMessage {
            from: PeerId::from(*group_id),
            to: self.roster.local_user.id.clone(),
            from_display_name: (*group_name).to_string(),
            sub_sender_display_name: speaker,
            content: (*CHATTER.choose(&mut rng)?).to_string(),
            is_group: true,
        })
    }
}
