//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use parley_app::Tab;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// A peer appears at most once in the chat-peer list.
pub struct UniqueChatPeers;

impl Invariant for UniqueChatPeers {
    fn name(&self) -> &'static str {
        "unique_chat_peers"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            let mut seen = HashSet::new();
            for peer in &session.chat_peers {
                if !seen.insert(peer) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("session {}: {peer} listed twice", session.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The open conversation always has a chat-list entry.
///
/// If `current_peer` is `Some(peer)`, then `chat_peers` must contain `peer`,
/// otherwise the user could not navigate back to the conversation they are in.
pub struct CurrentPeerListed;

impl Invariant for CurrentPeerListed {
    fn name(&self) -> &'static str {
        "current_peer_listed"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            if let Some(current) = &session.current_peer
                && !session.chat_peers.contains(current)
            {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "session {}: current peer {current} not in {:?}",
                        session.id, session.chat_peers
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The chat panel shows exactly the chat-peer titles, in order.
pub struct ChatPanelMirrorsPeers;

impl Invariant for ChatPanelMirrorsPeers {
    fn name(&self) -> &'static str {
        "chat_panel_mirrors_peers"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            let Some(panel) = session.panels.get(&Tab::Chat) else {
                continue;
            };
            if panel.rows != session.chat_titles {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "session {}: chat panel {:?} != chat peers {:?}",
                        session.id, panel.rows, session.chat_titles
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Selections and scroll windows stay inside their lists.
///
/// Every panel's `selected` and `offset` index a row (or are `0` when the
/// panel is empty), and with a non-zero viewport the selection is visible.
/// The transcript selection obeys the same bound.
pub struct SelectionInBounds;

impl Invariant for SelectionInBounds {
    fn name(&self) -> &'static str {
        "selection_in_bounds"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for session in &state.sessions {
            for (tab, panel) in &session.panels {
                let last = panel.rows.len().saturating_sub(1);
                let visible = panel.viewport == 0
                    || (panel.offset <= panel.selected
                        && panel.selected < panel.offset + panel.viewport);

                if panel.selected > last || panel.offset > last || !visible {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "session {} {tab:?}: selected {} offset {} viewport {} rows {}",
                            session.id,
                            panel.selected,
                            panel.offset,
                            panel.viewport,
                            panel.rows.len()
                        ),
                    });
                }
            }

            let (lines, selected) = session.transcript;
            if selected > lines.saturating_sub(1) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "session {}: transcript line {selected} of {lines}",
                        session.id
                    ),
                });
            }
        }
        Ok(())
    }
}
