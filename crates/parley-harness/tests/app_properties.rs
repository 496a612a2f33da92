//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use std::sync::Arc;

use parley_app::{
    App, AppAction, AppEvent, ContactDirectory, ContactList, KeyInput, Peer, ReceivedLine,
    SendOutcome, Tab,
};
use parley_harness::InvariantRegistry;
use proptest::prelude::*;

/// Peers the generated traffic comes from. The last one is unknown to the
/// directory.
const PEERS: [(&str, &str); 5] = [
    ("@alice", "Alice"),
    ("@bob", "Bob"),
    ("@carol", "Carol"),
    ("@@ops", "Ops"),
    ("@stranger", "Stranger"),
];

fn directory() -> Arc<ContactDirectory> {
    let contacts = ContactList {
        members: PEERS[..3].iter().map(|(id, name)| Peer::individual(*id, *name)).collect(),
        groups: vec![Peer::group(PEERS[3].0, PEERS[3].1, 4)],
    };
    Arc::new(ContactDirectory::build(contacts, []))
}

fn peer(index: usize) -> Peer {
    let (id, name) = PEERS[index];
    if id.starts_with("@@") { Peer::group(id, name, 4) } else { Peer::individual(id, name) }
}

fn loaded_app() -> App {
    let mut app = App::new();
    let _ = app.handle(AppEvent::Loaded {
        local_user: Peer::individual("@me", "Me"),
        directory: directory(),
        chat_peers: vec![peer(1), peer(0)],
    });
    app
}

/// One step of a generated session.
#[derive(Debug, Clone)]
enum Step {
    /// Raw key event.
    Key(KeyInput),
    /// Inbound line from `PEERS[index]`.
    Line(usize, String),
    /// Outcome for whatever is in flight.
    Finish(SendOutcome),
    /// Refresh returning the peers selected by the mask.
    Refresh(u8),
    /// Terminal resize.
    Resize(u16, u16),
}

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => prop::char::range(' ', '~').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        2 => Just(KeyInput::Left),
        2 => Just(KeyInput::Right),
        2 => Just(KeyInput::Up),
        2 => Just(KeyInput::Down),
        3 => Just(KeyInput::F(1)),
        1 => Just(KeyInput::Ctrl('s')),
        1 => Just(KeyInput::Ctrl('j')),
        1 => Just(KeyInput::Ctrl('k')),
    ]
}

fn outcome_strategy() -> impl Strategy<Value = SendOutcome> {
    prop_oneof![
        Just(SendOutcome::Delivered),
        Just(SendOutcome::Rejected),
        Just(SendOutcome::TimedOut),
    ]
}

/// Generate random session steps.
fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => key_strategy().prop_map(Step::Key),
        3 => (0..PEERS.len(), "[a-z ]{1,12}").prop_map(|(i, text)| Step::Line(i, text)),
        2 => outcome_strategy().prop_map(Step::Finish),
        1 => any::<u8>().prop_map(Step::Refresh),
        1 => (0u16..200, 0u16..80).prop_map(|(c, r)| Step::Resize(c, r)),
    ]
}

fn apply(app: &mut App, step: Step) -> Vec<AppAction> {
    match step {
        Step::Key(key) => app.handle(AppEvent::Key(key)),
        Step::Line(index, text) => app.handle(AppEvent::LineReceived(ReceivedLine {
            session_key: PEERS[index].0.into(),
            line: format!("{} said: {text}", PEERS[index].1),
        })),
        Step::Finish(outcome) => match app.in_flight() {
            Some(message) => {
                let local_id = message.local_id;
                app.handle(AppEvent::SendFinished { local_id, outcome })
            },
            None => vec![],
        },
        Step::Refresh(mask) => {
            let chat_peers =
                (0..PEERS.len()).filter(|i| (mask & (1 << i)) != 0).map(peer).collect();
            app.handle(AppEvent::Refreshed { directory: directory(), chat_peers })
        },
        Step::Resize(cols, rows) => app.handle(AppEvent::Resize(cols, rows)),
    }
}

proptest! {
    /// App invariants hold under arbitrary event sequences.
    #[test]
    fn prop_app_invariants_hold(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let mut app = loaded_app();
        let invariants = InvariantRegistry::standard();

        for step in steps {
            let _ = apply(&mut app, step.clone());

            let checked = invariants.check_app(&app);
            prop_assert!(checked.is_ok(), "Invariant violated after {:?}: {:?}", step, checked);
        }
    }

    /// At most one send is ever outstanding.
    ///
    /// While a message is in flight, further submits produce no action.
    #[test]
    fn prop_single_send_in_flight(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let mut app = loaded_app();

        for step in steps {
            let busy = app.in_flight().is_some();
            let actions = apply(&mut app, step);
            let sends = actions.iter().filter(|a| matches!(a, AppAction::Send(_))).count();

            prop_assert!(sends <= 1);
            if busy {
                prop_assert_eq!(sends, 0);
            }
        }
    }

    /// Lines for the open conversation land in its transcript, never in the
    /// pending buffer.
    #[test]
    fn prop_open_conversation_never_pends(
        steps in prop::collection::vec(step_strategy(), 0..80),
    ) {
        let mut app = loaded_app();

        for step in steps {
            let _ = apply(&mut app, step);

            if let Some(current) = app.current_peer()
                && app.directory().contains(current)
            {
                prop_assert!(
                    !app.store().has_pending(current),
                    "{} has pending lines while open", current
                );
            }
        }
    }

    /// Unread markers appear only on the chat tab.
    #[test]
    fn prop_markers_only_on_chat_tab(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let mut app = loaded_app();

        for step in steps {
            let _ = apply(&mut app, step);

            for tab in [Tab::Contacts, Tab::Groups] {
                prop_assert_eq!(app.display_rows(tab), app.panel(tab).rows().to_vec());
            }
        }
    }
}
