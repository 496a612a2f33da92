//! Property-based tests for the message store, list panels and input.
//!
//! Tests verify that invariants hold under arbitrary inputs. Whole-App event
//! sequences are covered by the invariant registry in `parley-harness`.

use std::sync::Arc;

use parley_app::{
    App, AppAction, AppEvent, ContactDirectory, ContactList, KeyInput, ListPanel, MessageStore,
    Peer, PeerId, ReceivedLine, Tab, truncate_display_name,
};
use proptest::prelude::*;

fn directory() -> ContactDirectory {
    ContactDirectory::build(
        ContactList {
            members: vec![Peer::individual("@alice", "Alice"), Peer::individual("@bob", "Bob")],
            groups: vec![],
        },
        [],
    )
}

fn line_strategy() -> impl Strategy<Value = String> {
    "[a-z ]{0,12}"
}

/// Panel operations.
#[derive(Debug, Clone)]
enum PanelOp {
    Up,
    Down,
    Rows(usize),
    Viewport(usize),
}

fn panel_op_strategy() -> impl Strategy<Value = PanelOp> {
    prop_oneof![
        3 => Just(PanelOp::Up),
        3 => Just(PanelOp::Down),
        1 => (0usize..30).prop_map(PanelOp::Rows),
        1 => (0usize..15).prop_map(PanelOp::Viewport),
    ]
}

proptest! {
    #[test]
    fn prop_merge_appends_pending_in_order(
        history in prop::collection::vec(line_strategy(), 0..8),
        pending in prop::collection::vec(line_strategy(), 0..8),
    ) {
        let directory = directory();
        let bob = PeerId::from("@bob");
        let mut store = MessageStore::new();
        for line in &history {
            store.append_history(&bob, line.clone());
        }
        for line in &pending {
            store.push_pending(&bob, line.clone());
        }

        let merged = store.merge(&bob, &directory).map(<[String]>::to_vec);

        let expected: Vec<String> = history.iter().chain(&pending).cloned().collect();
        prop_assert_eq!(merged, Ok(expected.clone()));
        prop_assert!(store.pending(&bob).is_empty());

        // Second merge is a no-op.
        let again = store.merge(&bob, &directory).map(<[String]>::to_vec);
        prop_assert_eq!(again, Ok(expected));
    }

    #[test]
    fn prop_merge_unknown_peer_leaves_buffers(
        pending in prop::collection::vec(line_strategy(), 1..5),
    ) {
        let directory = directory();
        let ghost = PeerId::from("@ghost");
        let mut store = MessageStore::new();
        for line in &pending {
            store.push_pending(&ghost, line.clone());
        }

        prop_assert!(store.merge(&ghost, &directory).is_err());
        prop_assert_eq!(store.pending(&ghost), pending.as_slice());
        prop_assert!(store.history(&ghost).is_empty());
    }

    #[test]
    fn prop_panel_selection_in_bounds(ops in prop::collection::vec(panel_op_strategy(), 0..60)) {
        let mut panel = ListPanel::new((0..5).map(|i| format!("row {i}")).collect());
        panel.set_viewport(4);

        for op in ops {
            match op {
                PanelOp::Up => panel.move_up(),
                PanelOp::Down => panel.move_down(),
                PanelOp::Rows(n) => panel.set_rows((0..n).map(|i| format!("row {i}")).collect()),
                PanelOp::Viewport(v) => panel.set_viewport(v),
            }

            let len = panel.rows().len();
            prop_assert!(panel.selected() <= len.saturating_sub(1));
            prop_assert!(panel.offset() <= len.saturating_sub(1));
            if panel.viewport() > 0 {
                prop_assert!(panel.offset() <= panel.selected());
                prop_assert!(panel.selected() < panel.offset() + panel.viewport());
            }
        }
    }

    #[test]
    fn prop_whitespace_input_never_sends(input in "[ \t]{0,10}") {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Loaded {
            local_user: Peer::individual("@me", "Me"),
            directory: Arc::new(directory()),
            chat_peers: vec![Peer::individual("@bob", "Bob")],
        });
        let _ = app.handle(AppEvent::Key(KeyInput::F(1)));

        for c in input.chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        prop_assert!(!actions.iter().any(|a| matches!(a, AppAction::Send(_))));
        prop_assert!(app.in_flight().is_none());
    }

    #[test]
    fn prop_backspace_removes_one_code_point(input in "\\PC{1,20}") {
        let mut app = App::new();
        for c in input.chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
        let typed = app.input().to_string();
        let _ = app.handle(AppEvent::Key(KeyInput::Backspace));

        let mut expected = typed.clone();
        expected.pop();
        prop_assert_eq!(app.input(), expected.as_str());
    }

    #[test]
    fn prop_truncation_bounded_prefix(name in "\\PC{0,80}") {
        let title = truncate_display_name(&name);
        prop_assert!(title.chars().count() <= 40);
        prop_assert!(name.starts_with(&title));
    }

    #[test]
    fn prop_lines_for_closed_conversations_stay_pending(count in 1usize..20) {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Loaded {
            local_user: Peer::individual("@me", "Me"),
            directory: Arc::new(directory()),
            chat_peers: vec![Peer::individual("@bob", "Bob")],
        });

        for i in 0..count {
            let line = ReceivedLine { session_key: "@alice".into(), line: format!("line {i}") };
            let _ = app.handle(AppEvent::LineReceived(line));
        }

        prop_assert_eq!(app.store().pending(&"@alice".into()).len(), count);
        prop_assert_eq!(app.active_tab(), Tab::Chat);
    }
}
