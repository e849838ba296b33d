use super::*;
use crate::edit::fixture::{V1, V2, apply, fixture, spec};
use crate::edit::request::EditRequest;

fn append(track: crate::model::track::TrackId) -> EditRequest {
    EditRequest::Append {
        track,
        clip: spec("e.mp4", 0, 9),
    }
}

fn push_one(history: &mut History, seq: &mut Sequence, label: &str) {
    let action = apply(seq, append(V1)).unwrap();
    history.push(HistoryEntry {
        label: label.to_string(),
        edits: vec![action],
    });
}

#[test]
fn undo_and_redo_walk_the_stacks() {
    let mut seq = fixture();
    let start = seq.clone();
    let mut history = History::new(0);
    push_one(&mut history, &mut seq, "one");
    push_one(&mut history, &mut seq, "two");
    let end = seq.clone();

    assert_eq!(history.undo(&mut seq).unwrap(), "two");
    assert_eq!(history.undo(&mut seq).unwrap(), "one");
    assert_eq!(seq.tracks, start.tracks);
    assert!(!history.can_undo());
    assert_eq!(history.redo_labels(), vec!["two", "one"]);

    assert_eq!(history.redo(&mut seq).unwrap(), "one");
    assert_eq!(history.redo(&mut seq).unwrap(), "two");
    assert_eq!(seq.tracks, end.tracks);
    assert!(!history.can_redo());
}

#[test]
fn empty_stacks_report_state_errors() {
    let mut seq = fixture();
    let mut history = History::new(0);
    assert!(matches!(history.undo(&mut seq), Err(EditError::State(_))));
    assert!(matches!(history.redo(&mut seq), Err(EditError::State(_))));
}

#[test]
fn new_edit_discards_redo() {
    let mut seq = fixture();
    let mut history = History::new(0);
    push_one(&mut history, &mut seq, "one");
    history.undo(&mut seq).unwrap();
    assert!(history.can_redo());
    push_one(&mut history, &mut seq, "two");
    assert!(!history.can_redo());
    assert_eq!(history.undo_labels(), vec!["two"]);
}

#[test]
fn limit_drops_oldest_entries() {
    let mut seq = fixture();
    let mut history = History::new(2);
    for label in ["a", "b", "c"] {
        push_one(&mut history, &mut seq, label);
    }
    assert_eq!(history.undo_labels(), vec!["b", "c"]);

    history.set_limit(1);
    assert_eq!(history.undo_labels(), vec!["c"]);
    history.clear();
    assert!(!history.can_undo());
}

#[test]
fn failed_group_undo_leaves_entry_and_sequence_in_place() {
    let mut seq = fixture();
    let mut first = apply(&mut seq, append(V1)).unwrap();
    let second = apply(&mut seq, append(V2)).unwrap();
    // Knock the first edit out of step so undoing the group fails halfway.
    first.undo_edit(&mut seq).unwrap();
    let before = seq.clone();

    let mut history = History::new(0);
    history.push(HistoryEntry {
        label: "group".to_string(),
        edits: vec![first, second],
    });
    assert!(matches!(history.undo(&mut seq), Err(EditError::State(_))));
    assert_eq!(seq.tracks, before.tracks);
    assert_eq!(history.undo_labels(), vec!["group"]);
}
