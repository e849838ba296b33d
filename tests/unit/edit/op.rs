use super::*;
use crate::model::clip::ClipId;
use crate::model::sequence::Profile;

const T: TrackId = TrackId(0);

fn one_blank() -> (Sequence, Clip) {
    let mut seq = Sequence::new("ops", Profile::default(), 1, 0);
    let blank = Clip::blank(ClipId(1), 10);
    seq.tracks[0].clips.push(blank.clone());
    (seq, blank)
}

fn append(index: usize, clip: Clip) -> SeqOp {
    SeqOp::Splice {
        track: T,
        index,
        removed: Vec::new(),
        inserted: vec![clip],
    }
}

#[test]
fn apply_all_restores_when_a_later_op_is_stale() {
    let (mut seq, blank) = one_blank();
    let before = seq.clone();
    let ops = vec![
        append(1, Clip::blank(ClipId(2), 5)),
        SeqOp::Splice {
            track: T,
            index: 0,
            removed: vec![Clip::blank(ClipId(9), 10)],
            inserted: vec![blank],
        },
    ];
    let err = apply_all(&mut seq, &ops).unwrap_err();
    assert!(matches!(err, EditError::State(_)));
    assert_eq!(seq, before);
}

#[test]
fn revert_all_restores_when_an_earlier_op_is_stale() {
    let (mut seq, _) = one_blank();
    let ops = vec![
        append(0, Clip::blank(ClipId(7), 3)),
        append(1, Clip::blank(ClipId(2), 5)),
    ];
    apply_all(&mut seq, &ops).unwrap();
    let applied = seq.clone();

    // Something outside the recorded ops replaced the first inserted entry.
    seq.tracks[0].clips[0] = Clip::blank(ClipId(8), 3);
    let tampered = seq.clone();
    let err = revert_all(&mut seq, &ops).unwrap_err();
    assert!(matches!(err, EditError::State(_)));
    assert_eq!(seq, tampered);
    assert_ne!(seq, applied);
}

#[test]
fn compositor_ops_check_their_slot() {
    let (mut seq, _) = one_blank();
    let op = SeqOp::Compositor {
        position: 3,
        before: None,
        after: None,
    };
    assert!(matches!(op.apply(&mut seq), Err(EditError::State(_))));
}
