use crate::edit::fixture::*;
use crate::edit::request::{ClipRef, Edge, EditRequest, TrimMode};
use crate::foundation::error::EditError;
use crate::model::clip::{Clip, ClipId, ClipSpec};
use crate::model::sequence::{Profile, Sequence};
use crate::model::track::{EditFreedom, TrackId};

/// Fill `track` with entries of the given lengths; `(true, _)` entries are blanks.
/// Media clips start at source frame 100.
fn lay(seq: &mut Sequence, track: usize, entries: &[(bool, u64)]) -> Vec<ClipId> {
    let mut ids = Vec::new();
    for &(blank, len) in entries {
        let id = seq.alloc_clip_id();
        let clip = if blank {
            Clip::blank(id, len)
        } else {
            Clip::from_spec(id, &ClipSpec::new(video("m.mp4"), 100, 100 + len - 1))
        };
        seq.tracks[track].clips.push(clip);
        ids.push(id);
    }
    ids
}

fn trim_end(track: TrackId, index: usize, delta: i64, mode: TrimMode) -> EditRequest {
    EditRequest::TrimEnd {
        clip: ClipRef::new(track, index),
        delta,
        mode: Some(mode),
    }
}

fn trim_start(track: TrackId, index: usize, delta: i64, mode: TrimMode) -> EditRequest {
    EditRequest::TrimStart {
        clip: ClipRef::new(track, index),
        delta,
        mode: Some(mode),
    }
}

#[test]
fn overwrite_trim_end_eats_into_following_blank() {
    let mut seq = Sequence::new("s", Profile::default(), 1, 0);
    let ids = lay(&mut seq, 0, &[(false, 50), (true, 15), (false, 50)]);
    apply(&mut seq, trim_end(TrackId(0), 0, 10, TrimMode::Overwrite)).unwrap();
    let t = &seq.tracks[0];
    assert_eq!(
        shape(t),
        vec![(false, 100, 159), (true, 0, 4), (false, 100, 149)]
    );
    assert_eq!(t.len_frames(), 115);
    assert_eq!(t.clips[0].id, ids[0]);
}

#[test]
fn overwrite_trim_end_consumes_blank_then_head_of_next_clip() {
    let mut seq = Sequence::new("s", Profile::default(), 1, 0);
    let ids = lay(&mut seq, 0, &[(false, 50), (true, 15), (false, 50)]);
    apply(&mut seq, trim_end(TrackId(0), 0, 20, TrimMode::Overwrite)).unwrap();
    let t = &seq.tracks[0];
    assert_eq!(shape(t), vec![(false, 100, 169), (false, 105, 149)]);
    assert_eq!(t.len_frames(), 115);
    assert_eq!(t.clips[1].id, ids[2]);
    assert_well_formed(&seq);
}

#[test]
fn overwrite_trim_end_shrink_leaves_gap() {
    let mut seq = fixture();
    apply(&mut seq, trim_end(V1, 2, -10, TrimMode::Overwrite)).unwrap();
    let t = &seq.tracks[1];
    assert_eq!(t.len_frames(), 170);
    assert!(t.clips[3].is_blank());
    assert_eq!(t.clips[3].len_frames(), 10);
}

#[test]
fn insert_trim_changes_track_length() {
    let mut seq = fixture();
    apply(&mut seq, trim_end(V1, 0, -10, TrimMode::Insert)).unwrap();
    assert_eq!(seq.tracks[1].len_frames(), 160);
    assert_eq!(seq.tracks[1].clip_range(2).unwrap().start, 110);

    apply(&mut seq, trim_start(V1, 0, -30, TrimMode::Insert)).unwrap();
    assert_eq!(shape(&seq.tracks[1])[0], (false, 70, 189));
    assert_eq!(seq.tracks[1].len_frames(), 190);
}

#[test]
fn trim_past_source_end_fails_for_video_only() {
    let mut seq = fixture();
    let err = apply(&mut seq, trim_end(V1, 2, 751, TrimMode::Insert)).unwrap_err();
    assert!(matches!(
        err,
        EditError::InsufficientHandle {
            needed: 751,
            available: 750,
            ..
        }
    ));

    // Stills have no source end.
    apply(&mut seq, trim_end(V2, 1, 5000, TrimMode::Insert)).unwrap();
    assert_eq!(seq.tracks[2].clips[1].len_frames(), 5030);
}

#[test]
fn trim_start_past_source_head_fails() {
    let mut seq = fixture();
    let err = apply(&mut seq, trim_start(V2, 0, -1, TrimMode::Insert)).unwrap_err();
    assert!(matches!(err, EditError::InsufficientHandle { .. }));
}

#[test]
fn trim_cannot_remove_whole_clip() {
    let mut seq = fixture();
    let err = apply(&mut seq, trim_end(V2, 1, -30, TrimMode::Insert)).unwrap_err();
    assert!(matches!(err, EditError::InvalidRange(_)));
}

#[test]
fn trimming_blank_is_rejected() {
    let mut seq = fixture();
    let err = apply(&mut seq, trim_end(V1, 1, 5, TrimMode::Insert)).unwrap_err();
    assert!(matches!(err, EditError::Validation(_)));
}

#[test]
fn overwrite_trim_start_leaves_blank_before_clip() {
    let mut seq = fixture();
    apply(&mut seq, trim_start(V1, 0, 10, TrimMode::Overwrite)).unwrap();
    let t = &seq.tracks[1];
    assert_eq!(t.len_frames(), 170);
    assert_eq!(shape(t)[..2], [(true, 0, 9), (false, 110, 199)]);
    assert_eq!(t.clips[1].id, A);
}

#[test]
fn overwrite_trim_start_cannot_extend_before_track_start() {
    let mut seq = fixture();
    let err = apply(&mut seq, trim_start(V1, 0, -10, TrimMode::Overwrite)).unwrap_err();
    assert!(matches!(err, EditError::InvalidRange(_)));
}

#[test]
fn roll_moves_cut_and_consumes_blank() {
    let mut seq = fixture();
    apply(
        &mut seq,
        EditRequest::Roll {
            clip: ClipRef::new(V1, 0),
            delta: 20,
        },
    )
    .unwrap();
    let t = &seq.tracks[1];
    assert_eq!(shape(t), vec![(false, 100, 219), (false, 200, 249)]);
    assert_eq!(t.len_frames(), 170);
}

#[test]
fn roll_between_media_clips_keeps_length() {
    let mut seq = fixture();
    apply(
        &mut seq,
        EditRequest::Roll {
            clip: ClipRef::new(V2, 0),
            delta: -5,
        },
    )
    .unwrap();
    assert_eq!(shape(&seq.tracks[2]), vec![(false, 0, 54), (false, 5, 39)]);
    assert_eq!(seq.tracks[2].len_frames(), 90);
}

#[test]
fn roll_without_following_entry_fails() {
    let mut seq = fixture();
    let err = apply(
        &mut seq,
        EditRequest::Roll {
            clip: ClipRef::new(V1, 2),
            delta: 1,
        },
    )
    .unwrap_err();
    assert!(matches!(err, EditError::InvalidRange(_)));
}

#[test]
fn slip_shifts_source_window_only() {
    let mut seq = fixture();
    apply(
        &mut seq,
        EditRequest::Slip {
            clip: ClipRef::new(V1, 0),
            delta: 50,
        },
    )
    .unwrap();
    assert_eq!(shape(&seq.tracks[1])[0], (false, 150, 249));
    assert_eq!(seq.tracks[1].len_frames(), 170);

    let err = apply(
        &mut seq,
        EditRequest::Slip {
            clip: ClipRef::new(V2, 0),
            delta: -1,
        },
    )
    .unwrap_err();
    assert!(matches!(err, EditError::InsufficientHandle { .. }));
}

fn ripple(track: TrackId, index: usize, edge: Edge, delta: i64) -> EditRequest {
    EditRequest::RippleTrim {
        clip: ClipRef::new(track, index),
        edge,
        delta,
    }
}

#[test]
fn ripple_grow_opens_gap_on_other_tracks_at_cut() {
    let mut seq = Sequence::new("s", Profile::default(), 2, 0);
    lay(&mut seq, 0, &[(false, 50), (false, 50)]);
    lay(&mut seq, 1, &[(false, 50), (false, 30)]);
    apply(&mut seq, ripple(TrackId(0), 0, Edge::End, 10)).unwrap();
    assert_eq!(seq.tracks[0].len_frames(), 110);
    assert_eq!(seq.tracks[1].len_frames(), 90);
    assert!(seq.tracks[1].clips[1].is_blank());
    assert_eq!(seq.tracks[1].clip_range(2).unwrap().start, 60);
}

#[test]
fn ripple_grow_refuses_to_split_other_track() {
    let mut seq = Sequence::new("s", Profile::default(), 2, 0);
    lay(&mut seq, 0, &[(false, 50), (false, 50)]);
    lay(&mut seq, 1, &[(false, 80)]);
    let before = seq.clone();
    let err = apply(&mut seq, ripple(TrackId(0), 0, Edge::End, 10)).unwrap_err();
    assert!(matches!(err, EditError::Validation(_)));
    assert_eq!(seq, before);

    // A locked track is left out of the ripple entirely.
    seq.tracks[1].edit_freedom = EditFreedom::Locked;
    apply(&mut seq, ripple(TrackId(0), 0, Edge::End, 10)).unwrap();
    assert_eq!(seq.tracks[1].len_frames(), 80);
}

#[test]
fn ripple_shrink_closes_blank_on_other_tracks() {
    let mut seq = Sequence::new("s", Profile::default(), 2, 0);
    lay(&mut seq, 0, &[(false, 50), (false, 50)]);
    lay(&mut seq, 1, &[(false, 40), (true, 10), (false, 30)]);
    apply(&mut seq, ripple(TrackId(0), 0, Edge::End, -10)).unwrap();
    assert_eq!(seq.tracks[0].len_frames(), 90);
    let t = &seq.tracks[1];
    assert_eq!(t.len_frames(), 70);
    assert_eq!(t.clip_count(), 2);
    assert_eq!(t.clip_range(1).unwrap().start, 40);
}

#[test]
fn ripple_shrink_refuses_to_remove_media() {
    let mut seq = Sequence::new("s", Profile::default(), 2, 0);
    lay(&mut seq, 0, &[(false, 50), (false, 50)]);
    lay(&mut seq, 1, &[(false, 80)]);
    let err = apply(&mut seq, ripple(TrackId(0), 0, Edge::End, -10)).unwrap_err();
    assert!(matches!(err, EditError::InvalidRange(_)));
}

#[test]
fn ripple_start_trim_shifts_later_material() {
    let mut seq = Sequence::new("s", Profile::default(), 2, 0);
    lay(&mut seq, 0, &[(false, 50), (false, 50)]);
    lay(&mut seq, 1, &[(false, 50), (true, 20), (false, 30)]);
    // Shrinking the head of the second clip removes frames 50..60 everywhere.
    apply(&mut seq, ripple(TrackId(0), 1, Edge::Start, 10)).unwrap();
    assert_eq!(shape(&seq.tracks[0])[1], (false, 110, 149));
    assert_eq!(seq.tracks[1].len_frames(), 90);
    assert_eq!(seq.tracks[1].clips[1].len_frames(), 10);
}
