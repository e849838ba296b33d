use super::*;
use crate::model::clip::{ClipSpec, MediaKind, MediaRef};

fn media_clip(id: u64, clip_in: u64, clip_out: u64) -> Clip {
    let media = MediaRef::new(format!("m{id}.mp4"), MediaKind::Video, 1000);
    Clip::from_spec(ClipId(id), &ClipSpec::new(media, clip_in, clip_out))
}

fn track_of(clips: Vec<Clip>) -> Track {
    let mut t = Track::new(TrackId(1), TrackKind::Video);
    t.clips = clips;
    t
}

fn assert_contiguous(t: &Track) {
    for i in 0..t.clip_count().saturating_sub(1) {
        assert_eq!(
            t.clip_start(i + 1).unwrap(),
            t.clip_start(i).unwrap() + t.clips[i].len_frames()
        );
    }
    assert_eq!(t.clip_start(t.clip_count()).unwrap(), t.len_frames());
}

#[test]
fn starts_and_lookup_follow_lengths() {
    let t = track_of(vec![
        media_clip(1, 0, 99),
        Clip::blank(ClipId(2), 20),
        media_clip(3, 0, 49),
    ]);
    assert_eq!(t.len_frames(), 170);
    assert_eq!(t.clip_start(0).unwrap(), 0);
    assert_eq!(t.clip_start(1).unwrap(), 100);
    assert_eq!(t.clip_start(2).unwrap(), 120);
    assert_eq!(t.clip_index_at(0), Some(0));
    assert_eq!(t.clip_index_at(99), Some(0));
    assert_eq!(t.clip_index_at(100), Some(1));
    assert_eq!(t.clip_index_at(169), Some(2));
    assert_eq!(t.clip_index_at(170), None);
    assert!(t.clip_start(4).is_err());
    assert_contiguous(&t);
}

#[test]
fn removing_between_blanks_merges_them() {
    let mut t = track_of(vec![
        media_clip(1, 0, 9),
        Clip::blank(ClipId(2), 5),
        media_clip(3, 0, 9),
        Clip::blank(ClipId(4), 7),
        media_clip(5, 0, 9),
    ]);
    let removed = t.remove_range(2, 3).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id, ClipId(3));
    assert_eq!(t.clip_count(), 3);
    assert!(t.clips[1].is_blank());
    assert_eq!(t.clips[1].len_frames(), 12);
    assert_eq!(t.clips[1].id, ClipId(2));
    assert_contiguous(&t);
}

#[test]
fn inserting_blank_next_to_blank_merges() {
    let mut t = track_of(vec![media_clip(1, 0, 9), Clip::blank(ClipId(2), 5)]);
    t.insert(Clip::blank(ClipId(3), 3), 2).unwrap();
    assert_eq!(t.clip_count(), 2);
    assert_eq!(t.clips[1].len_frames(), 8);
    assert!(t.insert(media_clip(4, 0, 1), 5).is_err());
}

#[test]
fn remove_range_rejects_bad_bounds() {
    let mut t = track_of(vec![media_clip(1, 0, 9)]);
    assert!(matches!(
        t.remove_range(0, 2),
        Err(EditError::InvalidRange(_))
    ));
    assert!(matches!(
        t.remove_range(1, 0),
        Err(EditError::InvalidRange(_))
    ));
}

#[test]
fn display_list_reports_ranges() {
    let t = track_of(vec![media_clip(1, 5, 14), Clip::blank(ClipId(2), 3)]);
    let list = t.display_list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].range, FrameRange::new(0, 10).unwrap());
    assert_eq!(list[0].clip_in, 5);
    assert!(list[1].is_blank);
    assert_eq!(list[1].range, FrameRange::new(10, 13).unwrap());
}

#[test]
fn locked_track_refuses_edits() {
    let mut t = track_of(vec![]);
    assert!(t.ensure_editable().is_ok());
    t.edit_freedom = EditFreedom::Locked;
    assert!(matches!(
        t.ensure_editable(),
        Err(EditError::LockedTrack { track: 1 })
    ));
}
