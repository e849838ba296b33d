use super::*;
use crate::model::clip::{ClipSource, ClipSpec, MediaKind, MediaRef, SyncData};

fn media_clip(seq: &mut Sequence, len: u64) -> Clip {
    let id = seq.alloc_clip_id();
    let media = MediaRef::new("a.mp4", MediaKind::Video, 1000);
    Clip::from_spec(id, &ClipSpec::new(media, 0, len - 1))
}

fn two_track_seq() -> Sequence {
    let mut seq = Sequence::new("s", Profile::default(), 1, 1);
    let v = media_clip(&mut seq, 50);
    let blank = Clip::blank(seq.alloc_clip_id(), 10);
    let a = media_clip(&mut seq, 30);
    seq.tracks[1].clips = vec![blank, v];
    seq.tracks[0].clips = vec![a];
    seq
}

#[test]
fn new_orders_audio_before_video() {
    let seq = Sequence::new("s", Profile::default(), 2, 1);
    let kinds: Vec<_> = seq.tracks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TrackKind::Audio, TrackKind::Video, TrackKind::Video]
    );
    assert_eq!(seq.tracks[2].id, TrackId(2));
}

#[test]
fn find_clip_reports_track_index_and_start() {
    let seq = two_track_seq();
    let v = seq.tracks[1].clips[1].id;
    assert_eq!(
        seq.find_clip(v),
        Some(ClipLocation {
            track: TrackId(1),
            index: 1,
            start: 10
        })
    );
    assert_eq!(seq.clip_span(v).unwrap(), FrameRange::new(10, 60).unwrap());
    assert_eq!(seq.len_frames(), 60);
    assert!(seq.find_clip(ClipId(999)).is_none());
}

#[test]
fn sync_diff_measures_offset_drift() {
    let mut seq = two_track_seq();
    let parent = seq.tracks[1].clips[1].id;
    seq.tracks[0].clips[0].sync = Some(SyncData { parent, offset: -10 });
    let child = seq.tracks[0].clips[0].id;
    assert_eq!(seq.sync_diff(child).unwrap(), Some(0));
    seq.tracks[0].clips[0].sync = Some(SyncData { parent, offset: 0 });
    assert_eq!(seq.sync_diff(child).unwrap(), Some(-10));
    assert_eq!(seq.children_of(parent), vec![child]);
    assert_eq!(seq.sync_diff(parent).unwrap(), None);
}

#[test]
fn validate_rejects_chained_sync_and_adjacent_blanks() {
    let mut seq = two_track_seq();
    assert!(seq.validate().is_ok());

    let parent = seq.tracks[1].clips[1].id;
    let child = seq.tracks[0].clips[0].id;
    seq.tracks[0].clips[0].sync = Some(SyncData { parent, offset: 0 });
    seq.tracks[1].clips[1].sync = Some(SyncData {
        parent: child,
        offset: 0,
    });
    assert!(matches!(seq.validate(), Err(EditError::Sync(_))));

    let mut seq = two_track_seq();
    let extra = Clip::blank(seq.alloc_clip_id(), 3);
    seq.tracks[1].clips.insert(0, extra);
    assert!(matches!(seq.validate(), Err(EditError::Validation(_))));
}

#[test]
fn reseed_moves_counter_past_loaded_ids() {
    let mut seq = two_track_seq();
    seq.next_clip_id = 1;
    seq.reseed_ids();
    let fresh = seq.alloc_clip_id();
    assert!(seq.find_clip(fresh).is_none());
}

#[test]
fn validate_rejects_clips_past_the_frame_ceiling() {
    let mut seq = two_track_seq();
    seq.tracks[1].clips[1].source = ClipSource::Media(MediaRef::image("still.png"));
    seq.tracks[1].clips[1].clip_out = u64::MAX;
    assert!(matches!(seq.validate(), Err(EditError::InvalidRange(_))));
}
