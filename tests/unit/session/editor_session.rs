use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::edit::fixture::{A, C, E, V1, V2, fixture, shape, spec};
use crate::edit::request::{ClipRef, TrimMode};
use crate::jobs::engine::{CancelToken, RenderEngine};

fn session() -> EditorSession {
    EditorSession::new(fixture(), EditorConfig::default())
}

fn append(track: TrackId) -> EditRequest {
    EditRequest::Append {
        track,
        clip: spec("e.mp4", 0, 9),
    }
}

#[test]
fn apply_records_history_and_reports_summary() {
    let mut s = session();
    let summary = s.apply(append(V1)).unwrap();
    assert_eq!(summary.label, "Append");
    assert_eq!(summary.touched, vec![V1]);
    assert_eq!(summary.sequence_len, 180);
    assert_eq!(s.history().undo_labels(), vec!["Append"]);

    assert_eq!(s.undo().unwrap(), "Append");
    assert_eq!(s.sequence().tracks[1].len_frames(), 170);
    assert_eq!(s.redo().unwrap(), "Append");
    assert_eq!(s.sequence().tracks[1].len_frames(), 180);
}

#[test]
fn failed_edit_is_not_recorded() {
    let mut s = session();
    let err = s
        .apply(EditRequest::Cut {
            track: V1,
            frame: 100,
        })
        .unwrap_err();
    assert!(matches!(err, EditError::NoOp(_)));
    assert!(!s.history().can_undo());
    assert!(matches!(s.undo(), Err(EditError::State(_))));
}

#[test]
fn consolidated_edits_undo_as_one_step() {
    let mut s = session();
    let before = s.sequence().clone();
    let summary = s
        .apply_consolidated("Append Both", vec![append(V1), append(V2)])
        .unwrap();
    assert_eq!(summary.touched, vec![V1, V2]);
    assert_eq!(s.history().undo_labels(), vec!["Append Both"]);

    s.undo().unwrap();
    assert_eq!(s.sequence().tracks, before.tracks);
}

#[test]
fn consolidated_group_is_all_or_nothing() {
    let mut s = session();
    let before = s.sequence().clone();
    let err = s
        .apply_consolidated(
            "Bad Group",
            vec![
                append(V1),
                EditRequest::Cut {
                    track: V1,
                    frame: 100,
                },
            ],
        )
        .unwrap_err();
    assert!(matches!(err, EditError::NoOp(_)));
    assert_eq!(s.sequence().tracks, before.tracks);
    assert!(!s.history().can_undo());

    assert!(matches!(
        s.apply_consolidated("Nothing", Vec::new()),
        Err(EditError::NoOp(_))
    ));
}

#[test]
fn history_limit_comes_from_config() {
    let cfg = EditorConfig {
        history_limit: 2,
        ..EditorConfig::default()
    };
    let mut s = EditorSession::new(fixture(), cfg);
    for _ in 0..3 {
        s.apply(append(V1)).unwrap();
    }
    assert_eq!(s.history().undo_labels().len(), 2);
}

#[test]
fn session_trim_mode_is_the_default_for_trims() {
    let cfg = EditorConfig {
        trim_mode: TrimMode::Overwrite,
        ..EditorConfig::default()
    };
    let mut s = EditorSession::new(fixture(), cfg);
    s.apply(EditRequest::TrimEnd {
        clip: ClipRef::new(V2, 0),
        delta: -10,
        mode: None,
    })
    .unwrap();
    assert_eq!(s.sequence().tracks[2].len_frames(), 90);
}

#[test]
fn resync_track_reports_when_nothing_moved() {
    let mut s = session();
    assert!(s.resync_track(V1).unwrap().is_none());
    assert!(s.resync_track(TrackId(0)).unwrap().is_none());

    s.apply(EditRequest::Insert {
        track: V1,
        frame: 0,
        clip: spec("e.mp4", 0, 9),
    })
    .unwrap();
    let summary = s.resync_track(TrackId(0)).unwrap().unwrap();
    assert_eq!(summary.label, "Resync");
    assert_eq!(s.sequence().sync_diff(E).unwrap(), Some(0));

    s.apply(EditRequest::Overwrite {
        track: V1,
        frame: 10,
        clip: spec("f.mp4", 0, 19),
    })
    .unwrap();
    assert!(s.resync_track(TrackId(0)).unwrap().is_none());
}

#[test]
fn lock_and_mute_are_not_history() {
    let mut s = session();
    s.set_track_locked(V1, true).unwrap();
    assert!(matches!(
        s.apply(append(V1)),
        Err(EditError::LockedTrack { track: 1 })
    ));
    s.set_track_locked(V1, false).unwrap();
    s.set_track_mute(V1, MuteState::All).unwrap();
    assert_eq!(s.sequence().tracks[1].mute, MuteState::All);
    assert!(!s.history().can_undo());
    assert!(s.set_track_locked(TrackId(9), true).is_err());
}

/// Engine that pretends to render instantly, fails, or waits for cancellation.
#[derive(Clone, Copy)]
enum Fake {
    Ok,
    Fail,
    WaitForCancel,
}

impl RenderEngine for Fake {
    fn render(&self, req: &RenderRequest, cancel: &CancelToken) -> EditResult<PathBuf> {
        match self {
            Fake::Ok => Ok(req.out_path.clone()),
            Fake::Fail => Err(EditError::job("encoder exploded")),
            Fake::WaitForCancel => {
                let deadline = Instant::now() + Duration::from_secs(5);
                while !cancel.is_cancelled() && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Err(EditError::job("render cancelled"))
            }
        }
    }
}

fn wait_for_outcome(s: &mut EditorSession, queue: &JobQueue) -> JobOutcome {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(outcome) = s.poll_jobs(queue).pop() {
            return outcome;
        }
        assert!(Instant::now() < deadline, "job did not finish");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn rendered_transition_lands_on_timeline() {
    let mut s = session();
    let mut queue = JobQueue::new(Arc::new(Fake::Ok), 1).unwrap();
    let handle = s
        .request_transition(
            &mut queue,
            V2,
            0,
            10,
            TransitionAlignment::Centered,
            &TransitionStyle::new("wipe", serde_json::json!({"dir": "rtl"})),
            PathBuf::from("renders/t.mp4"),
        )
        .unwrap();
    assert_eq!(s.pending_jobs(), vec![handle.id()]);

    let outcome = wait_for_outcome(&mut s, &queue);
    let (id, summary) = match outcome {
        JobOutcome::Applied { id, summary } => (id, summary),
        other => panic!("expected applied outcome, got {other:?}"),
    };
    assert_eq!(id, handle.id());
    assert_eq!(summary.label, "Add Transition");
    assert!(s.pending_jobs().is_empty());
    let t = &s.sequence().tracks[2];
    assert_eq!(shape(t)[1], (false, 0, 9));
    assert_eq!(t.clips[1].media().unwrap().path, "renders/t.mp4");
    assert_eq!(t.clips[0].id, C);

    s.undo().unwrap();
    assert_eq!(s.sequence().tracks[2].clip_count(), 2);
}

#[test]
fn stale_render_is_rejected_without_touching_timeline() {
    let mut s = session();
    let mut queue = JobQueue::new(Arc::new(Fake::Ok), 1).unwrap();
    s.request_fade(
        &mut queue,
        A,
        10,
        FadeDirection::In,
        PathBuf::from("renders/f.mp4"),
    )
    .unwrap();
    s.apply(EditRequest::SpliceOut {
        track: V1,
        from: 0,
        to: 0,
    })
    .unwrap();
    let before = s.sequence().clone();

    let outcome = wait_for_outcome(&mut s, &queue);
    assert!(matches!(outcome, JobOutcome::Rejected { .. }), "{outcome:?}");
    assert_eq!(s.sequence(), &before);
    assert_eq!(s.history().undo_labels(), vec!["Splice Out"]);
}

#[test]
fn failed_and_cancelled_renders_change_nothing() {
    let mut s = session();
    let before = s.sequence().clone();

    let mut queue = JobQueue::new(Arc::new(Fake::Fail), 1).unwrap();
    s.request_fade(&mut queue, A, 10, FadeDirection::Out, PathBuf::from("f.mp4"))
        .unwrap();
    let outcome = wait_for_outcome(&mut s, &queue);
    let message = match outcome {
        JobOutcome::Failed { message, .. } => message,
        other => panic!("expected failure, got {other:?}"),
    };
    assert!(message.contains("encoder exploded"));

    let mut queue = JobQueue::new(Arc::new(Fake::WaitForCancel), 1).unwrap();
    let handle = s
        .request_fade(&mut queue, A, 10, FadeDirection::Out, PathBuf::from("f.mp4"))
        .unwrap();
    handle.cancel();
    let outcome = wait_for_outcome(&mut s, &queue);
    assert!(matches!(outcome, JobOutcome::Cancelled { .. }), "{outcome:?}");

    assert_eq!(s.sequence(), &before);
    assert!(!s.history().can_undo());
}

#[test]
fn planning_errors_do_not_queue_jobs() {
    let mut s = session();
    let mut queue = JobQueue::new(Arc::new(Fake::Ok), 1).unwrap();
    assert!(
        s.request_transition(
            &mut queue,
            V1,
            0,
            10,
            TransitionAlignment::Centered,
            &TransitionStyle::dissolve(),
            PathBuf::from("t.mp4"),
        )
        .is_err()
    );
    let err = s
        .request_transition(
            &mut queue,
            V2,
            0,
            10,
            TransitionAlignment::Centered,
            &TransitionStyle::new("spiral", serde_json::Value::Null),
            PathBuf::from("t.mp4"),
        )
        .unwrap_err();
    assert!(matches!(err, EditError::Validation(_)));
    assert!(s.pending_jobs().is_empty());
}
