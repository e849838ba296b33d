use std::path::PathBuf;

use super::*;
use crate::edit::fixture::{B, fixture};
use crate::media::info::{MediaInfo, StaticMediaInfo};

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("flowedit-project-{}", std::process::id()))
        .join(name)
}

fn full_provider() -> StaticMediaInfo {
    StaticMediaInfo::new()
        .with_file("a.mp4", MediaKind::Video, 1000)
        .with_file("b.mp4", MediaKind::Video, 1000)
        .with_file("c.mp4", MediaKind::Video, 1000)
        .with_file("d.png", MediaKind::Image, 0)
        .with_file("a.wav", MediaKind::Audio, 500)
}

fn to_json(project: &Project) -> Vec<u8> {
    let mut buf = Vec::new();
    project.to_writer(&mut buf).unwrap();
    buf
}

#[test]
fn save_and_reopen_gives_same_project() {
    let project = Project::new("demo", fixture());
    let path = scratch("roundtrip/demo.json");
    project.save(&path).unwrap();
    let reopened = Project::from_path(&path).unwrap();
    assert_eq!(reopened, project);
}

#[test]
fn newer_format_is_refused() {
    let mut project = Project::new("demo", fixture());
    project.format_version = PROJECT_FORMAT_VERSION + 1;
    let err = Project::from_reader(to_json(&project).as_slice()).unwrap_err();
    assert!(matches!(err, EditError::Validation(_)));
}

#[test]
fn malformed_sequence_is_refused() {
    let mut project = Project::new("demo", fixture());
    project.sequence.compositors[0].a_track = project.sequence.compositors[0].b_track;
    assert!(Project::from_reader(to_json(&project).as_slice()).is_err());

    let err = Project::from_reader(&b"{\"name\": 3}"[..]).unwrap_err();
    assert!(matches!(err, EditError::Serde(_)));
}

#[test]
fn stale_id_counters_are_reseeded() {
    let mut project = Project::new("demo", fixture());
    project.sequence.next_clip_id = 0;
    project.sequence.next_compositor_id = 0;
    let loaded = Project::from_reader(to_json(&project).as_slice()).unwrap();
    assert_eq!(loaded.sequence.next_clip_id, 7);
    assert_eq!(loaded.sequence.next_compositor_id, 2);
}

#[test]
fn missing_media_is_flagged_but_clip_survives() {
    let mut project = Project::new("demo", fixture());
    let provider = StaticMediaInfo::new()
        .with_file("a.mp4", MediaKind::Video, 1000)
        .with_file("c.mp4", MediaKind::Video, 1000)
        .with_file("d.png", MediaKind::Image, 0)
        .with_file("a.wav", MediaKind::Audio, 500);
    let report = project.resolve_media(&provider);
    assert_eq!(report.missing, vec!["b.mp4".to_string()]);
    assert!(!report.is_clean());
    assert!(matches!(report.warnings[0], EditError::SourceMissing { .. }));

    let b = project.sequence.clip(B).unwrap();
    assert!(b.media().unwrap().missing);
    assert_eq!((b.clip_in, b.clip_out), (200, 249));

    // Media found again on a later load clears the flag.
    let report = project.resolve_media(&full_provider());
    assert!(report.is_clean());
    assert!(!project.sequence.clip(B).unwrap().media().unwrap().missing);
}

#[test]
fn bin_entries_get_probed_lengths_and_patterns_are_skipped() {
    let mut project = Project::new("demo", fixture());
    project.bin.push(MediaRef {
        path: "new.mov".to_string(),
        kind: MediaKind::Video,
        length: None,
        missing: false,
    });
    project.bin.push(MediaRef::pattern("color:#ff0000"));
    let provider = full_provider().with(MediaInfo {
        path: "new.mov".to_string(),
        kind: MediaKind::Video,
        length: Some(321),
        codec: Some("h264".to_string()),
        width: Some(1280),
        height: Some(720),
    });
    let report = project.resolve_media(&provider);
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(project.bin[0].length, Some(321));
    assert!(!project.bin[1].missing);
}

struct Broken;

impl MediaInfoProvider for Broken {
    fn probe(&self, path: &str) -> EditResult<MediaInfo> {
        Err(EditError::validation(format!("cannot read '{path}'")))
    }
}

#[test]
fn unreadable_media_is_a_warning_not_missing() {
    let mut project = Project::new("demo", fixture());
    let report = project.resolve_media(&Broken);
    assert!(report.missing.is_empty());
    assert_eq!(report.warnings.len(), 5);
    assert!(
        project
            .sequence
            .tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .filter_map(|c| c.media())
            .all(|m| !m.missing)
    );
}

#[test]
fn load_reads_file_and_reports() {
    let path = scratch("load/demo.json");
    Project::new("demo", fixture()).save(&path).unwrap();
    let (project, report) = Project::load(&path, &full_provider()).unwrap();
    assert_eq!(project.name, "demo");
    assert!(report.is_clean());

    let err = Project::load(scratch("load/absent.json"), &full_provider()).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
