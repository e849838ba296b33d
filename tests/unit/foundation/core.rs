use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(2, 5).unwrap();
    assert!(!r.contains(1));
    assert!(r.contains(2));
    assert!(r.contains(4));
    assert!(!r.contains(5));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(matches!(
        FrameRange::new(5, 2),
        Err(EditError::InvalidRange(_))
    ));
}

#[test]
fn frame_range_overlap_and_shift() {
    let a = FrameRange::with_len(10, 10);
    assert!(a.overlaps(FrameRange::new(19, 30).unwrap()));
    assert!(!a.overlaps(FrameRange::new(20, 30).unwrap()));
    assert_eq!(a.shift(-15), FrameRange::new(0, 5).unwrap());
    assert_eq!(a.shift(5), FrameRange::new(15, 25).unwrap());
}

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_parses_rational_and_integer_forms() {
    assert_eq!("25".parse::<Fps>().unwrap(), Fps::new(25, 1).unwrap());
    assert_eq!(
        "30000/1001".parse::<Fps>().unwrap(),
        Fps::new(30000, 1001).unwrap()
    );
    assert!("0/1".parse::<Fps>().is_err());
    assert!("abc".parse::<Fps>().is_err());
}
