use std::path::PathBuf;

use exrmerge_core::jobs::{build_jobs, FrameKey, InputFile};

fn inputs(paths: &[&str]) -> Vec<InputFile> {
    paths.iter().map(|p| InputFile::new(*p, ["R"])).collect()
}

#[test]
fn test_jobs_partition_inputs() {
    let paths = [
        "a_0002.exr",
        "b_0001.exr",
        "a_0001.exr",
        "still.exr",
        "b_0002.exr",
        "notes.exr",
    ];
    let jobs = build_jobs(inputs(&paths));

    let mut seen: Vec<PathBuf> = jobs
        .iter()
        .flat_map(|j| j.files.iter().map(|f| f.path().to_path_buf()))
        .collect();
    let mut expected: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn test_jobs_sorted_with_unnumbered_last() {
    let jobs = build_jobs(inputs(&["x.exr", "s_10.exr", "s_2.exr", "s_7.exr"]));
    let frames: Vec<Option<u32>> = jobs.iter().map(|j| j.frame).collect();
    assert_eq!(frames, vec![Some(2), Some(7), Some(10), None]);
}

#[test]
fn test_input_order_kept_within_job() {
    let jobs = build_jobs(inputs(&["z/s_1.exr", "a/s_1.exr", "m/s_1.exr"]));
    assert_eq!(jobs.len(), 1);
    let order: Vec<_> = jobs[0].files.iter().map(|f| f.path().to_path_buf()).collect();
    assert_eq!(
        order,
        vec![
            PathBuf::from("z/s_1.exr"),
            PathBuf::from("a/s_1.exr"),
            PathBuf::from("m/s_1.exr")
        ]
    );
}

#[test]
fn test_duplicate_paths_kept() {
    let jobs = build_jobs(inputs(&["s_1.exr", "s_1.exr"]));
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].files.len(), 2);
}

#[test]
fn test_max_frame_distinct_from_unnumbered() {
    let jobs = build_jobs(inputs(&["s_4294967295.exr", "plain.exr"]));
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].frame, Some(u32::MAX));
    assert_eq!(jobs[1].frame, None);
}

#[test]
fn test_requested_channels_attached() {
    let jobs = build_jobs(vec![InputFile::new("s_1.exr", ["R", "G", "G"])]);
    let file = &jobs[0].files[0];
    assert!(file.wants("R"));
    assert!(file.wants("G"));
    assert!(!file.wants("B"));
    assert_eq!(file.requested_count(), 2);
}

#[test]
fn test_empty_input() {
    assert!(build_jobs(Vec::new()).is_empty());
}

#[test]
fn test_frame_key_ordering() {
    assert!(FrameKey::Numbered(u32::MAX) < FrameKey::Unnumbered);
    assert_eq!(FrameKey::from(None), FrameKey::Unnumbered);
    assert_eq!(FrameKey::from(Some(3)).frame(), Some(3));
}
