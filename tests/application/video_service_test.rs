use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;

use subtitler::application::services::{
    DEFAULT_VIDEO_LANGUAGE, VideoServiceError, VideoUpload,
};

use crate::helpers::fakes::{FakeExtractor, TestHarness};

fn body(chunks: Vec<&'static str>) -> BoxStream<'static, Result<Bytes, io::Error>> {
    futures::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes())))).boxed()
}

fn upload(file_name: &str, chunks: Vec<&'static str>) -> VideoUpload<'static> {
    VideoUpload {
        owner_id: "user-1".to_string(),
        file_name: file_name.to_string(),
        title: None,
        language: None,
        stream: body(chunks),
    }
}

fn stored_files(harness: &TestHarness) -> usize {
    std::fs::read_dir(harness.layout.video_dir())
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn given_supported_file_when_uploading_then_video_row_and_file_exist() {
    let harness = TestHarness::new();
    let service = harness.video_service(Arc::new(FakeExtractor::with_audio(42.0)), 1024);
    let before = stored_files(&harness);

    let video = service
        .upload(upload("Holiday Trip.MP4", vec!["abc", "defg"]))
        .await
        .unwrap();

    assert_eq!(video.owner_id, "user-1");
    assert_eq!(video.title, "Holiday Trip");
    assert_eq!(video.file_name, "Holiday Trip.MP4");
    assert_eq!(video.file_size, 7);
    assert_eq!(video.language, DEFAULT_VIDEO_LANGUAGE);
    assert_eq!(video.duration_secs(), 42.0);
    assert_eq!(std::fs::read(&video.file_path).unwrap(), b"abcdefg");
    assert_eq!(stored_files(&harness), before + 1);

    let listed = service.list("user-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(service.list("someone-else").await.unwrap().is_empty());
}

#[tokio::test]
async fn given_title_and_language_when_uploading_then_they_are_kept() {
    let harness = TestHarness::new();
    let service = harness.video_service(Arc::new(FakeExtractor::with_audio(1.0)), 1024);

    let video = service
        .upload(VideoUpload {
            title: Some("Lecture 3".to_string()),
            language: Some("en-US".to_string()),
            ..upload("lecture.mkv", vec!["x"])
        })
        .await
        .unwrap();

    assert_eq!(video.title, "Lecture 3");
    assert_eq!(video.language, "en-US");
}

#[tokio::test]
async fn given_oversized_body_when_uploading_then_too_large_and_nothing_is_left() {
    let harness = TestHarness::new();
    let service = harness.video_service(Arc::new(FakeExtractor::with_audio(1.0)), 4);
    let before = stored_files(&harness);

    let err = service
        .upload(upload("big.mp4", vec!["abc", "defg"]))
        .await
        .unwrap_err();

    assert!(matches!(err, VideoServiceError::TooLarge { limit: 4 }));
    assert_eq!(stored_files(&harness), before);
    assert!(service.list("user-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn given_unsupported_extension_when_uploading_then_invalid_input() {
    let harness = TestHarness::new();
    let service = harness.video_service(Arc::new(FakeExtractor::with_audio(1.0)), 1024);

    let err = service
        .upload(upload("notes.txt", vec!["abc"]))
        .await
        .unwrap_err();

    assert!(matches!(err, VideoServiceError::InvalidInput(_)));
    assert!(!service.validate_format("notes.txt"));
    assert!(service.validate_format("movie.MKV"));
}

#[tokio::test]
async fn given_empty_body_when_uploading_then_invalid_input_and_file_is_discarded() {
    let harness = TestHarness::new();
    let service = harness.video_service(Arc::new(FakeExtractor::with_audio(1.0)), 1024);
    let before = stored_files(&harness);

    let err = service.upload(upload("empty.mp4", vec![])).await.unwrap_err();

    assert!(matches!(err, VideoServiceError::InvalidInput(_)));
    assert_eq!(stored_files(&harness), before);
}

#[tokio::test]
async fn given_stored_video_when_deleting_then_file_and_row_are_removed() {
    let harness = TestHarness::new();
    let service = harness.video_service(Arc::new(FakeExtractor::with_audio(1.0)), 1024);
    let video = service
        .upload(upload("clip.mp4", vec!["abc"]))
        .await
        .unwrap();

    service.delete(video.id).await.unwrap();

    assert!(!PathBuf::from(&video.file_path).exists());
    assert!(matches!(
        service.get(video.id).await.unwrap_err(),
        VideoServiceError::NotFound(_)
    ));
}
