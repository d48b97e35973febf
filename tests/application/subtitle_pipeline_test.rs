use std::sync::Arc;
use std::time::Duration;

use subtitler::application::ports::{SubtitleRepository, TaskRepository, TranscriptionError};
use subtitler::application::services::{PipelineError, SubtitleRequest};
use subtitler::domain::{
    LanguageHint, SubtitleFormat, TaskId, TaskRecord, TaskStatus,
};

use crate::helpers::fakes::{
    FakeExtractor, RecordingProgress, ScriptedEngine, TestHarness, segment,
};

fn request_for(video_id: subtitler::domain::VideoId, language: &str) -> SubtitleRequest {
    SubtitleRequest {
        task_id: TaskId::new(),
        video_id,
        language: language.to_string(),
        format: SubtitleFormat::Srt,
    }
}

async fn wait_until_terminal(harness: &TestHarness, task_id: TaskId) -> TaskRecord {
    for _ in 0..200 {
        let task = harness.tasks.get_by_id(task_id).await.unwrap().unwrap();
        if task.status.is_terminal() {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {} never finished", task_id);
}

fn chunk_files_left(harness: &TestHarness) -> Vec<String> {
    std::fs::read_dir(harness.layout.audio_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("_part"))
        .collect()
}

#[tokio::test]
async fn given_short_clip_when_pipeline_runs_then_task_succeeds_with_reference_srt() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "zh-CN").await;
    let engine = Arc::new(ScriptedEngine::returning(vec![
        segment(0.0, 5.1, "你好"),
        segment(5.1, 11.8, "世界"),
    ]));
    let (service, pool) = harness.running_service(
        Arc::new(FakeExtractor::with_audio(12.0)),
        engine.clone(),
    );

    let task_id = service.submit(video.id, "zh-CN", "srt").await.unwrap();
    let task = wait_until_terminal(&harness, task_id).await;

    assert_eq!(task.status, TaskStatus::Succeeded);
    assert_eq!(task.progress, 100);

    let subtitles = harness.subtitles.list_by_video(video.id).await.unwrap();
    assert_eq!(subtitles.len(), 1);
    let subtitle = &subtitles[0];
    assert_eq!(subtitle.segment_count, 2);
    assert_eq!(subtitle.duration, 12);
    assert!(subtitle.has_file());

    let export = service.export(subtitle.id, None).await.unwrap();
    assert_eq!(
        String::from_utf8(export.bytes).unwrap(),
        "1\n00:00:00,000 --> 00:00:05,100\n你好\n\n2\n00:00:05,100 --> 00:00:11,800\n世界\n\n"
    );
    assert_eq!(
        engine.calls()[0].1,
        LanguageHint::Code("zh-CN".to_string())
    );

    drop(service);
    pool.join().await;
}

#[tokio::test]
async fn given_audio_longer_than_provider_limit_when_pipeline_runs_then_chunks_are_stitched() {
    let harness = TestHarness::new();
    let video = harness.seed_video("long.mp4", "en").await;
    let engine = Arc::new(
        ScriptedEngine::new(|call| Ok(vec![segment(0.0, 5.0, &format!("c{}", call))]))
            .with_max_seconds(25.0),
    );
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(63.0)),
        engine.clone(),
        harness.pipeline_config(),
    );
    let progress = RecordingProgress::default();

    let subtitle = pipeline
        .run(&request_for(video.id, "en"), &progress)
        .await
        .unwrap();

    let stitched: Vec<(f64, f64, String, usize)> = subtitle
        .segments()
        .unwrap()
        .into_iter()
        .map(|s| (s.start_time, s.end_time, s.text, s.index))
        .collect();
    assert_eq!(
        stitched,
        vec![
            (0.0, 5.0, "c0".to_string(), 1),
            (20.0, 25.0, "c1".to_string(), 2),
            (40.0, 45.0, "c2".to_string(), 3),
            (60.0, 63.0, "c3".to_string(), 4),
        ]
    );
    assert_eq!(engine.calls().len(), 4);
    assert!(chunk_files_left(&harness).is_empty());
    assert_eq!(progress.values(), vec![10, 30, 80, 95]);
}

#[tokio::test]
async fn given_video_without_audio_when_pipeline_runs_then_task_fails_at_extraction() {
    let harness = TestHarness::new();
    let video = harness.seed_video("silent.mp4", "zh-CN").await;
    let (service, pool) = harness.running_service(
        Arc::new(FakeExtractor::without_audio()),
        Arc::new(ScriptedEngine::returning(vec![segment(0.0, 1.0, "x")])),
    );

    let task_id = service.submit(video.id, "zh-CN", "srt").await.unwrap();
    let task = wait_until_terminal(&harness, task_id).await;

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.progress, 10);
    assert!(task.error_message.unwrap().contains("audio"));

    drop(service);
    pool.join().await;
}

#[tokio::test]
async fn given_provider_503_when_pipeline_runs_then_task_fails_without_subtitle_row() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "zh-CN").await;
    let (service, pool) = harness.running_service(
        Arc::new(FakeExtractor::with_audio(4.0)),
        Arc::new(ScriptedEngine::failing_with_status(503)),
    );

    let task_id = service.submit(video.id, "", "vtt").await.unwrap();
    let task = wait_until_terminal(&harness, task_id).await;

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.progress, 30);
    assert!(task.error_message.unwrap().contains("503"));
    assert!(harness.subtitles.list_by_video(video.id).await.unwrap().is_empty());

    drop(service);
    pool.join().await;
}

#[tokio::test]
async fn given_slow_provider_when_deadline_passes_then_run_fails_with_timeout() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "en").await;
    let mut config = harness.pipeline_config();
    config.transcribe_timeout = Duration::from_millis(50);
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(2.0)),
        Arc::new(
            ScriptedEngine::returning(vec![segment(0.0, 1.0, "late")])
                .with_delay(Duration::from_secs(5)),
        ),
        config,
    );

    let err = pipeline
        .run(&request_for(video.id, "en"), &RecordingProgress::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Timeout(_)));
    assert_eq!(err.kind(), "timeout");
}

#[tokio::test]
async fn given_text_only_response_when_pipeline_runs_then_single_cue_spans_the_audio() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "en").await;
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(7.0)),
        Arc::new(ScriptedEngine::returning(vec![segment(0.0, 0.0, "whole clip")])),
        harness.pipeline_config(),
    );

    let subtitle = pipeline
        .run(&request_for(video.id, "en"), &RecordingProgress::default())
        .await
        .unwrap();

    let segments = subtitle.segments().unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_time, 0.0);
    assert_eq!(segments[0].end_time, 7.0);
}

#[tokio::test]
async fn given_blank_transcription_when_pipeline_runs_then_run_fails() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "en").await;
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(3.0)),
        Arc::new(ScriptedEngine::returning(vec![segment(0.0, 1.0, "   ")])),
        harness.pipeline_config(),
    );

    let err = pipeline
        .run(&request_for(video.id, "en"), &RecordingProgress::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Transcription(_)));
    assert!(harness.subtitles.list_by_video(video.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_blank_request_language_when_pipeline_runs_then_provider_detects_it() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "zh-CN").await;
    let engine = Arc::new(ScriptedEngine::returning(vec![segment(0.0, 1.0, "hello")]));
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(2.0)),
        engine.clone(),
        harness.pipeline_config(),
    );

    let subtitle = pipeline
        .run(&request_for(video.id, ""), &RecordingProgress::default())
        .await
        .unwrap();

    assert_eq!(engine.calls()[0].1, LanguageHint::Auto);
    assert_eq!(subtitle.language, "auto");
}

#[tokio::test]
async fn given_blank_request_language_and_configured_default_when_pipeline_runs_then_default_is_sent() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "zh-CN").await;
    let engine = Arc::new(ScriptedEngine::returning(vec![segment(0.0, 1.0, "hello")]));
    let mut config = harness.pipeline_config();
    config.default_language = Some("en-US".to_string());
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(2.0)),
        engine.clone(),
        config,
    );

    pipeline
        .run(&request_for(video.id, " "), &RecordingProgress::default())
        .await
        .unwrap();

    assert_eq!(engine.calls()[0].1, LanguageHint::Code("en-US".to_string()));
}

#[tokio::test]
async fn given_video_without_audio_stream_when_pipeline_runs_then_extraction_is_never_attempted() {
    let harness = TestHarness::new();
    let video = harness.seed_video("silent.mp4", "en").await;
    let extractor = Arc::new(FakeExtractor::without_audio());
    let pipeline = harness.pipeline(
        extractor.clone(),
        Arc::new(ScriptedEngine::returning(vec![segment(0.0, 1.0, "x")])),
        harness.pipeline_config(),
    );

    let err = pipeline
        .run(&request_for(video.id, "en"), &RecordingProgress::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Media(_)));
    assert!(err.to_string().contains("no audio"));
    assert_eq!(extractor.extractions(), 0);
}

#[tokio::test]
async fn given_missing_video_when_pipeline_runs_then_not_found() {
    let harness = TestHarness::new();
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(2.0)),
        Arc::new(ScriptedEngine::new(|_| {
            Err(TranscriptionError::InvalidResponse("unused".into()))
        })),
        harness.pipeline_config(),
    );

    let err = pipeline
        .run(
            &request_for(subtitler::domain::VideoId::new(), "en"),
            &RecordingProgress::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[tokio::test]
async fn given_extracted_audio_not_kept_when_run_ends_then_wav_is_removed() {
    let harness = TestHarness::new();
    let video = harness.seed_video("clip.mp4", "en").await;
    let mut config = harness.pipeline_config();
    config.keep_extracted_audio = false;
    let pipeline = harness.pipeline(
        Arc::new(FakeExtractor::with_audio(2.0)),
        Arc::new(ScriptedEngine::returning(vec![segment(0.0, 1.0, "hi")])),
        config,
    );
    let request = request_for(video.id, "en");

    pipeline
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap();

    let audio = harness.layout.audio_file(&video.id, &request.task_id);
    assert!(!audio.exists());
}
