use subtitler::application::ports::{
    RepositoryError, SubtitleRepository, TaskRepository, VideoRepository,
};
use subtitler::domain::{
    Subtitle, SubtitleFormat, SubtitleSegment, TaskId, TaskRecord, TaskStatus, Video, VideoId,
};

use crate::helpers::test_postgres::TestPostgres;

#[tokio::test]
#[ignore = "requires docker"]
async fn given_fresh_database_when_migrations_run_then_tables_are_empty() {
    let pg = TestPostgres::new().await;

    for table in ["videos", "subtitles", "tasks"] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pg.pool)
            .await
            .expect("Failed to count rows");
        assert_eq!(count, 0, "{} should be empty", table);
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_task_row_when_progress_and_terminal_updates_race_then_guards_hold() {
    let pg = TestPostgres::new().await;
    let task = TaskRecord::new(VideoId::new());
    pg.tasks.create(&task).await.unwrap();

    pg.tasks
        .update_progress(task.task_id, 30, "speech recognition")
        .await
        .unwrap();
    pg.tasks
        .update_progress(task.task_id, 10, "stale")
        .await
        .unwrap();
    let mid = pg.tasks.get_by_id(task.task_id).await.unwrap().unwrap();
    assert_eq!(mid.progress, 30);

    pg.tasks.mark_succeeded(task.task_id, "done").await.unwrap();
    pg.tasks.mark_failed(task.task_id, "late failure").await.unwrap();

    let stored = pg.tasks.get_by_id(task.task_id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Succeeded);
    assert_eq!(stored.progress, 100);
    assert_eq!(stored.error_message, None);
    assert!(
        pg.tasks
            .list_by_status(TaskStatus::Running)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_missing_task_when_marking_failed_then_not_found() {
    let pg = TestPostgres::new().await;

    let err = pg.tasks.mark_failed(TaskId::new(), "x").await.unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_subtitle_and_video_rows_when_round_tripped_then_fields_survive() {
    let pg = TestPostgres::new().await;
    let video = Video::new(
        VideoId::new(),
        "owner-1".to_string(),
        "Lecture".to_string(),
        "lecture.mp4".to_string(),
        "/data/videos/x.mp4".to_string(),
        1024,
        "zh-CN".to_string(),
        61.5,
    );
    pg.videos.create(&video).await.unwrap();

    let segments = [
        SubtitleSegment::new(0.0, 5.1, "你好"),
        SubtitleSegment::new(5.1, 11.8, "世界"),
    ];
    let subtitle =
        Subtitle::from_segments(video.id, "zh-CN".to_string(), SubtitleFormat::Vtt, &segments)
            .unwrap();
    pg.subtitles.create(&subtitle).await.unwrap();
    pg.subtitles
        .update_file_path(subtitle.id, "/data/subtitles/x.vtt")
        .await
        .unwrap();

    let stored_video = pg.videos.get_by_id(video.id).await.unwrap().unwrap();
    assert_eq!(stored_video.duration_secs(), 61.5);
    assert_eq!(pg.videos.list_by_owner("owner-1").await.unwrap().len(), 1);

    let listed = pg.subtitles.list_by_video(video.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].format, SubtitleFormat::Vtt);
    assert_eq!(listed[0].segment_count, 2);
    assert_eq!(listed[0].file_path, "/data/subtitles/x.vtt");
    assert_eq!(listed[0].segments().unwrap()[1].text, "世界");

    assert!(pg.subtitles.delete(subtitle.id).await.unwrap());
    assert!(pg.videos.delete(video.id).await.unwrap());
    assert!(!pg.videos.delete(video.id).await.unwrap());
}
