use std::io;

use bytes::Bytes;
use futures::StreamExt;

use subtitler::application::ports::{MediaStore, MediaStoreError};
use subtitler::domain::StorageLayout;
use subtitler::infrastructure::storage::LocalMediaStore;

fn store_in(dir: &tempfile::TempDir) -> (LocalMediaStore, StorageLayout) {
    let layout = StorageLayout::new(
        dir.path().join("v"),
        dir.path().join("a"),
        dir.path().join("s"),
        dir.path().join("t"),
    );
    (LocalMediaStore::new(&layout).unwrap(), layout)
}

fn chunks(parts: &[&'static str]) -> futures::stream::BoxStream<'static, Result<Bytes, io::Error>> {
    futures::stream::iter(
        parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect::<Vec<_>>(),
    )
    .boxed()
}

#[tokio::test]
async fn given_new_store_then_every_root_directory_exists() {
    let dir = tempfile::tempdir().unwrap();
    let (_store, layout) = store_in(&dir);

    for root in [
        layout.video_dir(),
        layout.audio_dir(),
        layout.subtitle_dir(),
        layout.temp_dir(),
    ] {
        assert!(root.is_dir(), "{} missing", root.display());
    }
}

#[tokio::test]
async fn given_stream_within_limit_when_storing_then_bytes_land_at_path() {
    let dir = tempfile::tempdir().unwrap();
    let (store, layout) = store_in(&dir);
    let path = layout.video_dir().join("clip.mp4");

    let written = store
        .store_stream(&path, chunks(&["ab", "cd"]), Some(4))
        .await
        .unwrap();

    assert_eq!(written, 4);
    assert_eq!(store.read(&path).await.unwrap(), b"abcd");
    assert_eq!(store.size(&path).await.unwrap(), 4);
    assert!(!layout.video_dir().join("clip.mp4.part").exists());
}

#[tokio::test]
async fn given_stream_over_limit_when_storing_then_too_large_and_no_file_remains() {
    let dir = tempfile::tempdir().unwrap();
    let (store, layout) = store_in(&dir);
    let path = layout.video_dir().join("clip.mp4");

    let err = store
        .store_stream(&path, chunks(&["abc", "de"]), Some(4))
        .await
        .unwrap_err();

    assert!(matches!(err, MediaStoreError::TooLarge { limit: 4 }));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(layout.video_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn given_failing_stream_when_storing_then_partial_file_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let (store, layout) = store_in(&dir);
    let path = layout.video_dir().join("clip.mp4");
    let stream = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"ab")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
    ])
    .boxed();

    let err = store.store_stream(&path, stream, None).await.unwrap_err();

    assert!(matches!(err, MediaStoreError::Io(_)));
    assert_eq!(std::fs::read_dir(layout.video_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn given_nested_path_when_writing_then_parents_are_created_and_no_bom_is_added() {
    let dir = tempfile::tempdir().unwrap();
    let (store, layout) = store_in(&dir);
    let path = layout.subtitle_dir().join("nested").join("x.srt");

    store.write(&path, "1\n字幕\n".as_bytes()).await.unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, "1\n字幕\n".as_bytes());
    assert_ne!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
}

#[tokio::test]
async fn given_missing_file_when_deleting_then_ok_and_when_reading_then_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (store, layout) = store_in(&dir);
    let path = layout.audio_dir().join("nothing.wav");

    store.delete(&path).await.unwrap();
    let err = store.read(&path).await.unwrap_err();

    assert!(matches!(err, MediaStoreError::NotFound(_)));
}
