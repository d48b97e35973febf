use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use subtitler::application::ports::{SubtitleRepository, TaskRepository, VideoRepository};
use subtitler::application::services::{
    SubtitlePipeline, SubtitleService, SubtitleWorkerPool, VideoService,
};
use subtitler::infrastructure::media::AudioExtractorFactory;
use subtitler::infrastructure::observability::{TracingConfig, init_tracing};
use subtitler::infrastructure::persistence::{
    InMemorySubtitleRepository, InMemoryTaskRepository, InMemoryVideoRepository,
    PgSubtitleRepository, PgTaskRepository, PgVideoRepository, create_pool, run_migrations,
};
use subtitler::infrastructure::storage::LocalMediaStore;
use subtitler::infrastructure::stt::TranscriptionEngineFactory;
use subtitler::presentation::{AppState, Environment, Settings, create_router};

struct Repositories {
    tasks: Arc<dyn TaskRepository>,
    subtitles: Arc<dyn SubtitleRepository>,
    videos: Arc<dyn VideoRepository>,
}

async fn connect_repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    let Some(url) = settings
        .database
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
    else {
        tracing::warn!("No database.url configured, task and subtitle state will not survive a restart");
        return Ok(Repositories {
            tasks: Arc::new(InMemoryTaskRepository::new()),
            subtitles: Arc::new(InMemorySubtitleRepository::new()),
            videos: Arc::new(InMemoryVideoRepository::new()),
        });
    };

    let pool = create_pool(url, settings.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Repositories {
        tasks: Arc::new(PgTaskRepository::new(pool.clone())),
        subtitles: Arc::new(PgSubtitleRepository::new(pool.clone())),
        videos: Arc::new(PgVideoRepository::new(pool)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        settings.logging.json,
        settings.logging.level.clone(),
    ));

    let app = &settings.app;
    let layout = app.layout();

    let repositories = connect_repositories(&settings).await?;
    let store = Arc::new(LocalMediaStore::new(&layout).context("Failed to prepare storage directories")?);
    let extractor = AudioExtractorFactory::create(&app.media_config()).await;
    let engine = TranscriptionEngineFactory::create(
        app.stt.provider,
        app.stt.active().to_provider_config(),
    )
    .context("Failed to configure speech-to-text provider")?;

    tracing::info!(
        provider = engine.name(),
        workers = app.workers,
        queue_capacity = app.queue_capacity,
        "Speech-to-text provider ready"
    );

    let pipeline = Arc::new(SubtitlePipeline::new(
        Arc::clone(&extractor),
        engine,
        Arc::clone(&repositories.videos),
        Arc::clone(&repositories.subtitles),
        store.clone(),
        app.pipeline_config(),
    ));

    let (sender, receiver) = mpsc::channel(app.queue_capacity.max(1));
    let workers = SubtitleWorkerPool::spawn(
        app.workers,
        receiver,
        pipeline,
        Arc::clone(&repositories.tasks),
    );

    let subtitle_service = Arc::new(SubtitleService::new(
        Arc::clone(&repositories.tasks),
        Arc::clone(&repositories.subtitles),
        Arc::clone(&repositories.videos),
        store.clone(),
        sender,
    ));
    let video_service = Arc::new(VideoService::new(
        Arc::clone(&repositories.videos),
        store,
        extractor,
        layout,
        app.upload_policy(),
    ));

    let interrupted = subtitle_service
        .sweep_interrupted()
        .await
        .context("Failed to sweep interrupted tasks")?;
    if interrupted > 0 {
        tracing::info!(count = interrupted, "Interrupted tasks marked failed");
    }

    let router = create_router(AppState::new(subtitle_service, video_service));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, workers = workers.size(), "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
