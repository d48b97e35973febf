use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::application::ports::{ProgressReporter, RepositoryError, TaskRepository};
use crate::domain::TaskId;

use super::{PipelineError, SubtitlePipeline, SubtitleRequest};

/// Forwards pipeline checkpoints to the task row.
pub struct TaskProgress {
    task_id: TaskId,
    tasks: Arc<dyn TaskRepository>,
}

impl TaskProgress {
    pub fn new(task_id: TaskId, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { task_id, tasks }
    }
}

#[async_trait]
impl ProgressReporter for TaskProgress {
    async fn report(&self, progress: u8, message: &str) -> Result<(), RepositoryError> {
        tracing::debug!(progress, message, "Task progress");
        self.tasks
            .update_progress(self.task_id, progress, message)
            .await
    }
}

/// A fixed set of workers draining one bounded queue. Each run is owned by one worker.
pub struct SubtitleWorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl SubtitleWorkerPool {
    pub fn spawn(
        workers: usize,
        receiver: mpsc::Receiver<SubtitleRequest>,
        pipeline: Arc<SubtitlePipeline>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        let receiver = Arc::new(Mutex::new(receiver));
        let handles = (0..workers.max(1))
            .map(|worker_no| {
                let worker = SubtitleWorker {
                    worker_no,
                    receiver: Arc::clone(&receiver),
                    pipeline: Arc::clone(&pipeline),
                    tasks: Arc::clone(&tasks),
                };
                tokio::spawn(worker.run())
            })
            .collect();
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit. Workers stop once all senders are dropped.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Subtitle worker panicked");
            }
        }
    }
}

struct SubtitleWorker {
    worker_no: usize,
    receiver: Arc<Mutex<mpsc::Receiver<SubtitleRequest>>>,
    pipeline: Arc<SubtitlePipeline>,
    tasks: Arc<dyn TaskRepository>,
}

impl SubtitleWorker {
    async fn run(self) {
        tracing::info!(worker = self.worker_no, "Subtitle worker started");
        loop {
            let next = self.receiver.lock().await.recv().await;
            let Some(request) = next else {
                break;
            };

            let span = tracing::info_span!(
                "subtitle_task",
                task_id = %request.task_id,
                video_id = %request.video_id,
                worker = self.worker_no,
            );
            self.process(request).instrument(span).await;
        }
        tracing::info!(worker = self.worker_no, "Subtitle worker stopped: channel closed");
    }

    async fn process(&self, request: SubtitleRequest) {
        let progress = TaskProgress::new(request.task_id, Arc::clone(&self.tasks));

        match self.pipeline.run(&request, &progress).await {
            Ok(subtitle) => {
                if let Err(e) = self.tasks.mark_succeeded(request.task_id, "done").await {
                    tracing::error!(error = %e, "Failed to mark task succeeded");
                    return;
                }
                tracing::info!(
                    subtitle_id = %subtitle.id,
                    segments = subtitle.segment_count,
                    engine = self.pipeline.engine_name(),
                    "Subtitle generated"
                );
            }
            Err(e) => self.fail(request.task_id, &e).await,
        }
    }

    async fn fail(&self, task_id: TaskId, error: &PipelineError) {
        tracing::error!(kind = error.kind(), error = %error, "Subtitle task failed");
        if let Err(e) = self.tasks.mark_failed(task_id, &error.to_string()).await {
            tracing::error!(error = %e, "Failed to mark task failed");
        }
    }
}
