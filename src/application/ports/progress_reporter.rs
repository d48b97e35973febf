use async_trait::async_trait;

use super::RepositoryError;

/// Receives pipeline checkpoints for one task.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, progress: u8, message: &str) -> Result<(), RepositoryError>;
}
