use anyhow::{bail, Context, Result};
use log::info;
use tokio::io::AsyncBufRead;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{gesture::ClassifierAdapter, selection::SelectionController};

use super::loop_worker::{replay_loop, ReplayReport};

/// Owns the replay task. One replay at a time.
pub struct ReplayController {
    handle: Option<JoinHandle<Result<ReplayReport>>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for ReplayController {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start<R>(
        &mut self,
        reader: R,
        controller: SelectionController,
        adapter: ClassifierAdapter,
        linger: Duration,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        if self.handle.is_some() {
            bail!("replay already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(replay_loop(
            reader,
            controller,
            adapter,
            linger,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Token that stops the running replay when cancelled (e.g. on Ctrl-C).
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.cancel_token.clone()
    }

    /// Waits for the replay to finish on its own.
    pub async fn wait(&mut self) -> Result<ReplayReport> {
        self.cancel_token = None;
        let Some(handle) = self.handle.take() else {
            bail!("no replay running");
        };
        handle.await.context("replay task failed to join")?
    }

    pub async fn stop(&mut self) -> Result<ReplayReport> {
        if let Some(token) = self.cancel_token.take() {
            info!("stopping replay");
            token.cancel();
        }
        self.wait().await
    }
}
