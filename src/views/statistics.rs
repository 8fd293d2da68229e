use crate::api::Backend;
use crate::error::Result;
use crate::types::{ContentStatistics, WatchStatistics};
use log::error;
use std::sync::{Arc, Mutex};

use super::lock;

#[derive(Debug, Clone, Default)]
pub struct StatisticsState {
    pub content: Option<ContentStatistics>,
    pub watch: Option<WatchStatistics>,
    pub loading: bool,
    pub last_error: Option<String>,
}

/// Collection and watch-time statistics.
pub struct StatisticsView<B> {
    backend: Arc<B>,
    state: Mutex<StatisticsState>,
}

impl<B: Backend> StatisticsView<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(StatisticsState::default()),
        }
    }

    pub fn snapshot(&self) -> StatisticsState {
        lock(&self.state).clone()
    }

    /// Both sets are applied together or not at all.
    pub async fn load(&self) -> Result<()> {
        lock(&self.state).loading = true;

        let (content, watch) = tokio::join!(
            self.backend.content_statistics(),
            self.backend.watch_statistics()
        );

        let mut state = lock(&self.state);
        state.loading = false;
        match (content, watch) {
            (Ok(content), Ok(watch)) => {
                state.content = Some(content);
                state.watch = Some(watch);
                state.last_error = None;
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Error fetching statistics: {}", e);
                state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
