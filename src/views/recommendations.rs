//! Recommendation list with one-step import of suggested titles.

use crate::api::Backend;
use crate::error::{AppError, Result};
use crate::types::{ContentId, ContentType, ExternalRef, ImportRequest, Recommendation};
use log::{debug, error, info};
use std::sync::{Arc, Mutex};

use super::{InFlight, Notice, lock};

/// Where to go after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Open the detail view of the new (or existing) record.
    Open(ContentId),
    /// The server returned no identifier; the list was reloaded instead.
    Refreshed,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationsState {
    pub items: Vec<Recommendation>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub notice: Option<Notice>,
    pending: InFlight<ExternalRef>,
    generation: u64,
    disposed: bool,
}

impl RecommendationsState {
    pub fn is_importing(&self, external: &ExternalRef) -> bool {
        self.pending.contains(external)
    }
}

pub struct RecommendationsView<B> {
    backend: Arc<B>,
    state: Mutex<RecommendationsState>,
}

impl<B: Backend> RecommendationsView<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(RecommendationsState::default()),
        }
    }

    pub fn snapshot(&self) -> RecommendationsState {
        lock(&self.state).clone()
    }

    pub fn items(&self) -> Vec<Recommendation> {
        lock(&self.state).items.clone()
    }

    pub fn take_notice(&self) -> Option<Notice> {
        lock(&self.state).notice.take()
    }

    pub async fn load(&self) -> Result<()> {
        let ticket = {
            let mut state = lock(&self.state);
            if state.disposed {
                return Ok(());
            }
            state.generation += 1;
            state.loading = true;
            state.generation
        };

        let result = self.backend.recommendations().await;

        let mut state = lock(&self.state);
        if state.generation != ticket {
            debug!("Discarding superseded recommendations");
            return Ok(());
        }
        state.loading = false;
        match result {
            Ok(items) => {
                debug!("Loaded {} recommendations", items.len());
                state.items = items;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching recommendations: {}", e);
                state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Import the suggested title at `index` into the collection.
    pub async fn import(&self, index: usize) -> Result<ImportOutcome> {
        let suggestion = {
            let mut state = lock(&self.state);
            let suggestion = match state.items.get(index) {
                Some(Recommendation::Suggested(suggestion)) => suggestion.clone(),
                Some(Recommendation::Owned(owned)) => {
                    return Err(AppError::InvalidInput(format!(
                        "'{}' is already in your collection",
                        owned.title
                    )));
                }
                None => {
                    return Err(AppError::InvalidInput(format!(
                        "No recommendation at position {}",
                        index
                    )));
                }
            };
            state.pending.begin(suggestion.external.clone())?;
            suggestion
        };

        let request = ImportRequest {
            external: suggestion.external.clone(),
            content_type: suggestion.content_type.unwrap_or(ContentType::Movie),
            status: None,
        };
        let result = self.backend.import_external(&request).await;

        let new_id = {
            let mut state = lock(&self.state);
            state.pending.finish(&suggestion.external);
            match result {
                Ok(response) => {
                    info!("Imported {} ({})", suggestion.title, suggestion.external);
                    state.notice = Some(Notice::Success(
                        response
                            .message
                            .clone()
                            .unwrap_or_else(|| "Imported to your collection".to_string()),
                    ));
                    response.new_id()
                }
                Err(e) => {
                    error!("Error importing {}: {}", suggestion.external, e);
                    state.notice = Some(Notice::Error("Failed to import item".to_string()));
                    return Err(e);
                }
            }
        };

        match new_id {
            Some(id) => Ok(ImportOutcome::Open(id)),
            None => {
                self.load().await?;
                Ok(ImportOutcome::Refreshed)
            }
        }
    }

    pub fn dispose(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        state.disposed = true;
    }
}
