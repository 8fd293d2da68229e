//! Adding content, either from an external catalog or by hand.

use crate::api::Backend;
use crate::error::{AppError, Result};
use crate::types::{
    ContentId, ContentKind, ContentType, ExternalRef, ExternalSource, ExternalTitle, Genre,
    GenreId, ImportRequest, NewContent, Platform, Status,
};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use super::{InFlight, Notice, lock};

/// Manual entry form. Numeric fields are kept as typed text until submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDraft {
    pub title: String,
    pub director: String,
    pub description: String,
    pub release_date: String,
    pub genre_ids: Vec<String>,
    pub platform: String,
    pub status: Status,
    pub content_type: ContentType,
    pub poster_url: String,
    pub runtime: String,
    pub total_seasons: String,
    pub total_episodes: String,
}

impl Default for ContentDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            director: String::new(),
            description: String::new(),
            release_date: String::new(),
            genre_ids: Vec::new(),
            platform: String::new(),
            status: Status::Wishlist,
            content_type: ContentType::Movie,
            poster_url: String::new(),
            runtime: String::new(),
            total_seasons: "1".to_string(),
            total_episodes: "0".to_string(),
        }
    }
}

fn parse_optional<T: FromStr>(field: &str, value: &str) -> Result<Option<T>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("Invalid {}: '{}'", field, value)))
}

impl ContentDraft {
    /// Copy what an external result knows into the form.
    pub fn prefill_from(&mut self, title: &ExternalTitle, content_type: ContentType) {
        self.title = title.title.clone();
        self.description = title.description.clone().unwrap_or_default();
        self.release_date = title.release_date.clone().unwrap_or_default();
        self.poster_url = title.poster_url.clone().unwrap_or_default();
        self.content_type = title.content_type.unwrap_or(content_type);
        if let Some(runtime) = title.runtime {
            self.runtime = runtime.to_string();
        }
    }

    /// Validate the form and build the create payload.
    pub fn to_new_content(&self) -> Result<NewContent> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }

        let genre_ids = self
            .genre_ids
            .iter()
            .map(|id| {
                id.trim()
                    .parse::<GenreId>()
                    .map_err(|_| AppError::InvalidInput(format!("Invalid genre id: '{}'", id)))
            })
            .collect::<Result<Vec<_>>>()?;

        let kind = match self.content_type {
            ContentType::Movie => ContentKind::Movie {
                runtime: parse_optional("runtime", &self.runtime)?,
            },
            ContentType::TvShow => ContentKind::TvShow {
                total_seasons: parse_optional("season count", &self.total_seasons)?,
                total_episodes: parse_optional("episode count", &self.total_episodes)?,
                episodes_per_season: BTreeMap::new(),
            },
        };

        let release_date = self.release_date.trim();
        Ok(NewContent {
            title: title.to_string(),
            director: self.director.trim().to_string(),
            description: self.description.clone(),
            release_date: (!release_date.is_empty()).then(|| release_date.to_string()),
            genre_ids,
            platform: parse_optional("platform id", &self.platform)?,
            status: self.status,
            poster_url: self.poster_url.trim().to_string(),
            kind,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddContentState {
    pub genres: Vec<Genre>,
    pub platforms: Vec<Platform>,
    pub source: ExternalSource,
    pub content_type: ContentType,
    pub results: Vec<ExternalTitle>,
    pub searching: bool,
    pub draft: ContentDraft,
    pub notice: Option<Notice>,
    pub last_error: Option<String>,
    pending: InFlight<ExternalRef>,
    submitting: bool,
    generation: u64,
}

pub struct AddContentView<B> {
    backend: Arc<B>,
    state: Mutex<AddContentState>,
}

impl<B: Backend> AddContentView<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(AddContentState::default()),
        }
    }

    pub fn snapshot(&self) -> AddContentState {
        lock(&self.state).clone()
    }

    pub fn draft(&self) -> ContentDraft {
        lock(&self.state).draft.clone()
    }

    pub fn take_notice(&self) -> Option<Notice> {
        lock(&self.state).notice.take()
    }

    /// Fetch the genre and platform choices for the manual form.
    pub async fn load_options(&self) -> Result<()> {
        let (genres, platforms) = tokio::join!(self.backend.genres(), self.backend.platforms());

        let mut state = lock(&self.state);
        match (genres, platforms) {
            (Ok(genres), Ok(platforms)) => {
                debug!("Loaded {} genres and {} platforms", genres.len(), platforms.len());
                state.genres = genres;
                state.platforms = platforms;
                state.last_error = None;
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Error fetching form options: {}", e);
                state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn set_source(&self, source: ExternalSource) {
        let mut state = lock(&self.state);
        if state.source != source {
            state.source = source;
            state.results.clear();
            state.searching = false;
            state.generation += 1;
        }
    }

    pub fn set_content_type(&self, content_type: ContentType) {
        let mut state = lock(&self.state);
        if state.content_type != content_type {
            state.content_type = content_type;
            state.draft.content_type = content_type;
            state.results.clear();
            state.searching = false;
            state.generation += 1;
        }
    }

    /// Search the selected catalog. A blank query sends nothing.
    ///
    /// Results of a search overtaken by a newer search, or by a change of
    /// source or content type, are dropped and the current results returned.
    pub async fn search(&self, query: &str) -> Result<Vec<ExternalTitle>> {
        let query = query.trim();
        let (ticket, source, content_type) = {
            let mut state = lock(&self.state);
            if query.is_empty() {
                state.notice = Some(Notice::Error("Please enter a search query".to_string()));
                return Err(AppError::InvalidInput("Search query is empty".to_string()));
            }
            state.searching = true;
            state.generation += 1;
            (state.generation, state.source, state.content_type)
        };

        let result = self
            .backend
            .search_external(source, query, content_type)
            .await;

        let mut state = lock(&self.state);
        if state.generation != ticket {
            debug!("Discarding superseded {} search for '{}'", source, query);
            return Ok(state.results.clone());
        }
        state.searching = false;
        match result {
            Ok(results) => {
                debug!("{} search for '{}' found {} titles", source, query, results.len());
                state.results = results.clone();
                Ok(results)
            }
            Err(e) => {
                error!("Error searching {}: {}", source, e);
                state.notice = Some(Notice::Error(
                    "Error searching. Please try again.".to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Import search result `index` with an initial status.
    ///
    /// On failure the manual form is filled in from the result instead.
    pub async fn import(&self, index: usize, status: Status) -> Result<ContentId> {
        let (title, content_type) = {
            let mut state = lock(&self.state);
            let title = state.results.get(index).cloned().ok_or_else(|| {
                AppError::InvalidInput(format!("No search result at position {}", index))
            })?;
            state.pending.begin(title.external.clone())?;
            (title, state.content_type)
        };

        let request = ImportRequest {
            external: title.external.clone(),
            content_type,
            status: Some(status),
        };
        let result = self.backend.import_external(&request).await;

        let mut state = lock(&self.state);
        state.pending.finish(&title.external);
        let result = result.and_then(|response| {
            response.new_id().ok_or_else(|| {
                AppError::Parse("import response carried no content id".to_string())
            })
        });

        match result {
            Ok(id) => {
                info!("Imported {} as content {}", title.external, id);
                state.notice = Some(Notice::Success("Content added successfully!".to_string()));
                Ok(id)
            }
            Err(e) => {
                warn!("Import of {} failed, falling back to manual entry: {}", title.external, e);
                state.draft.prefill_from(&title, content_type);
                state.results.clear();
                state.notice = Some(Notice::Error(
                    "Error importing content. You can add it manually.".to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Create a record from a filled-in form.
    pub async fn submit(&self, draft: ContentDraft) -> Result<ContentId> {
        let content = {
            let mut state = lock(&self.state);
            state.draft = draft;
            let content = match state.draft.to_new_content() {
                Ok(content) => content,
                Err(e) => {
                    state.notice = Some(Notice::Error(e.user_message()));
                    return Err(e);
                }
            };
            if state.submitting {
                return Err(AppError::Busy("content creation already in progress".to_string()));
            }
            state.submitting = true;
            content
        };

        let result = self.backend.create_content(&content).await;

        let mut state = lock(&self.state);
        state.submitting = false;
        match result {
            Ok(item) => {
                info!("Created content {} '{}'", item.id, item.title);
                state.notice = Some(Notice::Success("Content added successfully!".to_string()));
                state.draft = ContentDraft::default();
                Ok(item.id)
            }
            Err(e) => {
                error!("Error creating content: {}", e);
                state.notice = Some(Notice::Error(
                    "Error creating content. Please check all fields.".to_string(),
                ));
                Err(e)
            }
        }
    }
}
