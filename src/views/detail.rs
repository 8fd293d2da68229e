//! Single-item detail page: ratings, reviews, watch progress, status and
//! deletion.

use crate::api::Backend;
use crate::error::{AppError, Result};
use crate::types::{
    CompletionEstimate, ContentId, ContentItem, EpisodeMark, NewRating, NewReview, Rating,
    Review, ReviewNotes, Status,
};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};

use super::{Confirm, InFlight, Notice, lock};

/// Lifecycle of the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The item could not be fetched.
    Missing,
    Deleted,
}

/// Kinds of write the detail view can issue; at most one of each runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Rate,
    SaveReview,
    GenerateReview,
    MarkEpisode,
    SetStatus,
    Delete,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub id: Option<ContentId>,
    pub phase: DetailPhase,
    pub content: Option<ContentItem>,
    /// Displayed rating, 0 when unrated.
    pub rating: u8,
    pub review: String,
    pub notes: String,
    pub estimate: Option<CompletionEstimate>,
    pub notice: Option<Notice>,
    pending: InFlight<Mutation>,
    generation: u64,
    disposed: bool,
}

impl DetailState {
    pub fn is_pending(&self, mutation: Mutation) -> bool {
        self.pending.contains(&mutation)
    }
}

fn rating_for(ratings: Vec<Rating>, id: ContentId) -> Option<Rating> {
    ratings.into_iter().find(|r| r.content == id)
}

fn review_for(reviews: Vec<Review>, id: ContentId) -> Option<Review> {
    reviews.into_iter().find(|r| r.content == id)
}

pub struct DetailView<B> {
    backend: Arc<B>,
    state: Mutex<DetailState>,
}

impl<B: Backend> DetailView<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Mutex::new(DetailState::default()),
        }
    }

    pub fn snapshot(&self) -> DetailState {
        lock(&self.state).clone()
    }

    pub fn phase(&self) -> DetailPhase {
        lock(&self.state).phase
    }

    pub fn rating(&self) -> u8 {
        lock(&self.state).rating
    }

    pub fn take_notice(&self) -> Option<Notice> {
        lock(&self.state).notice.take()
    }

    /// Fetch the item, then its rating, review and completion estimate.
    pub async fn load(&self, id: ContentId) -> Result<()> {
        let ticket = {
            let mut state = lock(&self.state);
            if state.disposed {
                return Ok(());
            }
            if state.id != Some(id) {
                state.content = None;
                state.rating = 0;
                state.review.clear();
                state.notes.clear();
                state.estimate = None;
            }
            state.id = Some(id);
            state.phase = DetailPhase::Loading;
            state.generation += 1;
            state.generation
        };

        let fetched = self.backend.get_content(id).await;

        let item = {
            let mut state = lock(&self.state);
            if state.generation != ticket {
                debug!("Discarding superseded load of content {}", id);
                return Ok(());
            }
            match fetched {
                Ok(item) => {
                    if let Some(value) = item.rating_value {
                        state.rating = value;
                    }
                    if let Some(text) = &item.review_text {
                        state.review = text.clone();
                    }
                    state.content = Some(item.clone());
                    state.phase = DetailPhase::Loaded;
                    item
                }
                Err(e) => {
                    error!("Error loading content {}: {}", id, e);
                    state.phase = if state.content.is_some() {
                        DetailPhase::Loaded
                    } else {
                        DetailPhase::Missing
                    };
                    state.notice = Some(Notice::Error(e.user_message()));
                    return Err(e);
                }
            }
        };

        let is_show = item.is_tv_show();
        let (ratings, reviews, estimate) = tokio::join!(
            self.backend.ratings(Some(id)),
            self.backend.reviews(Some(id)),
            async {
                if is_show {
                    Some(self.backend.completion_estimate(id).await)
                } else {
                    None
                }
            }
        );

        let mut state = lock(&self.state);
        if state.generation != ticket {
            debug!("Discarding superseded details of content {}", id);
            return Ok(());
        }

        let rating = ratings
            .inspect_err(|e| warn!("Could not load rating for {}: {}", id, e))
            .ok()
            .and_then(|list| rating_for(list, id));
        match rating {
            Some(r) => state.rating = r.rating,
            None => {
                if let Some(value) = item.rating_value {
                    state.rating = value;
                }
            }
        }

        let review = reviews
            .inspect_err(|e| warn!("Could not load review for {}: {}", id, e))
            .ok()
            .and_then(|list| review_for(list, id));
        match review {
            Some(r) => {
                state.review = r.review_text;
                state.notes = r.notes.unwrap_or_default();
            }
            None => {
                if let Some(text) = &item.review_text {
                    state.review = text.clone();
                }
            }
        }

        match estimate {
            Some(Ok(estimate)) => state.estimate = Some(estimate),
            Some(Err(e)) => warn!("Could not load completion estimate for {}: {}", id, e),
            None => state.estimate = None,
        }

        Ok(())
    }

    /// Reload the current item.
    pub async fn refresh(&self) -> Result<()> {
        let id = lock(&self.state).id;
        match id {
            Some(id) => self.load(id).await,
            None => Ok(()),
        }
    }

    /// Claim a mutation slot for the loaded item.
    fn begin(&self, mutation: Mutation) -> Result<ContentId> {
        let mut state = lock(&self.state);
        let id = match (state.id, state.phase) {
            (Some(id), DetailPhase::Loaded) if !state.disposed => id,
            _ => return Err(AppError::InvalidInput("No content loaded".to_string())),
        };
        state.pending.begin(mutation)?;
        Ok(id)
    }

    /// Release a mutation slot and record its outcome.
    fn finish(&self, mutation: Mutation, notice: Notice) {
        let mut state = lock(&self.state);
        state.pending.finish(&mutation);
        if !state.disposed {
            state.notice = Some(notice);
        }
    }

    /// Reload after a successful write. The write's notice outlives a
    /// failed reload; the failure is only logged.
    async fn refresh_after(&self, mutation: Mutation) {
        let notice = lock(&self.state).notice.clone();
        if let Err(e) = self.refresh().await {
            warn!("Reload after {:?} failed: {}", mutation, e);
            lock(&self.state).notice = notice;
        }
    }

    /// Rate the item 1 to 10.
    pub async fn rate(&self, value: u8) -> Result<()> {
        if !(1..=10).contains(&value) {
            return Err(AppError::InvalidInput(
                "Rating must be between 1 and 10".to_string(),
            ));
        }
        let id = self.begin(Mutation::Rate)?;
        lock(&self.state).rating = value;

        let result = self
            .backend
            .create_rating(&NewRating {
                content: id,
                rating: value,
            })
            .await;

        match result {
            Ok(_) => {
                info!("Rated content {} {}/10", id, value);
                self.finish(Mutation::Rate, Notice::Success("Rating saved!".to_string()));
                self.refresh_after(Mutation::Rate).await;
                Ok(())
            }
            Err(e) => {
                error!("Error saving rating for {}: {}", id, e);
                {
                    let mut state = lock(&self.state);
                    // Known defect: rolls back to 0, not to the last confirmed rating.
                    if state.id == Some(id) {
                        state.rating = 0;
                    }
                }
                self.finish(Mutation::Rate, Notice::Error("Error saving rating".to_string()));
                Err(e)
            }
        }
    }

    /// Save review text and private notes. Blank text is ignored.
    pub async fn save_review(&self, text: &str, notes: &str) -> Result<()> {
        if text.trim().is_empty() {
            debug!("Ignoring blank review");
            return Ok(());
        }
        let id = self.begin(Mutation::SaveReview)?;
        {
            let mut state = lock(&self.state);
            state.review = text.to_string();
            state.notes = notes.to_string();
        }

        let review = NewReview {
            content: id,
            review_text: text.to_string(),
            notes: notes.to_string(),
        };
        match self.backend.create_review(&review).await {
            Ok(_) => {
                info!("Saved review for content {}", id);
                self.finish(Mutation::SaveReview, Notice::Success("Review saved!".to_string()));
                self.refresh_after(Mutation::SaveReview).await;
                Ok(())
            }
            Err(e) => {
                error!("Error saving review for {}: {}", id, e);
                self.finish(Mutation::SaveReview, Notice::Error("Error saving review".to_string()));
                Err(e)
            }
        }
    }

    /// Ask the server to draft review text from `notes`.
    pub async fn generate_review(&self, notes: &str) -> Result<String> {
        if notes.trim().is_empty() {
            let mut state = lock(&self.state);
            state.notice = Some(Notice::Error("Please add some notes first".to_string()));
            return Err(AppError::InvalidInput(
                "Notes are required to generate a review".to_string(),
            ));
        }
        let id = self.begin(Mutation::GenerateReview)?;
        lock(&self.state).notes = notes.to_string();

        let request = ReviewNotes {
            content: id,
            notes: notes.to_string(),
        };
        match self.backend.generate_review(&request).await {
            Ok(review) => {
                {
                    let mut state = lock(&self.state);
                    if state.id == Some(id) {
                        state.review = review.review_text.clone();
                    }
                }
                self.finish(
                    Mutation::GenerateReview,
                    Notice::Success("Review generated!".to_string()),
                );
                Ok(review.review_text)
            }
            Err(e) => {
                error!("Error generating review for {}: {}", id, e);
                self.finish(
                    Mutation::GenerateReview,
                    Notice::Error("Error generating review".to_string()),
                );
                Err(e)
            }
        }
    }

    /// Record an episode as watched.
    pub async fn mark_episode(&self, season: u32, episode: u32) -> Result<()> {
        if season == 0 || episode == 0 {
            return Err(AppError::InvalidInput(
                "Season and episode must be positive".to_string(),
            ));
        }
        let id = self.begin(Mutation::MarkEpisode)?;

        let mark = EpisodeMark {
            content: id,
            season,
            episode,
            watch_time_minutes: None,
        };
        match self.backend.mark_episode(&mark).await {
            Ok(_) => {
                info!("Marked S{}E{} of content {} as watched", season, episode, id);
                self.finish(
                    Mutation::MarkEpisode,
                    Notice::Success(format!(
                        "Season {}, Episode {} marked as watched!",
                        season, episode
                    )),
                );
                self.refresh_after(Mutation::MarkEpisode).await;
                Ok(())
            }
            Err(e) => {
                error!("Error marking episode for {}: {}", id, e);
                self.finish(
                    Mutation::MarkEpisode,
                    Notice::Error("Error marking episode".to_string()),
                );
                Err(e)
            }
        }
    }

    pub async fn set_status(&self, status: Status) -> Result<()> {
        let id = self.begin(Mutation::SetStatus)?;

        match self.backend.update_status(id, status).await {
            Ok(_) => {
                info!("Content {} is now {}", id, status);
                self.finish(Mutation::SetStatus, Notice::Success("Status updated".to_string()));
                self.refresh_after(Mutation::SetStatus).await;
                Ok(())
            }
            Err(e) => {
                error!("Error updating status of {}: {}", id, e);
                self.finish(
                    Mutation::SetStatus,
                    Notice::Error("Error updating status".to_string()),
                );
                Err(e)
            }
        }
    }

    /// Delete the item after the user confirms.
    pub async fn delete(&self, confirm: &impl Confirm) -> Result<DeleteOutcome> {
        if !confirm.confirm("Are you sure you want to delete this content?") {
            debug!("Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        let id = self.begin(Mutation::Delete)?;

        match self.backend.delete_content(id).await {
            Ok(()) => {
                info!("Deleted content {}", id);
                {
                    let mut state = lock(&self.state);
                    if state.id == Some(id) {
                        state.phase = DetailPhase::Deleted;
                        state.content = None;
                        state.estimate = None;
                    }
                }
                self.finish(Mutation::Delete, Notice::Success("Content deleted!".to_string()));
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                error!("Error deleting content {}: {}", id, e);
                self.finish(Mutation::Delete, Notice::Error("Error deleting content".to_string()));
                Err(e)
            }
        }
    }

    /// Leave the page. Results that arrive later are discarded.
    pub fn dispose(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        state.disposed = true;
    }
}
