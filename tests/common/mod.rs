//! In-memory backend for driving the view controllers in tests.

#![allow(dead_code)]

use moviemate::api::Backend;
use moviemate::error::{AppError, Result};
use moviemate::types::{
    CompletionEstimate, ContentId, ContentItem, ContentStatistics, ContentType, EpisodeMark,
    ExternalSource, ExternalTitle, Genre, ImportRequest, ImportResponse, NewContent, NewRating,
    NewReview, Platform, Rating, Recommendation, Review, ReviewNotes, Status, WatchHistoryEntry,
    WatchProgress, WatchStatistics,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub body: Value,
}

pub struct FakeBackend {
    pub content: Mutex<Vec<ContentItem>>,
    pub ratings: Mutex<Vec<Rating>>,
    pub reviews: Mutex<Vec<Review>>,
    pub recommendations: Mutex<Vec<Recommendation>>,
    pub search_results: Mutex<Vec<ExternalTitle>>,
    pub import_response: Mutex<ImportResponse>,
    pub estimate: Mutex<CompletionEstimate>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, u16>>,
    held: Mutex<HashMap<&'static str, usize>>,
    gate: Semaphore,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn movie(id: ContentId, title: &str) -> ContentItem {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "content_type": "movie",
        "status": "wishlist",
        "runtime": 120
    }))
    .unwrap()
}

pub fn show(id: ContentId, title: &str) -> ContentItem {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "content_type": "tv_show",
        "status": "watching",
        "total_seasons": 2,
        "total_episodes": 20
    }))
    .unwrap()
}

pub fn rating(content: ContentId, value: u8) -> Rating {
    Rating {
        id: None,
        content,
        content_title: None,
        rating: value,
        rated_at: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            content: Mutex::new(Vec::new()),
            ratings: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            recommendations: Mutex::new(Vec::new()),
            search_results: Mutex::new(Vec::new()),
            import_response: Mutex::new(ImportResponse::default()),
            estimate: Mutex::new(CompletionEstimate::default()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            held: Mutex::new(HashMap::new()),
            gate: Semaphore::new(0),
        }
    }

    pub fn with_content(items: Vec<ContentItem>) -> Self {
        let backend = Self::new();
        *guard(&backend.content) = items;
        backend
    }

    /// Make every call to `method` fail with an HTTP status.
    pub fn fail(&self, method: &'static str, status: u16) {
        guard(&self.failures).insert(method, status);
    }

    pub fn recover(&self, method: &'static str) {
        guard(&self.failures).remove(method);
    }

    /// Block the next call to `method` until [`release`](Self::release).
    pub fn hold_next(&self, method: &'static str) {
        *guard(&self.held).entry(method).or_insert(0) += 1;
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self, method: &str) -> Vec<Value> {
        guard(&self.calls)
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.body.clone())
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls(method).len()
    }

    /// Yield until `method` has been called at least `n` times.
    pub async fn wait_for(&self, method: &str, n: usize) {
        while self.count(method) < n {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, method: &'static str, body: Value) -> Result<()> {
        guard(&self.calls).push(Call { method, body });

        let hold = {
            let mut held = guard(&self.held);
            match held.get_mut(method) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            }
        };
        if hold {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }

        let failure = guard(&self.failures).get(method).copied();
        match failure {
            Some(status) => Err(AppError::Http {
                status,
                message: format!("{} failed", method),
            }),
            None => Ok(()),
        }
    }

    fn of_type(&self, content_type: ContentType) -> Vec<ContentItem> {
        guard(&self.content)
            .iter()
            .filter(|item| item.content_type() == content_type)
            .cloned()
            .collect()
    }

    fn find(&self, id: ContentId) -> Result<ContentItem> {
        guard(&self.content)
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("content {}", id)))
    }
}

impl Backend for FakeBackend {
    async fn list_content(&self, query: &[(&'static str, String)]) -> Result<Vec<ContentItem>> {
        let body: serde_json::Map<String, Value> = query
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect();
        self.enter("list_content", Value::Object(body)).await?;

        let param = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_lowercase())
        };
        let search = param("search");
        let content_type = param("content_type");
        Ok(guard(&self.content)
            .iter()
            .filter(|item| {
                search
                    .as_deref()
                    .is_none_or(|s| item.title.to_lowercase().contains(s))
            })
            .filter(|item| {
                content_type
                    .as_deref()
                    .is_none_or(|t| item.content_type().as_str() == t)
            })
            .cloned()
            .collect())
    }

    async fn list_movies(&self) -> Result<Vec<ContentItem>> {
        self.enter("list_movies", Value::Null).await?;
        Ok(self.of_type(ContentType::Movie))
    }

    async fn list_tv_shows(&self) -> Result<Vec<ContentItem>> {
        self.enter("list_tv_shows", Value::Null).await?;
        Ok(self.of_type(ContentType::TvShow))
    }

    async fn get_content(&self, id: ContentId) -> Result<ContentItem> {
        self.enter("get_content", json!({ "id": id })).await?;
        self.find(id)
    }

    async fn create_content(&self, content: &NewContent) -> Result<ContentItem> {
        let body = serde_json::to_value(content)?;
        self.enter("create_content", body.clone()).await?;

        let mut record = body;
        record["id"] = json!(100);
        let item: ContentItem = serde_json::from_value(record)?;
        guard(&self.content).push(item.clone());
        Ok(item)
    }

    async fn update_status(&self, id: ContentId, status: Status) -> Result<ContentItem> {
        self.enter("update_status", json!({ "id": id, "status": status }))
            .await?;
        let mut content = guard(&self.content);
        let item = content
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound(format!("content {}", id)))?;
        item.status = status;
        Ok(item.clone())
    }

    async fn delete_content(&self, id: ContentId) -> Result<()> {
        self.enter("delete_content", json!({ "id": id })).await?;
        guard(&self.content).retain(|item| item.id != id);
        Ok(())
    }

    async fn content_statistics(&self) -> Result<ContentStatistics> {
        self.enter("content_statistics", Value::Null).await?;
        let content = guard(&self.content);
        Ok(ContentStatistics {
            total: content.len() as u64,
            movies: content.iter().filter(|i| !i.is_tv_show()).count() as u64,
            tv_shows: content.iter().filter(|i| i.is_tv_show()).count() as u64,
            ..ContentStatistics::default()
        })
    }

    async fn recommendations(&self) -> Result<Vec<Recommendation>> {
        self.enter("recommendations", Value::Null).await?;
        Ok(guard(&self.recommendations).clone())
    }

    async fn search_external(
        &self,
        source: ExternalSource,
        query: &str,
        content_type: ContentType,
    ) -> Result<Vec<ExternalTitle>> {
        self.enter(
            "search_external",
            json!({ "source": source.as_str(), "q": query, "type": content_type }),
        )
        .await?;
        Ok(guard(&self.search_results).clone())
    }

    async fn import_external(&self, request: &ImportRequest) -> Result<ImportResponse> {
        self.enter("import_external", serde_json::to_value(request)?)
            .await?;
        Ok(guard(&self.import_response).clone())
    }

    async fn completion_estimate(&self, id: ContentId) -> Result<CompletionEstimate> {
        self.enter("completion_estimate", json!({ "id": id })).await?;
        Ok(guard(&self.estimate).clone())
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        self.enter("genres", Value::Null).await?;
        Ok(vec![
            Genre {
                id: 1,
                name: "Drama".to_string(),
            },
            Genre {
                id: 2,
                name: "Science Fiction".to_string(),
            },
        ])
    }

    async fn create_genre(&self, name: &str) -> Result<Genre> {
        self.enter("create_genre", json!({ "name": name })).await?;
        Ok(Genre {
            id: 99,
            name: name.to_string(),
        })
    }

    async fn platforms(&self) -> Result<Vec<Platform>> {
        self.enter("platforms", Value::Null).await?;
        Ok(vec![Platform {
            id: 1,
            name: "Netflix".to_string(),
            icon: None,
        }])
    }

    async fn create_platform(&self, name: &str) -> Result<Platform> {
        self.enter("create_platform", json!({ "name": name })).await?;
        Ok(Platform {
            id: 99,
            name: name.to_string(),
            icon: None,
        })
    }

    async fn ratings(&self, content: Option<ContentId>) -> Result<Vec<Rating>> {
        self.enter("ratings", json!({ "content": content })).await?;
        Ok(guard(&self.ratings).clone())
    }

    async fn create_rating(&self, new: &NewRating) -> Result<Rating> {
        self.enter("create_rating", serde_json::to_value(new)?).await?;
        let stored = rating(new.content, new.rating);
        let mut ratings = guard(&self.ratings);
        ratings.retain(|r| r.content != new.content);
        ratings.push(stored.clone());
        Ok(stored)
    }

    async fn update_rating(&self, id: i64, new: &NewRating) -> Result<Rating> {
        let mut body = serde_json::to_value(new)?;
        body["id"] = json!(id);
        self.enter("update_rating", body).await?;
        Ok(rating(new.content, new.rating))
    }

    async fn reviews(&self, content: Option<ContentId>) -> Result<Vec<Review>> {
        self.enter("reviews", json!({ "content": content })).await?;
        Ok(guard(&self.reviews).clone())
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.enter("create_review", serde_json::to_value(review)?)
            .await?;
        let stored = Review {
            id: Some(1),
            content: review.content,
            content_title: None,
            review_text: review.review_text.clone(),
            notes: Some(review.notes.clone()),
            created_at: None,
            updated_at: None,
        };
        guard(&self.reviews).push(stored.clone());
        Ok(stored)
    }

    async fn update_review(&self, id: i64, review: &NewReview) -> Result<Review> {
        let mut body = serde_json::to_value(review)?;
        body["id"] = json!(id);
        self.enter("update_review", body).await?;
        Ok(Review {
            id: Some(id),
            content: review.content,
            content_title: None,
            review_text: review.review_text.clone(),
            notes: Some(review.notes.clone()),
            created_at: None,
            updated_at: None,
        })
    }

    async fn generate_review(&self, notes: &ReviewNotes) -> Result<Review> {
        self.enter("generate_review", serde_json::to_value(notes)?)
            .await?;
        Ok(Review {
            id: Some(2),
            content: notes.content,
            content_title: None,
            review_text: format!("A film about {}.", notes.notes),
            notes: Some(notes.notes.clone()),
            created_at: None,
            updated_at: None,
        })
    }

    async fn watch_progress(&self, content: Option<ContentId>) -> Result<Vec<WatchProgress>> {
        self.enter("watch_progress", json!({ "content": content }))
            .await?;
        Ok(Vec::new())
    }

    async fn mark_episode(&self, mark: &EpisodeMark) -> Result<WatchProgress> {
        self.enter("mark_episode", serde_json::to_value(mark)?).await?;
        Ok(WatchProgress {
            id: Some(1),
            content: mark.content,
            content_title: None,
            season: mark.season,
            episode: mark.episode,
            completed: true,
            watched_at: None,
            watch_time_minutes: mark.watch_time_minutes,
        })
    }

    async fn watch_history(&self) -> Result<Vec<WatchHistoryEntry>> {
        self.enter("watch_history", Value::Null).await?;
        Ok(Vec::new())
    }

    async fn watch_statistics(&self) -> Result<WatchStatistics> {
        self.enter("watch_statistics", Value::Null).await?;
        Ok(WatchStatistics {
            weekly_minutes: 90,
            weekly_hours: 1.5,
            ..WatchStatistics::default()
        })
    }
}
