//! API client for the MovieMate REST service.
//!
//! [`Backend`] is the seam every view controller is written against. The
//! HTTP implementation is [`ApiClient`]; tests drive the views with an
//! in-memory backend instead.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{
    CompletionEstimate, ContentId, ContentType, ContentItem, ContentStatistics, EpisodeMark, ExternalSource,
    ExternalTitle, Genre, ImportRequest, ImportResponse, Listing, NewContent, NewName, NewRating,
    NewReview, Platform, Rating, Recommendation, Review, ReviewNotes, Status, StatusUpdate,
    WatchHistoryEntry, WatchProgress, WatchStatistics,
};
use log::{debug, info, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Query string pairs for list endpoints.
pub type Query = Vec<(&'static str, String)>;

/// Every remote operation the client needs, one method per resource action.
pub trait Backend: Send + Sync {
    // content
    fn list_content(&self, query: &[(&'static str, String)])
        -> impl Future<Output = Result<Vec<ContentItem>>> + Send;
    fn list_movies(&self) -> impl Future<Output = Result<Vec<ContentItem>>> + Send;
    fn list_tv_shows(&self) -> impl Future<Output = Result<Vec<ContentItem>>> + Send;
    fn get_content(&self, id: ContentId) -> impl Future<Output = Result<ContentItem>> + Send;
    fn create_content(&self, content: &NewContent)
        -> impl Future<Output = Result<ContentItem>> + Send;
    fn update_status(&self, id: ContentId, status: Status)
        -> impl Future<Output = Result<ContentItem>> + Send;
    fn delete_content(&self, id: ContentId) -> impl Future<Output = Result<()>> + Send;
    fn content_statistics(&self) -> impl Future<Output = Result<ContentStatistics>> + Send;
    fn recommendations(&self) -> impl Future<Output = Result<Vec<Recommendation>>> + Send;
    fn search_external(
        &self,
        source: ExternalSource,
        query: &str,
        content_type: ContentType,
    ) -> impl Future<Output = Result<Vec<ExternalTitle>>> + Send;
    fn import_external(&self, request: &ImportRequest)
        -> impl Future<Output = Result<ImportResponse>> + Send;
    fn completion_estimate(&self, id: ContentId)
        -> impl Future<Output = Result<CompletionEstimate>> + Send;

    // reference data
    fn genres(&self) -> impl Future<Output = Result<Vec<Genre>>> + Send;
    fn create_genre(&self, name: &str) -> impl Future<Output = Result<Genre>> + Send;
    fn platforms(&self) -> impl Future<Output = Result<Vec<Platform>>> + Send;
    fn create_platform(&self, name: &str) -> impl Future<Output = Result<Platform>> + Send;

    // ratings and reviews
    fn ratings(&self, content: Option<ContentId>)
        -> impl Future<Output = Result<Vec<Rating>>> + Send;
    fn create_rating(&self, rating: &NewRating) -> impl Future<Output = Result<Rating>> + Send;
    fn update_rating(&self, id: i64, rating: &NewRating)
        -> impl Future<Output = Result<Rating>> + Send;
    fn reviews(&self, content: Option<ContentId>)
        -> impl Future<Output = Result<Vec<Review>>> + Send;
    fn create_review(&self, review: &NewReview) -> impl Future<Output = Result<Review>> + Send;
    fn update_review(&self, id: i64, review: &NewReview)
        -> impl Future<Output = Result<Review>> + Send;
    fn generate_review(&self, notes: &ReviewNotes)
        -> impl Future<Output = Result<Review>> + Send;

    // watching
    fn watch_progress(&self, content: Option<ContentId>)
        -> impl Future<Output = Result<Vec<WatchProgress>>> + Send;
    fn mark_episode(&self, mark: &EpisodeMark)
        -> impl Future<Output = Result<WatchProgress>> + Send;
    fn watch_history(&self) -> impl Future<Output = Result<Vec<WatchHistoryEntry>>> + Send;
    fn watch_statistics(&self) -> impl Future<Output = Result<WatchStatistics>> + Send;
}

/// Retry an async read with exponential backoff.
///
/// Only errors for which [`AppError::is_retryable`] holds are retried, up
/// to `max_retries` extra attempts starting at `BASE_RETRY_DELAY_MS`.
async fn retry_with_backoff<T, F, Fut>(operation_name: &str, max_retries: u32, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!("{} succeeded after {} attempts", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) if attempt < max_retries && e.is_retryable() => {
                let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2_u64.pow(attempt));
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name,
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// HTTP implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    read_retries: u32,
}

impl ApiClient {
    /// Build a client against `base_url` with a request timeout.
    pub fn new(base_url: &str, timeout: Duration, read_retries: u32) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("moviemate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            read_retries,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.read_retries,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `content/3/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            Err(AppError::Http { status, message })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        retry_with_backoff(&format!("GET {}", path), self.read_retries, || {
            let url = url.clone();
            async move {
                let resp = self.http.get(&url).query(query).send().await?;
                let resp = Self::check_response(resp).await?;
                let bytes = resp.bytes().await?;
                serde_json::from_slice::<T>(&bytes)
                    .map_err(|e| AppError::Parse(format!("{}: {}", path, e)))
            }
        })
        .await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<T>> {
        let listing: Listing<T> = self.get_json(path, query).await?;
        Ok(listing.into_items())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let resp = self.http.request(method, &url).json(body).send().await?;
        let resp = Self::check_response(resp).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| AppError::Parse(format!("{}: {}", path, e)))
    }

    fn content_filter(content: Option<ContentId>) -> Query {
        content
            .map(|id| vec![("content", id.to_string())])
            .unwrap_or_default()
    }
}

impl Backend for ApiClient {
    async fn list_content(&self, query: &[(&'static str, String)]) -> Result<Vec<ContentItem>> {
        let items: Vec<ContentItem> = self.get_list("content/", query).await?;
        debug!("Loaded {} content items", items.len());
        Ok(items)
    }

    async fn list_movies(&self) -> Result<Vec<ContentItem>> {
        self.get_list("content/movies/", &[]).await
    }

    async fn list_tv_shows(&self) -> Result<Vec<ContentItem>> {
        self.get_list("content/tv_shows/", &[]).await
    }

    async fn get_content(&self, id: ContentId) -> Result<ContentItem> {
        self.get_json(&format!("content/{}/", id), &[])
            .await
            .map_err(|e| match e {
                AppError::Http { status: 404, .. } => {
                    AppError::NotFound(format!("content {}", id))
                }
                other => other,
            })
    }

    async fn create_content(&self, content: &NewContent) -> Result<ContentItem> {
        self.send_json(Method::POST, "content/", content).await
    }

    async fn update_status(&self, id: ContentId, status: Status) -> Result<ContentItem> {
        self.send_json(
            Method::PATCH,
            &format!("content/{}/", id),
            &StatusUpdate { status },
        )
        .await
    }

    async fn delete_content(&self, id: ContentId) -> Result<()> {
        let url = self.url(&format!("content/{}/", id));
        debug!("DELETE {}", url);
        let resp = self.http.delete(&url).send().await?;
        Self::check_response(resp).await?;
        Ok(())
    }

    async fn content_statistics(&self) -> Result<ContentStatistics> {
        self.get_json("content/statistics/", &[]).await
    }

    async fn recommendations(&self) -> Result<Vec<Recommendation>> {
        self.get_list("content/recommendations/", &[]).await
    }

    async fn search_external(
        &self,
        source: ExternalSource,
        query: &str,
        content_type: ContentType,
    ) -> Result<Vec<ExternalTitle>> {
        let path = format!("content/search_{}/", source);
        let params = [
            ("q", query.to_string()),
            ("type", content_type.to_string()),
        ];
        self.get_list(&path, &params).await
    }

    async fn import_external(&self, request: &ImportRequest) -> Result<ImportResponse> {
        let path = format!("content/import_from_{}/", request.external.source());
        self.send_json(Method::POST, &path, request).await
    }

    async fn completion_estimate(&self, id: ContentId) -> Result<CompletionEstimate> {
        self.get_json(&format!("content/{}/completion_estimate/", id), &[])
            .await
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        self.get_list("genres/", &[]).await
    }

    async fn create_genre(&self, name: &str) -> Result<Genre> {
        let body = NewName {
            name: name.to_string(),
        };
        self.send_json(Method::POST, "genres/", &body).await
    }

    async fn platforms(&self) -> Result<Vec<Platform>> {
        self.get_list("platforms/", &[]).await
    }

    async fn create_platform(&self, name: &str) -> Result<Platform> {
        let body = NewName {
            name: name.to_string(),
        };
        self.send_json(Method::POST, "platforms/", &body).await
    }

    async fn ratings(&self, content: Option<ContentId>) -> Result<Vec<Rating>> {
        self.get_list("ratings/", &Self::content_filter(content))
            .await
    }

    async fn create_rating(&self, rating: &NewRating) -> Result<Rating> {
        self.send_json(Method::POST, "ratings/", rating).await
    }

    async fn update_rating(&self, id: i64, rating: &NewRating) -> Result<Rating> {
        self.send_json(Method::PUT, &format!("ratings/{}/", id), rating)
            .await
    }

    async fn reviews(&self, content: Option<ContentId>) -> Result<Vec<Review>> {
        self.get_list("reviews/", &Self::content_filter(content))
            .await
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.send_json(Method::POST, "reviews/", review).await
    }

    async fn update_review(&self, id: i64, review: &NewReview) -> Result<Review> {
        self.send_json(Method::PUT, &format!("reviews/{}/", id), review)
            .await
    }

    async fn generate_review(&self, notes: &ReviewNotes) -> Result<Review> {
        self.send_json(Method::POST, "reviews/generate_from_notes/", notes)
            .await
    }

    async fn watch_progress(&self, content: Option<ContentId>) -> Result<Vec<WatchProgress>> {
        self.get_list("watch-progress/", &Self::content_filter(content))
            .await
    }

    async fn mark_episode(&self, mark: &EpisodeMark) -> Result<WatchProgress> {
        self.send_json(Method::POST, "watch-progress/mark_episode/", mark)
            .await
    }

    async fn watch_history(&self) -> Result<Vec<WatchHistoryEntry>> {
        self.get_list("watch-history/", &[]).await
    }

    async fn watch_statistics(&self) -> Result<WatchStatistics> {
        self.get_json("watch-history/statistics/", &[]).await
    }
}
