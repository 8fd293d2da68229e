//! Type definitions for the moviemate client.
//!
//! Wire records mirror the JSON the MovieMate API returns. Where the wire
//! shape relies on optional fields to distinguish cases (movie vs show,
//! owned vs suggested), the public type is a sum type built from a private
//! raw struct, the same way [`ContentItem`] is built from `RawContentItem`.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

pub type ContentId = i64;
pub type GenreId = i64;
pub type PlatformId = i64;

/// Watch status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Wishlist,
    Watching,
    Completed,
    Paused,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Wishlist,
        Status::Watching,
        Status::Completed,
        Status::Paused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Wishlist => "wishlist",
            Status::Watching => "watching",
            Status::Completed => "completed",
            Status::Paused => "paused",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidInput(format!("unknown status '{}'", s)))
    }
}

/// Movie or TV show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Movie,
    TvShow,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::TvShow => "tv_show",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(ContentType::Movie),
            "tv_show" | "tv-show" | "tv" | "show" => Ok(ContentType::TvShow),
            other => Err(AppError::InvalidInput(format!(
                "unknown content type '{}'",
                other
            ))),
        }
    }
}

/// A genre reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// A streaming platform reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Aggregate watch progress the server attaches to TV shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressInfo {
    #[serde(default)]
    pub total_watched_episodes: u32,
    #[serde(default)]
    pub latest_season: Option<u32>,
    #[serde(default)]
    pub latest_episode: Option<u32>,
}

/// Fields that only make sense for one content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Movie {
        /// Runtime in minutes.
        runtime: Option<u32>,
    },
    TvShow {
        total_seasons: Option<u32>,
        total_episodes: Option<u32>,
        /// Season number (as a string key) to episode count.
        episodes_per_season: BTreeMap<String, u32>,
    },
}

impl ContentKind {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentKind::Movie { .. } => ContentType::Movie,
            ContentKind::TvShow { .. } => ContentType::TvShow,
        }
    }
}

/// Content record as it appears on the wire.
///
/// List endpoints return a lighter serializer than the detail endpoint, so
/// everything but the identity and classification fields is optional.
#[derive(Debug, Deserialize)]
struct RawContentItem {
    id: ContentId,
    title: String,
    content_type: ContentType,
    status: Status,
    director: Option<String>,
    description: Option<String>,
    release_date: Option<String>,
    #[serde(default)]
    genre: Vec<Genre>,
    platform: Option<PlatformId>,
    platform_name: Option<String>,
    poster_url: Option<String>,
    tmdb_id: Option<i64>,
    imdb_id: Option<String>,
    runtime: Option<u32>,
    total_seasons: Option<u32>,
    total_episodes: Option<u32>,
    episodes_per_season: Option<BTreeMap<String, u32>>,
    rating_value: Option<u8>,
    review_text: Option<String>,
    progress_info: Option<ProgressInfo>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// A movie or TV show in the user's collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawContentItem")]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub status: Status,
    pub kind: ContentKind,
    pub director: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub genres: Vec<Genre>,
    pub platform: Option<PlatformId>,
    pub platform_name: Option<String>,
    pub poster_url: Option<String>,
    pub tmdb_id: Option<i64>,
    pub imdb_id: Option<String>,
    /// Latest rating, denormalized by the server.
    pub rating_value: Option<u8>,
    /// Latest review text, denormalized by the server.
    pub review_text: Option<String>,
    pub progress_info: Option<ProgressInfo>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<RawContentItem> for ContentItem {
    fn from(raw: RawContentItem) -> Self {
        let kind = match raw.content_type {
            ContentType::Movie => ContentKind::Movie {
                runtime: raw.runtime,
            },
            ContentType::TvShow => ContentKind::TvShow {
                total_seasons: raw.total_seasons,
                total_episodes: raw.total_episodes,
                episodes_per_season: raw.episodes_per_season.unwrap_or_default(),
            },
        };

        // Progress is only meaningful for shows; the list serializer never
        // sends it and the detail serializer sends null for movies.
        let progress_info = match kind {
            ContentKind::TvShow { .. } => raw.progress_info,
            ContentKind::Movie { .. } => None,
        };

        Self {
            id: raw.id,
            title: raw.title,
            status: raw.status,
            kind,
            director: non_empty(raw.director),
            description: non_empty(raw.description),
            release_date: non_empty(raw.release_date),
            genres: raw.genre,
            platform: raw.platform,
            platform_name: non_empty(raw.platform_name),
            poster_url: non_empty(raw.poster_url),
            tmdb_id: raw.tmdb_id,
            imdb_id: non_empty(raw.imdb_id),
            rating_value: raw.rating_value,
            review_text: non_empty(raw.review_text),
            progress_info,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

impl ContentItem {
    pub fn content_type(&self) -> ContentType {
        self.kind.content_type()
    }

    pub fn is_tv_show(&self) -> bool {
        matches!(self.kind, ContentKind::TvShow { .. })
    }

    /// Year portion of the release date, if present.
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }

    /// Format the item for display in list output.
    ///
    /// # Examples
    ///
    /// ```
    /// use moviemate::types::{ContentItem, ContentKind, Status};
    ///
    /// let item = ContentItem {
    ///     id: 7,
    ///     title: "Heat".to_string(),
    ///     status: Status::Completed,
    ///     kind: ContentKind::Movie { runtime: Some(170) },
    ///     director: Some("Michael Mann".to_string()),
    ///     description: None,
    ///     release_date: Some("1995-12-15".to_string()),
    ///     genres: vec![],
    ///     platform: None,
    ///     platform_name: None,
    ///     poster_url: None,
    ///     tmdb_id: None,
    ///     imdb_id: None,
    ///     rating_value: Some(9),
    ///     review_text: None,
    ///     progress_info: None,
    ///     created_at: None,
    ///     updated_at: None,
    /// };
    /// assert_eq!(item.to_display(), "#7 Heat (1995) [movie, completed] 9/10");
    /// ```
    pub fn to_display(&self) -> String {
        let mut line = format!("#{} {}", self.id, self.title);
        if let Some(year) = self.release_year() {
            line.push_str(&format!(" ({})", year));
        }
        line.push_str(&format!(" [{}, {}]", self.content_type(), self.status));
        if let Some(rating) = self.rating_value {
            line.push_str(&format!(" {}/10", rating));
        }
        line
    }
}

/// A stored rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: ContentId,
    #[serde(default)]
    pub content_title: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub rated_at: Option<String>,
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: ContentId,
    #[serde(default)]
    pub content_title: Option<String>,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One watched episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchProgress {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: ContentId,
    #[serde(default)]
    pub content_title: Option<String>,
    pub season: u32,
    pub episode: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub watched_at: Option<String>,
    #[serde(default)]
    pub watch_time_minutes: Option<u32>,
}

/// One viewing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    pub id: i64,
    pub content: ContentId,
    #[serde(default)]
    pub content_title: Option<String>,
    #[serde(default)]
    pub watch_date: Option<String>,
    #[serde(default)]
    pub watch_time_minutes: Option<u32>,
    #[serde(default)]
    pub session_type: Option<String>,
}

/// Server-side projection of how long a show will take to finish.
///
/// Movies and finished shows get a reduced shape with only `message`
/// and `estimated_days`, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionEstimate {
    pub estimated_days: Option<f64>,
    pub remaining_episodes: Option<u32>,
    pub total_episodes: Option<u32>,
    pub watched_episodes: Option<u32>,
    pub completion_percentage: Option<f64>,
    pub message: Option<String>,
}

impl CompletionEstimate {
    pub fn to_display(&self) -> String {
        match (self.estimated_days, self.remaining_episodes) {
            (Some(days), Some(remaining)) => format!(
                "{} days ({} episodes remaining), {}% complete",
                days,
                remaining,
                self.completion_percentage.unwrap_or(0.0)
            ),
            _ => self
                .message
                .clone()
                .unwrap_or_else(|| "No estimate available".to_string()),
        }
    }
}

/// Collection-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStatistics {
    pub total: u64,
    pub movies: u64,
    pub tv_shows: u64,
    pub status_counts: BTreeMap<String, u64>,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMinutes {
    pub date: String,
    pub minutes: u64,
}

/// Watch-time totals over the last week and month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchStatistics {
    pub weekly_minutes: u64,
    pub monthly_minutes: u64,
    pub weekly_hours: f64,
    pub monthly_hours: f64,
    pub daily_breakdown: Vec<DailyMinutes>,
}

/// External catalog the server can search and import from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExternalSource {
    #[default]
    Tmdb,
    Omdb,
}

impl ExternalSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ExternalSource::Tmdb => "tmdb",
            ExternalSource::Omdb => "omdb",
        }
    }
}

impl fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExternalSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tmdb" => Ok(ExternalSource::Tmdb),
            "omdb" | "imdb" => Ok(ExternalSource::Omdb),
            other => Err(AppError::InvalidInput(format!(
                "unknown catalog '{}'",
                other
            ))),
        }
    }
}

/// Identifier of a title in an external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalRef {
    Tmdb(i64),
    /// OMDB titles are keyed by IMDb id (e.g. `tt0113277`).
    Omdb(String),
}

impl ExternalRef {
    pub fn source(&self) -> ExternalSource {
        match self {
            ExternalRef::Tmdb(_) => ExternalSource::Tmdb,
            ExternalRef::Omdb(_) => ExternalSource::Omdb,
        }
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalRef::Tmdb(id) => write!(f, "tmdb:{}", id),
            ExternalRef::Omdb(id) => write!(f, "omdb:{}", id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawExternalTitle {
    tmdb_id: Option<i64>,
    imdb_id: Option<String>,
    title: String,
    content_type: Option<ContentType>,
    description: Option<String>,
    release_date: Option<String>,
    poster_url: Option<String>,
    runtime: Option<u32>,
}

/// A title known to an external catalog but not (yet) in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawExternalTitle")]
pub struct ExternalTitle {
    pub external: ExternalRef,
    pub title: String,
    pub content_type: Option<ContentType>,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub runtime: Option<u32>,
}

impl TryFrom<RawExternalTitle> for ExternalTitle {
    type Error = String;

    fn try_from(raw: RawExternalTitle) -> Result<Self, Self::Error> {
        // TMDB results are enriched with an imdb_id as well; the TMDB id wins.
        let external = match (raw.tmdb_id, non_empty(raw.imdb_id)) {
            (Some(id), _) => ExternalRef::Tmdb(id),
            (None, Some(imdb)) => ExternalRef::Omdb(imdb),
            (None, None) => {
                return Err(format!("'{}' has no external identifier", raw.title));
            }
        };

        Ok(Self {
            external,
            title: raw.title,
            content_type: raw.content_type,
            description: non_empty(raw.description),
            release_date: non_empty(raw.release_date),
            poster_url: non_empty(raw.poster_url),
            runtime: raw.runtime,
        })
    }
}

impl ExternalTitle {
    pub fn to_display(&self) -> String {
        match self.release_date.as_deref().and_then(|d| d.get(..4)) {
            Some(year) => format!("{} ({}) [{}]", self.title, year, self.external),
            None => format!("{} [{}]", self.title, self.external),
        }
    }
}

/// A recommended title that is already in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedContent {
    pub id: ContentId,
    pub title: String,
    pub content_type: Option<ContentType>,
    pub poster_url: Option<String>,
    /// Genre names.
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecommendation {
    id: Option<ContentId>,
    title: String,
    content_type: Option<ContentType>,
    poster_url: Option<String>,
    #[serde(default)]
    genre: Vec<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

/// One entry of the recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRecommendation")]
pub enum Recommendation {
    Owned(RecommendedContent),
    Suggested(ExternalTitle),
}

impl TryFrom<RawRecommendation> for Recommendation {
    type Error = String;

    fn try_from(raw: RawRecommendation) -> Result<Self, Self::Error> {
        if let Some(id) = raw.id {
            return Ok(Recommendation::Owned(RecommendedContent {
                id,
                title: raw.title,
                content_type: raw.content_type,
                poster_url: non_empty(raw.poster_url),
                genres: raw.genre,
            }));
        }

        let mut fields = raw.rest;
        fields.insert("title".into(), raw.title.into());
        if let Some(content_type) = raw.content_type {
            fields.insert("content_type".into(), content_type.as_str().into());
        }
        if let Some(poster_url) = raw.poster_url {
            fields.insert("poster_url".into(), poster_url.into());
        }
        serde_json::from_value::<ExternalTitle>(serde_json::Value::Object(fields))
            .map(Recommendation::Suggested)
            .map_err(|e| e.to_string())
    }
}

impl Recommendation {
    pub fn title(&self) -> &str {
        match self {
            Recommendation::Owned(owned) => &owned.title,
            Recommendation::Suggested(suggested) => &suggested.title,
        }
    }

    pub fn to_display(&self) -> String {
        match self {
            Recommendation::Owned(owned) => format!("#{} {} (in collection)", owned.id, owned.title),
            Recommendation::Suggested(suggested) => suggested.to_display(),
        }
    }
}

/// Either a bare array or a paginated envelope with a `results` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Bare(items) => items,
        }
    }
}

/// Server-side sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    Title,
    ReleaseDate,
    CreatedAt,
    UpdatedAt,
}

impl OrderField {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderField::Title => "title",
            OrderField::ReleaseDate => "release_date",
            OrderField::CreatedAt => "created_at",
            OrderField::UpdatedAt => "updated_at",
        }
    }
}

/// A signed ordering, written `-field` when descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ordering {
    pub field: OrderField,
    pub descending: bool,
}

impl Default for Ordering {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: OrderField::CreatedAt,
            descending: true,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.field.as_str())
    }
}

impl FromStr for Ordering {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let field = [
            OrderField::Title,
            OrderField::ReleaseDate,
            OrderField::CreatedAt,
            OrderField::UpdatedAt,
        ]
        .into_iter()
        .find(|field| field.as_str() == name)
        .ok_or_else(|| AppError::InvalidInput(format!("cannot order by '{}'", s)))?;

        Ok(Self { field, descending })
    }
}

impl TryFrom<String> for Ordering {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ordering> for String {
    fn from(ordering: Ordering) -> Self {
        ordering.to_string()
    }
}

/// Payload for creating or replacing a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRating {
    pub content: ContentId,
    pub rating: u8,
}

/// Payload for creating or replacing a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub content: ContentId,
    pub review_text: String,
    pub notes: String,
}

/// Payload for server-side review generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewNotes {
    pub content: ContentId,
    pub notes: String,
}

/// Payload for marking one episode as watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeMark {
    pub content: ContentId,
    pub season: u32,
    pub episode: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_time_minutes: Option<u32>,
}

/// Partial update that only touches the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: Status,
}

/// Payload for creating a named reference entity (genre or platform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewName {
    pub name: String,
}

/// Request to import an external title into the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub external: ExternalRef,
    pub content_type: ContentType,
    pub status: Option<Status>,
}

impl Serialize for ImportRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            tmdb_id: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            imdb_id: Option<&'a str>,
            content_type: ContentType,
            #[serde(skip_serializing_if = "Option::is_none")]
            status: Option<Status>,
        }

        let (tmdb_id, imdb_id) = match &self.external {
            ExternalRef::Tmdb(id) => (Some(*id), None),
            ExternalRef::Omdb(id) => (None, Some(id.as_str())),
        };
        Body {
            tmdb_id,
            imdb_id,
            content_type: self.content_type,
            status: self.status,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportedRecord {
    #[serde(default)]
    pub id: Option<ContentId>,
}

/// Response of an import call.
///
/// A fresh import returns the created record; a duplicate returns
/// `{"message": "Content already exists", "data": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub id: Option<ContentId>,
    #[serde(default)]
    pub data: Option<ImportedRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ImportResponse {
    /// Identifier of the imported (or already existing) record.
    pub fn new_id(&self) -> Option<ContentId> {
        self.id
            .or_else(|| self.data.as_ref().and_then(|data| data.id))
    }
}

/// Payload for creating a content record by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    pub director: String,
    pub description: String,
    pub release_date: Option<String>,
    pub genre_ids: Vec<GenreId>,
    pub platform: Option<PlatformId>,
    pub status: Status,
    pub poster_url: String,
    pub kind: ContentKind,
}

impl Serialize for NewContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            title: &'a str,
            director: &'a str,
            description: &'a str,
            release_date: Option<&'a str>,
            genre_ids: &'a [GenreId],
            platform: Option<PlatformId>,
            status: Status,
            content_type: ContentType,
            poster_url: &'a str,
            runtime: Option<u32>,
            total_seasons: Option<u32>,
            total_episodes: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            episodes_per_season: Option<&'a BTreeMap<String, u32>>,
        }

        let (runtime, total_seasons, total_episodes, episodes_per_season) = match &self.kind {
            ContentKind::Movie { runtime } => (*runtime, None, None, None),
            ContentKind::TvShow {
                total_seasons,
                total_episodes,
                episodes_per_season,
            } => (
                None,
                *total_seasons,
                *total_episodes,
                Some(episodes_per_season),
            ),
        };

        Body {
            title: &self.title,
            director: &self.director,
            description: &self.description,
            release_date: self.release_date.as_deref(),
            genre_ids: &self.genre_ids,
            platform: self.platform,
            status: self.status,
            content_type: self.kind.content_type(),
            poster_url: &self.poster_url,
            runtime,
            total_seasons,
            total_episodes,
            episodes_per_season,
        }
        .serialize(serializer)
    }
}
