//! Filterable content lists (all content, movies, TV shows).

use crate::api::{Backend, Query};
use crate::error::Result;
use crate::types::{ContentItem, ContentType, OrderField, Ordering, Platform, PlatformId, Status};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::cmp;
use std::sync::{Arc, Mutex};

use super::lock;

/// Where list filters are evaluated. Applies to every list alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrategy {
    /// Send the filter as query parameters and show what the server returns.
    #[default]
    Server,
    /// Fetch the unfiltered collection and filter it here.
    Local,
}

/// Which collection a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    All,
    Movies,
    Shows,
}

impl ListKind {
    /// Content type implied by the list itself.
    pub fn pinned_type(self) -> Option<ContentType> {
        match self {
            ListKind::All => None,
            ListKind::Movies => Some(ContentType::Movie),
            ListKind::Shows => Some(ContentType::TvShow),
        }
    }
}

/// Filter criteria for a content list. Empty fields are unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    pub search: String,
    pub status: Option<Status>,
    pub platform: Option<PlatformId>,
    /// Genre name, matched as a case-insensitive substring.
    pub genre: String,
    pub content_type: Option<ContentType>,
    pub ordering: Option<Ordering>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            platform: None,
            genre: String::new(),
            content_type: None,
            ordering: Some(Ordering::default()),
        }
    }
}

/// A single edit to a [`ContentFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    Status(Option<Status>),
    Platform(Option<PlatformId>),
    Genre(String),
    ContentType(Option<ContentType>),
    Ordering(Option<Ordering>),
    Reset,
}

impl ContentFilter {
    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Search(search) => self.search = search,
            FilterChange::Status(status) => self.status = status,
            FilterChange::Platform(platform) => self.platform = platform,
            FilterChange::Genre(genre) => self.genre = genre,
            FilterChange::ContentType(content_type) => self.content_type = content_type,
            FilterChange::Ordering(ordering) => self.ordering = ordering,
            FilterChange::Reset => *self = Self::default(),
        }
    }

    /// Query parameters for exactly the fields that are set.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        let search = self.search.trim();
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        if let Some(platform) = self.platform {
            query.push(("platform", platform.to_string()));
        }
        let genre = self.genre.trim();
        if !genre.is_empty() {
            query.push(("genre", genre.to_string()));
        }
        if let Some(content_type) = self.content_type {
            query.push(("content_type", content_type.to_string()));
        }
        if let Some(ordering) = self.ordering {
            query.push(("ordering", ordering.to_string()));
        }
        query
    }

    /// Local equivalent of the server-side filter.
    ///
    /// Search is a case-insensitive substring of the title or director.
    /// List payloads carry only the platform name, so a platform id is
    /// resolved through `platforms` when the item has no id of its own.
    pub fn matches(&self, item: &ContentItem, platforms: &[Platform]) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty() {
            let in_title = item.title.to_lowercase().contains(&search);
            let in_director = item
                .director
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&search));
            if !in_title && !in_director {
                return false;
            }
        }

        if self.status.is_some_and(|status| item.status != status) {
            return false;
        }
        if self
            .content_type
            .is_some_and(|content_type| item.content_type() != content_type)
        {
            return false;
        }
        if let Some(wanted) = self.platform {
            let on_platform = match item.platform {
                Some(id) => id == wanted,
                None => {
                    let name = platforms.iter().find(|p| p.id == wanted).map(|p| &p.name);
                    matches!(
                        (name, &item.platform_name),
                        (Some(want), Some(have)) if want.eq_ignore_ascii_case(have)
                    )
                }
            };
            if !on_platform {
                return false;
            }
        }

        let genre = self.genre.trim().to_lowercase();
        genre.is_empty()
            || item
                .genres
                .iter()
                .any(|g| g.name.to_lowercase().contains(&genre))
    }

    /// Local equivalent of the server-side ordering.
    ///
    /// Missing release dates sort last. Timestamps are compared only when
    /// every item carries one; otherwise the fetch order, which is newest
    /// first, is kept (reversed for ascending `created_at`).
    pub fn sort(&self, items: &mut [ContentItem]) {
        let Some(ordering) = self.ordering else {
            return;
        };
        let directed = |o: cmp::Ordering| if ordering.descending { o.reverse() } else { o };

        match ordering.field {
            OrderField::Title => {
                items.sort_by(|a, b| directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())))
            }
            OrderField::ReleaseDate => items.sort_by(|a, b| match (&a.release_date, &b.release_date) {
                (Some(x), Some(y)) => directed(x.cmp(y)),
                (Some(_), None) => cmp::Ordering::Less,
                (None, Some(_)) => cmp::Ordering::Greater,
                (None, None) => cmp::Ordering::Equal,
            }),
            field @ (OrderField::CreatedAt | OrderField::UpdatedAt) => {
                let stamp = |item: &ContentItem| match field {
                    OrderField::CreatedAt => item.created_at.clone(),
                    _ => item.updated_at.clone(),
                };
                if items.iter().all(|item| stamp(item).is_some()) {
                    items.sort_by(|a, b| directed(stamp(a).cmp(&stamp(b))));
                } else if field == OrderField::CreatedAt && !ordering.descending {
                    items.reverse();
                } else {
                    debug!("Keeping fetch order for {}", ordering);
                }
            }
        }
    }
}

/// Renderable state of a list view.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub filter: ContentFilter,
    pub items: Vec<ContentItem>,
    pub loading: bool,
    /// Message of the last failed load; cleared by the next success.
    pub last_error: Option<String>,
    generation: u64,
    disposed: bool,
}

/// Controller for one content list page.
pub struct ListView<B> {
    backend: Arc<B>,
    kind: ListKind,
    strategy: FilterStrategy,
    state: Mutex<ListState>,
}

impl<B: Backend> ListView<B> {
    pub fn new(backend: Arc<B>, kind: ListKind, strategy: FilterStrategy) -> Self {
        Self {
            backend,
            kind,
            strategy,
            state: Mutex::new(ListState::default()),
        }
    }

    /// Start from a different default ordering.
    pub fn with_ordering(self, ordering: Ordering) -> Self {
        lock(&self.state).filter.ordering = Some(ordering);
        self
    }

    /// Start from a prepared filter without loading.
    pub fn with_filter(self, filter: ContentFilter) -> Self {
        lock(&self.state).filter = filter;
        self
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn snapshot(&self) -> ListState {
        lock(&self.state).clone()
    }

    pub fn items(&self) -> Vec<ContentItem> {
        lock(&self.state).items.clone()
    }

    pub fn filter(&self) -> ContentFilter {
        lock(&self.state).filter.clone()
    }

    /// Query sent for `filter` under the server strategy.
    pub fn server_query(&self, filter: &ContentFilter) -> Query {
        match self.kind.pinned_type() {
            Some(pinned) => {
                let mut filter = filter.clone();
                filter.content_type = Some(pinned);
                filter.to_query()
            }
            None => filter.to_query(),
        }
    }

    /// Change one filter field and reload immediately.
    pub async fn set_filter(&self, change: FilterChange) -> Result<()> {
        lock(&self.state).filter.apply(change);
        self.load().await
    }

    /// Re-issue the current query, e.g. after a failed load.
    pub async fn retry(&self) -> Result<()> {
        self.load().await
    }

    /// Fetch the list for the current filter, replacing prior results.
    pub async fn load(&self) -> Result<()> {
        let (ticket, filter) = {
            let mut state = lock(&self.state);
            if state.disposed {
                return Ok(());
            }
            state.generation += 1;
            state.loading = true;
            (state.generation, state.filter.clone())
        };

        let result = match self.strategy {
            FilterStrategy::Server => self.backend.list_content(&self.server_query(&filter)).await,
            FilterStrategy::Local => self.load_local(&filter).await,
        };

        let mut state = lock(&self.state);
        if state.generation != ticket {
            debug!("Discarding superseded {:?} list load", self.kind);
            return Ok(());
        }
        state.loading = false;

        match result {
            Ok(items) => {
                debug!("{:?} list now shows {} items", self.kind, items.len());
                state.items = items;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Error loading {:?} list: {}", self.kind, e);
                state.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Fetch the unfiltered collection, then filter and order it here.
    async fn load_local(&self, filter: &ContentFilter) -> Result<Vec<ContentItem>> {
        let (items, platforms) = tokio::join!(self.fetch_unfiltered(), async {
            match filter.platform {
                Some(_) => self.backend.platforms().await,
                None => Ok(Vec::new()),
            }
        });
        let platforms = platforms?;

        let pinned = self.kind.pinned_type();
        let mut items: Vec<ContentItem> = items?
            .into_iter()
            .filter(|item| pinned.is_none_or(|t| item.content_type() == t))
            .filter(|item| filter.matches(item, &platforms))
            .collect();
        filter.sort(&mut items);
        Ok(items)
    }

    async fn fetch_unfiltered(&self) -> Result<Vec<ContentItem>> {
        match self.kind {
            ListKind::All => self.backend.list_content(&[]).await,
            ListKind::Movies => self.backend.list_movies().await,
            ListKind::Shows => self.backend.list_tv_shows().await,
        }
    }

    /// Stop applying results; outstanding requests still complete.
    pub fn dispose(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        state.disposed = true;
        state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentKind, Genre};

    fn item(title: &str, director: Option<&str>, status: Status) -> ContentItem {
        ContentItem {
            id: 1,
            title: title.to_string(),
            status,
            kind: ContentKind::Movie { runtime: None },
            director: director.map(str::to_string),
            description: None,
            release_date: None,
            genres: vec![Genre {
                id: 1,
                name: "Science Fiction".to_string(),
            }],
            platform: Some(2),
            platform_name: None,
            poster_url: None,
            tmdb_id: None,
            imdb_id: None,
            rating_value: None,
            review_text: None,
            progress_info: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_default_filter_only_sends_ordering() {
        let query = ContentFilter::default().to_query();
        assert_eq!(query, vec![("ordering", "-created_at".to_string())]);
    }

    #[test]
    fn test_query_contains_exactly_set_fields() {
        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Search("alien".into()));
        filter.apply(FilterChange::Status(Some(Status::Watching)));
        filter.apply(FilterChange::Ordering(None));

        assert_eq!(
            filter.to_query(),
            vec![
                ("search", "alien".to_string()),
                ("status", "watching".to_string()),
            ]
        );

        filter.apply(FilterChange::Platform(Some(3)));
        filter.apply(FilterChange::Genre("drama".into()));
        filter.apply(FilterChange::ContentType(Some(ContentType::TvShow)));
        let keys: Vec<&str> = filter.to_query().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["search", "status", "platform", "genre", "content_type"]);
    }

    #[test]
    fn test_blank_search_is_omitted() {
        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Search("   ".into()));
        assert!(filter.to_query().iter().all(|(k, _)| *k != "search"));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Genre("horror".into()));
        filter.apply(FilterChange::Reset);
        assert_eq!(filter, ContentFilter::default());
    }

    #[test]
    fn test_matches_title_or_director_case_insensitive() {
        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Search("SCOTT".into()));

        assert!(filter.matches(&item("Alien", Some("Ridley Scott"), Status::Completed), &[]));
        assert!(filter.matches(&item("Great Scott", None, Status::Completed), &[]));
        assert!(!filter.matches(&item("Heat", Some("Michael Mann"), Status::Completed), &[]));
    }

    #[test]
    fn test_matches_status_platform_and_genre() {
        let movie = item("Alien", None, Status::Wishlist);

        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Status(Some(Status::Wishlist)));
        filter.apply(FilterChange::Platform(Some(2)));
        filter.apply(FilterChange::Genre("fiction".into()));
        assert!(filter.matches(&movie, &[]));

        filter.apply(FilterChange::Platform(Some(9)));
        assert!(!filter.matches(&movie, &[]));

        filter.apply(FilterChange::Platform(None));
        filter.apply(FilterChange::ContentType(Some(ContentType::TvShow)));
        assert!(!filter.matches(&movie, &[]));
    }

    fn titles(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_platform_resolved_by_name_for_list_payloads() {
        // List responses name the platform but carry no platform id.
        let listed: ContentItem = serde_json::from_value(serde_json::json!({
            "id": 4,
            "title": "Heat",
            "director": "Michael Mann",
            "release_date": "1995-12-15",
            "genre": [{"id": 1, "name": "Crime"}],
            "platform_name": "Netflix",
            "status": "completed",
            "content_type": "movie",
            "poster_url": null,
            "rating_value": 9,
            "runtime": 170
        }))
        .unwrap();
        let platforms = vec![
            Platform {
                id: 1,
                name: "Netflix".to_string(),
                icon: None,
            },
            Platform {
                id: 2,
                name: "Hulu".to_string(),
                icon: None,
            },
        ];

        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Platform(Some(1)));
        assert!(filter.matches(&listed, &platforms));

        filter.apply(FilterChange::Platform(Some(2)));
        assert!(!filter.matches(&listed, &platforms));

        // An id the platform list doesn't know matches nothing.
        filter.apply(FilterChange::Platform(Some(7)));
        assert!(!filter.matches(&listed, &platforms));
    }

    #[test]
    fn test_sort_by_title_both_directions() {
        let mut items = vec![
            item("Zodiac", None, Status::Completed),
            item("alien", None, Status::Completed),
            item("Heat", None, Status::Completed),
        ];
        let mut filter = ContentFilter::default();

        filter.apply(FilterChange::Ordering(Some("title".parse().unwrap())));
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["alien", "Heat", "Zodiac"]);

        filter.apply(FilterChange::Ordering(Some("-title".parse().unwrap())));
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Zodiac", "Heat", "alien"]);
    }

    #[test]
    fn test_sort_by_release_date_puts_undated_last() {
        let dated = |title: &str, date: Option<&str>| {
            let mut it = item(title, None, Status::Completed);
            it.release_date = date.map(str::to_string);
            it
        };
        let mut items = vec![
            dated("Undated", None),
            dated("Heat", Some("1995-12-15")),
            dated("Alien", Some("1979-05-25")),
        ];
        let mut filter = ContentFilter::default();

        filter.apply(FilterChange::Ordering(Some("release_date".parse().unwrap())));
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Alien", "Heat", "Undated"]);

        filter.apply(FilterChange::Ordering(Some("-release_date".parse().unwrap())));
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Heat", "Alien", "Undated"]);
    }

    #[test]
    fn test_sort_by_timestamps_without_values_keeps_fetch_order() {
        let fetched = || {
            vec![
                item("Newest", None, Status::Completed),
                item("Oldest", None, Status::Completed),
            ]
        };
        let mut filter = ContentFilter::default();

        let mut items = fetched();
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Newest", "Oldest"]);

        filter.apply(FilterChange::Ordering(Some("created_at".parse().unwrap())));
        let mut items = fetched();
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Oldest", "Newest"]);

        filter.apply(FilterChange::Ordering(Some("-updated_at".parse().unwrap())));
        let mut items = fetched();
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Newest", "Oldest"]);
    }

    #[test]
    fn test_sort_by_timestamps_when_present() {
        let mut items = vec![
            item("Early", None, Status::Completed),
            item("Late", None, Status::Completed),
        ];
        items[0].updated_at = Some("2024-01-01T00:00:00Z".to_string());
        items[1].updated_at = Some("2024-06-01T00:00:00Z".to_string());

        let mut filter = ContentFilter::default();
        filter.apply(FilterChange::Ordering(Some("-updated_at".parse().unwrap())));
        filter.sort(&mut items);
        assert_eq!(titles(&items), vec!["Late", "Early"]);
    }

    #[test]
    fn test_pinned_types() {
        assert_eq!(ListKind::All.pinned_type(), None);
        assert_eq!(ListKind::Movies.pinned_type(), Some(ContentType::Movie));
        assert_eq!(ListKind::Shows.pinned_type(), Some(ContentType::TvShow));
    }
}
