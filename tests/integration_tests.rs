//! Integration tests for moviemate.
//!
//! These tests verify the integration between different modules
//! using wire-shaped sample data.

use moviemate::config::Config;
use moviemate::error::AppError;
use moviemate::types::{
    ContentItem, ContentKind, ContentType, ExternalRef, Listing, Ordering, Recommendation, Status,
};
use moviemate::views::{ContentFilter, FilterChange, FilterStrategy};
use serde_json::json;

/// Test that paginated and bare list responses decode to the same items.
#[test]
fn test_listing_shapes_decode_identically() {
    let items = json!([
        {"id": 1, "title": "Heat", "content_type": "movie", "status": "completed"},
        {"id": 2, "title": "Dark", "content_type": "tv_show", "status": "watching"}
    ]);
    let page = json!({"count": 2, "next": null, "previous": null, "results": items.clone()});

    let bare: Listing<ContentItem> = serde_json::from_value(items).unwrap();
    let paged: Listing<ContentItem> = serde_json::from_value(page).unwrap();

    assert_eq!(bare.into_items(), paged.into_items());
}

/// Test content display formatting for both kinds.
#[test]
fn test_content_display_integration() {
    let show: ContentItem = serde_json::from_value(json!({
        "id": 2,
        "title": "Dark",
        "content_type": "tv_show",
        "status": "watching",
        "release_date": "2017-12-01",
        "total_seasons": 3,
        "total_episodes": 26,
        "episodes_per_season": {"1": 10, "2": 8, "3": 8}
    }))
    .unwrap();

    assert!(show.is_tv_show());
    assert_eq!(show.to_display(), "#2 Dark (2017) [tv_show, watching]");
    match show.kind {
        ContentKind::TvShow {
            episodes_per_season,
            ..
        } => assert_eq!(episodes_per_season.get("2"), Some(&8)),
        ContentKind::Movie { .. } => panic!("expected a TV show"),
    }
}

/// Test that a mixed recommendation list splits into owned and suggested entries.
#[test]
fn test_recommendation_mix_decoding() {
    let recs: Vec<Recommendation> = serde_json::from_value(json!([
        {"id": 3, "title": "Alien", "content_type": "movie", "genre": ["Horror", "Sci-Fi"]},
        {"title": "Heat", "tmdb_id": 949, "content_type": "movie", "release_date": "1995-12-15"}
    ]))
    .unwrap();

    assert!(matches!(&recs[0], Recommendation::Owned(owned) if owned.genres.len() == 2));
    match &recs[1] {
        Recommendation::Suggested(title) => assert_eq!(title.external, ExternalRef::Tmdb(949)),
        other => panic!("expected a suggestion, got {:?}", other),
    }
    assert_eq!(recs[1].to_display(), "Heat (1995) [tmdb:949]");
}

/// Test status and content type parsing from user input.
#[test]
fn test_enum_parsing() {
    assert_eq!("Watching".parse::<Status>().unwrap(), Status::Watching);
    assert_eq!("tv".parse::<ContentType>().unwrap(), ContentType::TvShow);
    assert!(matches!(
        "binged".parse::<Status>(),
        Err(AppError::InvalidInput(_))
    ));
}

/// Test ordering round trips through its wire form.
#[test]
fn test_ordering_parsing() {
    let ordering: Ordering = "-release_date".parse().unwrap();
    assert!(ordering.descending);
    assert_eq!(ordering.to_string(), "-release_date");
    assert_eq!(Ordering::default().to_string(), "-created_at");
    assert!("popularity".parse::<Ordering>().is_err());
}

/// Test config defaults line up with the list filter defaults.
#[test]
fn test_config_defaults() {
    let config = Config::new();

    assert_eq!(config.base_url, "http://localhost:8000/api");
    assert_eq!(config.filter_strategy, FilterStrategy::Server);
    assert_eq!(Some(config.ordering), ContentFilter::default().ordering);
}

/// Test that filter edits map to query parameters.
#[test]
fn test_filter_query_integration() {
    let mut filter = ContentFilter::default();
    filter.apply(FilterChange::Genre("Drama".into()));
    filter.apply(FilterChange::ContentType(Some(ContentType::Movie)));
    filter.apply(FilterChange::Ordering(Some("title".parse().unwrap())));

    assert_eq!(
        filter.to_query(),
        vec![
            ("genre", "Drama".to_string()),
            ("content_type", "movie".to_string()),
            ("ordering", "title".to_string()),
        ]
    );
}

/// Test the user-facing error messages.
#[test]
fn test_error_user_messages() {
    let transient = AppError::Http {
        status: 503,
        message: "unavailable".into(),
    };
    let rejected = AppError::Http {
        status: 400,
        message: "bad".into(),
    };

    assert!(transient.is_retryable());
    assert!(!rejected.is_retryable());
    assert!(transient.user_message().contains("try again"));
    assert!(rejected.user_message().contains("check all fields"));
    assert_eq!(
        AppError::NotFound("content 9".into()).user_message(),
        "Content not found"
    );
}
