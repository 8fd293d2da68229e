//! Main entry point for the moviemate CLI application.

use clap::{Parser, Subcommand};
use log::{debug, warn};
use moviemate::api::{ApiClient, Backend};
use moviemate::config::Config;
use moviemate::error::{AppError, Result};
use moviemate::prompt::{AssumeYes, StdinConfirm};
use moviemate::types::{
    ContentId, ContentType, ExternalSource, Ordering, PlatformId, Recommendation, Status,
};
use moviemate::views::{
    AddContentView, ContentDraft, ContentFilter, DeleteOutcome, DetailState, DetailView,
    ImportOutcome, ListKind, ListView, Notice, RecommendationsView, StatisticsView,
};
use std::sync::Arc;

/// Command-line arguments for the moviemate application.
#[derive(Parser, Debug)]
#[command(
    name = "moviemate",
    version,
    about = "Track the movies and TV shows you watch",
    long_about = "List, rate, review and import movies and TV shows stored on a MovieMate server."
)]
struct Cli {
    /// Root of the MovieMate API (overrides config)
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1, global = true)]
    log: u8,

    #[command(subcommand)]
    command: Command,
}

/// Filters shared by the list commands.
#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Substring of the title or director
    #[arg(short, long)]
    search: Option<String>,

    /// wishlist, watching, completed or paused
    #[arg(long)]
    status: Option<Status>,

    /// Platform id
    #[arg(long)]
    platform: Option<PlatformId>,

    /// Genre name
    #[arg(long)]
    genre: Option<String>,

    /// movie or tv_show
    #[arg(long = "type")]
    content_type: Option<ContentType>,

    /// Sort field, prefixed with '-' for descending (e.g. -release_date)
    #[arg(long, allow_hyphen_values = true)]
    ordering: Option<Ordering>,
}

impl FilterArgs {
    fn into_filter(self, default_ordering: Ordering) -> ContentFilter {
        ContentFilter {
            search: self.search.unwrap_or_default(),
            status: self.status,
            platform: self.platform,
            genre: self.genre.unwrap_or_default(),
            content_type: self.content_type,
            ordering: Some(self.ordering.unwrap_or(default_ordering)),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the whole collection
    List(FilterArgs),
    /// List movies
    Movies(FilterArgs),
    /// List TV shows
    Shows(FilterArgs),
    /// Show one item with its rating, review and progress
    Show { id: ContentId },
    /// Rate an item from 1 to 10
    Rate { id: ContentId, value: u8 },
    /// Write a review
    Review {
        id: ContentId,
        text: String,
        /// Private notes kept with the review
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Draft a review from notes
    GenerateReview { id: ContentId, notes: String },
    /// Mark an episode of a show as watched
    Watch {
        id: ContentId,
        season: u32,
        episode: u32,
    },
    /// Change the watch status of an item
    Status { id: ContentId, status: Status },
    /// Delete an item
    Delete {
        id: ContentId,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show recommendations
    Recommend,
    /// Import a recommendation by its number in `recommend`
    ImportRecommendation { number: usize },
    /// Search an external catalog
    Search {
        query: String,
        #[arg(long, default_value = "tmdb")]
        source: ExternalSource,
        #[arg(long = "type", default_value = "movie")]
        content_type: ContentType,
    },
    /// Search an external catalog and import one result by number
    Import {
        query: String,
        number: usize,
        #[arg(long, default_value = "tmdb")]
        source: ExternalSource,
        #[arg(long = "type", default_value = "movie")]
        content_type: ContentType,
        /// Initial status (defaults to the configured import status)
        #[arg(long)]
        status: Option<Status>,
    },
    /// Add an item by hand
    Add {
        title: String,
        #[arg(long = "type", default_value = "movie")]
        content_type: ContentType,
        #[arg(long, default_value = "")]
        director: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        release_date: String,
        /// Genre id, may be repeated
        #[arg(long = "genre")]
        genres: Vec<String>,
        /// Platform id
        #[arg(long, default_value = "")]
        platform: String,
        #[arg(long, default_value = "wishlist")]
        status: Status,
        #[arg(long, default_value = "")]
        poster_url: String,
        /// Runtime in minutes (movies)
        #[arg(long, default_value = "")]
        runtime: String,
        #[arg(long, default_value = "1")]
        seasons: String,
        #[arg(long, default_value = "0")]
        episodes: String,
    },
    /// Collection and watch-time statistics
    Stats,
    /// List genres, optionally creating one
    Genres {
        #[arg(long)]
        add: Option<String>,
    },
    /// List streaming platforms, optionally creating one
    Platforms {
        #[arg(long)]
        add: Option<String>,
    },
    /// Write a default config file
    Init,
}

fn print_notice(notice: Option<Notice>) {
    match notice {
        Some(Notice::Success(msg)) => println!("{}", msg),
        Some(Notice::Error(msg)) => eprintln!("{}", msg),
        None => {}
    }
}

fn print_detail(state: &DetailState) {
    let Some(item) = &state.content else {
        println!("Content not found");
        return;
    };

    println!("{}", item.to_display());
    if let Some(director) = &item.director {
        println!("Director: {}", director);
    }
    if !item.genres.is_empty() {
        let names: Vec<&str> = item.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres: {}", names.join(", "));
    }
    if let Some(platform) = &item.platform_name {
        println!("Platform: {}", platform);
    }
    if let Some(description) = &item.description {
        println!("\n{}\n", description);
    }

    match state.rating {
        0 => println!("Rating: not rated"),
        value => println!("Rating: {}/10", value),
    }
    if !state.review.is_empty() {
        println!("Review: {}", state.review);
    }
    if !state.notes.is_empty() {
        println!("Notes: {}", state.notes);
    }
    if let Some(progress) = &item.progress_info {
        match (progress.latest_season, progress.latest_episode) {
            (Some(season), Some(episode)) => println!(
                "Progress: {} episodes watched, last S{}E{}",
                progress.total_watched_episodes, season, episode
            ),
            _ => println!("Progress: {} episodes watched", progress.total_watched_episodes),
        }
    }
    if let Some(estimate) = &state.estimate {
        println!("{}", estimate.to_display());
    }
}

/// Load a detail view for `id`, ready for mutations.
async fn open_detail(client: &Arc<ApiClient>, id: ContentId) -> Result<DetailView<ApiClient>> {
    let view = DetailView::new(Arc::clone(client));
    view.load(id).await?;
    Ok(view)
}

async fn run_list(
    client: Arc<ApiClient>,
    config: &Config,
    kind: ListKind,
    args: FilterArgs,
) -> Result<()> {
    let view = ListView::new(client, kind, config.filter_strategy)
        .with_filter(args.into_filter(config.ordering));
    view.load().await?;

    let items = view.items();
    if items.is_empty() {
        println!("Nothing found.");
    }
    for item in items {
        println!("{}", item.to_display());
    }
    Ok(())
}

async fn run(command: Command, client: Arc<ApiClient>, config: &Config) -> Result<()> {
    match command {
        Command::List(args) => run_list(client, config, ListKind::All, args).await,
        Command::Movies(args) => run_list(client, config, ListKind::Movies, args).await,
        Command::Shows(args) => run_list(client, config, ListKind::Shows, args).await,
        Command::Show { id } => {
            let view = open_detail(&client, id).await?;
            print_detail(&view.snapshot());
            Ok(())
        }
        Command::Rate { id, value } => {
            let view = open_detail(&client, id).await?;
            let result = view.rate(value).await;
            print_notice(view.take_notice());
            result
        }
        Command::Review { id, text, notes } => {
            let view = open_detail(&client, id).await?;
            if text.trim().is_empty() {
                return Err(AppError::InvalidInput("Review text is empty".to_string()));
            }
            let result = view.save_review(&text, &notes).await;
            print_notice(view.take_notice());
            result
        }
        Command::GenerateReview { id, notes } => {
            let view = open_detail(&client, id).await?;
            let result = view.generate_review(&notes).await;
            print_notice(view.take_notice());
            println!("{}", result?);
            Ok(())
        }
        Command::Watch {
            id,
            season,
            episode,
        } => {
            let view = open_detail(&client, id).await?;
            let result = view.mark_episode(season, episode).await;
            print_notice(view.take_notice());
            result?;
            if let Some(estimate) = view.snapshot().estimate {
                println!("{}", estimate.to_display());
            }
            Ok(())
        }
        Command::Status { id, status } => {
            let view = open_detail(&client, id).await?;
            let result = view.set_status(status).await;
            print_notice(view.take_notice());
            result
        }
        Command::Delete { id, yes } => {
            let view = open_detail(&client, id).await?;
            let outcome = if yes {
                view.delete(&AssumeYes).await
            } else {
                view.delete(&StdinConfirm).await
            };
            print_notice(view.take_notice());
            if outcome? == DeleteOutcome::Cancelled {
                println!("Cancelled.");
            }
            Ok(())
        }
        Command::Recommend => {
            let view = RecommendationsView::new(client);
            view.load().await?;
            print_recommendations(&view.items());
            Ok(())
        }
        Command::ImportRecommendation { number } => {
            let view = RecommendationsView::new(Arc::clone(&client));
            view.load().await?;
            let result = view.import(number.saturating_sub(1)).await;
            print_notice(view.take_notice());
            match result? {
                ImportOutcome::Open(id) => {
                    let detail = open_detail(&client, id).await?;
                    print_detail(&detail.snapshot());
                }
                ImportOutcome::Refreshed => print_recommendations(&view.items()),
            }
            Ok(())
        }
        Command::Search {
            query,
            source,
            content_type,
        } => {
            let view = AddContentView::new(client);
            view.set_source(source);
            view.set_content_type(content_type);
            let result = view.search(&query).await;
            print_notice(view.take_notice());
            let results = result?;
            if results.is_empty() {
                println!("No results.");
            }
            for (i, title) in results.iter().enumerate() {
                println!("{:>3}. {}", i + 1, title.to_display());
            }
            Ok(())
        }
        Command::Import {
            query,
            number,
            source,
            content_type,
            status,
        } => {
            let view = AddContentView::new(client);
            view.set_source(source);
            view.set_content_type(content_type);
            view.search(&query).await?;
            let result = view
                .import(number.saturating_sub(1), status.unwrap_or(config.import_status))
                .await;
            print_notice(view.take_notice());
            match result {
                Ok(id) => {
                    println!("Added as #{}", id);
                    Ok(())
                }
                Err(e) => {
                    let draft = view.draft();
                    if !draft.title.is_empty() {
                        println!(
                            "Try: moviemate add {:?} --type {} --release-date {:?}",
                            draft.title, draft.content_type, draft.release_date
                        );
                    }
                    Err(e)
                }
            }
        }
        Command::Add {
            title,
            content_type,
            director,
            description,
            release_date,
            genres,
            platform,
            status,
            poster_url,
            runtime,
            seasons,
            episodes,
        } => {
            let view = AddContentView::new(client);
            let draft = ContentDraft {
                title,
                director,
                description,
                release_date,
                genre_ids: genres,
                platform,
                status,
                content_type,
                poster_url,
                runtime,
                total_seasons: seasons,
                total_episodes: episodes,
            };
            let result = view.submit(draft).await;
            print_notice(view.take_notice());
            println!("Added as #{}", result?);
            Ok(())
        }
        Command::Stats => {
            let view = StatisticsView::new(client);
            view.load().await?;
            let state = view.snapshot();
            if let Some(content) = state.content {
                println!(
                    "{} titles ({} movies, {} shows), average rating {:.1}",
                    content.total, content.movies, content.tv_shows, content.average_rating
                );
                for (status, count) in &content.status_counts {
                    println!("  {:<10} {}", status, count);
                }
            }
            if let Some(watch) = state.watch {
                println!(
                    "Watched {:.1}h this week, {:.1}h this month",
                    watch.weekly_hours, watch.monthly_hours
                );
            }
            Ok(())
        }
        Command::Genres { add } => {
            if let Some(name) = add {
                let genre = client.create_genre(&name).await?;
                println!("Created genre #{} {}", genre.id, genre.name);
            }
            for genre in client.genres().await? {
                println!("{:>4} {}", genre.id, genre.name);
            }
            Ok(())
        }
        Command::Platforms { add } => {
            if let Some(name) = add {
                let platform = client.create_platform(&name).await?;
                println!("Created platform #{} {}", platform.id, platform.name);
            }
            for platform in client.platforms().await? {
                println!("{:>4} {}", platform.id, platform.name);
            }
            Ok(())
        }
        Command::Init => {
            let path = Config::create_default_if_missing()?;
            println!("Config file: {}", path.display());
            Ok(())
        }
    }
}

fn print_recommendations(items: &[Recommendation]) {
    if items.is_empty() {
        println!("No recommendations yet. Rate a few titles first.");
    }
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, item.to_display());
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    // Load config
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let client = Arc::new(ApiClient::from_config(&config)?);
    debug!("Using API at {}", client.base_url());

    if let Err(e) = run(cli.command, client, &config).await {
        debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
