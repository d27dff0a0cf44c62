use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use storysync::api::{ApiError, StoryApi, StoryClient};
use storysync::config::{Config, ConfigError};
use storysync::connectivity::{Connectivity, Reachability, spawn_connectivity_probe};
use storysync::favorites::{Favorites, SortOrder, search_favorites, sort_favorites};
use storysync::models::{PayloadError, PhotoFile, StoryPayload};
use storysync::notice::{Notice, spawn_notice_sink};
use storysync::photo::{DEFAULT_PHOTO_NAME, guess_mime_type};
use storysync::store::{LocalStore, StoreError};
use storysync::submission::{SubmissionPolicy, SubmitError, SubmitOutcome};
use storysync::sync::foreground::run_foreground;
use storysync::sync::{DrainCoordinator, spawn_sync_trigger};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid story: {0}")]
    Payload(#[from] PayloadError),
    #[error("cannot read {path}: {source}")]
    ReadPhoto { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storysync", about = "Offline-first story submission and sync")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a story, queueing it when offline.
    Submit(SubmitArgs),
    /// Send every queued story now.
    Drain,
    Pending(PendingCommand),
    Favorites(FavoritesCommand),
    Stories(StoriesCommand),
    /// Run the background trigger and foreground sync loop until Ctrl-C.
    Watch,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[arg(long)]
    description: String,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    #[arg(long)]
    photo: PathBuf,
    #[arg(long, default_value_t = false, help = "Queue without trying the network")]
    offline: bool,
}

#[derive(Args, Debug)]
struct PendingCommand {
    #[command(subcommand)]
    command: PendingSubcommand,
}

#[derive(Subcommand, Debug)]
enum PendingSubcommand {
    List,
    Clear,
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List {
        #[arg(long, default_value = "newest", help = "newest, oldest, or name")]
        sort: String,
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        story_id: String,
    },
    Remove {
        story_id: String,
    },
    Toggle {
        story_id: String,
    },
}

#[derive(Args, Debug)]
struct StoriesCommand {
    #[command(subcommand)]
    command: StoriesSubcommand,
}

#[derive(Subcommand, Debug)]
enum StoriesSubcommand {
    List {
        #[arg(long, default_value_t = false)]
        location: bool,
    },
    Show {
        story_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Submit(args) => run_submit(&config, args).await,
        Command::Drain => run_drain(&config).await,
        Command::Pending(pending) => run_pending(&config, pending).await,
        Command::Favorites(favorites) => run_favorites(&config, favorites).await,
        Command::Stories(stories) => run_stories(&config, stories).await,
        Command::Watch => run_watch(&config).await,
    }
}

async fn open_store(config: &Config) -> Result<LocalStore, CliError> {
    let pool = storysync::db::init_pool(&config.db_url, config.db_max_connections).await?;
    Ok(LocalStore::new(pool))
}

fn open_client(config: &Config) -> Result<Arc<StoryClient>, CliError> {
    let token = config.api_token()?;
    Ok(Arc::new(StoryClient::new(&config.api_base_url, token, config.timeouts)?))
}

async fn run_submit(config: &Config, args: SubmitArgs) -> Result<(), CliError> {
    let bytes = tokio::fs::read(&args.photo)
        .await
        .map_err(|source| CliError::ReadPhoto { path: args.photo.clone(), source })?;
    let name = args
        .photo
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_PHOTO_NAME)
        .to_owned();
    let photo = PhotoFile { mime_type: guess_mime_type(&name).to_owned(), name, bytes };
    let payload = StoryPayload::new(args.description, args.lat, args.lon, photo)?;

    let store = open_store(config).await?;
    let client = open_client(config)?;
    let is_online = !args.offline && client.reachable().await;

    let (tx, mut rx) = mpsc::channel(config.notice_capacity);
    let api: Arc<dyn StoryApi> = client;
    let policy = SubmissionPolicy::new(store, api).with_notices(tx);
    let outcome = policy.submit(&payload, is_online).await;
    print_notices(&mut rx);

    match outcome? {
        SubmitOutcome::Submitted { message } => print_json(&json!({ "status": "submitted", "message": message })),
        SubmitOutcome::Queued { id } => print_json(&json!({ "status": "queued", "id": id })),
        SubmitOutcome::Rejected { message } => print_json(&json!({ "status": "rejected", "message": message })),
    }
}

async fn run_drain(config: &Config) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let api: Arc<dyn StoryApi> = open_client(config)?;
    let (tx, mut rx) = mpsc::channel(config.notice_capacity);
    let coordinator = DrainCoordinator::new(store, api).with_notices(tx);

    let summary = coordinator.drain().await;
    print_notices(&mut rx);
    print_json(&summary?)
}

async fn run_pending(config: &Config, pending: PendingCommand) -> Result<(), CliError> {
    let store = open_store(config).await?;
    match pending.command {
        PendingSubcommand::List => {
            let records: Vec<Value> = store
                .list_pending()
                .await?
                .into_iter()
                .map(|record| {
                    json!({
                        "id": record.id,
                        "description": record.description,
                        "lat": record.lat,
                        "lon": record.lon,
                        "photoName": record.photo_name,
                        "photoMimeType": record.photo_mime_type,
                        "enqueuedAt": record.enqueued_at,
                    })
                })
                .collect();
            print_json(&records)
        }
        PendingSubcommand::Clear => {
            let removed = store.clear_pending().await?;
            print_json(&json!({ "removed": removed }))
        }
    }
}

async fn run_favorites(config: &Config, favorites: FavoritesCommand) -> Result<(), CliError> {
    let service = Favorites::new(open_store(config).await?);
    match favorites.command {
        FavoritesSubcommand::List { sort, search } => {
            let order: SortOrder = sort.parse().unwrap_or_default();
            let mut items = service.list().await?;
            if let Some(query) = search {
                items = search_favorites(items, &query);
            }
            print_json(&sort_favorites(items, order))
        }
        FavoritesSubcommand::Add { story_id } => {
            let story = open_client(config)?.story_detail(&story_id).await?;
            print_json(&service.add(story).await?)
        }
        FavoritesSubcommand::Remove { story_id } => {
            service.remove(&story_id).await?;
            print_json(&json!({ "id": story_id, "favorite": false }))
        }
        FavoritesSubcommand::Toggle { story_id } => {
            let story = open_client(config)?.story_detail(&story_id).await?;
            let favorite = service.toggle(story).await?;
            print_json(&json!({ "id": story_id, "favorite": favorite }))
        }
    }
}

async fn run_stories(config: &Config, stories: StoriesCommand) -> Result<(), CliError> {
    let client = open_client(config)?;
    match stories.command {
        StoriesSubcommand::List { location } => print_json(&client.list_stories(location).await?),
        StoriesSubcommand::Show { story_id } => print_json(&client.story_detail(&story_id).await?),
    }
}

async fn run_watch(config: &Config) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let client = open_client(config)?;
    let connectivity = Connectivity::new(client.reachable().await);

    let trigger = spawn_sync_trigger(connectivity.subscribe());
    let probe = spawn_connectivity_probe(
        client.clone(),
        connectivity.clone(),
        Duration::from_millis(config.probe_interval_ms),
    );

    let (tx, rx) = mpsc::channel::<Notice>(config.notice_capacity);
    let printer = spawn_notice_sink(rx, |notice| println!("{}", notice.message()));

    let api: Arc<dyn StoryApi> = client;
    let coordinator = DrainCoordinator::new(store, api).with_notices(tx);
    if connectivity.is_online() {
        if let Err(e) = coordinator.drain().await {
            tracing::warn!(error = %e, "startup drain failed");
        }
    }

    tracing::info!(online = connectivity.is_online(), "watching for connectivity changes");
    run_foreground(coordinator, Some(trigger.subscribe()), connectivity.subscribe(), async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await;

    probe.abort();
    trigger.shutdown();
    // The coordinator held the last sender; the printer ends once the queue is flushed.
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "notice printer failed");
    }
    Ok(())
}

fn print_notices(rx: &mut mpsc::Receiver<Notice>) {
    while let Ok(notice) = rx.try_recv() {
        eprintln!("{}", notice.message());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
