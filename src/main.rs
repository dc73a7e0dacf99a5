use anyhow::{Context, Result};
use campus_housing::api::{create_router, AppState};
use campus_housing::config::{Config, FetchMode, ScrapeConfig};
use campus_housing::scrapers::{BrowserFetcher, Catalog, DocumentFetcher, HttpFetcher};
use campus_housing::store::{ListingStore, PgListingStore};
use campus_housing::{refresh_catalog, refresh_one, ListingAssembler};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "campus-housing", about = "Student housing listing scraper and API")]
struct Cli {
    /// Override FETCH_MODE (http or browser)
    #[arg(long, global = true)]
    fetch: Option<FetchMode>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate, scrape if the database is empty, then serve the API
    Serve,
    /// Scrape the whole catalog, or a single listing, into the database
    Scrape {
        /// Refresh only this listing URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Scrape one listing and print it without saving
    Show { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,campus_housing=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Show { url } => show(&url, cli.fetch.unwrap_or(FetchMode::Http)).await,
        command => {
            let mut config = Config::from_env().context("Failed to load configuration")?;
            if let Some(mode) = cli.fetch {
                config.fetch_mode = mode;
            }
            match command {
                Command::Scrape { url } => scrape(config, url).await,
                _ => serve(config).await,
            }
        }
    }
}

fn build_assembler(mode: FetchMode, scrape: ScrapeConfig) -> Result<Arc<ListingAssembler>> {
    let fetcher: Arc<dyn DocumentFetcher> = match mode {
        FetchMode::Http => Arc::new(HttpFetcher::new(&scrape)?),
        FetchMode::Browser => Arc::new(BrowserFetcher::new(&scrape)?),
    };
    info!("Using the {} fetcher", fetcher.name());
    Ok(Arc::new(ListingAssembler::new(fetcher, Arc::new(scrape))?))
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::load(path),
        None => Ok(Catalog::binghamton_west()),
    }
}

async fn connect(config: &Config) -> Result<PgListingStore> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let site = Url::parse(&config.scrape.base_url).context("Invalid site base URL")?;
    let store = PgListingStore::new(pool, site.host_str().unwrap_or_default());
    store.migrate().await.context("Failed to run migrations")?;
    info!("Database ready");
    Ok(store)
}

async fn serve(config: Config) -> Result<()> {
    info!("🏠 Campus Housing - listing API");

    let store: Arc<dyn ListingStore> = Arc::new(connect(&config).await?);
    let catalog = Arc::new(load_catalog(&config)?);
    let assembler = build_assembler(config.fetch_mode, config.scrape.clone())?;

    if config.scrape_on_startup && store.count().await? == 0 {
        info!("No properties in database, running initial scrape...");
        let summary = refresh_catalog(&assembler, &catalog, store.as_ref()).await;
        info!("✅ Initial scrape saved {} properties", summary.saved);
    }

    let app = create_router(AppState {
        store,
        assembler,
        catalog,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", addr);
    info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn scrape(config: Config, url: Option<String>) -> Result<()> {
    let store = connect(&config).await?;
    let assembler = build_assembler(config.fetch_mode, config.scrape.clone())?;

    if let Some(url) = url {
        let (id, record) = refresh_one(&assembler, &store, &url).await?;
        println!("{}. {} ({})", id, record.title, record.price_display());
        return Ok(());
    }

    let catalog = load_catalog(&config)?;
    info!("Starting scrape of {} catalog listings...", catalog.len());
    let summary = refresh_catalog(&assembler, &catalog, &store).await;

    println!();
    println!("✅ Discovered {} listings, saved {}", summary.discovered, summary.saved);
    for property in store.list(&Default::default()).await?.into_properties() {
        println!("{}. {} ({})", property.id, property.title, property.price);
        if let Some(bedrooms) = property.bedrooms {
            println!("   {} bedrooms", bedrooms);
        }
        println!("   Amenities: {}", property.amenities.join(", "));
        println!("   URL: {}", property.url);
    }

    Ok(())
}

async fn show(url: &str, mode: FetchMode) -> Result<()> {
    let assembler = build_assembler(mode, ScrapeConfig::default())?;
    let record = assembler.assemble_one(url).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
