use anyhow::Context;
use clap::Parser;
use contextual_news::{load_config, NewsConfig, NewsService, UserProfile};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch, score and print contextual news for one profile.
#[derive(Debug, Parser)]
#[command(name = "contextual-news", version)]
struct Args {
    #[arg(long, default_value = "teacher")]
    profession: String,

    #[arg(long, default_value = "India")]
    location: String,

    /// May be repeated.
    #[arg(long = "interest")]
    interests: Vec<String>,

    #[arg(long, default_value_t = 20)]
    limit: usize,

    #[arg(long)]
    force_refresh: bool,

    /// TOML config file. Falls back to $NEWS_CONFIG, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print source health instead of news.
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| env::var_os("NEWS_CONFIG").map(PathBuf::from));
    let config = match &config_path {
        Some(path) => load_config(path),
        None => NewsConfig::default(),
    };

    let service = NewsService::new(config).await.context("failed to build news service")?;

    let profile = UserProfile::new(&args.profession, &args.location).with_interests(args.interests.clone());
    let payload = service
        .get_contextual_news(&profile, args.limit, args.force_refresh)
        .await
        .context("failed to get news")?;

    if args.health {
        let report = service.get_source_health().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            "{} articles from {} sources ({} raw)",
            payload.metadata.total_articles, payload.metadata.sources_used, payload.metadata.raw_articles_fetched
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}
