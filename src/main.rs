//! LRU Cache Demo - exercises the cache engine from the command line
//!
//! Sets every KEY VALUE pair, reads them all back, then unsets them in
//! reverse order.

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_cache_engine::{CacheConfig, LruCache, Release};

/// Command line options. Unset options fall back to `LRU_CACHE_*` variables.
#[derive(Debug, Parser)]
#[command(name = "lru-cache-demo", about = "Exercise the LRU cache engine")]
struct Args {
    /// Number of hash buckets (minimum 128)
    #[arg(long)]
    buckets: Option<usize>,

    /// Maximum number of live entries
    #[arg(long)]
    max_entries: Option<usize>,

    /// Time-to-live in seconds
    #[arg(long)]
    ttl: Option<u64>,

    /// Print cache statistics as JSON before exiting
    #[arg(long)]
    stats: bool,

    /// KEY VALUE pairs
    #[arg(required = true, num_args = 2.., value_names = ["KEY", "VALUE"])]
    pairs: Vec<String>,
}

fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_cache_engine=info,lru_cache_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if args.pairs.len() % 2 != 0 {
        bail!("expected KEY VALUE pairs, got an odd number of arguments");
    }
    let pairs: Vec<(&str, &str)> = args
        .pairs
        .chunks_exact(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();
    println!("got {} key value pairs", pairs.len());

    let mut config = CacheConfig::from_env();
    if let Some(buckets) = args.buckets {
        config.buckets = buckets;
    }
    if let Some(ttl) = args.ttl {
        config.ttl = ttl;
    }
    config.max_entries = args.max_entries.or(config.max_entries);

    let cache: LruCache<String> = LruCache::builder()
        .config(config)
        .size_hook(String::len)
        .destroy_hook(drop)
        .build()
        .context("creating cache")?;

    for (key, value) in &pairs {
        if let Some(mru) = cache.read()?.most_recent_key() {
            info!(key = mru, "most recently used");
        }
        cache
            .set(key, value.to_string())
            .with_context(|| format!("set {}", key))?;
        println!("set: {} > {}", key, value);
    }

    for (key, _) in &pairs {
        match cache.get(key)? {
            Some(value) => println!("get: {} < {}", key, *value),
            None => println!("get: {}, unavailable", key),
        }
    }

    for (key, _) in pairs.iter().rev() {
        let mut guard = cache.write()?;
        if guard.contains(key) {
            guard.unset(key).with_context(|| format!("unset {}", key))?;
            println!("unset: {}", key);
            if let Some(mru) = guard.most_recent_key() {
                info!(key = mru, "most recently used");
            }
        }
    }

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&cache.stats()?)?);
    }

    cache.destroy(Release::Destroy).context("destroying cache")?;
    Ok(())
}
