//! Clearance CLI
//!
//! Runs the clearance API server, fetches clearance once, or measures how
//! well the cache coalesces concurrent callers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinSet;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clearance_acquire::FnAcquirer;
use clearance_api::{ApiConfig, ApiServer};
use clearance_cache::{CacheConfig, KeyedClearanceCache};
use clearance_core::types::{Clearance, RouteKey};

/// Clearance - keyed challenge-clearance cache
#[derive(Parser)]
#[command(name = "clearance")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3002")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Acquire clearance once with the configured helper and print it
    Get {
        /// Proxy URL (omit for a direct connection)
        #[arg(long, env = "PROXY_URL")]
        proxy: Option<String>,
        /// Acquire even if a valid clearance is cached
        #[arg(short, long)]
        force: bool,
        /// Print only the Cookie header
        #[arg(long)]
        header: bool,
    },

    /// Measure coalescing under concurrent load
    Bench {
        /// Concurrent callers per route
        #[arg(short, long, default_value = "100")]
        callers: usize,
        /// Number of distinct routes
        #[arg(short, long, default_value = "4")]
        routes: usize,
        /// Simulated acquisition time in milliseconds
        #[arg(short, long, default_value = "200")]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "clearance=debug,info"
    } else {
        "clearance=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Get { proxy, force, header } => cmd_get(proxy.as_deref(), force, header).await,
        Commands::Bench { callers, routes, delay_ms } => cmd_bench(callers, routes, delay_ms).await,
    }
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    let config = ApiConfig::from_env();

    println!("{}", "🚀 Starting clearance API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("   {} {}s", "Clearance TTL:".dimmed(), config.ttl_seconds);
    if config.acquirer_cmd.is_none() {
        println!(
            "   {} CLEARANCE_ACQUIRER_CMD is not set; acquisition is unavailable",
            "⚠️ ".yellow()
        );
    }
    println!("\n   Press Ctrl+C to stop.\n");

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    ApiServer::new(config).run(addr).await?;

    Ok(())
}

/// Acquire clearance once
async fn cmd_get(proxy: Option<&str>, force: bool, header: bool) -> Result<()> {
    let config = ApiConfig::from_env();
    let cache = KeyedClearanceCache::with_config(
        config.build_acquirer(),
        CacheConfig::with_ttl_seconds(config.ttl_seconds),
    );

    let route = RouteKey::from_proxy(proxy);
    eprintln!("{} {}", "🔓 Acquiring clearance for".cyan().bold(), route);

    let start = Instant::now();
    let clearance = cache
        .get(&route, force)
        .await
        .with_context(|| format!("Could not obtain clearance for {}", route))?;
    eprintln!("   {} {:?}", "✓ Acquired in".green(), start.elapsed());

    if header {
        println!("{}", clearance.cookie_header());
    } else {
        let output = serde_json::json!({
            "route": route,
            "values": clearance.values,
            "identity": clearance.identity,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

/// Run the coalescing benchmark
async fn cmd_bench(callers: usize, routes: usize, delay_ms: u64) -> Result<()> {
    anyhow::ensure!(callers > 0 && routes > 0, "callers and routes must be positive");

    let total = callers * routes;
    println!(
        "{} {} callers across {} routes",
        "📊 Benchmarking with".cyan().bold(),
        total,
        routes
    );

    let acquisitions = Arc::new(AtomicUsize::new(0));
    let counter = acquisitions.clone();
    let delay = Duration::from_millis(delay_ms);
    let acquirer = FnAcquirer::new(move |route: RouteKey| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            tokio::time::sleep(delay).await;
            debug!(%route, "Simulated acquisition finished");
            Ok(Clearance::new([("cf_clearance", format!("bench-{}", n))], "clearance-bench"))
        }
    });
    let cache = Arc::new(KeyedClearanceCache::new(Arc::new(acquirer)));

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    // Cold start: every caller arrives before any route is cached
    println!("\n{}", "1. Cold concurrent fetch...".dimmed());
    let start = Instant::now();
    let mut tasks = JoinSet::new();
    for i in 0..total {
        let cache = cache.clone();
        let route = RouteKey::from(format!("http://bench-proxy-{}:8080", i % routes).as_str());
        tasks.spawn(async move {
            let started = Instant::now();
            cache.get(&route, false).await.map(|_| started.elapsed())
        });
    }

    let mut latencies = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        latencies.push(joined??);
        pb.inc(1);
    }
    pb.finish();
    let cold_time = start.elapsed();
    let cold_acquisitions = acquisitions.load(Ordering::SeqCst);

    println!("   ✓ {} callers served in {:?}", total, cold_time);
    println!("   ✓ {} acquisitions", cold_acquisitions);

    // Warm: everything is a hit
    println!("\n{}", "2. Warm fetch...".dimmed());
    let start = Instant::now();
    for i in 0..total {
        let route = RouteKey::from(format!("http://bench-proxy-{}:8080", i % routes).as_str());
        cache.get(&route, false).await?;
    }
    let warm_time = start.elapsed();
    println!("   ✓ {} hits in {:?}", total, warm_time);

    latencies.sort();
    let p50 = latencies[latencies.len() / 2];
    let max = latencies[latencies.len() - 1];
    let stats = cache.stats();

    println!("\n{}", "📈 Results:".green().bold());
    println!("   Cold latency p50: {:?}, max: {:?}", p50, max);
    println!("   Warm time per call: {:.2}µs", warm_time.as_micros() as f64 / total as f64);
    println!("   Hits: {}, coalesced: {}", stats.hits, stats.coalesced);

    if cold_acquisitions == routes {
        println!("   {} One acquisition per route", "✅".green());
    } else {
        println!("   {} Expected {} acquisitions, saw {}", "❌".red(), routes, cold_acquisitions);
    }

    Ok(())
}
