//! ssr-selector: fetch an SSR subscription, probe every endpoint, and write the fastest one as
//! a proxy client configuration file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ssr_selector::{
    ClientConfig, ProbeOptions, ProgressCounter, SelectorError, TcpProber, fetch_feed,
    format_latency, parse_feed, select_fastest,
};

/// Select the lowest-latency endpoint from an SSR subscription feed
#[derive(Parser, Debug)]
#[command(name = "ssr-selector")]
#[command(about = "Select the lowest-latency endpoint from an SSR subscription feed")]
struct Args {
    /// Subscription feed URL
    url: String,

    /// Where to write the selected endpoint's configuration
    #[arg(short, long, default_value = "./shadowsocks.cfg")]
    output: PathBuf,

    /// Budget for each endpoint's probe sequence, in seconds
    #[arg(long, default_value = "3")]
    probe_timeout: u64,

    /// HTTP timeout for fetching the feed, in seconds
    #[arg(long, default_value = "60")]
    fetch_timeout: u64,

    /// Write indented JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "endpoint selection failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(args: &Args) -> ssr_selector::Result<()> {
    info!(url = %args.url, "fetching subscription feed");
    let payload = fetch_feed(&args.url, Duration::from_secs(args.fetch_timeout)).await?;

    let candidates = parse_feed(&payload)?;
    let progress = ProgressCounter::new(candidates.len());
    let options = ProbeOptions {
        timeout: Duration::from_secs(args.probe_timeout),
        ..ProbeOptions::default()
    };

    let ranking = select_fastest(candidates, &TcpProber, &progress, &options).await?;
    ranking.log_listing();

    let best = ranking.best()?;
    ClientConfig::from(best).write_to(&args.output, args.pretty)?;
    info!(
        server = %best.address,
        port = best.port,
        latency = %format_latency(best.latency),
        output = %args.output.display(),
        "selected endpoint written"
    );
    Ok(())
}

fn exit_code(err: &SelectorError) -> u8 {
    match err {
        SelectorError::FeedFetch(_) => 2,
        SelectorError::FeedDecode { .. } => 3,
        SelectorError::NoCandidates => 4,
        SelectorError::JsonError(_) | SelectorError::IoError(_) => 5,
        _ => 1,
    }
}
