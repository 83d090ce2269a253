//! Terminal observer for live redirect counts.
//!
//! Connects to a running server's `/ws/analytics/{code}` endpoint and prints
//! every message it receives until the server closes the connection or the
//! user presses Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! watch AbC123
//! watch AbC123 --url ws://shortener.internal:8000
//! watch AbC123 --current
//! watch ignored --create https://example.com/some/long/path
//! ```

use live_shortener::api::dto::analytics::AnalyticsResponse;
use live_shortener::api::dto::shorten::ShortenResponse;
use live_shortener::client::ApiClient;
use live_shortener::realtime::{AnalyticsUpdate, Heartbeat, InitialSnapshot, ObserverMessage};

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Watch redirect counts for a short link in real time.
#[derive(Parser)]
#[command(name = "watch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Short code to observe
    short_code: String,

    /// WebSocket base URL of the server
    #[arg(short, long, default_value = "ws://localhost:8000")]
    url: String,

    /// Shorten this URL first and watch the new code instead
    #[arg(long, value_name = "LONG_URL")]
    create: Option<String>,

    /// Print the current analytics before connecting
    #[arg(long)]
    current: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.url);
    let mut short_code = cli.short_code;

    if let Some(long_url) = &cli.create {
        println!("Creating short URL for: {}", long_url.cyan());
        let created = client
            .shorten(long_url)
            .await
            .context("Failed to create short URL")?;
        print_created(&created);
        short_code = created.short_code;
    }

    if cli.current {
        let analytics = client
            .analytics(&short_code)
            .await
            .with_context(|| format!("Failed to fetch analytics for {short_code}"))?;
        print_analytics(&analytics);
    }

    let endpoint = client.analytics_ws_url(&short_code);

    let (stream, _) = connect_async(&endpoint)
        .await
        .with_context(|| format!("Failed to connect to {endpoint}"))?;

    println!(
        "{} {} {}",
        "Watching".bold(),
        short_code.cyan().bold(),
        format!("({endpoint})").dimmed()
    );
    println!("{}", "Press Ctrl-C to stop.".dimmed());
    println!();

    let (_, mut read) = stream.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => print_message(&text),
                Some(Ok(Message::Close(_))) | None => {
                    println!("{}", "Connection closed by server".yellow());
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    println!("{} {}", "Connection error:".red().bold(), e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Stopped".dimmed());
                break;
            }
        }
    }

    Ok(())
}

fn print_message(text: &str) {
    match serde_json::from_str::<ObserverMessage>(text) {
        Ok(ObserverMessage::Snapshot(snapshot)) => print_snapshot(&snapshot),
        Ok(ObserverMessage::Update(update)) => print_update(&update),
        Ok(ObserverMessage::Heartbeat(heartbeat)) => print_heartbeat(&heartbeat),
        Err(_) => println!("{} {}", "?".yellow(), text),
    }
}

fn print_created(created: &ShortenResponse) {
    println!("{}", "Created short URL:".green().bold());
    println!("  Short code:    {}", created.short_code.bold());
    println!("  Shortened URL: {}", created.shortened_url);
    println!("  Original URL:  {}", created.original_url);
    println!();
}

fn print_analytics(analytics: &AnalyticsResponse) {
    println!("{}", "Current analytics:".bold());
    println!("  Short code:    {}", analytics.short_code);
    println!("  Original URL:  {}", analytics.original_url);
    println!(
        "  Redirects:     {}",
        analytics.redirect_count.to_string().bold()
    );
    println!(
        "  Created:       {}",
        analytics.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
}

fn print_snapshot(snapshot: &InitialSnapshot) {
    println!(
        "{} {} redirects so far (created {})",
        "●".blue(),
        snapshot.redirect_count.to_string().bold(),
        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

fn print_update(update: &AnalyticsUpdate) {
    println!(
        "{} {} {} redirects",
        update.timestamp.format("%H:%M:%S").to_string().dimmed(),
        "▲".green().bold(),
        update.redirect_count.to_string().green().bold()
    );
}

fn print_heartbeat(heartbeat: &Heartbeat) {
    println!(
        "{} {}",
        heartbeat.timestamp.format("%H:%M:%S").to_string().dimmed(),
        "heartbeat".dimmed()
    );
}
