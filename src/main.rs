//! seatwatch - Seat availability dashboard for your terminal and browser.
//!
//! Polls a seat availability backend, renders the summary and per-event
//! cards, and keeps them fresh on a timer with a manual retry.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::error;

mod cli;
mod client;
mod controller;
mod errors;
mod locale;
mod models;
mod output;
mod server;
mod view;

use cli::{Cli, Command};
use client::{ClientConfig, SeatsClient};
use controller::{ControllerConfig, SystemClock, ViewController};
use output::{Format, ViewSnapshot};
use view::{Document, ViewState};

/// Shortest refresh interval accepted from the command line.
const MIN_REFRESH_SECS: u64 = 30;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let client = ClientConfig {
        base_url: cli.base_url,
        timeout: Duration::from_secs(cli.timeout.max(1)),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;

    match cli.command {
        Command::Watch(args) => runtime.block_on(cmd_watch(args, &client)),
        Command::Once(args) => runtime.block_on(cmd_once(args, &client)),
        Command::Status(args) => runtime.block_on(cmd_status(args, &client)),
        Command::Ui(args) => runtime.block_on(cmd_ui(args, &client)),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Clamp a refresh interval to the supported minimum.
fn refresh_config(interval: u64) -> ControllerConfig {
    let secs = interval.max(MIN_REFRESH_SECS);
    if secs != interval {
        tracing::warn!("refresh interval clamped to minimum of {MIN_REFRESH_SECS} seconds");
    }
    ControllerConfig {
        refresh_interval: Duration::from_secs(secs),
    }
}

/// Build the one controller this process drives.
fn build_controller(client: &ClientConfig) -> Result<Arc<ViewController<SeatsClient>>> {
    let source = SeatsClient::new(client).context("failed to create seats client")?;
    let controller = ViewController::new(source, SystemClock, Document::host_page())
        .context("failed to bind view controller")?;
    Ok(Arc::new(controller))
}

/// Print the current document in `format`.
fn print_document(doc: &Document, controller: &ViewController<SeatsClient>, format: Format) -> Result<()> {
    let view = ViewSnapshot::capture(doc, &controller.regions());
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_view(&mut handle, &view, format)?;
    handle.flush()?;
    Ok(())
}

/// Execute the `watch` command - live dashboard until Ctrl+C.
async fn cmd_watch(args: cli::WatchArgs, client: &ClientConfig) -> Result<()> {
    let config = refresh_config(args.interval);
    let controller = build_controller(client)?;

    let updates = controller.subscribe();
    let refresh = controller.initialize(config.refresh_interval);

    let retry_controller = Arc::clone(&controller);
    let result = watch_loop(
        updates,
        spawn_stdin_reader(),
        server::shutdown_signal(),
        || {
            let controller = Arc::clone(&retry_controller);
            tokio::spawn(async move { controller.retry().await });
        },
        |doc| {
            if args.format == Format::Human {
                print!("{}", output::CLEAR);
                println!(
                    "\x1b[1m🎟 seatwatch\x1b[0m \x1b[2m| {} | every {}s | Enter: retry | Ctrl+C: quit\x1b[0m\n",
                    client.base_url,
                    config.refresh_interval.as_secs()
                );
            }
            print_document(doc, &controller, args.format)
        },
    )
    .await;

    refresh.cancel();
    result
}

/// Forward each line typed on stdin as a retry request.
///
/// The read blocks on a detached thread so shutdown never waits for input.
fn spawn_stdin_reader() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel(8);
    let spawned = std::thread::Builder::new()
        .name("stdin-retry".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if let Err(e) = line {
                    tracing::warn!("stdin closed: {}", e);
                    break;
                }
                if tx.blocking_send(()).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("failed to start stdin reader: {}", e);
    }
    rx
}

/// Render every document change and forward retries until `shutdown`
/// resolves or the controller goes away.
async fn watch_loop<F, R, D>(
    mut updates: watch::Receiver<Document>,
    mut retries: mpsc::Receiver<()>,
    shutdown: F,
    mut on_retry: R,
    mut on_change: D,
) -> Result<()>
where
    F: Future<Output = ()>,
    R: FnMut(),
    D: FnMut(&Document) -> Result<()>,
{
    let mut retries_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let doc = updates.borrow_and_update().clone();
                on_change(&doc)?;
            }
            retry = retries.recv(), if retries_open => {
                match retry {
                    Some(()) => on_retry(),
                    None => retries_open = false,
                }
            }
            () = &mut shutdown => break,
        }
    }
    Ok(())
}

/// Execute the `once` command - single load, print and exit.
async fn cmd_once(args: cli::OnceArgs, client: &ClientConfig) -> Result<()> {
    let controller = build_controller(client)?;
    controller.load_data().await;

    let doc = controller.snapshot();
    print_document(&doc, &controller, args.format)?;

    if controller.state() == Some(ViewState::Error) {
        let message = &doc.element(controller.regions().error_text).text;
        anyhow::bail!("failed to load seat data: {message}");
    }
    Ok(())
}

/// Execute the `status` command - backend cache status.
async fn cmd_status(args: cli::StatusArgs, client: &ClientConfig) -> Result<()> {
    let source = SeatsClient::new(client).context("failed to create seats client")?;
    let status = source
        .fetch_status()
        .await
        .context("failed to fetch backend status")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_status(&mut handle, &status, args.format)?;
    Ok(())
}

/// Execute the `ui` command - start web server.
async fn cmd_ui(args: cli::UiArgs, client: &ClientConfig) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        refresh_interval: refresh_config(args.interval).refresh_interval,
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🎟 seatwatch Web UI\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Backend: {}", client.base_url);
    println!("  Refresh: {}s", config.refresh_interval.as_secs());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    server::run_server(config, client).await
}
