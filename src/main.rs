//! Command-line front end for the study-session runtime.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Run one word search against the backend and print the session snapshot.
//! - Optionally narrate the top example through the configured synthesizer.

use anyhow::{Context, Result, anyhow};
use lingua_session::api::HttpApiClient;
use lingua_session::config::{AppConfig, load_config};
use lingua_session::narration::ProcessSpeechBackend;
use lingua_session::session::{SessionCommand, SessionView};
use std::env;
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str = "Usage: lingua-session <word> [source-lang] [target-lang] [corpus-lang] [--speak]";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    word: String,
    source: Option<String>,
    target: Option<String>,
    corpus: Option<String>,
    speak: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle).await {
        error!("{err:?}");
        std::process::exit(1);
    }
}

async fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let mut config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    apply_language_overrides(&mut config, &args);
    info!(
        api = %config.api_base_url,
        src = %config.source_language,
        tgt = %config.target_language,
        corpus = %config.corpus_language,
        level = %config.log_level,
        "Starting study session"
    );

    let api = HttpApiClient::from_config(&config).context("Failed to set up the API client")?;
    info!(base_url = %api.base_url(), "Using translation backend");
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let backend = ProcessSpeechBackend::new(config.narration_command.clone(), events_tx);
    let mut session = SessionView::from_config(api, backend, &config);

    if let Err(err) = session.load_languages().await {
        warn!("Continuing without the backend language list: {err}");
    }
    let result = session.submit_search(&args.word).await;
    print_snapshot(&session)?;
    if !result.is_done() {
        return Err(anyhow!(
            "Search failed: {}",
            result.error_message.unwrap_or_default()
        ));
    }

    if args.speak {
        if result.examples.as_ref().is_none_or(Vec::is_empty) {
            warn!("Nothing to narrate; the search returned no examples");
            return Ok(());
        }
        session
            .apply_command(SessionCommand::SpeakExample { index: 0 }, Instant::now())
            .context("Failed to start narration")?;
        while !session.narration_state().is_idle() {
            let Some(event) = events_rx.recv().await else {
                break;
            };
            session.handle_narration_event(event);
        }
        info!("Narration finished");
    }
    Ok(())
}

fn apply_language_overrides(config: &mut AppConfig, args: &CliArgs) {
    if let Some(source) = &args.source {
        config.source_language = source.clone();
    }
    if let Some(target) = &args.target {
        config.target_language = target.clone();
    }
    if let Some(corpus) = &args.corpus {
        config.corpus_language = corpus.clone();
    }
}

fn print_snapshot<A, B>(session: &SessionView<A, B>) -> Result<()>
where
    A: lingua_session::api::TranslationApi,
    B: lingua_session::narration::SpeechBackend,
{
    let json = serde_json::to_string_pretty(&session.snapshot())
        .context("Failed to serialize the session snapshot")?;
    println!("{json}");
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut speak = false;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--speak" => speak = true,
            "-h" | "--help" => return Err(anyhow!(USAGE)),
            flag if flag.starts_with("--") => {
                return Err(anyhow!("Unknown option {flag}\n{USAGE}"));
            }
            _ => positional.push(arg),
        }
    }
    if positional.len() > 4 {
        return Err(anyhow!(USAGE));
    }
    let mut positional = positional.into_iter();
    let word = positional.next().ok_or_else(|| anyhow!(USAGE))?;
    Ok(CliArgs {
        word,
        source: positional.next(),
        target: positional.next(),
        corpus: positional.next(),
        speak,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!("RUST_LOG is set; ignoring config log level");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
