//! Jarvis - voice-driven assistant front end
//!
//! Opens websites by (fuzzy) name, turns speech into normalized text
//! commands, and speaks text back through a browser page.

use anyhow::Result;
use clap::{Parser, Subcommand};
use jarvis::asr::WyomingClient;
use jarvis::audio::{GateSettings, PhraseSource, WavSource};
use jarvis::config::Config;
use jarvis::error::JarvisError;
use jarvis::listener::{Listener, ListenerSettings, TurnOutcome};
use jarvis::session_log::SessionLog;
use jarvis::translate::GoogleTranslator;
use jarvis::tts;
use jarvis::web::{
    run_prompt_loop, Console, SiteProvider, StaticSites, SystemLauncher, WebSession, WebsiteResolver,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const GOODBYE: &str = "Exiting on user request (Ctrl+C). Bye!";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <config_dir>/jarvis/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open websites by name (interactive)
    Web,
    /// Transcribe speech into the session log
    Listen {
        /// Read phrases from a recorded 16-bit WAV file
        #[arg(long)]
        wav: Option<PathBuf>,
    },
    /// Speak text through the configured TTS engine
    Speak {
        /// Speak each argument as its own message
        #[arg(long)]
        each: bool,

        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Setup logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🤖 Jarvis v{} starting...", env!("CARGO_PKG_VERSION"));

    match args.command.unwrap_or(Command::Web) {
        Command::Web => run_web(&config).await,
        Command::Listen { wav } => run_listen(&config, wav).await,
        Command::Speak { each, text } => run_speak(&config, each, text).await,
    }
}

async fn run_web(config: &Config) -> Result<()> {
    let sites = match &config.websites_path {
        Some(path) => StaticSites::load(Path::new(path))?,
        None => StaticSites::builtin(),
    };
    info!("🌐 {} websites loaded", sites.len());

    let resolver = WebsiteResolver::with_limits(sites, config.min_score, config.max_results);
    let mut session = WebSession::new(
        resolver,
        SystemLauncher::new(),
        SessionLog::new(&config.log_path),
    );

    // stdin blocks; keep it off the runtime so Ctrl+C stays responsive
    let prompt = tokio::task::spawn_blocking(move || {
        let mut console = Console::stdio();
        run_prompt_loop(&mut console, &mut session)
    });

    tokio::select! {
        res = prompt => res?,
        _ = tokio::signal::ctrl_c() => {
            println!("\n{}", GOODBYE);
            // the blocking stdin read would otherwise hold the runtime open
            std::process::exit(0);
        }
    }
}

async fn run_listen(config: &Config, wav: Option<PathBuf>) -> Result<()> {
    let settings = GateSettings::from_config(config);
    let wav = wav.or_else(|| config.wav_input.as_ref().map(PathBuf::from));

    let source: Box<dyn PhraseSource> = match wav {
        Some(path) => Box::new(WavSource::open(&path, settings)?),
        None => open_microphone(config, settings).await?,
    };

    let transcriber = WyomingClient::new(&config.wyoming_host, config.wyoming_port);
    if !transcriber.health_check().await {
        warn!(
            "⚠️ Transcription service at {}:{} is not reachable; phrases will be missed",
            config.wyoming_host, config.wyoming_port
        );
    }

    let mut listener = Listener::new(
        source,
        Arc::new(transcriber),
        Arc::new(GoogleTranslator::new(&config.translate_url)),
        SessionLog::new(&config.log_path),
        ListenerSettings::from_config(config),
    );

    info!("✅ Listening... (Ctrl + C to stop)");
    tokio::select! {
        res = listener.run() => {
            let outcomes = res?;
            let written = outcomes
                .iter()
                .filter(|o| matches!(o, TurnOutcome::Persisted(_)))
                .count();
            info!("{} of {} phrases written to {}", written, outcomes.len(), config.log_path);
        }
        _ = tokio::signal::ctrl_c() => println!("\n{}", GOODBYE),
    }
    Ok(())
}

#[cfg(feature = "microphone")]
async fn open_microphone(config: &Config, settings: GateSettings) -> Result<Box<dyn PhraseSource>> {
    let source = jarvis::audio::microphone::MicrophoneSource::open(&config.mic_keywords, settings)
        .await
        .map_err(|e| JarvisError::Audio(format!("Microphone Error: {:#}", e)))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "microphone"))]
async fn open_microphone(_config: &Config, _settings: GateSettings) -> Result<Box<dyn PhraseSource>> {
    Err(JarvisError::Audio(
        "built without the `microphone` feature; pass --wav <file> or set wav_input".to_string(),
    )
    .into())
}

async fn run_speak(config: &Config, each: bool, text: Vec<String>) -> Result<()> {
    let engine = tts::create_engine(config).await?;

    let result = if each {
        tts::speak_messages(engine.as_ref(), &text).await;
        Ok(())
    } else {
        engine.speak(&text.join(" ")).await
    };

    engine.shutdown().await?;
    result
}
