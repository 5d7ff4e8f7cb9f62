pub mod audio;
pub mod cli;
pub mod commands;
pub mod engine;
pub mod lessons;
pub mod persistence;
pub mod shell;
pub mod speech;
pub mod state;
pub mod viewer;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use engine::gemini_tts::GeminiTtsEngine;
use lessons::{catalog, Lesson};
use speech::SpeechClient;
use state::{AppState, Settings};
use viewer::LessonViewer;

/// Extra time given to the device to drain its buffer before a one-shot
/// `speak` exits.
const DRAIN_GRACE: Duration = Duration::from_millis(300);

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Fluent English v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = match &cli.config {
        Some(path) => path.clone(),
        None => persistence::settings_path()?,
    };

    if let Some(Command::InitConfig { force }) = &cli.command {
        return init_config(&settings_path, *force);
    }

    let settings = persistence::load_settings(&settings_path);

    let lessons = match &cli.lessons {
        Some(path) => catalog::load_from_file(path)?,
        None => catalog::load_builtin()?,
    };
    tracing::info!("Loaded {} lessons", lessons.len());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(run_async(cli, settings, lessons))
}

async fn run_async(cli: Cli, settings: Settings, lessons: Vec<Lesson>) -> Result<()> {
    let mut viewer = LessonViewer::new(lessons)?;
    if let Some(id) = cli.lesson.or(settings.general.start_lesson) {
        if let Err(e) = viewer.go_to(id) {
            tracing::warn!("Cannot open lesson {}: {}. Starting at the first lesson.", id, e);
        }
    }

    if matches!(cli.command, Some(Command::Lessons)) {
        for lesson in viewer.lessons() {
            println!("{:>3}  {}", lesson.id, lesson.subtitle);
        }
        return Ok(());
    }

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("API_KEY").ok());
    if api_key.is_none() {
        tracing::warn!("No API key set, speech will be unavailable (set GEMINI_API_KEY)");
    }

    let speech = Arc::new(build_speech_client(&settings, api_key)?);

    match cli.command {
        Some(Command::Speak { text }) => speak_once(&speech, &text).await,
        Some(Command::Export { text, out }) => export_once(&speech, &text, &out).await,
        Some(Command::Lessons) | Some(Command::InitConfig { .. }) => Ok(()),
        None => {
            let state = Arc::new(AppState::new(viewer, speech, settings));
            shell::run_shell(state).await
        }
    }
}

pub fn build_speech_client(settings: &Settings, api_key: Option<String>) -> Result<SpeechClient> {
    let engine = GeminiTtsEngine::new(
        &settings.speech.base_url,
        api_key,
        settings.speech.voice_options(),
        settings.speech.request_timeout(),
    )
    .context("Failed to create speech synthesis client")?;

    Ok(SpeechClient::new(Arc::new(engine), Arc::new(audio::CpalAudioHost))
        .with_retry(settings.speech.retry_policy())
        .with_sample_rate(settings.speech.sample_rate))
}

async fn speak_once(speech: &SpeechClient, text: &str) -> Result<()> {
    match speech.try_speak(text).await? {
        Some(playback) => {
            println!("Speaking: {}", playback.text);
            tokio::time::sleep(playback.duration + DRAIN_GRACE).await;
            Ok(())
        }
        None => anyhow::bail!("Nothing to speak in {:?}", text),
    }
}

async fn export_once(speech: &SpeechClient, text: &str, out: &Path) -> Result<()> {
    let buffer = speech
        .synthesize(text)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Nothing to speak in {:?}", text))?;
    audio::export::write_wav(&buffer, out)?;
    println!("Wrote {} ({:.2}s)", out.display(), buffer.duration().as_secs_f64());
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    persistence::save_settings(path, &Settings::default())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
