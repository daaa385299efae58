//! Narrator CLI
//!
//! Turns long text into a single spoken WAV file.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod input;
mod inspect;
mod narrate;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use application::{CancellationToken, PipelineError, SpeechSynthesisPort, TextSegmenter};
use clap::{Parser, Subcommand};
use domain::VoiceName;
use infrastructure::{AppConfig, SpeechAdapter, init_telemetry};

use crate::input::InputArgs;
use crate::narrate::Overrides;

/// Exit status after Ctrl-C, as shells report SIGINT
const EXIT_CANCELLED: u8 = 130;

/// Narrator CLI
#[derive(Parser)]
#[command(name = "narrator")]
#[command(author, version, about = "Long-form text to speech", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: narrator.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Narrate text into a WAV file
    ///
    /// Example: narrator narrate --input chapter1.txt --voice Charon -o chapter1.wav
    Narrate {
        #[command(flatten)]
        source: InputArgs,

        /// Voice to speak with (default from configuration)
        #[arg(long, env = "NARRATOR_VOICE")]
        voice: Option<String>,

        /// Output file
        #[arg(short, long, default_value = "narration.wav")]
        output: PathBuf,

        /// Maximum characters per synthesis request
        #[arg(short, long)]
        limit: Option<usize>,

        /// Silence between fragments in seconds
        #[arg(short, long)]
        gap: Option<f64>,
    },

    /// Show how text would be split, without calling the service
    Split {
        #[command(flatten)]
        source: InputArgs,

        /// Maximum characters per fragment
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List available voices
    Voices,

    /// Check that the speech service is reachable
    Check,

    /// Describe a WAV file written by `narrate`
    Inspect {
        /// File to inspect
        file: PathBuf,
    },
}

impl Commands {
    /// Whether the command reads the configuration sources
    const fn needs_config(&self) -> bool {
        matches!(self, Self::Narrate { .. } | Self::Split { .. } | Self::Check)
    }
}

/// Log filter for a `-v` count; `None` keeps the configured filter
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Exit status for a failed command
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(pipeline) if pipeline.is_cancelled() => EXIT_CANCELLED,
        _ => 1,
    }
}

/// Whether a failed command is worth running again unchanged
fn worth_retrying(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PipelineError>()
        .is_some_and(PipelineError::is_retryable)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err:#}");
            if worth_retrying(&err) {
                eprintln!("💡 The speech service may recover, try again in a moment");
            }
            ExitCode::from(exit_code(&err))
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = if cli.command.needs_config() {
        AppConfig::load_from(cli.config.as_deref())?
    } else {
        AppConfig::default()
    };

    let telemetry = match log_filter_from_verbosity(cli.verbose) {
        Some(filter) => config.telemetry.clone().with_log_filter(filter),
        None => config.telemetry.clone(),
    };
    init_telemetry(&telemetry).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Narrate {
            source,
            voice,
            output,
            limit,
            gap,
        } => {
            let text = source.read().await?;
            let voice = narrate::resolve_voice(voice.as_deref(), &config.speech.default_voice)?;
            let narration = Overrides { limit, gap }.apply(&config.narration)?;
            let speech: Arc<dyn SpeechSynthesisPort> =
                Arc::new(SpeechAdapter::new(config.speech)?);

            let cancel = CancellationToken::new();
            let watcher = narrate::cancel_on_interrupt(cancel.clone());
            let result =
                narrate::narrate(speech, narration, &text, voice, &output, &cancel).await;
            watcher.abort();

            let report = result?;
            let summary = report.summary;
            println!("✅ Saved {}", report.output.display());
            println!(
                "   Fragments: {} ({} skipped)",
                summary.fragments_total, summary.fragments_skipped
            );
            println!("   Duration:  {:.1} s", summary.duration_secs);
            println!("   Size:      {} bytes", report.wav_bytes);
        },

        Commands::Split { source, limit } => {
            let text = source.read().await?;
            let limit = limit.unwrap_or(config.narration.fragment_char_limit);
            let segmenter = TextSegmenter::new(limit)?;

            let fragments = segmenter.segment(&text);
            for fragment in &fragments {
                println!("#{} ({} chars)", fragment.index(), fragment.char_len());
                println!("{}", fragment.text());
                println!();
            }
            println!("{} fragment(s) at {limit} characters", fragments.len());
        },

        Commands::Voices => {
            for voice in VoiceName::ALL {
                let marker = if voice == VoiceName::default() {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "{:<8} {:<7} {}{marker}",
                    voice.id(),
                    voice.gender().to_string(),
                    voice.description()
                );
            }
        },

        Commands::Check => {
            let adapter = SpeechAdapter::new(config.speech)?;
            println!("🔎 Checking {} ...", adapter.model_name());

            if !adapter.is_available().await {
                bail!("Speech service is not reachable");
            }
            println!("✅ Speech service is reachable");
        },

        Commands::Inspect { file } => {
            let info = inspect::inspect(&file).await?;
            println!("{}", file.display());
            println!("{info}");
        },
    }

    Ok(())
}
