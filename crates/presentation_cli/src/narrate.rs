//! The `narrate` command: text in, WAV file out

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use application::{
    CancellationToken, NarrationConfig, NarrationService, NarrationSummary, SpeechSynthesisPort,
};
use domain::VoiceName;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Flag overrides applied on top of the loaded narration settings
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    /// Fragment character limit
    pub limit: Option<usize>,
    /// Silence gap in seconds
    pub gap: Option<f64>,
}

impl Overrides {
    /// Apply the overrides to `base` and validate the result
    ///
    /// # Errors
    ///
    /// Returns an error if the combined settings are invalid.
    pub fn apply(self, base: &NarrationConfig) -> Result<NarrationConfig> {
        let mut config = base.clone();
        if let Some(limit) = self.limit {
            config.fragment_char_limit = limit;
        }
        if let Some(gap) = self.gap {
            config.silence_gap_secs = gap;
        }
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid narration settings: {e}"))?;
        Ok(config)
    }
}

/// Pick the voice from the flag, falling back to the configured default
///
/// # Errors
///
/// Returns an error if the chosen name is not in the catalog.
pub fn resolve_voice(flag: Option<&str>, configured: &str) -> Result<VoiceName> {
    let name = flag.unwrap_or(configured);
    name.parse()
        .with_context(|| format!("Choose one of: {}", voice_list()))
}

fn voice_list() -> String {
    VoiceName::ALL
        .iter()
        .map(VoiceName::id)
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a finished run wrote
#[derive(Debug)]
pub struct NarrationReport {
    /// Run counters
    pub summary: NarrationSummary,
    /// Size of the written file
    pub wav_bytes: usize,
    /// Where the file was written
    pub output: PathBuf,
}

/// Run the pipeline over `text` and write the WAV file to `output`
///
/// Nothing is written when the run fails or is cancelled.
///
/// # Errors
///
/// Returns the pipeline error, or an I/O error if the file cannot be written.
pub async fn narrate(
    speech: Arc<dyn SpeechSynthesisPort>,
    config: NarrationConfig,
    text: &str,
    voice: VoiceName,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<NarrationReport> {
    let service = NarrationService::with_config(speech, config)?;

    let result = service
        .narrate_to_wav(text, voice, cancel, |progress| {
            eprintln!("[{progress}] Synthesizing fragment");
        })
        .await?;

    tokio::fs::write(output, &result.wav)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(path = %output.display(), bytes = result.wav.len(), "Narration saved");

    Ok(NarrationReport {
        summary: result.summary,
        wav_bytes: result.wav.len(),
        output: output.to_path_buf(),
    })
}

/// Trip `token` on the first Ctrl-C
///
/// The run stops before its next fragment; a call already in flight finishes.
pub fn cancel_on_interrupt(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current fragment");
            eprintln!("Stopping after the current fragment...");
            token.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use application::{ApplicationError, PipelineError, SynthesisResult};
    use async_trait::async_trait;

    use super::*;

    /// Returns `frames` frames of silence per call and records the texts
    struct CountingSpeech {
        frames: usize,
        texts: Mutex<Vec<String>>,
    }

    impl CountingSpeech {
        fn new(frames: usize) -> Self {
            Self {
                frames,
                texts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesisPort for CountingSpeech {
        async fn synthesize(
            &self,
            text: &str,
            _voice: VoiceName,
        ) -> Result<SynthesisResult, ApplicationError> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(SynthesisResult::new(vec![0; self.frames * 2], 24_000))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn overrides_replace_configured_values() {
        let config = Overrides {
            limit: Some(200),
            gap: Some(0.0),
        }
        .apply(&NarrationConfig::default())
        .unwrap();

        assert_eq!(config.fragment_char_limit, 200);
        assert!(config.silence_gap_secs.abs() < f64::EPSILON);
        assert_eq!(config.sample_rate, 24_000);
    }

    #[test]
    fn empty_overrides_keep_config() {
        let base = NarrationConfig::default();
        assert_eq!(Overrides::default().apply(&base).unwrap(), base);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let base = NarrationConfig::default();
        assert!(
            Overrides {
                limit: Some(0),
                gap: None
            }
            .apply(&base)
            .is_err()
        );
        assert!(
            Overrides {
                limit: None,
                gap: Some(-1.0)
            }
            .apply(&base)
            .is_err()
        );
    }

    #[test]
    fn voice_flag_wins_over_config() {
        assert_eq!(resolve_voice(Some("puck"), "Kore").unwrap(), VoiceName::Puck);
        assert_eq!(resolve_voice(None, "Charon").unwrap(), VoiceName::Charon);
    }

    #[test]
    fn unknown_voice_lists_choices() {
        let err = resolve_voice(Some("Nova"), "Kore").unwrap_err();
        assert!(format!("{err:#}").contains("Kore, Puck, Charon, Fenrir, Zephyr"));
    }

    #[tokio::test]
    async fn writes_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("story.wav");
        let speech = Arc::new(CountingSpeech::new(240));
        let config = Overrides {
            limit: Some(20),
            gap: Some(0.01),
        }
        .apply(&NarrationConfig::default())
        .unwrap();

        let report = narrate(
            speech.clone(),
            config,
            "Once upon a time.\n\nThe end.",
            VoiceName::Kore,
            &output,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        // Two fragments of 240 frames and one 240-frame gap
        let written = std::fs::read(&output).unwrap();
        assert_eq!(written.len(), report.wav_bytes);
        assert_eq!(written.len(), 44 + 3 * 240 * 2);
        assert_eq!(&written[..4], b"RIFF");
        assert_eq!(report.summary.fragments_total, 2);
        assert_eq!(report.output, output);
        assert_eq!(
            *speech.texts.lock().unwrap(),
            ["Once upon a time.", "The end."]
        );
    }

    #[tokio::test]
    async fn cancelled_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("story.wav");
        let token = CancellationToken::new();
        token.cancel();

        let err = narrate(
            Arc::new(CountingSpeech::new(10)),
            NarrationConfig::default(),
            "Never spoken.",
            VoiceName::Kore,
            &output,
            &token,
        )
        .await
        .unwrap_err();

        assert!(
            err.downcast_ref::<PipelineError>()
                .is_some_and(PipelineError::is_cancelled)
        );
        assert!(!output.exists());
    }
}
