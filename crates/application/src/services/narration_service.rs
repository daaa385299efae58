//! Narration service - Turns long text into one continuous audio file
//!
//! This service orchestrates the complete narration flow:
//! 1. Split the text into fragments
//! 2. Synthesize each fragment in order (one call in flight)
//! 3. Decode every returned PCM payload
//! 4. Join the decoded segments with silence gaps
//! 5. Optionally encode the result as a WAV file

use std::{fmt, sync::Arc, time::Duration};

use bytes::Bytes;
use domain::{
    AssembledAudio, AudioAssembler, AudioSegment, DomainError, PcmDecoder, PcmFormat,
    PipelineState, Progress, TextFragment, VoiceName, WavEncoder,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::PipelineError,
    ports::{SpeechSynthesisPort, SynthesisResult},
    services::CancellationToken,
    text_segmenter::{DEFAULT_FRAGMENT_CHAR_LIMIT, TextSegmenter},
};

/// Characters of fragment text shown in skip warnings
const PREVIEW_CHARS: usize = 40;

/// Configuration for narration runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Maximum characters per synthesis request
    #[serde(default = "default_fragment_char_limit")]
    pub fragment_char_limit: usize,

    /// Silence inserted between consecutive fragments, in seconds
    #[serde(default = "default_silence_gap_secs")]
    pub silence_gap_secs: f64,

    /// Sample rate the speech service produces
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count the speech service produces
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Runs with more fragments than this pause between calls
    #[serde(default = "default_cooling_threshold")]
    pub cooling_threshold: usize,

    /// Pause between calls for long runs, in milliseconds
    #[serde(default = "default_cooling_delay_ms")]
    pub cooling_delay_ms: u64,
}

const fn default_fragment_char_limit() -> usize {
    DEFAULT_FRAGMENT_CHAR_LIMIT
}

const fn default_silence_gap_secs() -> f64 {
    0.4
}

const fn default_sample_rate() -> u32 {
    PcmFormat::DEFAULT_SAMPLE_RATE
}

const fn default_channels() -> u16 {
    1
}

const fn default_cooling_threshold() -> usize {
    5
}

const fn default_cooling_delay_ms() -> u64 {
    200
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            fragment_char_limit: default_fragment_char_limit(),
            silence_gap_secs: default_silence_gap_secs(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            cooling_threshold: default_cooling_threshold(),
            cooling_delay_ms: default_cooling_delay_ms(),
        }
    }
}

impl NarrationConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.fragment_char_limit == 0 {
            return Err("Fragment character limit must be greater than 0".to_string());
        }

        if !self.silence_gap_secs.is_finite() || self.silence_gap_secs < 0.0 {
            return Err(format!(
                "Silence gap must be a non-negative number of seconds, got {}",
                self.silence_gap_secs
            ));
        }

        self.pcm_format().map_err(|e| e.to_string())?;

        Ok(())
    }

    /// PCM layout of the audio the speech service returns
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPcmFormat` for a zero rate or channel count.
    pub fn pcm_format(&self) -> Result<PcmFormat, DomainError> {
        PcmFormat::new(self.sample_rate, self.channels)
    }

    /// Pause applied between synthesis calls in long runs
    #[must_use]
    pub const fn cooling_delay(&self) -> Duration {
        Duration::from_millis(self.cooling_delay_ms)
    }
}

/// Result of handling one fragment
#[derive(Debug)]
pub enum FragmentOutcome {
    /// Audio was returned and decoded
    Decoded(AudioSegment),
    /// The service returned no audio; the fragment is left out
    Skipped,
    /// The fragment failed and the run must stop
    Failed(PipelineError),
}

/// Counters describing a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NarrationSummary {
    /// Fragments the text was split into
    pub fragments_total: usize,
    /// Fragments that contributed audio
    pub fragments_decoded: usize,
    /// Fragments the service returned no audio for
    pub fragments_skipped: usize,
    /// Length of the assembled audio in seconds
    pub duration_secs: f64,
}

/// Assembled audio together with its WAV encoding
#[derive(Debug)]
pub struct NarrationOutput {
    /// The joined audio timeline
    pub audio: AssembledAudio,
    /// Canonical WAV file bytes
    pub wav: Bytes,
    /// Run counters
    pub summary: NarrationSummary,
}

/// Tracks the pipeline state of one run
struct RunState {
    state: PipelineState,
}

impl RunState {
    const fn new() -> Self {
        Self {
            state: PipelineState::Idle,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid pipeline transition {} -> {}",
            self.state,
            next
        );
        if self.state != next {
            debug!(from = %self.state, to = %next, "Pipeline state transition");
        }
        self.state = next;
        if next.is_terminal() {
            debug!(state = %next, "Pipeline run finished");
        }
    }

    fn abort(&mut self, err: PipelineError) -> PipelineError {
        let next = if err.is_cancelled() {
            PipelineState::Cancelled
        } else {
            PipelineState::Aborted
        };
        self.advance(next);
        err
    }
}

/// Service for long-form narration
pub struct NarrationService {
    speech: Arc<dyn SpeechSynthesisPort>,
    config: NarrationConfig,
    segmenter: TextSegmenter,
    decoder: PcmDecoder,
    assembler: AudioAssembler,
}

impl fmt::Debug for NarrationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NarrationService {
    /// Create a narration service with the default configuration
    ///
    /// # Errors
    ///
    /// Never fails for the default configuration; see [`Self::with_config`].
    pub fn new(speech: Arc<dyn SpeechSynthesisPort>) -> Result<Self, PipelineError> {
        Self::with_config(speech, NarrationConfig::default())
    }

    /// Create a narration service with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Segmentation` for a zero fragment limit and
    /// `PipelineError::Assembly` for an invalid PCM format.
    pub fn with_config(
        speech: Arc<dyn SpeechSynthesisPort>,
        config: NarrationConfig,
    ) -> Result<Self, PipelineError> {
        let segmenter =
            TextSegmenter::new(config.fragment_char_limit).map_err(PipelineError::Segmentation)?;
        let format = config
            .pcm_format()
            .map_err(|source| PipelineError::Assembly {
                index: None,
                source,
            })?;

        Ok(Self {
            speech,
            segmenter,
            decoder: PcmDecoder::new(format),
            assembler: AudioAssembler::new(format, config.silence_gap_secs),
            config,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub const fn config(&self) -> &NarrationConfig {
        &self.config
    }

    /// PCM layout expected from the speech service
    #[must_use]
    pub const fn format(&self) -> PcmFormat {
        self.decoder.format()
    }

    /// Split text the way a run would, without calling the service
    #[must_use]
    pub fn fragments(&self, text: &str) -> Vec<TextFragment> {
        self.segmenter.segment(text)
    }

    /// Check if the speech service is available
    pub async fn is_available(&self) -> bool {
        self.speech.is_available().await
    }

    /// Narrate `text` into one assembled audio buffer
    ///
    /// `on_progress` is called once per fragment, before its synthesis call.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if any fragment fails or no audio is produced.
    pub async fn run<F>(
        &self,
        text: &str,
        voice: VoiceName,
        on_progress: F,
    ) -> Result<AssembledAudio, PipelineError>
    where
        F: FnMut(Progress) + Send,
    {
        self.run_with_cancellation(text, voice, &CancellationToken::new(), on_progress)
            .await
    }

    /// Narrate `text`, stopping between fragments once `cancel` is tripped
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Cancelled` when cancelled, otherwise as [`Self::run`].
    pub async fn run_with_cancellation<F>(
        &self,
        text: &str,
        voice: VoiceName,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<AssembledAudio, PipelineError>
    where
        F: FnMut(Progress) + Send,
    {
        self.execute(text, voice, cancel, on_progress)
            .await
            .map(|(audio, _)| audio)
    }

    /// Narrate `text` and encode the result as a WAV file
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if the run fails or the audio does not fit a
    /// WAV container.
    pub async fn narrate_to_wav<F>(
        &self,
        text: &str,
        voice: VoiceName,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<NarrationOutput, PipelineError>
    where
        F: FnMut(Progress) + Send,
    {
        let (audio, summary) = self.execute(text, voice, cancel, on_progress).await?;

        let wav = WavEncoder::encode(&audio).map_err(|source| PipelineError::Assembly {
            index: None,
            source,
        })?;

        info!(
            wav_bytes = wav.len(),
            duration_secs = summary.duration_secs,
            "Narration encoded"
        );

        Ok(NarrationOutput {
            audio,
            wav,
            summary,
        })
    }

    #[instrument(skip(self, text, cancel, on_progress), fields(text_len = text.len(), voice = %voice))]
    async fn execute<F>(
        &self,
        text: &str,
        voice: VoiceName,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<(AssembledAudio, NarrationSummary), PipelineError>
    where
        F: FnMut(Progress) + Send,
    {
        let mut run = RunState::new();

        run.advance(PipelineState::Segmenting);
        let fragments = self.segmenter.segment(text);
        let total = fragments.len();

        if total == 0 {
            warn!("Text contains nothing to narrate");
            return Err(run.abort(PipelineError::EmptyResult { total }));
        }

        info!(fragments = total, "Starting narration");

        let cooling = total > self.config.cooling_threshold;
        let mut segments = Vec::with_capacity(total);
        let mut skipped = 0usize;

        for (position, fragment) in fragments.iter().enumerate() {
            if cooling && position > 0 {
                tokio::time::sleep(self.config.cooling_delay()).await;
            }

            if cancel.is_cancelled() {
                info!(completed = position, total, "Narration cancelled");
                return Err(run.abort(PipelineError::Cancelled {
                    completed: position,
                    total,
                }));
            }

            on_progress(Progress::new(fragment.index(), total));

            run.advance(PipelineState::Synthesizing);
            let response = self.speech.synthesize(fragment.text(), voice).await;

            match self.handle_response(fragment, response, &mut run) {
                FragmentOutcome::Decoded(segment) => segments.push(segment),
                FragmentOutcome::Skipped => {
                    skipped += 1;
                    warn!(
                        fragment = fragment.index(),
                        preview = %fragment.preview(PREVIEW_CHARS),
                        "Speech service returned no audio, skipping fragment"
                    );
                },
                FragmentOutcome::Failed(err) => {
                    error!(fragment = fragment.index(), error = %err, "Narration aborted");
                    return Err(run.abort(err));
                },
            }
        }

        if segments.is_empty() {
            warn!(total, "No fragment produced audio");
            return Err(run.abort(PipelineError::EmptyResult { total }));
        }

        run.advance(PipelineState::Assembling);
        let decoded = segments.len();
        let audio = match self.assembler.assemble(segments) {
            Ok(audio) => audio,
            Err(source) => {
                error!(error = %source, "Audio assembly failed");
                return Err(run.abort(PipelineError::Assembly {
                    index: None,
                    source,
                }));
            },
        };
        run.advance(PipelineState::Done);

        let summary = NarrationSummary {
            fragments_total: total,
            fragments_decoded: decoded,
            fragments_skipped: skipped,
            duration_secs: audio.duration_secs(),
        };

        info!(
            decoded,
            skipped,
            frames = audio.frame_count(),
            duration_secs = summary.duration_secs,
            "Narration complete"
        );

        Ok((audio, summary))
    }

    /// Classify one synthesis response
    fn handle_response(
        &self,
        fragment: &TextFragment,
        response: Result<SynthesisResult, crate::ApplicationError>,
        run: &mut RunState,
    ) -> FragmentOutcome {
        let index = fragment.index();

        let result = match response {
            Ok(result) => result,
            Err(source) => return FragmentOutcome::Failed(PipelineError::Service { index, source }),
        };

        if result.is_empty() {
            return FragmentOutcome::Skipped;
        }

        let expected = self.decoder.format();
        if let Some(rate) = result.sample_rate
            && rate != expected.sample_rate()
        {
            let source = match PcmFormat::new(rate, expected.channels()) {
                Ok(found) => DomainError::FormatMismatch { expected, found },
                Err(err) => err,
            };
            return FragmentOutcome::Failed(PipelineError::Assembly {
                index: Some(index),
                source,
            });
        }

        run.advance(PipelineState::Decoding);
        match self.decoder.decode(&result.audio_data) {
            Ok(segment) => {
                debug!(
                    fragment = index,
                    frames = segment.frame_count(),
                    "Decoded fragment audio"
                );
                FragmentOutcome::Decoded(segment)
            },
            Err(source) => FragmentOutcome::Failed(PipelineError::Decode { index, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::MockSpeechSynthesisPort;

    /// PCM for `frames` mono frames of a constant sample
    fn pcm(frames: usize, sample: i16) -> Vec<u8> {
        sample.to_le_bytes().repeat(frames)
    }

    fn ok_pcm(frames: usize) -> Result<SynthesisResult, ApplicationError> {
        Ok(SynthesisResult::new(pcm(frames, 1000), 24_000))
    }

    /// Replays scripted responses in order and records the texts it saw
    struct ScriptedSpeech {
        responses: Mutex<VecDeque<Result<SynthesisResult, ApplicationError>>>,
        calls: Mutex<Vec<(String, VoiceName)>>,
        cancel_after_call: Option<(usize, CancellationToken)>,
    }

    impl ScriptedSpeech {
        fn new(responses: Vec<Result<SynthesisResult, ApplicationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                cancel_after_call: None,
            }
        }

        fn cancelling_after(mut self, call: usize, token: CancellationToken) -> Self {
            self.cancel_after_call = Some((call, token));
            self
        }

        fn calls(&self) -> Vec<(String, VoiceName)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechSynthesisPort for ScriptedSpeech {
        async fn synthesize(
            &self,
            text: &str,
            voice: VoiceName,
        ) -> Result<SynthesisResult, ApplicationError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((text.to_string(), voice));
                calls.len()
            };
            if let Some((after, token)) = &self.cancel_after_call
                && call == *after
            {
                token.cancel();
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApplicationError::Internal("script exhausted".into())))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    /// One paragraph per fragment with a limit of 10
    const THREE_FRAGMENTS: &str = "First one.\n\nSecond.\n\nThird one.";

    fn small_config() -> NarrationConfig {
        NarrationConfig {
            fragment_char_limit: 10,
            ..Default::default()
        }
    }

    fn service(speech: Arc<dyn SpeechSynthesisPort>) -> NarrationService {
        NarrationService::with_config(speech, small_config()).unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn defaults() {
            let config = NarrationConfig::default();
            assert_eq!(config.fragment_char_limit, 1000);
            assert!((config.silence_gap_secs - 0.4).abs() < f64::EPSILON);
            assert_eq!(config.sample_rate, 24_000);
            assert_eq!(config.channels, 1);
            assert_eq!(config.cooling_threshold, 5);
            assert_eq!(config.cooling_delay(), Duration::from_millis(200));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn rejects_zero_limit() {
            let config = NarrationConfig {
                fragment_char_limit: 0,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn rejects_negative_or_nan_gap() {
            for gap in [-0.1, f64::NAN, f64::INFINITY] {
                let config = NarrationConfig {
                    silence_gap_secs: gap,
                    ..Default::default()
                };
                assert!(config.validate().is_err(), "gap {gap} accepted");
            }
        }

        #[test]
        fn rejects_zero_sample_rate() {
            let config = NarrationConfig {
                sample_rate: 0,
                ..Default::default()
            };
            assert!(config.validate().is_err());
            assert!(config.pcm_format().is_err());
        }

        #[test]
        fn service_rejects_zero_limit() {
            let config = NarrationConfig {
                fragment_char_limit: 0,
                ..Default::default()
            };
            let result =
                NarrationService::with_config(Arc::new(MockSpeechSynthesisPort::new()), config);
            assert!(matches!(
                result,
                Err(PipelineError::Segmentation(DomainError::InvalidFragmentLimit(0)))
            ));
        }

        #[test]
        fn service_rejects_zero_channels() {
            let config = NarrationConfig {
                channels: 0,
                ..Default::default()
            };
            let result =
                NarrationService::with_config(Arc::new(MockSpeechSynthesisPort::new()), config);
            assert!(matches!(
                result,
                Err(PipelineError::Assembly { index: None, .. })
            ));
        }
    }

    mod run {
        use super::*;

        #[tokio::test]
        async fn assembles_all_fragments_with_gaps() {
            let speech = Arc::new(ScriptedSpeech::new(vec![
                ok_pcm(100),
                ok_pcm(200),
                ok_pcm(300),
            ]));
            let service = service(speech.clone());

            let audio = service
                .run(THREE_FRAGMENTS, VoiceName::Puck, |_| {})
                .await
                .unwrap();

            // 0.4 s at 24 kHz = 9600 silence frames per gap
            assert_eq!(audio.segment_count(), 3);
            assert_eq!(audio.silence_frames(), 9600);
            assert_eq!(audio.frame_count(), 600 + 2 * 9600);

            let calls = speech.calls();
            assert_eq!(calls.len(), 3);
            assert_eq!(calls[0], ("First one.".to_string(), VoiceName::Puck));
            assert_eq!(calls[1].0, "Second.");
            assert_eq!(calls[2].0, "Third one.");
        }

        #[tokio::test]
        async fn progress_is_reported_before_each_call() {
            let speech = Arc::new(ScriptedSpeech::new(vec![
                ok_pcm(10),
                Ok(SynthesisResult::empty()),
                ok_pcm(10),
            ]));
            let service = service(speech);

            let mut reports = Vec::new();
            service
                .run(THREE_FRAGMENTS, VoiceName::Kore, |p| {
                    reports.push((p.current(), p.total()));
                })
                .await
                .unwrap();

            assert_eq!(reports, [(1, 3), (2, 3), (3, 3)]);
        }

        #[tokio::test]
        async fn service_failure_names_fragment() {
            let speech = Arc::new(ScriptedSpeech::new(vec![
                ok_pcm(10),
                Err(ApplicationError::RateLimited),
                ok_pcm(10),
            ]));
            let service = service(speech.clone());

            let err = service
                .run(THREE_FRAGMENTS, VoiceName::Kore, |_| {})
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                PipelineError::Service {
                    index: 2,
                    source: ApplicationError::RateLimited
                }
            ));
            // The third fragment is never requested
            assert_eq!(speech.calls().len(), 2);
        }

        #[tokio::test]
        async fn empty_payloads_are_skipped() {
            let speech = Arc::new(ScriptedSpeech::new(vec![
                Ok(SynthesisResult::empty()),
                ok_pcm(50),
                Ok(SynthesisResult::empty()),
            ]));
            let service = service(speech);

            let output = service
                .narrate_to_wav(
                    THREE_FRAGMENTS,
                    VoiceName::Kore,
                    &CancellationToken::new(),
                    |_| {},
                )
                .await
                .unwrap();

            assert_eq!(output.audio.segment_count(), 1);
            assert_eq!(output.audio.frame_count(), 50);
            assert_eq!(output.summary.fragments_total, 3);
            assert_eq!(output.summary.fragments_decoded, 1);
            assert_eq!(output.summary.fragments_skipped, 2);
        }

        #[tokio::test]
        async fn all_empty_payloads_is_empty_result() {
            let speech = Arc::new(ScriptedSpeech::new(vec![
                Ok(SynthesisResult::empty()),
                Ok(SynthesisResult::empty()),
                Ok(SynthesisResult::empty()),
            ]));
            let service = service(speech);

            let err = service
                .run(THREE_FRAGMENTS, VoiceName::Kore, |_| {})
                .await
                .unwrap_err();

            assert!(matches!(err, PipelineError::EmptyResult { total: 3 }));
        }

        #[tokio::test]
        async fn blank_text_never_calls_the_service() {
            let mut mock = MockSpeechSynthesisPort::new();
            mock.expect_synthesize().never();
            let service = NarrationService::new(Arc::new(mock)).unwrap();

            let mut progress_calls = 0;
            let err = service
                .run("  \n\n  ", VoiceName::Kore, |_| progress_calls += 1)
                .await
                .unwrap_err();

            assert!(matches!(err, PipelineError::EmptyResult { total: 0 }));
            assert_eq!(progress_calls, 0);
        }

        #[tokio::test]
        async fn malformed_pcm_is_decode_error() {
            let speech = Arc::new(ScriptedSpeech::new(vec![
                ok_pcm(10),
                Ok(SynthesisResult::new(vec![1, 2, 3], 24_000)),
            ]));
            let service = service(speech);

            let err = service
                .run(THREE_FRAGMENTS, VoiceName::Kore, |_| {})
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                PipelineError::Decode {
                    index: 2,
                    source: DomainError::MalformedPcm { byte_len: 3, .. }
                }
            ));
            assert_eq!(err.fragment_index(), Some(2));
        }

        #[tokio::test]
        async fn sample_rate_mismatch_is_assembly_error() {
            let speech = Arc::new(ScriptedSpeech::new(vec![Ok(SynthesisResult::new(
                pcm(10, 0),
                16_000,
            ))]));
            let service = service(speech);

            let err = service
                .run(THREE_FRAGMENTS, VoiceName::Kore, |_| {})
                .await
                .unwrap_err();

            match err {
                PipelineError::Assembly {
                    index: Some(1),
                    source: DomainError::FormatMismatch { expected, found },
                } => {
                    assert_eq!(expected.sample_rate(), 24_000);
                    assert_eq!(found.sample_rate(), 16_000);
                },
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn missing_sample_rate_uses_configured_format() {
            let mut mock = MockSpeechSynthesisPort::new();
            mock.expect_synthesize().times(1).returning(|_, _| {
                Ok(SynthesisResult {
                    audio_data: pcm(24, -1),
                    sample_rate: None,
                })
            });
            let service = NarrationService::new(Arc::new(mock)).unwrap();

            let audio = service
                .run("Hello there.", VoiceName::Zephyr, |_| {})
                .await
                .unwrap();

            assert_eq!(audio.frame_count(), 24);
            assert_eq!(audio.format(), PcmFormat::default());
        }

        #[tokio::test]
        async fn single_fragment_has_no_silence() {
            let mut mock = MockSpeechSynthesisPort::new();
            mock.expect_synthesize()
                .withf(|text, voice| text == "Hello there." && *voice == VoiceName::Fenrir)
                .times(1)
                .returning(|_, _| ok_pcm(480));
            let service = NarrationService::new(Arc::new(mock)).unwrap();

            let audio = service
                .run("Hello there.", VoiceName::Fenrir, |_| {})
                .await
                .unwrap();

            assert_eq!(audio.frame_count(), 480);
            assert_eq!(audio.silence_frames(), 0);
        }
    }

    mod cancellation {
        use super::*;

        #[tokio::test]
        async fn cancelled_before_start() {
            let mut mock = MockSpeechSynthesisPort::new();
            mock.expect_synthesize().never();
            let service = NarrationService::with_config(Arc::new(mock), small_config()).unwrap();

            let token = CancellationToken::new();
            token.cancel();

            let err = service
                .run_with_cancellation(THREE_FRAGMENTS, VoiceName::Kore, &token, |_| {})
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                PipelineError::Cancelled {
                    completed: 0,
                    total: 3
                }
            ));
        }

        #[tokio::test]
        async fn in_flight_call_finishes_then_run_stops() {
            let token = CancellationToken::new();
            let speech = Arc::new(
                ScriptedSpeech::new(vec![ok_pcm(10), ok_pcm(10), ok_pcm(10)])
                    .cancelling_after(1, token.clone()),
            );
            let service = service(speech.clone());

            let mut reports = Vec::new();
            let err = service
                .run_with_cancellation(THREE_FRAGMENTS, VoiceName::Kore, &token, |p| {
                    reports.push(p.current());
                })
                .await
                .unwrap_err();

            assert!(err.is_cancelled());
            assert!(matches!(
                err,
                PipelineError::Cancelled {
                    completed: 1,
                    total: 3
                }
            ));
            assert_eq!(speech.calls().len(), 1);
            assert_eq!(reports, [1]);
        }
    }

    mod state {
        use super::*;

        #[test]
        fn abort_ends_in_terminal_state() {
            let mut run = RunState::new();
            run.advance(PipelineState::Segmenting);
            run.advance(PipelineState::Synthesizing);
            assert!(!run.state.is_terminal());

            let err = run.abort(PipelineError::EmptyResult { total: 1 });

            assert_eq!(run.state, PipelineState::Aborted);
            assert!(run.state.is_terminal());
            assert!(!err.is_cancelled());
        }

        #[test]
        fn cancelled_abort_ends_cancelled() {
            let mut run = RunState::new();
            run.advance(PipelineState::Segmenting);

            run.abort(PipelineError::Cancelled {
                completed: 0,
                total: 2,
            });

            assert_eq!(run.state, PipelineState::Cancelled);
        }
    }

    mod cooling {
        use super::*;

        fn texts(count: usize) -> String {
            (1..=count)
                .map(|i| format!("Part {i}."))
                .collect::<Vec<_>>()
                .join("\n\n")
        }

        #[tokio::test(start_paused = true)]
        async fn long_runs_pause_between_calls() {
            let speech = Arc::new(ScriptedSpeech::new((0..6).map(|_| ok_pcm(1)).collect()));
            let service = service(speech);

            let started = Instant::now();
            service
                .run(&texts(6), VoiceName::Kore, |_| {})
                .await
                .unwrap();

            // Five pauses between six calls, none before the first
            let elapsed = started.elapsed();
            assert!(elapsed >= Duration::from_millis(5 * 200), "{elapsed:?}");
            assert!(elapsed < Duration::from_millis(6 * 200), "{elapsed:?}");
        }

        #[tokio::test(start_paused = true)]
        async fn short_runs_do_not_pause() {
            let speech = Arc::new(ScriptedSpeech::new((0..5).map(|_| ok_pcm(1)).collect()));
            let service = service(speech);

            let started = Instant::now();
            service
                .run(&texts(5), VoiceName::Kore, |_| {})
                .await
                .unwrap();

            assert!(started.elapsed() < Duration::from_millis(200));
        }
    }

    #[test]
    fn debug_hides_port() {
        let service = NarrationService::new(Arc::new(MockSpeechSynthesisPort::new())).unwrap();
        let debug = format!("{service:?}");
        assert!(debug.contains("NarrationService"));
        assert!(debug.contains("config"));
    }

    #[test]
    fn fragments_match_segmenter() {
        let service = service(Arc::new(MockSpeechSynthesisPort::new()));
        let fragments = service.fragments(THREE_FRAGMENTS);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[2].text(), "Third one.");
    }
}
