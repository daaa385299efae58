//! The `inspect` command: describe a narration file

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use domain::WavEncoder;

/// Format and length of a WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    /// File size in bytes
    pub file_bytes: usize,
    /// Frames per second
    pub sample_rate: u32,
    /// Interleaved channels
    pub channels: usize,
    /// Sample frames in the data chunk
    pub frames: usize,
    /// Playback length in seconds
    pub duration_secs: f64,
}

impl fmt::Display for WavInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size:        {} bytes", self.file_bytes)?;
        writeln!(f, "Encoding:    16-bit PCM")?;
        writeln!(f, "Sample rate: {} Hz", self.sample_rate)?;
        writeln!(f, "Channels:    {}", self.channels)?;
        writeln!(f, "Frames:      {}", self.frames)?;
        write!(f, "Duration:    {:.2} s", self.duration_secs)
    }
}

/// Read and parse the WAV file at `path`
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a canonical
/// 16-bit PCM WAV file.
pub async fn inspect(path: &Path) -> Result<WavInfo> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let audio = WavEncoder::decode(&bytes)
        .with_context(|| format!("{} is not a narration WAV file", path.display()))?;

    Ok(WavInfo {
        file_bytes: bytes.len(),
        sample_rate: audio.sample_rate(),
        channels: audio.channel_count(),
        frames: audio.frame_count(),
        duration_secs: audio.duration_secs(),
    })
}
