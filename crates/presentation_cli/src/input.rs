//! Text sources for commands that narrate or split text

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::io::AsyncReadExt;

/// Where the text comes from; stdin when neither flag is given
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Read the text from a file
    #[arg(short, long, conflicts_with = "text")]
    pub input: Option<PathBuf>,

    /// Pass the text directly
    #[arg(short, long)]
    pub text: Option<String>,
}

impl InputArgs {
    /// Read the selected source to a string
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or holds only whitespace.
    pub async fn read(&self) -> Result<String> {
        let text = match (&self.text, &self.input) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("Failed to read text from stdin")?;
                text
            },
        };

        if text.trim().is_empty() {
            bail!("No text to narrate");
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn inline_text_wins() {
        let args = InputArgs {
            input: None,
            text: Some("Hello there.".to_string()),
        };
        assert_eq!(args.read().await.unwrap(), "Hello there.");
    }

    #[tokio::test]
    async fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "From a file.\n\nSecond paragraph.").unwrap();

        let args = InputArgs {
            input: Some(file.path().to_path_buf()),
            text: None,
        };
        assert_eq!(
            args.read().await.unwrap(),
            "From a file.\n\nSecond paragraph."
        );
    }

    #[tokio::test]
    async fn missing_file_names_path() {
        let args = InputArgs {
            input: Some(PathBuf::from("/nonexistent/story.txt")),
            text: None,
        };
        let err = args.read().await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/story.txt"));
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let args = InputArgs {
            input: None,
            text: Some(" \n\n ".to_string()),
        };
        assert!(args.read().await.is_err());
    }
}
