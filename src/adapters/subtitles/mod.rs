// Subtitle adapter - placeholder source until speech-to-text is wired in

use std::path::Path;

use async_trait::async_trait;

use crate::domain::model::Subtitle;
use crate::ports::SubtitlePort;

pub const PLACEHOLDER_TEXT: &str = "AI-generated subtitle";

/// Yields a single caption over the first three seconds
pub struct PlaceholderSubtitles;

#[async_trait]
impl SubtitlePort for PlaceholderSubtitles {
    async fn subtitles(&self, _video: &Path, target_duration: f64) -> Vec<Subtitle> {
        let end = target_duration.min(3.0);
        if end <= 0.0 {
            return Vec::new();
        }
        vec![Subtitle {
            text: PLACEHOLDER_TEXT.to_string(),
            start: 0.0,
            end,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_window() {
        let subs = PlaceholderSubtitles.subtitles(Path::new("a.mp4"), 2.0).await;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].end, 2.0);

        let subs = PlaceholderSubtitles.subtitles(Path::new("a.mp4"), 30.0).await;
        assert_eq!(subs[0].end, 3.0);
    }
}
