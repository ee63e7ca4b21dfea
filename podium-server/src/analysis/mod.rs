//! Remote media analysis
//!
//! # Pipeline
//!
//! upload file → poll until ACTIVE → generateContent with prompt → parse
//! reply leniently
//!
//! `MediaAnalyzer` implementations never fail. Any error along the way is
//! logged and replaced with a fixed fallback result, so callers always have
//! something to persist.

pub mod gemini;
pub mod parser;
mod prompts;

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::grading::{self, Grade};

pub use gemini::{GeminiClient, GeminiError};

pub const FALLBACK_VIDEO_SUGGESTION: &str =
    "Try to maintain eye contact and vary your pitch to keep the audience engaged.";

pub const FALLBACK_AUDIO_SUGGESTION: &str =
    "Answer the question directly and support your point with a concrete example.";

pub const FALLBACK_QUESTIONS: [&str; 3] = [
    "Could you elaborate on the data source used in slide 3?",
    "How does this solution scale with more users?",
    "What were the main challenges you faced during implementation?",
];

/// A stored media file handed to the analyzer
#[derive(Debug, Clone)]
pub struct MediaRef {
    pub path: PathBuf,
    pub mime_type: String,
}

impl MediaRef {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Assessment of a presentation video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAnalysis {
    pub expression: f64,
    pub intonation: f64,
    pub posture: f64,
    pub overall_rating: Grade,
    pub suggestion: String,
    pub questions: Vec<String>,
    pub is_fallback: bool,
}

impl VideoAnalysis {
    /// Result used when the remote analysis is unavailable
    pub fn fallback() -> Self {
        Self {
            expression: 0.0,
            intonation: 0.0,
            posture: 0.0,
            overall_rating: Grade::E,
            suggestion: FALLBACK_VIDEO_SUGGESTION.to_string(),
            questions: FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            is_fallback: true,
        }
    }

    /// Mean of the three sub-scores, two decimals
    pub fn video_score(&self) -> f64 {
        grading::video_score(self.expression, self.intonation, self.posture)
    }
}

/// Assessment of a recorded answer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAnalysis {
    pub score: f64,
    pub suggestion: String,
    pub is_relevant: bool,
    pub is_fallback: bool,
}

impl AudioAnalysis {
    pub fn fallback() -> Self {
        Self {
            score: 0.0,
            suggestion: FALLBACK_AUDIO_SUGGESTION.to_string(),
            is_relevant: false,
            is_fallback: true,
        }
    }
}

/// Analyzes stored media
///
/// Implementations must not fail: errors are absorbed into the fallback.
#[async_trait]
pub trait MediaAnalyzer: Send + Sync {
    async fn analyze_presentation(&self, media: &MediaRef) -> VideoAnalysis;

    async fn analyze_answer(&self, media: &MediaRef, question: &str) -> AudioAnalysis;
}

/// Analyzer used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct FallbackAnalyzer;

#[async_trait]
impl MediaAnalyzer for FallbackAnalyzer {
    async fn analyze_presentation(&self, _media: &MediaRef) -> VideoAnalysis {
        VideoAnalysis::fallback()
    }

    async fn analyze_answer(&self, _media: &MediaRef, _question: &str) -> AudioAnalysis {
        AudioAnalysis::fallback()
    }
}

/// Polling bounds for remote file processing
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            timeout: Duration::from_millis(300_000),
        }
    }
}

/// Analyzer backed by the Gemini API
pub struct GeminiAnalyzer {
    client: GeminiClient,
    poll: PollSettings,
}

impl GeminiAnalyzer {
    pub fn new(client: GeminiClient, poll: PollSettings) -> Self {
        Self { client, poll }
    }

    /// Upload, wait, prompt; the remote file is deleted afterwards
    async fn run_prompt(&self, media: &MediaRef, prompt: &str) -> Result<String, GeminiError> {
        let uploaded = self.client.upload_file(&media.path, &media.mime_type).await?;
        let name = uploaded.name.clone();

        let reply = match self
            .client
            .wait_until_active(uploaded, self.poll.interval, self.poll.timeout)
            .await
        {
            Ok(active) => self.client.generate_content(&active, prompt).await,
            Err(e) => Err(e),
        };

        if let Err(e) = self.client.delete_file(&name).await {
            warn!(file = %name, error = %e, "Failed to delete remote file");
        }

        reply
    }
}

#[async_trait]
impl MediaAnalyzer for GeminiAnalyzer {
    async fn analyze_presentation(&self, media: &MediaRef) -> VideoAnalysis {
        let reply = match self.run_prompt(media, prompts::VIDEO_PROMPT).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(path = %media.path.display(), error = %e, "Video analysis failed, using fallback");
                return VideoAnalysis::fallback();
            }
        };

        match parser::parse_video_reply(&reply) {
            Ok(mut analysis) => {
                if analysis.questions.is_empty() {
                    warn!("Model returned no questions, using generic ones");
                    analysis.questions = FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect();
                }
                info!(
                    expression = analysis.expression,
                    intonation = analysis.intonation,
                    posture = analysis.posture,
                    rating = %analysis.overall_rating,
                    "Video analysis complete"
                );
                analysis
            }
            Err(e) => {
                warn!(error = %e, "Unparseable video analysis reply, using fallback");
                VideoAnalysis::fallback()
            }
        }
    }

    async fn analyze_answer(&self, media: &MediaRef, question: &str) -> AudioAnalysis {
        let prompt = prompts::audio_prompt(question);
        let reply = match self.run_prompt(media, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(path = %media.path.display(), error = %e, "Audio analysis failed, using fallback");
                return AudioAnalysis::fallback();
            }
        };

        match parser::parse_audio_reply(&reply) {
            Ok(analysis) => {
                info!(score = analysis.score, is_relevant = analysis.is_relevant, "Audio analysis complete");
                analysis
            }
            Err(e) => {
                warn!(error = %e, "Unparseable audio analysis reply, using fallback");
                AudioAnalysis::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_fallback_is_zero_valued() {
        let fallback = VideoAnalysis::fallback();
        assert_eq!(fallback.video_score(), 0.0);
        assert_eq!(fallback.overall_rating, Grade::E);
        assert_eq!(fallback.questions.len(), 3);
        assert!(fallback.is_fallback);
    }

    #[tokio::test]
    async fn test_fallback_analyzer_never_calls_out() {
        let analyzer = FallbackAnalyzer;
        let media = MediaRef::new("/nonexistent/video.mp4", "video/mp4");

        assert_eq!(analyzer.analyze_presentation(&media).await, VideoAnalysis::fallback());
        assert_eq!(
            analyzer.analyze_answer(&media, "Why?").await,
            AudioAnalysis::fallback()
        );
    }

    #[tokio::test]
    async fn test_gemini_analyzer_missing_file_falls_back() {
        let client = GeminiClient::with_base_url("key", "model", "http://127.0.0.1:9").unwrap();
        let analyzer = GeminiAnalyzer::new(client, PollSettings::default());
        let media = MediaRef::new("/nonexistent/answer.mp3", "audio/mpeg");

        let analysis = analyzer.analyze_answer(&media, "Why?").await;
        assert!(analysis.is_fallback);
    }
}
