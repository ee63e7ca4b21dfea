//! Lenient parsing of model replies
//!
//! Models wrap JSON in code fences or prose and sometimes quote numbers.
//! The reply is narrowed to a JSON object first, then each field is read
//! with a default instead of failing the whole parse.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

use crate::analysis::{AudioAnalysis, VideoAnalysis};
use crate::grading::{round2, Grade};

pub const DEFAULT_SUGGESTION: &str = "No suggestions available";
pub const DEFAULT_RATING: Grade = Grade::C;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("No JSON object found in model reply")]
    NoJsonObject,
}

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").ok())
        .as_ref()
}

fn object_regex() -> Option<&'static Regex> {
    static OBJECT: OnceLock<Option<Regex>> = OnceLock::new();
    OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").ok()).as_ref()
}

/// Locate the JSON object in a reply
pub fn extract_json_object(reply: &str) -> Result<Map<String, Value>, ParseError> {
    let unfenced = fence_regex()
        .and_then(|re| re.captures(reply))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(reply)
        .trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(unfenced) {
        return Ok(map);
    }

    let span = object_regex()
        .and_then(|re| re.find(unfenced).or_else(|| re.find(reply)))
        .map(|m| m.as_str())
        .ok_or(ParseError::NoJsonObject)?;

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ParseError::NoJsonObject),
    }
}

/// Score in [0, 100] with two decimals; numbers and numeric strings accepted
fn score(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() {
        round2(raw.clamp(0.0, 100.0))
    } else {
        0.0
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes"),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        _ => false,
    }
}

/// Parse a presentation assessment
pub fn parse_video_reply(reply: &str) -> Result<VideoAnalysis, ParseError> {
    let object = extract_json_object(reply)?;

    let overall_rating = object
        .get("overall_rating")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Grade>().ok())
        .unwrap_or(DEFAULT_RATING);

    let questions = object
        .get("questions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(VideoAnalysis {
        expression: score(object.get("expression")),
        intonation: score(object.get("intonation")),
        posture: score(object.get("posture")),
        overall_rating,
        suggestion: text(object.get("suggestion")).unwrap_or_else(|| DEFAULT_SUGGESTION.to_string()),
        questions,
        is_fallback: false,
    })
}

/// Parse an answer assessment
pub fn parse_audio_reply(reply: &str) -> Result<AudioAnalysis, ParseError> {
    let object = extract_json_object(reply)?;

    Ok(AudioAnalysis {
        score: score(object.get("score")),
        suggestion: text(object.get("suggestion")).unwrap_or_else(|| DEFAULT_SUGGESTION.to_string()),
        is_relevant: flag(object.get("is_relevant")),
        is_fallback: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let reply = r#"{"expression": 82.5, "intonation": 70, "posture": 65.25,
            "overall_rating": "B", "suggestion": "Slow down.",
            "questions": ["Why?", "How?", "When?"]}"#;
        let analysis = parse_video_reply(reply).unwrap();

        assert_eq!(analysis.expression, 82.5);
        assert_eq!(analysis.intonation, 70.0);
        assert_eq!(analysis.posture, 65.25);
        assert_eq!(analysis.overall_rating, Grade::B);
        assert_eq!(analysis.suggestion, "Slow down.");
        assert_eq!(analysis.questions, vec!["Why?", "How?", "When?"]);
        assert!(!analysis.is_fallback);
    }

    #[test]
    fn test_fenced_json_with_numeric_strings() {
        let reply = "```json\n{\"expression\": \"88.123\", \"intonation\": \"loud\", \"posture\": 140}\n```";
        let analysis = parse_video_reply(reply).unwrap();

        assert_eq!(analysis.expression, 88.12);
        assert_eq!(analysis.intonation, 0.0);
        assert_eq!(analysis.posture, 100.0);
        assert_eq!(analysis.overall_rating, Grade::C);
        assert_eq!(analysis.suggestion, DEFAULT_SUGGESTION);
        assert!(analysis.questions.is_empty());
    }

    #[test]
    fn test_prose_wrapped_json() {
        let reply = "Here is my evaluation:\n{\"score\": 77, \"suggestion\": \"Give an example.\", \"is_relevant\": true}\nGood luck!";
        let analysis = parse_audio_reply(reply).unwrap();

        assert_eq!(analysis.score, 77.0);
        assert_eq!(analysis.suggestion, "Give an example.");
        assert!(analysis.is_relevant);
    }

    #[test]
    fn test_questions_filtered() {
        let reply = r#"{"questions": ["  First?  ", "", 42, null, "Second?"]}"#;
        let analysis = parse_video_reply(reply).unwrap();
        assert_eq!(analysis.questions, vec!["First?", "Second?"]);
    }

    #[test]
    fn test_rating_case_insensitive() {
        let analysis = parse_video_reply(r#"{"overall_rating": "s"}"#).unwrap();
        assert_eq!(analysis.overall_rating, Grade::S);

        let analysis = parse_video_reply(r#"{"overall_rating": "excellent"}"#).unwrap();
        assert_eq!(analysis.overall_rating, Grade::C);
    }

    #[test]
    fn test_relevance_flag_variants() {
        assert!(parse_audio_reply(r#"{"is_relevant": "true"}"#).unwrap().is_relevant);
        assert!(parse_audio_reply(r#"{"is_relevant": 1}"#).unwrap().is_relevant);
        assert!(!parse_audio_reply(r#"{"is_relevant": "no"}"#).unwrap().is_relevant);
        assert!(!parse_audio_reply(r#"{}"#).unwrap().is_relevant);
    }

    #[test]
    fn test_unparseable_reply() {
        assert_eq!(
            parse_video_reply("I cannot evaluate this video.").unwrap_err(),
            ParseError::NoJsonObject
        );
        assert!(parse_audio_reply("{not json}").is_err());
        assert!(parse_audio_reply("[1, 2, 3]").is_err());
    }
}
