//! Score aggregation and letter grades
//!
//! The final score is a fixed weighted average of the video score and the
//! mean answer score, mapped to a letter through static thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const VIDEO_WEIGHT: f64 = 0.6;
pub const AUDIO_WEIGHT: f64 = 0.4;

/// Letter grade, best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Grade for a 0-100 score: ≥90 S, ≥80 A, ≥70 B, ≥60 C, ≥50 D, else E
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::S
        } else if score >= 80.0 {
            Grade::A
        } else if score >= 70.0 {
            Grade::B
        } else if score >= 60.0 {
            Grade::C
        } else if score >= 50.0 {
            Grade::D
        } else {
            Grade::E
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Grade::S),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "E" => Ok(Grade::E),
            other => Err(format!("Unknown grade: {}", other)),
        }
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of `scores`, 0 for an empty slice
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Video score from the three sub-scores
pub fn video_score(expression: f64, intonation: f64, posture: f64) -> f64 {
    round2(mean(&[expression, intonation, posture]))
}

/// Result of combining video and audio scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalGrade {
    /// Mean answer score, two decimals
    pub audio_score: f64,
    /// Rounded weighted score
    pub overall_score: i64,
    pub grade: Grade,
}

/// Combine the video score with every answer score of a presentation
///
/// No answers counts as an audio score of 0. The grade is taken from the
/// unrounded weighted score.
pub fn final_grade(video_score: f64, answer_scores: &[f64]) -> FinalGrade {
    let audio_score = mean(answer_scores);
    let weighted = video_score * VIDEO_WEIGHT + audio_score * AUDIO_WEIGHT;

    FinalGrade {
        audio_score: round2(audio_score),
        overall_score: weighted.round() as i64,
        grade: Grade::from_score(weighted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_score(100.0), Grade::S);
        assert_eq!(Grade::from_score(90.0), Grade::S);
        assert_eq!(Grade::from_score(89.99), Grade::A);
        assert_eq!(Grade::from_score(80.0), Grade::A);
        assert_eq!(Grade::from_score(70.0), Grade::B);
        assert_eq!(Grade::from_score(60.0), Grade::C);
        assert_eq!(Grade::from_score(50.0), Grade::D);
        assert_eq!(Grade::from_score(49.99), Grade::E);
        assert_eq!(Grade::from_score(0.0), Grade::E);
    }

    #[test]
    fn test_grade_parse_is_lenient_about_case() {
        assert_eq!(" a ".parse::<Grade>(), Ok(Grade::A));
        assert_eq!("s".parse::<Grade>(), Ok(Grade::S));
        assert!("F".parse::<Grade>().is_err());
    }

    #[test]
    fn test_weighted_average() {
        // 80 * 0.6 + 70 * 0.4 = 76
        let result = final_grade(80.0, &[60.0, 80.0]);
        assert_eq!(result.audio_score, 70.0);
        assert_eq!(result.overall_score, 76);
        assert_eq!(result.grade, Grade::B);
    }

    #[test]
    fn test_no_answers_counts_as_zero_audio() {
        let result = final_grade(90.0, &[]);
        assert_eq!(result.audio_score, 0.0);
        assert_eq!(result.overall_score, 54);
        assert_eq!(result.grade, Grade::D);
    }

    #[test]
    fn test_grade_uses_unrounded_score() {
        // 57 + 32.6 = 89.6 rounds to 90 but stays below the S threshold
        let result = final_grade(95.0, &[81.5]);
        assert_eq!(result.overall_score, 90);
        assert_eq!(result.grade, Grade::A);
    }

    #[test]
    fn test_video_score_rounded() {
        assert_eq!(video_score(80.0, 70.0, 60.5), 70.17);
    }
}
