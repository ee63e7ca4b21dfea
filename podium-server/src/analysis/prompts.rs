//! Prompts sent alongside the uploaded media

pub const VIDEO_PROMPT: &str = r#"Analyze this presentation video and provide a detailed evaluation in JSON format with the following structure:
{
    "expression": <float 0-100>,
    "intonation": <float 0-100>,
    "posture": <float 0-100>,
    "overall_rating": <string: "S", "A", "B", "C", "D", or "E">,
    "suggestion": <string with improvement suggestions>,
    "questions": [<array of 3 potential audience questions>]
}

Criteria:
- Expression: Facial expressions, eye contact, enthusiasm
- Intonation: Voice modulation, clarity, pacing
- Posture: Body language, confidence, gestures
- Overall Rating: S=Excellent, A=Very Good, B=Good, C=Average, D=Below Average, E=Poor

Only return valid JSON, no additional text."#;

/// Prompt for grading a recorded answer to `question`
pub fn audio_prompt(question: &str) -> String {
    format!(
        r#"Listen to this recorded answer to the interview question: "{}"

Evaluate the answer and respond in JSON format with the following structure:
{{
    "score": <float 0-100>,
    "suggestion": <string with concrete improvement suggestions>,
    "is_relevant": <boolean: whether the answer addresses the question>
}}

Criteria:
- Relevance to the question
- Clarity and structure of the answer
- Confidence and fluency of delivery

Only return valid JSON, no additional text."#,
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_prompt_embeds_question() {
        let prompt = audio_prompt("How does it scale?");
        assert!(prompt.contains("\"How does it scale?\""));
        assert!(prompt.contains("\"is_relevant\""));
    }
}
