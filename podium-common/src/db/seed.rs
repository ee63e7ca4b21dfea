//! Learning catalogue seed data

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// (title, description, video_url)
pub const LEARNING_CATALOGUE: &[(&str, &str, &str)] = &[
    (
        "Roadmap to presentation success",
        "Key questions to ask before writing, identifying key messages, and building the story/communication flow.",
        "https://www.youtube.com/watch?v=W7GPV0K6iEY",
    ),
    (
        "Discover the Roadmap to Engaging PowerPoint Presentations",
        "How to use a visual \"roadmap\" instead of a basic table of contents to captivate your audience and indicate progress.",
        "https://www.youtube.com/watch?v=PKkPI8oayjk",
    ),
    (
        "PowerPoint Roadmap & Structure for a Successful Presentation",
        "Tailoring your approach to different presentation types and the vital importance of starting strong.",
        "https://www.youtube.com/watch?v=LCe4ROjIKH4",
    ),
    (
        "PowerPoint Slide Makeover using Effective Visuals (3 Steps to Design)",
        "Practical, step-by-step example of how to makeover a financial planning slide using effective visuals, clear design, and simple animation.",
        "https://www.youtube.com/watch?v=-wR-kWqRyr8",
    ),
    (
        "How To Create Professional Microsoft PowerPoint Presentation Slides",
        "PowerPoint Slide Design from Beginner to EXPERT in One Video",
        "https://www.youtube.com/watch?v=44zBpZHVMAk",
    ),
    (
        "PowerPoint Slide Design from Beginner to EXPERT in One Video",
        "A comprehensive tutorial covering various slide design secrets, infographics, and animation techniques for in-depth learning.",
        "https://www.youtube.com/watch?v=lxcHLxjkcXQ",
    ),
    (
        "Public Speaking For Beginners",
        "A great starting point for beginners, covering immediate do's and don'ts, confident posture, eye contact, and reducing reliance on notes.",
        "https://www.youtube.com/watch?v=i5mYphUoOCs",
    ),
    (
        "Make Body Language Your Superpower",
        "An in-depth look at how to use your nonverbal communication effectively, including reading and responding to the audience's body language.",
        "https://www.youtube.com/watch?v=cFLjudWTuGQ",
    ),
    (
        "Present With Confidence: Use Your Body Language & Voice To Make A Big Impact",
        "Detailed, practical tips on combining verbal and non-verbal delivery skills, specifically focusing on posture, gestures, facial expressions, and vocal variety.",
        "https://www.youtube.com/watch?v=4wiJpm43pGs",
    ),
];

/// Insert the catalogue when the learnings table is empty
///
/// Returns the number of rows inserted (0 on every run after the first).
pub async fn seed_learnings(pool: &SqlitePool) -> Result<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM learnings")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut tx = pool.begin().await?;
    for (title, description, video_url) in LEARNING_CATALOGUE {
        sqlx::query(
            r#"
            INSERT INTO learnings (title, description, video_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(video_url)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Seeded {} learning entries", LEARNING_CATALOGUE.len());
    Ok(LEARNING_CATALOGUE.len())
}
