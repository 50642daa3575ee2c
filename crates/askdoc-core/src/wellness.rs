//! Companion chat setup, journal feedback and insights over the Gemini gateway.

use tracing::{info, warn};

use crate::ai::{self, AiError, ChatSession, GeminiClient};
use crate::config::Config;
use crate::content::SYSTEM_INSTRUCTION;
use crate::state::{format_date, JournalEntry, MoodEntry};

pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const CHAT_MAX_OUTPUT_TOKENS: u32 = 500;

pub const FEEDBACK_EMPTY_REPLY: &str = "Thank you for sharing your thoughts.";
pub const FEEDBACK_FALLBACK: &str =
    "Your entry has been saved. Writing is a powerful tool for clarity.";

pub const NEED_MORE_DATA: &str = "I need a bit more information to generate insights. Please try logging your mood or writing a journal entry first so I can get to know you better.";

/// Chat session with the companion persona.
///
/// Sampling settings come from the config file when present.
pub fn companion_session(settings: &Config) -> Result<ChatSession, AiError> {
    ai::create_session(
        SYSTEM_INSTRUCTION,
        settings.temperature.unwrap_or(CHAT_TEMPERATURE),
        settings.max_output_tokens.unwrap_or(CHAT_MAX_OUTPUT_TOKENS),
    )
}

fn journal_feedback_prompt(entry: &str) -> String {
    format!(
        "The user has written the following journal entry: \"{}\".\n\
         Provide a very brief (2-3 sentences), encouraging, and empathetic reflection on this entry.\n\
         Do not analyze deeply, just acknowledge and validate.",
        entry
    )
}

/// A short empathetic reflection on a journal entry.
///
/// Only credential problems are returned as errors; anything else degrades to
/// a fixed encouraging message.
pub async fn generate_journal_feedback(entry: &str) -> Result<String, AiError> {
    let client = ai::client()?;
    journal_feedback_with(&client, entry).await
}

pub async fn journal_feedback_with(client: &GeminiClient, entry: &str) -> Result<String, AiError> {
    match client
        .generate_once(&journal_feedback_prompt(entry), SYSTEM_INSTRUCTION)
        .await
    {
        Ok(text) if text.trim().is_empty() => Ok(FEEDBACK_EMPTY_REPLY.to_string()),
        Ok(text) => Ok(text),
        Err(e) if e.is_credential_error() => Err(e),
        Err(e) => {
            warn!(error = %e, "journal feedback failed, using fallback");
            Ok(FEEDBACK_FALLBACK.to_string())
        }
    }
}

fn mood_lines(moods: &[MoodEntry]) -> String {
    moods
        .iter()
        .map(|m| {
            format!(
                "- {}: {} (Intensity {}/10). Note: {}",
                format_date(m.timestamp),
                m.mood,
                m.intensity,
                m.note
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn journal_lines(journals: &[JournalEntry]) -> String {
    journals
        .iter()
        .map(|j| {
            format!(
                "- {}: Prompt: \"{}\" Content: \"{}\"",
                format_date(j.timestamp),
                j.prompt,
                j.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn insights_prompt(moods: &[MoodEntry], journals: &[JournalEntry]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Analyze the following user wellness data to identify emotional patterns and suggest coping strategies.\n\n",
    );
    prompt.push_str("Mood Logs:\n");
    prompt.push_str(&mood_lines(moods));
    prompt.push_str("\n\nJournal Entries:\n");
    prompt.push_str(&journal_lines(journals));
    prompt.push_str("\n\nPlease provide a response with the following sections formatted clearly:\n");
    prompt.push_str("1. 🌊 Emotional Patterns (Trends in mood or recurring themes)\n");
    prompt.push_str("2. 🧭 Coping Strategies (2-3 tailored, gentle suggestions)\n");
    prompt.push_str("3. ✨ Suggested Reflection (A specific question for their next journal entry)\n\n");
    prompt.push_str("Keep the tone warm, empathetic, non-judgmental, and safe. Do not sound clinical.\n");
    prompt.push_str("Use emojis to make it friendly.\n");
    prompt.push_str(
        "IMPORTANT: Start by explicitly stating this is an AI observation and not a medical diagnosis.",
    );
    prompt
}

/// Structured reflection over everything the user has logged.
///
/// With nothing logged this returns [`NEED_MORE_DATA`] without touching the
/// network or the credential.
pub async fn generate_insights(
    moods: &[MoodEntry],
    journals: &[JournalEntry],
) -> Result<String, AiError> {
    if moods.is_empty() && journals.is_empty() {
        return Ok(NEED_MORE_DATA.to_string());
    }
    let client = ai::client()?;
    insights_with(&client, moods, journals).await
}

pub async fn insights_with(
    client: &GeminiClient,
    moods: &[MoodEntry],
    journals: &[JournalEntry],
) -> Result<String, AiError> {
    if moods.is_empty() && journals.is_empty() {
        return Ok(NEED_MORE_DATA.to_string());
    }

    info!(
        moods = moods.len(),
        journals = journals.len(),
        "requesting insights"
    );
    let text = client
        .generate_once(&insights_prompt(moods, journals), SYSTEM_INSTRUCTION)
        .await?;
    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing;

    fn unreachable_client() -> GeminiClient {
        GeminiClient::new("test-key").with_base_url("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_insights_without_data_skips_network() {
        // The client would fail if it were used
        let text = insights_with(&unreachable_client(), &[], &[]).await.unwrap();
        assert_eq!(text, NEED_MORE_DATA);

        // The process-wide path never resolves a key either
        let text = generate_insights(&[], &[]).await.unwrap();
        assert_eq!(text, NEED_MORE_DATA);
    }

    #[tokio::test]
    async fn test_insights_network_failure_is_returned() {
        let moods = vec![MoodEntry::new("Calm", 4, "")];
        let err = insights_with(&unreachable_client(), &moods, &[])
            .await
            .unwrap_err();
        assert!(!err.is_credential_error());
    }

    #[tokio::test]
    async fn test_journal_feedback_falls_back_on_network_failure() {
        let text = journal_feedback_with(&unreachable_client(), "Today was long.")
            .await
            .unwrap();
        assert_eq!(text, FEEDBACK_FALLBACK);
    }

    async fn rejecting_client() -> GeminiClient {
        let base_url = testing::serve_once("401 Unauthorized", "application/json", "{}").await;
        GeminiClient::new("bad-key").with_base_url(&base_url)
    }

    #[tokio::test]
    async fn test_journal_feedback_surfaces_rejected_key() {
        let err = journal_feedback_with(&rejecting_client().await, "Today was long.")
            .await
            .unwrap_err();
        assert!(err.is_credential_error());
    }

    #[tokio::test]
    async fn test_insights_surface_rejected_key() {
        let moods = vec![MoodEntry::new("Anxious", 6, "deadline")];
        let err = insights_with(&rejecting_client().await, &moods, &[])
            .await
            .unwrap_err();
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_insights_prompt_lists_every_entry() {
        let moods = vec![
            MoodEntry::new("Sad", 3, "tired"),
            MoodEntry::new("Happy", 7, ""),
        ];
        let journals = vec![JournalEntry::new(
            "What is one thing you are grateful for today?",
            "My sister called.",
        )];
        let prompt = insights_prompt(&moods, &journals);

        assert!(prompt.contains("Sad (Intensity 3/10). Note: tired"));
        assert!(prompt.contains("Happy (Intensity 7/10). Note: "));
        assert!(prompt.contains(
            "Prompt: \"What is one thing you are grateful for today?\" Content: \"My sister called.\""
        ));
        assert!(prompt.contains("🌊 Emotional Patterns"));
        assert!(prompt.contains("🧭 Coping Strategies"));
        assert!(prompt.contains("✨ Suggested Reflection"));
        assert!(prompt.contains("not a medical diagnosis"));
    }

    #[test]
    fn test_journal_prompt_quotes_entry() {
        let prompt = journal_feedback_prompt("I went for a walk.");
        assert!(prompt.contains("\"I went for a walk.\""));
        assert!(prompt.contains("2-3 sentences"));
    }
}
