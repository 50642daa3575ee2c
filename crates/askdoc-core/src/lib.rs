pub mod ai;
pub mod config;
pub mod content;
pub mod state;
pub mod storage;
pub mod wellness;

// Re-export main types for convenience
pub use ai::{AiError, ChatSession, DeltaStream, GeminiClient};
pub use config::Config;
pub use content::{ResourceCategory, ResourceLink};
pub use state::{ChatMessage, ChatRole, JournalEntry, Mood, MoodEntry, Theme, Transcript};
pub use storage::{History, LocalStore, StorageError};
