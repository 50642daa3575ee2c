pub mod error;
pub mod gemini;
pub mod sse;

#[cfg(test)]
pub(crate) mod testing;

pub use error::AiError;
pub use gemini::{client, create_session, set_default_model, ChatSession, DeltaStream, GeminiClient, SessionOptions};
