pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompts;
pub mod tokens;
pub mod validator;

pub use error::ReadingError;
pub use generator::{GeneratedReading, ReadingGenerator, DEFAULT_MODEL};
pub use pipeline::{
    ContinuedReading, ConversationRepository, ReadingPipeline, StartReadingRequest, StartedReading,
};
pub use tokens::{TokenCounter, WhitespaceTokenCounter};
pub use validator::QuestionValidator;
