//! External provider contracts and their HTTP client implementations.
//!
//! Each provider takes its credentials at construction time; nothing in here
//! reads the environment.

pub mod generation;
pub mod research;
pub mod speech;
pub mod storage;

pub use generation::{CompletionOptions, GenerationProvider, InlineImage, OpenAiCompatClient, ResponseFormat};
pub use research::{ResearchProvider, SearchDepth, TavilySearchClient};
pub use speech::{OpenAiSpeechClient, SpeechProvider};
pub use storage::{BlobStore, LocalBlobStore};
