pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{LLMError, LLMStream, Result, VisionProvider};
pub use providers::QubridProvider;
pub use types::LLMChunk;
