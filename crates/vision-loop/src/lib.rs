pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod stream;

pub use config::ExchangeConfig;
pub use controller::{ActiveConversationView, ExchangeOutcome, UploadOutcome, VisionChat};
pub use error::ExchangeError;
pub use events::ExchangeEvent;
pub use stream::{consume_vision_stream, ChunkCoalescer};
