pub mod coalescer;
pub mod handler;

pub use coalescer::ChunkCoalescer;
pub use handler::consume_vision_stream;
