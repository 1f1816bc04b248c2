//! Chunked I/O pieces shared by the client and server engines.

pub mod buffer;
pub mod io;
pub mod progress;

pub use buffer::TransferBuffer;
pub use io::{read_chunk, write_chunk};
pub use progress::{format_bytes, ProgressTracker};
