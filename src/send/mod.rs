//! Client transfer engine: pick the payload, connect, stream, close.

pub mod client;
mod payload;

pub use client::{close, connect, run_client, stream, SendReport};
pub use payload::{select_payload, ByteSource};
