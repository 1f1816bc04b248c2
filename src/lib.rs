//! Point-to-point TCP transfer of a message or a file slice.
//!
//! The client engine lives in [`send`], the single-shot server in
//! [`receive`]. Both stream through the chunk buffer in [`transfer`].

pub mod cli;
pub mod common;
pub mod receive;
pub mod send;
pub mod transfer;
