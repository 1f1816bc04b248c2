//! Server transfer engine: a single-shot receiver.

pub mod server;

pub use server::{
    accept_one, bind_and_listen, close, receive, run_server, serve_one, ReceiveReport,
};
