#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod refdata;
pub mod repo;
pub mod store;
