//! Core translation pipeline

pub mod backends;
pub mod chunker;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod rules;
