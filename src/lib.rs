pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingest;
pub mod layout;
pub mod listener;
pub mod model;
pub mod render;
pub mod source;
pub mod threshold;
