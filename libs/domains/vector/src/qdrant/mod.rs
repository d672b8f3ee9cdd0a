mod client;
mod config;
mod payload;

pub use client::QdrantRepository;
pub use config::QdrantConfig;
