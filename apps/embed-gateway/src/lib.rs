//! Embed Gateway
//!
//! HTTP front door that turns text into vectors and stores or searches them
//! in a managed vector database.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   ↓ (JSON over HTTP)
//! domain_vector::router (/upsert, /search, /health)
//!   ↓
//! VectorService
//!   ↓
//! ┌──────────────────────┬───────────────────┐
//! │ Pinecone | Qdrant    │ OpenAI | FastEmbed│
//! └──────────────────────┴───────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: Environment-driven backend selection
//! - `server`: Startup, wiring and graceful shutdown

pub mod config;
pub mod server;

pub use config::Config;
pub use server::run;
