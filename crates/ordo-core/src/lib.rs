//! # ordo-core
//!
//! The privacy-aware query runtime for the Ordo assistant.
//!
//! This crate provides:
//! - The seams the pipeline is built on (`LanguageModel`, `ToolInvoker`,
//!   `ContentFilter`, `AuditSink`, `IntentClassifier`)
//! - `OrdoAgent`, which drives every query through the seven-stage workflow
//!   so that tool output is always filtered before it reaches the model
//! - `OrdoConfig`, the TOML + environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ordo_core::{OrdoAgent, traits::{ContentFilter, ToolInvoker}};
//!
//! let agent = OrdoAgent::new(filter, tools).with_model(model);
//! let answer = agent.process_query("What is my wallet balance?", context).await;
//! ```

pub mod agent;
pub mod classifier;
pub mod config;
pub mod prompts;
pub mod traits;
pub mod workflow;

pub use agent::OrdoAgent;
pub use classifier::{Classification, KeywordClassifier};
pub use config::OrdoConfig;
