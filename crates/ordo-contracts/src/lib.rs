//! # ordo-contracts
//!
//! Shared types, errors, and audit records for the Ordo assistant core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod agent;
pub mod audit;
pub mod error;
pub mod permission;
pub mod policy;
pub mod tool;
