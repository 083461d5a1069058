//! # warden-contracts
//!
//! Shared vocabulary, policies, decisions, and errors for the WARDEN access
//! decision engine.
//!
//! All crates in the workspace import from here. No evaluation logic lives in
//! this crate, only data definitions, validation, and formatting.

pub mod access;
pub mod decision;
pub mod error;
pub mod policy;
