//! # vocalis-std
//!
//! Standard implementations for the Vocalis skill framework.
//!
//! This crate provides:
//! - **Standard middleware**: request logging, tracing spans, account-link
//!   guard, conditional wrapper ([`middleware`])
//! - **Testing utilities**: counting and recording doubles ([`testing`])

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use vocalis_core;

// Modules
pub mod middleware;
pub mod testing;
