//! Lixmath Core - Shared domain types.
//!
//! This crate provides the types used by the storefront binary and its tests:
//! - the demo product [`Catalog`] and [`Price`] arithmetic
//! - the session-stored [`Cart`]
//! - [`Email`] validation and type-safe ids
//! - WebVTT rendering for transcription results ([`subtitles`])
//! - target language mapping for the translation proxy ([`language`])
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod language;
pub mod subtitles;
pub mod types;

pub use types::*;
