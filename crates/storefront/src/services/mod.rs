//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `translate` - DeepL page translation proxy
//! - `transcribe` - Speech-to-subtitles proxy (OpenAI Whisper)

pub mod auth;
pub mod translate;
pub mod transcribe;

pub use auth::{AuthError, AuthService, Registration};
pub use transcribe::{MediaUpload, TranscribeError, Transcript, WhisperClient};
pub use translate::{DeeplClient, TranslateError, TranslateRequest, TranslateResponse};
