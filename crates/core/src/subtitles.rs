//! WebVTT rendering for transcription segments.
//!
//! Transcription providers return timed segments (`start`/`end` in seconds).
//! This module turns them into a `.vtt` file a video player can load.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A timed piece of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
    /// Transcribed text (may carry leading/trailing whitespace).
    #[serde(default)]
    pub text: String,
}

/// Format a second offset as a WebVTT timestamp (`HH:MM:SS.mmm`).
///
/// The offset is rounded once to whole milliseconds so values like `2.3`
/// render as `.300` rather than `.299`. Negative and non-finite offsets clamp
/// to zero.
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let millis = if seconds.is_finite() && seconds > 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ms = (seconds * 1000.0).round() as u64;
        ms
    } else {
        0
    };

    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1000;
    let ms = millis % 1000;

    format!("{hours:02}:{minutes:02}:{secs:02}.{ms:03}")
}

/// Render segments as a WebVTT document.
///
/// Cues are numbered from 1 in segment order. An empty segment list yields
/// just the `WEBVTT` header.
#[must_use]
pub fn to_vtt(segments: &[Segment]) -> String {
    let mut out = String::from("WEBVTT\n");
    for (i, segment) in segments.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n{}\n{} --> {}\n{}\n",
            i + 1,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text.trim()
        );
    }
    out
}

/// The plain transcript: the provider's full text when present, otherwise
/// the segment texts joined with single spaces.
#[must_use]
pub fn plain_text(full_text: Option<&str>, segments: &[Segment]) -> String {
    match full_text {
        Some(text) if !text.is_empty() => text.to_owned(),
        _ => segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_owned(),
    }
}
