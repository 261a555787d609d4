//! Accessibility preferences applied to every page.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use lixmath_core::language::{DEFAULT_PAGE_LANGUAGE, is_valid_tag};

/// Bounds for the font scale slider, in percent.
pub const FONT_SCALE_RANGE: (u16, u16) = (80, 200);
/// Bounds for the line height slider, in hundredths.
pub const LINE_HEIGHT_RANGE: (u16, u16) = (100, 300);
/// Bounds for the letter spacing slider, in pixels.
pub const LETTER_SPACING_RANGE: (u16, u16) = (0, 10);

/// Per-visitor accessibility settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityPrefs {
    pub high_contrast: bool,
    pub dyslexic_font: bool,
    pub underline_links: bool,
    pub reduce_motion: bool,
    /// Font scale in percent.
    pub font_scale: Option<u16>,
    /// Line height in hundredths (150 = 1.50).
    pub line_height: Option<u16>,
    /// Letter spacing in px.
    pub letter_spacing: Option<u16>,
    /// Page language tag set after a translation.
    pub lang: Option<String>,
}

impl AccessibilityPrefs {
    /// Space-separated classes for the `<html>` element.
    #[must_use]
    pub fn html_classes(&self) -> String {
        [
            (self.high_contrast, "a11y-contrast"),
            (self.dyslexic_font, "a11y-dyslexic"),
            (self.underline_links, "a11y-underline-links"),
            (self.reduce_motion, "a11y-reduce-motion"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, class)| *class)
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Language for `<html lang>`.
    #[must_use]
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_PAGE_LANGUAGE)
    }

    /// Set the page language, ignoring malformed tags.
    ///
    /// Returns whether the tag was accepted.
    pub fn set_lang(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if is_valid_tag(tag) {
            self.lang = Some(tag.to_owned());
            true
        } else {
            false
        }
    }

    /// Clamp slider values into their allowed ranges.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        let clamp = |v: Option<u16>, (lo, hi): (u16, u16)| v.map(|v| v.clamp(lo, hi));
        self.font_scale = clamp(self.font_scale, FONT_SCALE_RANGE);
        self.line_height = clamp(self.line_height, LINE_HEIGHT_RANGE);
        self.letter_spacing = clamp(self.letter_spacing, LETTER_SPACING_RANGE);
        self
    }

    /// The `:root` custom properties stylesheet for the slider values.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let mut vars = String::new();
        // Writing to a String cannot fail.
        if let Some(scale) = self.font_scale {
            let _ = write!(vars, "--a11y-font-scale:{scale}%;");
        }
        if let Some(line) = self.line_height {
            let _ = write!(vars, "--a11y-line:{}.{:02};", line / 100, line % 100);
        }
        if let Some(letter) = self.letter_spacing {
            let _ = write!(vars, "--a11y-letter:{letter}px;");
        }

        if vars.is_empty() {
            String::new()
        } else {
            format!(":root{{{vars}}}\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_classes() {
        let prefs = AccessibilityPrefs {
            high_contrast: true,
            reduce_motion: true,
            ..AccessibilityPrefs::default()
        };
        assert_eq!(prefs.html_classes(), "a11y-contrast a11y-reduce-motion");
        assert_eq!(AccessibilityPrefs::default().html_classes(), "");
    }

    #[test]
    fn test_stylesheet() {
        let prefs = AccessibilityPrefs {
            font_scale: Some(120),
            line_height: Some(165),
            letter_spacing: Some(2),
            ..AccessibilityPrefs::default()
        };
        assert_eq!(
            prefs.stylesheet(),
            ":root{--a11y-font-scale:120%;--a11y-line:1.65;--a11y-letter:2px;}\n"
        );
        assert_eq!(AccessibilityPrefs::default().stylesheet(), "");
    }

    #[test]
    fn test_stylesheet_pads_line_height() {
        let prefs = AccessibilityPrefs {
            line_height: Some(205),
            ..AccessibilityPrefs::default()
        };
        assert_eq!(prefs.stylesheet(), ":root{--a11y-line:2.05;}\n");
    }

    #[test]
    fn test_clamped() {
        let prefs = AccessibilityPrefs {
            font_scale: Some(500),
            line_height: Some(10),
            letter_spacing: Some(3),
            ..AccessibilityPrefs::default()
        }
        .clamped();
        assert_eq!(prefs.font_scale, Some(200));
        assert_eq!(prefs.line_height, Some(100));
        assert_eq!(prefs.letter_spacing, Some(3));
    }

    #[test]
    fn test_set_lang() {
        let mut prefs = AccessibilityPrefs::default();
        assert_eq!(prefs.lang(), "es");
        assert!(prefs.set_lang("en-US"));
        assert_eq!(prefs.lang(), "en-US");
        assert!(!prefs.set_lang("<bad>"));
        assert_eq!(prefs.lang(), "en-US");
    }
}
