//! Accessibility preferences and the translation/subtitle tools page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{PageContext, load_prefs, store_prefs};
use crate::models::AccessibilityPrefs;
use crate::models::accessibility::{FONT_SCALE_RANGE, LETTER_SPACING_RANGE, LINE_HEIGHT_RANGE};

use super::api::ApiError;

/// Settings form data.
///
/// Checkboxes are present only when ticked; sliders may arrive blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrefsForm {
    pub contrast: Option<String>,
    pub dyslexic: Option<String>,
    pub underline: Option<String>,
    pub reduce_motion: Option<String>,
    pub scale: String,
    pub line: String,
    pub letter: String,
    /// Present when the "Restablecer" button was used.
    pub reset: Option<String>,
}

impl PrefsForm {
    /// Merge into existing preferences, keeping the page language.
    fn apply(self, current: AccessibilityPrefs) -> AccessibilityPrefs {
        if self.reset.is_some() {
            return AccessibilityPrefs {
                lang: current.lang,
                ..AccessibilityPrefs::default()
            };
        }

        AccessibilityPrefs {
            high_contrast: self.contrast.is_some(),
            dyslexic_font: self.dyslexic.is_some(),
            underline_links: self.underline.is_some(),
            reduce_motion: self.reduce_motion.is_some(),
            font_scale: parse_slider(&self.scale),
            line_height: parse_slider(&self.line),
            letter_spacing: parse_slider(&self.letter),
            lang: current.lang,
        }
        .clamped()
    }
}

fn parse_slider(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}

/// Body of `POST /accessibility/language`.
#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub lang: String,
}

/// One range input on the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slider {
    /// Form field name.
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: u16,
    pub max: u16,
    /// Current value, or the browser default when unset.
    pub value: u16,
}

impl Slider {
    fn new(
        name: &'static str,
        label: &'static str,
        unit: &'static str,
        (min, max): (u16, u16),
        current: Option<u16>,
        default: u16,
    ) -> Self {
        Self {
            name,
            label,
            unit,
            min,
            max,
            value: current.unwrap_or(default),
        }
    }
}

/// Accessibility page template.
#[derive(Template, WebTemplate)]
#[template(path = "accessibility/index.html")]
pub struct AccessibilityTemplate {
    pub page: PageContext,
    pub sliders: Vec<Slider>,
}

/// Display the settings form and the page tools.
pub async fn index(page: PageContext) -> AccessibilityTemplate {
    let prefs = &page.prefs;
    let sliders = vec![
        Slider::new("scale", "Tamaño de texto", "%", FONT_SCALE_RANGE, prefs.font_scale, 100),
        Slider::new(
            "line",
            "Interlineado (centésimas)",
            "",
            LINE_HEIGHT_RANGE,
            prefs.line_height,
            150,
        ),
        Slider::new(
            "letter",
            "Espaciado entre letras",
            "px",
            LETTER_SPACING_RANGE,
            prefs.letter_spacing,
            0,
        ),
    ];

    AccessibilityTemplate { page, sliders }
}

/// Save the settings form.
#[instrument(skip(session, form))]
pub async fn save(session: Session, Form(form): Form<PrefsForm>) -> Result<Redirect> {
    let prefs = form.apply(load_prefs(&session).await);
    store_prefs(&session, &prefs).await?;

    Ok(Redirect::to("/accessibility"))
}

/// Record the page language chosen in the translation widget.
#[instrument(skip(session, body))]
pub async fn set_language(
    session: Session,
    body: std::result::Result<Json<LanguageRequest>, JsonRejection>,
) -> std::result::Result<StatusCode, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut prefs = load_prefs(&session).await;
    if !prefs.set_lang(&request.lang) {
        return Err(ApiError::bad_request("invalid language tag"));
    }
    store_prefs(&session, &prefs).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to store language");
        ApiError::internal("session error")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Custom properties for the slider values.
#[instrument(skip(session))]
pub async fn stylesheet(session: Session) -> impl IntoResponse {
    let css = load_prefs(&session).await.stylesheet();
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], css)
}
