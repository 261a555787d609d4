//! In-process tests of the assembled router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::config::StoreConfig;
use crate::db::test_support::memory_pool;
use crate::middleware::create_session_layer;
use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

use super::api::MAX_MEDIA_BYTES;
use super::app;

const REGISTRATION: &str = "nombres=Ana&ap_paterno=Quispe&ap_materno=Huaman&edad=24\
    &carrera=Civil&telefono=&email=ana%40example.com&pais=PE\
    &pass=contrasena1&pass2=contrasena1&acepto=on";

async fn test_app(config: StoreConfig) -> Router {
    let session_layer = create_session_layer(MemoryStore::default(), &config);
    let state = AppState::new(config, memory_pool().await).unwrap();
    app(state, session_layer, None)
}

/// A browser stand-in that keeps the session cookie between requests.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    async fn new() -> Self {
        Self::with_config(StoreConfig::for_tests()).await
    }

    async fn with_config(config: StoreConfig) -> Self {
        Self {
            app: test_app(config).await,
            cookie: None,
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(cookie) = session_cookie(&response) {
            self.cookie = Some(cookie);
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
    }

    async fn post_json(&mut self, uri: &str, body: &str) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
    }
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE_NAME))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// =============================================================================
// Health and catalog
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let mut browser = Browser::new().await;

    let response = browser.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = browser.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let mut browser = Browser::new().await;
    let response = browser.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("content-security-policy"));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_catalog_lists_products() {
    let mut browser = Browser::new().await;
    let body = body_text(browser.get("/").await).await;

    assert!(body.contains("Diseño de Pavimento Rígido"));
    assert!(body.contains("Diseño de Vigas 2D"));
    assert!(body.contains("/products/col-vias"));
    assert!(body.contains(">Ver</a>"));
    assert!(body.contains(">Agregar</button>"));
}

#[tokio::test]
async fn test_product_page_and_unknown_product() {
    let mut browser = Browser::new().await;

    let response = browser.get("/products/vigas-2d").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Diseño de Vigas 2D"));
    assert!(body.contains("S/ 24.90"));
    assert!(body.contains(">Agregar</button>"));

    let response = browser.get("/products/no-existe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detail_falls_back_to_first_product() {
    let mut browser = Browser::new().await;

    for uri in ["/detalle", "/detalle?id="] {
        let response = browser.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Diseño de Pavimento Rígido"));
    }

    let response = browser.get("/detalle?id=col-vias").await;
    assert!(body_text(response).await.contains("Estudios de Vías y Columnas"));

    let response = browser.get("/detalle?id=nada").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_add_to_cart_redirects_back() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_form("/cart/add", "product_id=vigas-2d&return_to=%2Fproducts%2Fvigas-2d")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products/vigas-2d");

    let body = body_text(browser.get("/cart").await).await;
    assert!(body.contains("Diseño de Vigas 2D"));
}

#[tokio::test]
async fn test_add_to_cart_rejects_offsite_return() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_form("/cart/add", "product_id=pav-rig&return_to=%2F%2Fevil.example")
        .await;
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_add_to_cart_htmx_returns_badge() {
    let mut browser = Browser::new().await;

    let request = Request::post("/cart/add")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(Body::from("product_id=pav-rig&qty=2"))
        .unwrap();
    let response = browser.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    assert!(body_text(response).await.contains(">2<"));

    let body = body_text(browser.get("/cart/count").await).await;
    assert!(body.contains(">2<"));
}

#[tokio::test]
async fn test_add_to_cart_with_blank_quantity_adds_one() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_form("/cart/add", "product_id=pav-rig&qty=&return_to=%2F")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let body = body_text(browser.get("/cart/count").await).await;
    assert!(body.contains(">1<"));
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let mut browser = Browser::new().await;
    let response = browser.post_form("/cart/add", "product_id=nada").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_from_cart() {
    let mut browser = Browser::new().await;
    browser.post_form("/cart/add", "product_id=pav-rig").await;
    let body = body_text(browser.get("/cart").await).await;
    assert!(body.contains(">Eliminar</button>"));

    let response = browser.post_form("/cart/remove", "product_id=pav-rig").await;
    assert_eq!(location(&response), "/cart");

    let body = body_text(browser.get("/cart").await).await;
    assert!(body.contains("Tu carrito está vacío"));
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let mut browser = Browser::new().await;

    for uri in ["/checkout", "/downloads", "/downloads/pav-rig", "/account"] {
        let response = browser.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/auth/login");
    }
}

#[tokio::test]
async fn test_register_validation_errors() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_form("/auth/register", &REGISTRATION.replace("&acepto=on", ""))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Debes aceptar Términos y Privacidad"));
    assert!(body.contains("Quispe"));
    assert!(!body.contains("contrasena1"));

    let response = browser
        .post_form("/auth/register", &REGISTRATION.replace("pass2=contrasena1", "pass2=otra"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Las contraseñas no coinciden"));
}

#[tokio::test]
async fn test_register_signs_in_and_rejects_duplicates() {
    let mut browser = Browser::new().await;

    let response = browser.post_form("/auth/register", REGISTRATION).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account");

    let response = browser.get("/account").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Ana Quispe"));
    assert!(body.contains("ana@example.com"));

    let response = browser.post_form("/auth/register", REGISTRATION).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("Ese correo ya está registrado"));
}

#[tokio::test]
async fn test_login_and_logout() {
    let mut browser = Browser::new().await;
    browser.post_form("/auth/register", REGISTRATION).await;
    browser.post_form("/auth/logout", "").await;

    let response = browser.get("/account").await;
    assert_eq!(location(&response), "/auth/login");

    let response = browser
        .post_form("/auth/login", "email=ana%40example.com&pass=contrasena1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account");

    let response = browser.get("/auth/login").await;
    assert_eq!(location(&response), "/account");
}

#[tokio::test]
async fn test_login_errors() {
    let mut browser = Browser::new().await;
    browser.post_form("/auth/register", REGISTRATION).await;
    browser.post_form("/auth/logout", "").await;

    let response = browser.post_form("/auth/login", "email=&pass=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Completa correo y contraseña"));

    let response = browser
        .post_form("/auth/login", "email=nadie%40example.com&pass=contrasena1")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("No existe una cuenta con ese correo"));

    let response = browser
        .post_form("/auth/login", "email=ana%40example.com&pass=incorrecta")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_text(response).await;
    assert!(body.contains("Contraseña incorrecta"));
    assert!(body.contains("ana@example.com"));
}

// =============================================================================
// Checkout and downloads
// =============================================================================

#[tokio::test]
async fn test_checkout_records_downloads() {
    let mut browser = Browser::new().await;
    browser.post_form("/cart/add", "product_id=vigas-2d").await;
    browser.post_form("/auth/register", REGISTRATION).await;

    let body = body_text(browser.get("/checkout").await).await;
    assert!(body.contains("S/ 24.90"));

    let response = browser.post_form("/checkout/pay", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout/thanks");

    let body = body_text(browser.get("/cart").await).await;
    assert!(body.contains("Tu carrito está vacío"));

    let body = body_text(browser.get("/downloads").await).await;
    assert!(body.contains("Diseño de Vigas 2D"));
    assert!(body.contains("v1.0"));

    let response = browser.get("/downloads/vigas-2d").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"vigas-2d-v1.0.txt\""
    );
    assert_eq!(
        body_text(response).await,
        "Descarga simulada de Diseño de Vigas 2D"
    );

    let response = browser.get("/downloads/pav-rig").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pay_with_empty_cart_goes_back_to_cart() {
    let mut browser = Browser::new().await;
    browser.post_form("/auth/register", REGISTRATION).await;

    let response = browser.post_form("/checkout/pay", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    let body = body_text(browser.get("/downloads").await).await;
    assert!(body.contains("No hay compras aún."));
}

// =============================================================================
// Accessibility
// =============================================================================

#[tokio::test]
async fn test_saved_prefs_reach_layout_and_stylesheet() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_form("/accessibility", "contrast=on&scale=120&line=&letter=2")
        .await;
    assert_eq!(location(&response), "/accessibility");

    let response = browser.get("/accessibility/prefs.css").await;
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/css; charset=utf-8"
    );
    assert_eq!(
        body_text(response).await,
        ":root{--a11y-font-scale:120%;--a11y-letter:2px;}\n"
    );

    let body = body_text(browser.get("/").await).await;
    assert!(body.contains("a11y-contrast"));
}

#[tokio::test]
async fn test_set_language() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_json("/accessibility/language", r#"{"lang":"en"}"#)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_text(browser.get("/").await).await.contains(r#"lang="en""#));

    let response = browser
        .post_json("/accessibility/language", r#"{"lang":"no es un idioma"}"#)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Proxy API
// =============================================================================

#[tokio::test]
async fn test_proxy_endpoints_require_keys() {
    let mut browser = Browser::new().await;

    let response = browser
        .post_json("/api/translate", r#"{"target":"en","items":[]}"#)
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "DEEPL_API_KEY missing");

    let response = browser
        .send(Request::post("/api/asr").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "OPENAI_API_KEY missing");
}

#[tokio::test]
async fn test_api_cors_preflight() {
    let mut browser = Browser::new().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/translate")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = browser.send(request).await;

    assert!(response.status().is_success());
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_translate_rejects_malformed_body() {
    let mut config = StoreConfig::for_tests();
    config.translation.api_key = Some(SecretString::from("test-key"));
    let mut browser = Browser::with_config(config).await;

    let response = browser.post_json("/api/translate", "{").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    // Empty batches never reach DeepL.
    let response = browser
        .post_json("/api/translate", r#"{"target":"en","items":[]}"#)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["translations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_asr_requires_media_file() {
    let mut config = StoreConfig::for_tests();
    config.transcription.api_key = Some(SecretString::from("test-key"));
    let mut browser = Browser::with_config(config).await;

    let response = browser
        .send(Request::post("/api/asr").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing file");

    let boundary = "lixmath-boundary";
    let multipart = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         sin archivo\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::post("/api/asr")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(multipart))
        .unwrap();
    let response = browser.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing file");
}

/// A multipart request carrying a `media` file of `size` bytes.
fn media_request(size: usize) -> Request<Body> {
    let boundary = "lixmath-boundary";
    let mut body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"media\"; filename=\"clase.mp4\"\r\n\
         Content-Type: video/mp4\r\n\r\n"
    )
    .into_bytes();
    body.resize(body.len() + size, b'x');
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post("/api/asr")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_asr_media_size_limit() {
    let mut config = StoreConfig::for_tests();
    config.transcription.api_key = Some(SecretString::from("test-key"));
    // Nothing listens here, so an accepted upload fails upstream with a 500.
    config.transcription.endpoint = "http://127.0.0.1:9/v1/audio/transcriptions".parse().unwrap();
    let mut browser = Browser::with_config(config).await;

    // A file of exactly the limit fits alongside its multipart envelope.
    let response = browser.send(media_request(MAX_MEDIA_BYTES)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(body_json(response).await["error"], "file too large");

    let response = browser.send(media_request(MAX_MEDIA_BYTES + 1)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"], "file too large");
}
