//! Minimal web form for generating brand kits (feature `server`).
//!
//! Routes:
//! - `GET /`          the brief form
//! - `POST /generate` form-encoded brief; result page with a zip download
//! - `GET /health`    liveness probe
//!
//! Generated assets are inlined as `data:` URIs, so the server keeps no
//! state between requests.

use crate::brief::{BrandBrief, HexColor, Vibe, DEFAULT_THEME_COLOR};
use crate::config::KitConfig;
use crate::error::BrandKitError;
use crate::generate::generate;
use crate::output::BrandKit;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<KitConfig>,
}

/// Raw form fields, validated into a [`BrandBrief`] by the handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BriefForm {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub vibe: String,
    #[serde(default)]
    pub color: String,
}

impl BriefForm {
    fn to_brief(&self) -> Result<BrandBrief, BrandKitError> {
        let vibe = if self.vibe.trim().is_empty() {
            Vibe::default()
        } else {
            self.vibe.parse()?
        };
        let color = if self.color.trim().is_empty() {
            DEFAULT_THEME_COLOR
        } else {
            self.color.parse()?
        };
        BrandBrief::new(&self.brand_name, &self.industry, vibe, color)
    }
}

/// Build the application router.
pub fn router(config: KitConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate_kit))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, config: KitConfig) -> Result<(), BrandKitError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BrandKitError::Internal(format!("Failed to bind {addr}: {e}")))?;
    info!("Brand kit form listening on http://{}", addr);
    axum::serve(listener, router(config))
        .await
        .map_err(|e| BrandKitError::Internal(format!("Server error: {e}")))
}

async fn index() -> Html<String> {
    Html(page(&render_form(&BriefForm::default(), None)))
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_kit(State(state): State<AppState>, Form(form): Form<BriefForm>) -> Response {
    let brief = match form.to_brief() {
        Ok(brief) => brief,
        Err(err) => {
            let body = page(&render_form(&form, Some(&err.to_string())));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response();
        }
    };

    match generate(&brief, &state.config).await {
        Ok(kit) => {
            for warning in kit.warnings() {
                warn!("{}: {}", brief.brand_name(), warning);
            }
            Html(page(&render_result(&kit))).into_response()
        }
        Err(err) => {
            warn!("Brand kit generation failed: {}", err);
            let body = page(&format!(
                "<h1>Generation failed</h1>\n<pre class=\"error\">{}</pre>\n<p><a href=\"/\">Back</a></p>",
                escape_html(&err.to_string())
            ));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

fn page(body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>AI Branding Kit Generator</title>\n<style>\n\
body{{font-family:sans-serif;max-width:44rem;margin:2rem auto;padding:0 1rem}}\n\
label{{display:block;margin-top:1rem}}\n\
.warning{{background:#fff4e5;border-left:4px solid #ff9800;padding:.5rem 1rem}}\n\
.swatch{{display:inline-block;width:4rem;height:4rem;margin-right:.5rem;border:1px solid #ccc}}\n\
pre{{white-space:pre-wrap}}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn render_form(form: &BriefForm, warning: Option<&str>) -> String {
    let mut html = String::from("<h1>AI Branding Kit Generator</h1>\n");
    if let Some(warning) = warning {
        let _ = writeln!(html, "<p class=\"warning\">{}</p>", escape_html(warning));
    }

    let selected_vibe = form.vibe.parse::<Vibe>().unwrap_or_default();
    let color = form
        .color
        .parse::<HexColor>()
        .unwrap_or(DEFAULT_THEME_COLOR);

    html.push_str("<form method=\"post\" action=\"/generate\">\n");
    let _ = writeln!(
        html,
        "<label>Brand Name <input name=\"brand_name\" required value=\"{}\"></label>",
        escape_html(&form.brand_name)
    );
    let _ = writeln!(
        html,
        "<label>Industry <input name=\"industry\" required value=\"{}\"></label>",
        escape_html(&form.industry)
    );
    html.push_str("<label>Brand Vibe <select name=\"vibe\">\n");
    for vibe in Vibe::ALL {
        let selected = if vibe == selected_vibe { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{0}\"{1}>{0}</option>",
            vibe.label(),
            selected
        );
    }
    html.push_str("</select></label>\n");
    let _ = writeln!(
        html,
        "<label>Theme Color <input type=\"color\" name=\"color\" value=\"{}\"></label>",
        color.to_string().to_lowercase()
    );
    html.push_str("<p><button type=\"submit\">Generate Branding Kit</button></p>\n</form>");
    html
}

fn render_result(kit: &BrandKit) -> String {
    let brief = &kit.brief;
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<h1>Branding Kit: {}</h1>",
        escape_html(brief.brand_name())
    );
    for warning in kit.warnings() {
        let _ = writeln!(html, "<p class=\"warning\">{}</p>", escape_html(&warning));
    }

    html.push_str("<h2>Brand Text</h2>\n");
    let _ = writeln!(html, "<pre>{}</pre>", escape_html(&kit.copy.text));

    if let Some(logo) = &kit.logo.logo {
        html.push_str("<h2>Logo</h2>\n");
        let _ = writeln!(
            html,
            "<img alt=\"{} logo\" width=\"256\" src=\"data:image/png;base64,{}\">",
            escape_html(brief.brand_name()),
            STANDARD.encode(&logo.png)
        );
    }

    html.push_str("<h2>Palette</h2>\n<div>\n");
    for color in kit.palette.colors() {
        let _ = writeln!(
            html,
            "<span class=\"swatch\" title=\"{0}\" style=\"background:{0}\"></span>",
            color
        );
    }
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<p><a download=\"{}\" href=\"data:application/zip;base64,{}\">Download Branding Kit</a></p>",
        escape_html(&kit.archive_file_name),
        STANDARD.encode(&kit.archive)
    );
    html.push_str("<p><a href=\"/\">Create another</a></p>");
    html
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
