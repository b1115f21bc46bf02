//! HTTP form server built on axum.
//!
//! Serves the four-field form as HTML, re-rendering the page on every
//! submission, plus a JSON endpoint and a health check. All handlers share
//! the loaded artifacts read-only.

use crate::artifacts::LoadedArtifacts;
use crate::config::{FormConfig, HirecastConfig, ServerConfig};
use crate::error::HirecastError;
use crate::form::{FORM_FIELDS, FormSession, FormSubmission, FormValues};
use crate::render::Rendered;
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use handlebars::Handlebars;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, info_span};
use uuid::Uuid;

/// Form field carrying the submit button press.
pub const TRIGGER_FIELD: &str = "trigger";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
  body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
  label { display: block; margin-top: 1rem; }
  input[type=text] { width: 100%; padding: 0.4rem; }
  button { margin-top: 1.5rem; padding: 0.5rem 1rem; }
  .success { background: #e6f4ea; color: #1e4620; padding: 1rem; margin-top: 1.5rem; }
  .error { background: #fdecea; color: #611a15; padding: 1rem; margin-top: 1.5rem; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<form method="post" action="/">
{{#each fields}}
  <label for="{{key}}">{{label}}</label>
  <input type="text" id="{{key}}" name="{{key}}" value="{{value}}">
{{/each}}
  <button type="submit" name="trigger" value="1">{{submit_label}}</button>
</form>
{{#if result}}
<div class="{{#if result.success}}success{{else}}error{{/if}}" role="status">{{result.message}}</div>
{{/if}}
</body>
</html>
"#;

/// Shared state for the form server.
pub struct FormServer {
    artifacts: Arc<LoadedArtifacts>,
    form: FormConfig,
    templates: Handlebars<'static>,
}

pub type SharedServer = Arc<FormServer>;

impl FormServer {
    pub fn new(artifacts: Arc<LoadedArtifacts>, form: FormConfig) -> Result<Self, HirecastError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(false);
        templates
            .register_template_string("page", PAGE_TEMPLATE)
            .map_err(|e| HirecastError::Template {
                message: e.to_string(),
            })?;
        Ok(Self {
            artifacts,
            form,
            templates,
        })
    }

    /// Load the configured artifacts from `workspace` and build the server.
    pub fn from_config(config: &HirecastConfig, workspace: &Path) -> Result<Self, HirecastError> {
        let artifacts = LoadedArtifacts::load(&config.artifacts, workspace)?;
        Self::new(Arc::new(artifacts), config.form.clone())
    }

    pub fn artifacts(&self) -> &LoadedArtifacts {
        &self.artifacts
    }

    /// Render the form page with the given values and optional result.
    pub fn render_page(
        &self,
        values: &FormValues,
        result: Option<&Rendered>,
    ) -> Result<String, HirecastError> {
        let fields: Vec<_> = FORM_FIELDS
            .iter()
            .map(|f| {
                json!({
                    "key": f.key,
                    "label": f.label,
                    "value": values.get(f.key).unwrap_or_default(),
                })
            })
            .collect();
        let result = result.map(|r| {
            json!({
                "success": r.is_success(),
                "message": r.message(),
            })
        });
        let context = json!({
            "title": self.form.title,
            "submit_label": self.form.submit_label,
            "fields": fields,
            "result": result,
        });
        self.templates
            .render("page", &context)
            .map_err(|e| HirecastError::Template {
                message: e.to_string(),
            })
    }
}

/// Parse a urlencoded form post. Unknown keys are ignored, missing inputs
/// stay empty, and the trigger fired if its field is present at all.
pub fn submission_from_pairs(pairs: &HashMap<String, String>) -> FormSubmission {
    let mut values = FormValues::default();
    for field in FORM_FIELDS {
        if let Some(v) = pairs.get(field.key) {
            values.set(field.key, v.as_str());
        }
    }
    FormSubmission {
        values,
        triggered: pairs.contains_key(TRIGGER_FIELD),
    }
}

/// Build an axum Router with the form page, JSON API, and `/health`.
pub fn router(shared: SharedServer) -> Router {
    Router::new()
        .route("/", get(page_handler).post(submit_handler))
        .route("/api/predict", post(api_predict_handler))
        .route("/health", get(health_handler))
        .with_state(shared)
}

fn page_response(server: &FormServer, values: &FormValues, result: Option<&Rendered>) -> Response {
    match server.render_page(values, result) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render form page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}

/// Fresh, untouched form.
async fn page_handler(State(server): State<SharedServer>) -> Response {
    page_response(&server, &FormValues::default(), None)
}

/// Form post: one interaction cycle of the page.
async fn submit_handler(
    State(server): State<SharedServer>,
    Form(pairs): Form<HashMap<String, String>>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("form_submit", %request_id);
    let _enter = span.enter();

    let submission = submission_from_pairs(&pairs);
    let rendered = FormSession::new(server.artifacts()).run_cycle(&submission);
    if let Some(r) = &rendered {
        info!(success = r.is_success(), "Form prediction");
    }
    page_response(&server, &submission.values, rendered.as_ref())
}

/// JSON prediction: always treated as a triggered cycle.
async fn api_predict_handler(
    State(server): State<SharedServer>,
    Json(values): Json<FormValues>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("api_predict", %request_id);
    let _enter = span.enter();

    let submission = FormSubmission {
        values,
        triggered: true,
    };
    match FormSession::new(server.artifacts()).run_cycle(&submission) {
        Some(Rendered::Success {
            message,
            prediction,
        }) => {
            info!(%prediction, "API prediction");
            Json(json!({ "prediction": prediction, "message": message })).into_response()
        }
        Some(Rendered::Failure { kind, message }) => {
            info!(kind, "API prediction failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": kind, "message": message })),
            )
                .into_response()
        }
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Health check endpoint.
async fn health_handler(State(server): State<SharedServer>) -> impl IntoResponse {
    let artifacts = server.artifacts();
    Json(json!({
        "status": "ok",
        "model": artifacts.predictor().name(),
        "scaler": artifacts.scaler().name(),
    }))
}

/// Start the form server on the configured address.
///
/// This is an async function that runs until cancelled.
pub async fn run(shared: SharedServer, config: &ServerConfig) -> Result<(), HirecastError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Form server listening");
    axum::serve(listener, router(shared)).await?;
    Ok(())
}
