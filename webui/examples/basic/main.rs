//! Basic WebUI Example
//!
//! This example demonstrates:
//! - A full page assembled from several template fragments
//! - Views that answer navigation with HTML and script requests with JSON envelopes
//! - Flash messages queued on one request and delivered on a later one
//! - Transient notifications, server-side validation replies and redirects
//!
//! Run with: cargo run --example basic
//!
//! Test with:
//!   curl http://localhost:8080/
//!   curl -H 'X-Requested-With: XMLHttpRequest' http://localhost:8080/home
//!   curl -c jar -b jar -H 'X-Requested-With: XMLHttpRequest' http://localhost:8080/notify
//!   curl -c jar -b jar -H 'X-Requested-With: XMLHttpRequest' http://localhost:8080/home
//!   curl -H 'X-Requested-With: XMLHttpRequest' -d 'validation=1' http://localhost:8080/inputform
//!   curl -i http://localhost:8080/docs

use std::collections::{BTreeMap, HashMap};

use acton_webui::prelude::*;
use serde_json::json;

const LANGS: [(&str, &str); 3] = [("en", "English"), ("fr", "Français"), ("ar", "العربية")];

fn langs() -> BTreeMap<&'static str, &'static str> {
    LANGS.into_iter().collect()
}

fn menu() -> serde_json::Value {
    json!([
        {"label": "Home", "icon": "fa-home", "url": "#home"},
        {"label": "UI Components", "icon": "fa-cubes", "children": [
            {"label": "Notifications", "url": "#notify"},
            {"label": "Input Form", "url": "#inputform"},
        ]},
        {"label": "Documentation", "url": "#docs"},
    ])
}

// Full document: shell, menu board and the landing content
async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let html = state.engine().render(
        &json!({
            "doc_title": "WebUI",
            "langs": langs(),
            "menu": menu(),
        }),
        &["webui/html.tpl", "webui/menuboard.tpl", "mainpage.tpl"],
    )?;
    Ok(Html(html))
}

async fn home(State(state): State<AppState>, ctx: ViewContext) -> Result<WebResponse> {
    let html = state.engine().render(
        &json!({ "langs": langs(), "message": "Welcome" }),
        &["option_panel.tpl"],
    )?;
    reply(&ctx, html, "Home", None).await
}

async fn notifications(ctx: ViewContext) -> Result<WebResponse> {
    flash(&ctx, "error.us", "error message STICKY_MSG").await?;
    flash(&ctx, "warn", "warning message").await?;
    flash_message(&ctx, FlashMessage::info("info message")).await?;
    flash_message(&ctx, FlashMessage::success("success message")).await?;

    reply(
        &ctx,
        "<div class=\"p-3\">showing notifications</div>",
        "Notifications",
        None,
    )
    .await
}

async fn input_form(State(state): State<AppState>, ctx: ViewContext) -> Result<WebResponse> {
    let html = state.engine().render(
        &json!({
            "form_id": "1234",
            "submit_url": "/inputform",
            "fields": [
                {"type": "checkbox", "label": "Server side validation", "name": "validation"},
                {"type": "text", "label": "Required Field", "name": "field1", "required": true},
                {"type": "text", "label": "Optional Field", "name": "field2"},
            ],
        }),
        &["inputform.tpl"],
    )?;
    reply(&ctx, html, "Input Form", None).await
}

async fn submit_form(ctx: ViewContext, Form(form): Form<HashMap<String, String>>) -> Result<WebResponse> {
    if form.get("validation").map(String::as_str) == Some("1") {
        let params = json!({ "validation": ["field1"] });
        return reply(&ctx, "", "", Some(params)).await;
    }

    let mut fields: Vec<_> = form.iter().collect();
    fields.sort();
    let mut msg = String::from("Submitted Data:<br>");
    for (key, value) in fields {
        msg.push_str(&format!("<b>{key}:</b> {value}<br>"));
    }

    info!(fields = form.len(), "Form submitted");
    notify(&ctx, &msg, "success", false, true, None).await
}

async fn login(ctx: ViewContext, Form(form): Form<HashMap<String, String>>) -> Result<WebResponse> {
    let username = form.get("username").map(String::as_str).unwrap_or_default();
    let digest = form.get("digest").map(String::as_str).unwrap_or_default();

    let error = if username.is_empty() || digest.is_empty() {
        "Please enter username and password"
    } else if username == "admin" {
        return notify(&ctx, "Welcome, admin", "success", false, true, None).await;
    } else {
        "Invalid username or password"
    };

    warn!(username, "Login rejected");
    notify(&ctx, error, "error", false, true, None).await
}

async fn docs() -> Result<WebResponse> {
    redirect("https://docs.rs/acton-webui", true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::load()?;
    config.templates.root = concat!(env!("CARGO_MANIFEST_DIR"), "/examples/basic/templates").into();
    config.session.secure = false;

    init_tracing(&config)?;

    let sessions = create_memory_session_layer(&config.session);
    let state = AppState::new(config.clone());

    let app = Router::new()
        .route("/", get(index))
        .route("/home", get(home))
        .route("/notify", get(notifications))
        .route("/inputform", get(input_form).post(submit_form))
        .route("/loginpage", post(login))
        .route("/docs", get(docs))
        .layer(sessions)
        .with_state(state);

    Server::new(config).serve(app).await?;

    Ok(())
}
