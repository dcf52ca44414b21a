use super::utils::{print_json, require_caller};
use crate::app::App;
use anyhow::Result;
use classroom_application::CreateSessionRequest;
use classroom_core::session::Privacy;
use serde_json::json;

pub async fn create(
    app: &App,
    caller: Option<&str>,
    name: String,
    privacy: Option<Privacy>,
    description: Option<String>,
    hidden: bool,
) -> Result<()> {
    let caller = require_caller(caller)?;
    let request = CreateSessionRequest {
        sname: Some(name),
        privacy,
        description,
        hidden: Some(hidden),
    };
    let session = app.services.sessions.create_session(caller, request).await?;
    print_json(&json!({
        "id": session.id,
        "owner": session.owner,
        "privacy": session.privacy,
    }))
}

pub async fn list(app: &App) -> Result<()> {
    print_json(&app.services.sessions.list_public().await?)
}

pub async fn joined(app: &App, caller: Option<&str>) -> Result<()> {
    let caller = require_caller(caller)?;
    print_json(&app.services.sessions.list_joined(caller).await?)
}

pub async fn invited(app: &App, caller: Option<&str>) -> Result<()> {
    let caller = require_caller(caller)?;
    print_json(&app.services.sessions.list_invited(caller).await?)
}

pub async fn join(app: &App, caller: Option<&str>, session_id: &str) -> Result<()> {
    let caller = require_caller(caller)?;
    let membership = app.services.memberships.join(session_id, caller).await?;
    print_json(&membership)
}

pub async fn invite(
    app: &App,
    caller: Option<&str>,
    session_id: &str,
    invitee: &str,
) -> Result<()> {
    let caller = require_caller(caller)?;
    let membership = app
        .services
        .memberships
        .invite(session_id, caller, invitee)
        .await?;
    print_json(&membership)
}

pub async fn set_permission(
    app: &App,
    caller: Option<&str>,
    session_id: &str,
    target: &str,
    role: &str,
) -> Result<()> {
    let caller = require_caller(caller)?;
    let membership = app
        .services
        .memberships
        .set_permission(session_id, caller, target, Some(role))
        .await?;
    print_json(&membership)
}
