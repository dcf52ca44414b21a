use super::utils::print_json;
use crate::app::App;
use anyhow::{Result, bail};
use classroom_core::user::User;

/// Registers `username`; existing users are left untouched.
pub async fn add(app: &App, username: &str) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        bail!("username must not be blank");
    }

    let user = match app.users.find_by_username(username).await? {
        Some(existing) => existing,
        None => {
            let user = User::new(username);
            app.users.save(&user).await?;
            tracing::info!("[user] Registered {}", username);
            user
        }
    };
    print_json(&user)
}
