//! Status command implementation.

use anyhow::Result;
use roster_business::ApiError;
use tracing::{info, instrument, warn};

use crate::commands::fail;
use crate::context::AppContext;
use crate::output::Output;

#[instrument(skip_all, name = "status")]
pub async fn run_status(ctx: AppContext, check: bool) -> Result<()> {
    let out = Output::new();
    let config = ctx.api.config();

    out.header("Roster");
    out.labeled("API", config.api_url());
    out.labeled("Session file", ctx.session_path.display());
    out.labeled("On expired token", config.unauthorized_policy);
    match config.request_timeout {
        Some(timeout) => out.labeled("Timeout", format!("{}s", timeout.as_secs())),
        None => out.labeled("Timeout", "none"),
    }
    out.newline();

    if !ctx.session.is_authenticated() {
        out.info("Not logged in");
        return Ok(());
    }
    out.success("Logged in");

    if !check {
        return Ok(());
    }

    match ctx.api.list_users(&ctx.session).await {
        Ok(users) => {
            info!(count = users.len(), "Token accepted");
            out.success(format!("Token accepted ({} users visible)", users.len()));
            Ok(())
        }
        Err(err @ ApiError::Auth { .. }) => {
            warn!("Token rejected: {err}");
            fail(&out, err);
        }
        Err(err) => fail(&out, format!("Could not verify the token: {err}")),
    }
}
