//! Logout command implementation.

use anyhow::{Context as _, Result};
use roster_business::sign_out;
use tracing::{info, instrument};

use crate::context::AppContext;
use crate::output::Output;

#[instrument(skip_all, name = "logout")]
pub fn run_logout(mut ctx: AppContext) -> Result<()> {
    let out = Output::new();

    if !ctx.session.is_authenticated() {
        out.info("Not logged in");
        return Ok(());
    }

    sign_out(&mut ctx.session).context("Failed to clear the saved session")?;
    info!("Logged out");
    out.success("Logged out");
    out.labeled("Removed", ctx.session_path.display());
    Ok(())
}
