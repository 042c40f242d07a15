//! Add command implementation.

use anyhow::{Context as _, Result};
use tracing::instrument;

use crate::cli::UserFields;
use crate::commands::{apply_fields, submit_draft};
use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{Ask, fill_form};

#[instrument(skip_all, name = "add")]
pub async fn run_add(ctx: AppContext, fields: UserFields) -> Result<()> {
    ctx.require_session()?;
    let out = Output::new();

    let mut dashboard = ctx.dashboard();
    dashboard.toggle_add()?;
    let draft = dashboard.draft_mut().context("Add form did not open")?;
    apply_fields(draft, &fields);
    if ctx.interactive {
        out.header("New user");
        fill_form(draft, Ask::Missing)?;
    }

    if !submit_draft(&mut dashboard, &out, ctx.interactive).await? {
        std::process::exit(1);
    }
    Ok(())
}
