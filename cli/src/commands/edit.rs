//! Edit command implementation.

use anyhow::{Context as _, Result};
use tracing::instrument;

use crate::cli::UserFields;
use crate::commands::{apply_fields, fail, mount_or_exit, submit_draft};
use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{Ask, fill_form};

/// Loads the list first so the draft starts from the stored record; only the given flags
/// replace values. Without flags an interactive terminal is asked for every field.
#[instrument(skip_all, name = "edit", fields(id = %id))]
pub async fn run_edit(ctx: AppContext, id: String, fields: UserFields) -> Result<()> {
    ctx.require_session()?;
    let out = Output::new();

    let mut dashboard = mount_or_exit(&ctx, &out).await;
    if let Err(err) = dashboard.start_edit(&id) {
        fail(&out, err);
    }

    let draft = dashboard.draft_mut().context("Edit form did not open")?;
    apply_fields(draft, &fields);
    if ctx.interactive && fields.is_empty() {
        out.header(format!("Edit {id}"));
        fill_form(draft, Ask::All)?;
    }

    if !submit_draft(&mut dashboard, &out, ctx.interactive).await? {
        std::process::exit(1);
    }
    Ok(())
}
