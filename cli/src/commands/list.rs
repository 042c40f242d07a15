//! List command implementation.

use anyhow::Result;
use chrono::Local;
use roster_business::{Gender, SortKey};
use tracing::{debug, instrument};

use crate::commands::mount_or_exit;
use crate::context::AppContext;
use crate::output::Output;

#[instrument(skip_all, name = "list")]
pub async fn run_list(
    ctx: AppContext,
    search: Option<String>,
    gender: Option<Gender>,
    sort: SortKey,
) -> Result<()> {
    ctx.require_session()?;
    let out = Output::new();

    let mut dashboard = mount_or_exit(&ctx, &out).await;
    dashboard.set_search(search.unwrap_or_default());
    dashboard.set_gender_filter(gender);
    dashboard.set_sort(sort);
    debug!(filter = ?dashboard.filter(), "Applying filter");

    out.users(&dashboard.view());
    if let Some(fetched) = dashboard.last_fetch() {
        out.dim(format!(
            "Fetched at {}",
            fetched.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));
    }
    Ok(())
}
