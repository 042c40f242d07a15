//! Delete command implementation.

use anyhow::{Result, bail};
use roster_business::DashboardError;
use tracing::{info, instrument};

use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{AssumeYes, TerminalConfirm};

#[instrument(skip_all, name = "delete", fields(id = %id))]
pub async fn run_delete(ctx: AppContext, id: String, yes: bool) -> Result<()> {
    ctx.require_session()?;
    let out = Output::new();

    let mut dashboard = ctx.dashboard();
    let result = if yes {
        dashboard.delete(&id, &mut AssumeYes).await
    } else if ctx.interactive {
        dashboard.delete(&id, &mut TerminalConfirm).await
    } else {
        bail!("Refusing to delete without confirmation. Pass --yes to skip the prompt.");
    };
    out.notices(dashboard.take_notices());

    match result {
        Ok(true) => Ok(()),
        Ok(false) => {
            info!("Delete cancelled");
            out.info("Cancelled");
            Ok(())
        }
        Err(DashboardError::Api(_)) => std::process::exit(1),
        Err(err) => Err(err.into()),
    }
}
