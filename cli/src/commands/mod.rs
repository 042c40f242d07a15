//! Command implementations for the Roster CLI.
//!
//! Each subcommand is implemented in its own module. The helpers below are shared by the
//! commands that drive the dashboard controller.

pub mod add;
pub mod completions;
pub mod dashboard;
pub mod delete;
pub mod edit;
pub mod list;
pub mod login;
pub mod logout;
pub mod register;
pub mod status;

use std::fmt::Display;

use anyhow::Result;
use roster_business::{
    DashboardController, DashboardError, DashboardPhase, Form, FormError, Route, UserField,
    UserForm,
};
use tracing::warn;

pub use add::run_add;
pub use completions::generate_completions;
pub use dashboard::run_dashboard;
pub use delete::run_delete;
pub use edit::run_edit;
pub use list::run_list;
pub use login::run_login;
pub use logout::run_logout;
pub use register::run_register;
pub use status::run_status;

use crate::cli::UserFields;
use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{Ask, fill_form};

/// Print the message and exit non-zero.
pub fn fail(out: &Output, message: impl Display) -> ! {
    out.error(message);
    std::process::exit(1);
}

/// Mount the dashboard, printing whatever went wrong and exiting when no list could be
/// loaded.
pub async fn mount_or_exit(ctx: &AppContext, out: &Output) -> DashboardController {
    let mut dashboard = ctx.dashboard();
    let route = dashboard.mount().await;
    if route == Route::Login {
        out.notices(dashboard.take_notices());
        fail(out, "Session ended. Run `roster login` to sign in again.");
    }
    if let DashboardPhase::LoadFailed(_) = dashboard.phase() {
        out.notices(dashboard.take_notices());
        std::process::exit(1);
    }
    dashboard
}

/// Copy the flags that were given onto the draft.
pub fn apply_fields(form: &mut Form<UserForm>, fields: &UserFields) {
    let UserFields {
        names,
        age,
        gender,
        residence,
        guardian,
    } = fields;

    if let Some(names) = names {
        form.on_change(UserField::Names, names.clone());
    }
    if let Some(age) = age {
        form.on_change(UserField::Age, age.clone());
    }
    if let Some(gender) = gender {
        form.on_change(UserField::Gender, gender.as_str());
    }
    if let Some(residence) = residence {
        form.on_change(UserField::Residence, residence.clone());
    }
    if let Some(guardian) = guardian {
        form.on_change(UserField::Guardian, guardian.clone());
    }
}

/// Submit the open draft. Returns whether it was saved.
///
/// Field errors are printed; when `interactive`, only the failing fields are asked again
/// and the draft is resubmitted. Backend failures are printed from the controller's
/// notices and leave the draft open.
pub async fn submit_draft(
    dashboard: &mut DashboardController,
    out: &Output,
    interactive: bool,
) -> Result<bool> {
    loop {
        match dashboard.submit().await {
            Ok(()) => {
                out.notices(dashboard.take_notices());
                return Ok(true);
            }
            Err(DashboardError::Form(FormError::Invalid { .. })) => {
                out.error("Please fix the following:");
                if let Some(draft) = dashboard.draft() {
                    out.field_errors(draft.errors());
                }
                if !interactive {
                    return Ok(false);
                }
                if let Some(draft) = dashboard.draft_mut() {
                    fill_form(draft, Ask::Invalid)?;
                }
            }
            Err(DashboardError::Form(FormError::Api(err)) | DashboardError::Api(err)) => {
                warn!("Submit failed: {err}");
                out.notices(dashboard.take_notices());
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        }
    }
}
