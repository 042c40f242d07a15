//! Interactive dashboard: a menu loop over the dashboard controller.

use std::fmt;

use anyhow::{Context as _, Result, bail};
use chrono::Local;
use inquire::{Select, Text};
use roster_business::{
    Confirm as _, DashboardController, DashboardError, DashboardPhase, Gender, Route, SortKey,
};
use tracing::{debug, instrument};

use crate::commands::submit_draft;
use crate::context::AppContext;
use crate::output::Output;
use crate::prompt::{Ask, TerminalConfirm, fill_form};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Refresh,
    Add,
    Edit,
    Delete,
    Search,
    FilterGender,
    Sort,
    ClearFilters,
    Logout,
    Quit,
}

impl Action {
    const ALL: [Self; 10] = [
        Self::Refresh,
        Self::Add,
        Self::Edit,
        Self::Delete,
        Self::Search,
        Self::FilterGender,
        Self::Sort,
        Self::ClearFilters,
        Self::Logout,
        Self::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Refresh => "Refresh",
            Self::Add => "Add user",
            Self::Edit => "Edit user",
            Self::Delete => "Delete user",
            Self::Search => "Search",
            Self::FilterGender => "Filter by gender",
            Self::Sort => "Sort",
            Self::ClearFilters => "Clear filters",
            Self::Logout => "Logout",
            Self::Quit => "Quit",
        })
    }
}

/// A row offered when picking a user to edit or delete.
struct UserChoice {
    id: String,
    label: String,
}

impl fmt::Display for UserChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Pick from the users currently shown. `None` when the list is empty or the admin escaped.
fn pick_user(dashboard: &DashboardController, out: &Output) -> Result<Option<String>> {
    let choices: Vec<UserChoice> = dashboard
        .view()
        .users
        .iter()
        .map(|user| UserChoice {
            id: user.id.clone(),
            label: format!("{} ({}, {})", user.names, user.age, user.residence),
        })
        .collect();
    if choices.is_empty() {
        out.dim("No users to choose from.");
        return Ok(None);
    }

    let picked = Select::new("User:", choices)
        .prompt_skippable()
        .context("Failed to read user")?;
    Ok(picked.map(|choice| choice.id))
}

fn render(dashboard: &DashboardController, out: &Output) {
    out.newline();
    out.header("Roster dashboard");

    let filter = dashboard.filter();
    if filter.is_active() {
        let gender = filter.gender.map_or("any", Gender::as_str);
        out.dim(format!(
            "Search '{}'  Gender {}  Sort {}",
            filter.search, gender, filter.sort
        ));
    }
    if let DashboardPhase::LoadFailed(message) = dashboard.phase() {
        out.warning(format!("Showing the last loaded list: {message}"));
    }

    out.users(&dashboard.view());
    if let Some(fetched) = dashboard.last_fetch() {
        out.dim(format!(
            "Fetched at {}",
            fetched.with_timezone(&Local).format("%H:%M:%S")
        ));
    }
}

/// Submit the open draft until it is saved or the admin gives up on it.
async fn save_draft(dashboard: &mut DashboardController, out: &Output) -> Result<()> {
    loop {
        if submit_draft(dashboard, out, true).await? {
            return Ok(());
        }
        if !TerminalConfirm.confirm("Change the values and try again?") {
            dashboard.cancel();
            return Ok(());
        }
        if let Some(draft) = dashboard.draft_mut() {
            fill_form(draft, Ask::All)?;
        }
    }
}

/// Mutations already queued their failure as a notice; anything else is a real error.
fn tolerate_api(result: Result<(), DashboardError>) -> Result<()> {
    match result {
        Ok(()) | Err(DashboardError::Api(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

async fn handle(
    action: Action,
    dashboard: &mut DashboardController,
    out: &Output,
) -> Result<()> {
    match action {
        Action::Refresh => tolerate_api(dashboard.refetch().await)?,
        Action::Add => {
            dashboard.toggle_add()?;
            if let Some(draft) = dashboard.draft_mut() {
                fill_form(draft, Ask::All)?;
            }
            save_draft(dashboard, out).await?;
        }
        Action::Edit => {
            if let Some(id) = pick_user(dashboard, out)? {
                dashboard.start_edit(&id)?;
                if let Some(draft) = dashboard.draft_mut() {
                    fill_form(draft, Ask::All)?;
                }
                save_draft(dashboard, out).await?;
            }
        }
        Action::Delete => {
            if let Some(id) = pick_user(dashboard, out)? {
                let result = dashboard.delete(&id, &mut TerminalConfirm).await;
                tolerate_api(result.map(|_| ()))?;
            }
        }
        Action::Search => {
            let term = Text::new("Search:")
                .with_default(&dashboard.filter().search)
                .prompt()
                .context("Failed to read search term")?;
            dashboard.set_search(term);
        }
        Action::FilterGender => {
            let mut options = vec!["Any"];
            options.extend(Gender::ALL.map(Gender::as_str));
            let picked = Select::new("Gender:", options)
                .prompt()
                .context("Failed to read gender")?;
            dashboard.set_gender_filter(picked.parse().ok());
        }
        Action::Sort => {
            let sort = Select::new("Sort by:", SortKey::ALL.to_vec())
                .prompt()
                .context("Failed to read sort key")?;
            dashboard.set_sort(sort);
        }
        Action::ClearFilters => {
            dashboard.set_search("");
            dashboard.set_gender_filter(None);
            dashboard.set_sort(SortKey::None);
        }
        Action::Logout | Action::Quit => {}
    }
    Ok(())
}

#[instrument(skip_all, name = "dashboard")]
pub async fn run_dashboard(ctx: AppContext) -> Result<()> {
    if !ctx.interactive {
        bail!("The dashboard needs an interactive terminal. Use `roster list` instead.");
    }
    ctx.require_session()?;
    let out = Output::new();

    let mut dashboard = ctx.dashboard();
    if dashboard.mount().await == Route::Login {
        out.notices(dashboard.take_notices());
        bail!("Session ended. Run `roster login` to sign in again.");
    }

    loop {
        out.notices(dashboard.take_notices());
        if *dashboard.phase() == DashboardPhase::Unauthenticated {
            out.warning("Session ended. Run `roster login` to sign in again.");
            return Ok(());
        }
        render(&dashboard, &out);

        let Some(action) = Select::new("Action:", Action::ALL.to_vec())
            .with_page_size(Action::ALL.len())
            .prompt_skippable()
            .context("Failed to read action")?
        else {
            return Ok(());
        };
        debug!(%action, "Dashboard action");

        match action {
            Action::Quit => return Ok(()),
            Action::Logout => {
                dashboard.logout()?;
                out.success("Logged out");
                return Ok(());
            }
            other => handle(other, &mut dashboard, &out).await?,
        }
    }
}
