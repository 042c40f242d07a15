//! Configuration and session wiring shared by every command.

use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use roster_business::{
    BusinessConfig, DashboardController, FileSessionStore, Route, RouteGuard, Session,
    UnauthorizedPolicy, UsersApi, validate_base_url,
};
use tracing::{debug, instrument};

use crate::cli::GlobalArgs;

/// Everything a command needs: the API client, the loaded session and where it lives.
pub struct AppContext {
    pub api: UsersApi,
    pub session: Session,
    pub session_path: PathBuf,
    pub interactive: bool,
}

/// Environment first, then flags on top.
pub fn resolve_config(args: &GlobalArgs) -> Result<BusinessConfig> {
    let mut config = BusinessConfig::from_env().context("Invalid ROSTER_* environment")?;

    if let Some(url) = &args.api_url {
        validate_base_url(url)?;
        config.api_base_url.clone_from(url);
    }
    if let Some(secs) = args.timeout {
        config = config.with_request_timeout(Some(Duration::from_secs(secs)));
    }
    if args.logout_on_expired {
        config = config.with_unauthorized_policy(UnauthorizedPolicy::ForceLogout);
    }
    Ok(config)
}

impl AppContext {
    #[instrument(skip_all, name = "context")]
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let config = resolve_config(args)?;
        debug!(
            api = %config.api_url(),
            policy = %config.unauthorized_policy,
            "Resolved configuration"
        );

        let session_path = match &args.session_file {
            Some(path) => path.clone(),
            None => FileSessionStore::default_path()?,
        };
        let session = Session::load(Arc::new(FileSessionStore::new(&session_path)))
            .with_context(|| format!("Failed to load session from {}", session_path.display()))?;

        Ok(Self {
            api: UsersApi::new(config),
            session,
            session_path,
            interactive: std::io::stdin().is_terminal(),
        })
    }

    /// Fails with a hint when the route guard would send the admin to the login screen.
    pub fn require_session(&self) -> Result<()> {
        if RouteGuard::resolve(Route::Dashboard, &self.session) == Route::Login {
            bail!("Not logged in. Run `roster login` first.");
        }
        Ok(())
    }

    pub fn dashboard(&self) -> DashboardController {
        DashboardController::new(self.api.clone(), self.session.clone())
    }
}
