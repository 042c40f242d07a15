//! Dashboard controller.
//!
//! Owns the fetched user list, the add/edit draft and the filter inputs. Every successful
//! mutation is followed by a full refetch so the list always reflects the backend.
//!
//! ## Phases
//!
//! ```text
//! Unauthenticated --mount--> Loading --ok--> Ready (Viewing | Adding | Editing(id))
//!                                    \--err-> LoadFailed(message)
//! any --logout--> Unauthenticated
//! ```
//!
//! Outcomes the admin should see are queued as [`Notice`]s; the shell drains them with
//! [`DashboardController::take_notices`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::api::{ApiError, UsersApi};
use crate::config::UnauthorizedPolicy;
use crate::form::{Form, FormError, UserForm};
use crate::guard::{Route, RouteGuard};
use crate::model::{Gender, User};
use crate::session::{Session, SessionError};
use crate::view::{DerivedView, SortKey, UserFilter, derive_view};

pub const DELETE_PROMPT: &str = "Are you sure to delete this user?";
pub const USER_ADDED_MESSAGE: &str = "User added successfully!";
pub const USER_UPDATED_MESSAGE: &str = "User updated successfully!";
pub const USER_DELETED_MESSAGE: &str = "User deleted successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardPhase {
    Unauthenticated,
    Loading,
    Ready,
    LoadFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMode {
    Viewing,
    Adding,
    Editing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Blocking yes/no question asked before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Please login to continue")]
    Unauthenticated,
    #[error("No user with id '{0}'")]
    UnknownUser(String),
    #[error("No add or edit form is open")]
    NoDraft,
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug)]
pub struct DashboardController {
    api: UsersApi,
    session: Session,
    policy: UnauthorizedPolicy,
    phase: DashboardPhase,
    mode: DashboardMode,
    users: Vec<User>,
    filter: UserFilter,
    draft: Option<Form<UserForm>>,
    last_fetch: Option<DateTime<Utc>>,
    notices: VecDeque<Notice>,
}

impl DashboardController {
    /// The 401 policy is taken from the client's configuration.
    pub fn new(api: UsersApi, session: Session) -> Self {
        let policy = api.config().unauthorized_policy;
        Self {
            api,
            session,
            policy,
            phase: DashboardPhase::Unauthenticated,
            mode: DashboardMode::Viewing,
            users: Vec::new(),
            filter: UserFilter::default(),
            draft: None,
            last_fetch: None,
            notices: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> &DashboardPhase {
        &self.phase
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// When the list was last fetched successfully.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    fn ensure_authenticated(&self) -> Result<(), DashboardError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(DashboardError::Unauthenticated)
        }
    }

    /// Entry point when the dashboard is shown. Returns the route the shell should display.
    pub async fn mount(&mut self) -> Route {
        let route = RouteGuard::resolve(Route::Dashboard, &self.session);
        if route != Route::Dashboard {
            self.phase = DashboardPhase::Unauthenticated;
            return route;
        }

        self.mode = DashboardMode::Viewing;
        self.draft = None;
        // Failures are already queued as notices and reflected in the phase.
        if let Err(e) = self.refetch().await {
            info!("dashboard: mount finished without data: {e}");
        }
        RouteGuard::resolve(Route::Dashboard, &self.session)
    }

    /// Replace the list with the backend's current state.
    pub async fn refetch(&mut self) -> Result<(), DashboardError> {
        self.ensure_authenticated()?;
        self.phase = DashboardPhase::Loading;

        match self.api.list_users(&self.session).await {
            Ok(users) => {
                self.users = users;
                self.last_fetch = Some(Utc::now());
                self.phase = DashboardPhase::Ready;
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                self.notify(Notice::error(message.clone()));
                if err.is_unauthorized() && self.policy == UnauthorizedPolicy::ForceLogout {
                    warn!("dashboard: token rejected, ending session");
                    self.reset_to_unauthenticated()?;
                } else {
                    self.phase = DashboardPhase::LoadFailed(message);
                }
                Err(err.into())
            }
        }
    }

    /// Refetch after a mutation already succeeded. The mutation's outcome stands either way.
    async fn resync(&mut self) {
        if let Err(e) = self.refetch().await {
            error!("dashboard: refetch after mutation failed: {e}");
        }
    }

    /// Open an empty add form, or close it if it is already open.
    pub fn toggle_add(&mut self) -> Result<(), DashboardError> {
        self.ensure_authenticated()?;
        if self.mode == DashboardMode::Adding {
            self.cancel();
        } else {
            self.mode = DashboardMode::Adding;
            self.draft = Some(Form::new());
        }
        Ok(())
    }

    /// Open the edit form for `id`, pre-populated from the fetched record.
    pub fn start_edit(&mut self, id: &str) -> Result<(), DashboardError> {
        self.ensure_authenticated()?;
        let user = self
            .user(id)
            .ok_or_else(|| DashboardError::UnknownUser(id.to_owned()))?;
        let draft = Form::from_user(user);
        self.mode = DashboardMode::Editing(id.to_owned());
        self.draft = Some(draft);
        Ok(())
    }

    /// Back to viewing; the draft is discarded.
    pub fn cancel(&mut self) {
        self.mode = DashboardMode::Viewing;
        self.draft = None;
    }

    pub fn draft(&self) -> Option<&Form<UserForm>> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Form<UserForm>> {
        self.draft.as_mut()
    }

    /// Create or update, depending on the mode, then refetch.
    ///
    /// On failure the draft and mode are left as they were so the admin can correct and
    /// resubmit.
    pub async fn submit(&mut self) -> Result<(), DashboardError> {
        self.ensure_authenticated()?;
        let Some(draft) = self.draft.as_mut() else {
            return Err(DashboardError::NoDraft);
        };
        let api = &self.api;
        let session = &self.session;

        let (result, success_message) = match &self.mode {
            DashboardMode::Adding => (
                draft
                    .submit(|payload| async move {
                        api.create_user(session, &payload).await.map(|_| ())
                    })
                    .await,
                USER_ADDED_MESSAGE,
            ),
            DashboardMode::Editing(id) => (
                draft
                    .submit(|payload| async move {
                        api.update_user(session, id, &payload).await.map(|_| ())
                    })
                    .await,
                USER_UPDATED_MESSAGE,
            ),
            DashboardMode::Viewing => return Err(DashboardError::NoDraft),
        };

        match result {
            Ok(()) => {
                self.notify(Notice::success(success_message));
                self.cancel();
                self.resync().await;
                Ok(())
            }
            Err(FormError::Api(err)) => {
                self.notify(Notice::error(err.to_string()));
                Err(FormError::Api(err).into())
            }
            // Field errors stay on the draft.
            Err(err) => Err(err.into()),
        }
    }

    /// Delete after confirmation. Returns `false` when the admin declined.
    pub async fn delete(
        &mut self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> Result<bool, DashboardError> {
        self.ensure_authenticated()?;
        if !confirm.confirm(DELETE_PROMPT) {
            info!("dashboard: delete of {id} declined");
            return Ok(false);
        }

        match self.api.delete_user(&self.session, id).await {
            Ok(()) => {
                self.notify(Notice::success(USER_DELETED_MESSAGE));
                if self.mode == DashboardMode::Editing(id.to_owned()) {
                    self.cancel();
                }
                self.resync().await;
                Ok(true)
            }
            Err(err) => {
                self.notify(Notice::error(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// End the session and drop everything fetched with it.
    pub fn logout(&mut self) -> Result<Route, DashboardError> {
        self.reset_to_unauthenticated()?;
        Ok(RouteGuard::resolve(Route::Dashboard, &self.session))
    }

    fn reset_to_unauthenticated(&mut self) -> Result<(), SessionError> {
        self.users.clear();
        self.last_fetch = None;
        self.cancel();
        self.phase = DashboardPhase::Unauthenticated;
        self.session.end()
    }

    pub fn filter(&self) -> &UserFilter {
        &self.filter
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search = term.into();
    }

    pub fn set_gender_filter(&mut self, gender: Option<Gender>) {
        self.filter.gender = gender;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.filter.sort = sort;
    }

    /// Filtered list and statistics for the current inputs.
    pub fn view(&self) -> DerivedView<'_> {
        derive_view(&self.users, &self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BusinessConfig;
    use crate::api::SESSION_EXPIRED_MESSAGE;
    use crate::form::UserField;
    use crate::test_utils::{TEST_TOKEN, TestContext, user};

    fn ada() -> User {
        user("1", "Ada Obi", 12, Gender::Female, "Kigali", "Grace Obi")
    }

    fn tom() -> User {
        user("2", "Tom Ndayisaba", 9, Gender::Male, "Huye", "Ann Uwase")
    }

    async fn authenticated() -> TestContext {
        let mut test_ctx = TestContext::new().await;
        test_ctx.set_authenticated(TEST_TOKEN);
        test_ctx
    }

    fn controller(test_ctx: &TestContext) -> DashboardController {
        DashboardController::new(test_ctx.api.clone(), test_ctx.session.clone())
    }

    fn fill(draft: &mut Form<UserForm>, user: &User) {
        draft.on_change(UserField::Names, user.names.clone());
        draft.on_change(UserField::Age, user.age.to_string());
        draft.on_change(UserField::Gender, user.gender.as_str());
        draft.on_change(UserField::Residence, user.residence.clone());
        draft.on_change(UserField::Guardian, user.guardian.clone());
    }

    #[tokio::test]
    async fn test_mount_without_token_redirects() {
        let test_ctx = TestContext::new().await;
        let mut dashboard = controller(&test_ctx);

        assert_eq!(dashboard.mount().await, Route::Login);
        assert_eq!(dashboard.phase(), &DashboardPhase::Unauthenticated);
        assert_eq!(test_ctx.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_mount_loads_users() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada(), tom()]).await;
        let mut dashboard = controller(&test_ctx);

        assert_eq!(dashboard.mount().await, Route::Dashboard);
        assert_eq!(dashboard.phase(), &DashboardPhase::Ready);
        assert_eq!(&dashboard.mode, &DashboardMode::Viewing);
        assert_eq!(dashboard.users().len(), 2);
        assert!(dashboard.last_fetch().is_some());
        assert!(dashboard.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_mount_expired_token_reports_by_default() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users_error(401, "jwt expired").await;
        let mut dashboard = controller(&test_ctx);

        assert_eq!(dashboard.mount().await, Route::Dashboard);
        assert_eq!(
            dashboard.phase(),
            &DashboardPhase::LoadFailed(SESSION_EXPIRED_MESSAGE.to_owned())
        );
        assert_eq!(
            dashboard.take_notices(),
            vec![Notice::error(SESSION_EXPIRED_MESSAGE)]
        );
        assert!(dashboard.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_mount_expired_token_force_logout() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users_error(401, "jwt expired").await;
        let config = BusinessConfig::new(test_ctx.mock_server.uri())
            .with_unauthorized_policy(UnauthorizedPolicy::ForceLogout);
        let mut dashboard =
            DashboardController::new(UsersApi::new(config), test_ctx.session.clone());

        assert_eq!(dashboard.mount().await, Route::Login);
        assert_eq!(dashboard.phase(), &DashboardPhase::Unauthenticated);
        assert!(!dashboard.session.is_authenticated());
        assert_eq!(dashboard.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn test_mount_server_error_is_generic() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users_error(500, "boom").await;
        let mut dashboard = controller(&test_ctx);

        dashboard.mount().await;
        assert_eq!(
            dashboard.phase(),
            &DashboardPhase::LoadFailed("Failed to fetch users. Please try again.".to_owned())
        );
    }

    #[tokio::test]
    async fn test_toggle_add_and_cancel() {
        let test_ctx = authenticated().await;
        let mut dashboard = controller(&test_ctx);

        dashboard.toggle_add().unwrap();
        assert_eq!(&dashboard.mode, &DashboardMode::Adding);
        assert!(dashboard.draft().is_some());

        dashboard.toggle_add().unwrap();
        assert_eq!(&dashboard.mode, &DashboardMode::Viewing);
        assert!(dashboard.draft().is_none());
    }

    #[tokio::test]
    async fn test_start_edit_unknown_id_keeps_mode() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada()]).await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        let err = dashboard.start_edit("missing").unwrap_err();
        assert!(matches!(err, DashboardError::UnknownUser(ref id) if id == "missing"));
        assert_eq!(&dashboard.mode, &DashboardMode::Viewing);

        dashboard.start_edit("1").unwrap();
        assert_eq!(&dashboard.mode, &DashboardMode::Editing("1".to_owned()));
        assert_eq!(
            dashboard.draft().unwrap().value(UserField::Names),
            "Ada Obi"
        );
    }

    #[tokio::test]
    async fn test_submit_add_notifies_and_returns_to_viewing() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada()]).await;
        test_ctx.mock_create_user(&ada()).await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        dashboard.toggle_add().unwrap();
        fill(dashboard.draft_mut().unwrap(), &ada());
        dashboard.submit().await.unwrap();

        assert_eq!(&dashboard.mode, &DashboardMode::Viewing);
        assert!(dashboard.draft().is_none());
        assert_eq!(
            dashboard.take_notices(),
            vec![Notice::success(USER_ADDED_MESSAGE)]
        );
        // mount, create, refetch
        assert_eq!(test_ctx.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_submit_edit_sends_update() {
        let test_ctx = authenticated().await;
        let mut moved = ada();
        moved.residence = "Rubavu".to_owned();
        test_ctx.mock_list_users(vec![ada()]).await;
        test_ctx.mock_update_user(&moved).await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        dashboard.start_edit("1").unwrap();
        dashboard
            .draft_mut()
            .unwrap()
            .on_change(UserField::Residence, "Rubavu");
        dashboard.submit().await.unwrap();

        assert_eq!(&dashboard.mode, &DashboardMode::Viewing);
        assert_eq!(
            dashboard.take_notices(),
            vec![Notice::success(USER_UPDATED_MESSAGE)]
        );
    }

    #[tokio::test]
    async fn test_submit_invalid_draft_sends_nothing() {
        let test_ctx = authenticated().await;
        let mut dashboard = controller(&test_ctx);

        dashboard.toggle_add().unwrap();
        let err = dashboard.submit().await.unwrap_err();

        assert!(matches!(err, DashboardError::Form(FormError::Invalid { .. })));
        assert_eq!(&dashboard.mode, &DashboardMode::Adding);
        assert!(!dashboard.draft().unwrap().errors().is_empty());
        assert_eq!(test_ctx.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_draft() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada()]).await;
        test_ctx
            .mock_mutation_error("PUT", "/users/1", 400, "age must be a number")
            .await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        dashboard.start_edit("1").unwrap();
        dashboard
            .draft_mut()
            .unwrap()
            .on_change(UserField::Residence, "Rubavu");
        let err = dashboard.submit().await.unwrap_err();

        assert!(matches!(err, DashboardError::Form(FormError::Api(ApiError::Validation { .. }))));
        assert_eq!(&dashboard.mode, &DashboardMode::Editing("1".to_owned()));
        assert_eq!(
            dashboard.draft().unwrap().value(UserField::Residence),
            "Rubavu"
        );
        assert_eq!(
            dashboard.take_notices(),
            vec![Notice::error("age must be a number")]
        );
    }

    #[tokio::test]
    async fn test_submit_without_draft() {
        let test_ctx = authenticated().await;
        let mut dashboard = controller(&test_ctx);
        assert!(matches!(
            dashboard.submit().await,
            Err(DashboardError::NoDraft)
        ));
    }

    #[tokio::test]
    async fn test_delete_declined_does_nothing() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada()]).await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        let mut asked = None;
        let deleted = dashboard
            .delete("1", &mut |prompt: &str| {
                asked = Some(prompt.to_owned());
                false
            })
            .await
            .unwrap();

        assert!(!deleted);
        assert_eq!(asked.as_deref(), Some(DELETE_PROMPT));
        assert_eq!(test_ctx.request_count().await, 1);
        assert_eq!(dashboard.users().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_confirmed_refetches() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada()]).await;
        test_ctx.mock_delete_user("1").await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        let deleted = dashboard.delete("1", &mut |_: &str| true).await.unwrap();

        assert!(deleted);
        assert_eq!(
            dashboard.take_notices(),
            vec![Notice::success(USER_DELETED_MESSAGE)]
        );
        assert_eq!(test_ctx.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_list() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada()]).await;
        test_ctx.mock_mutation_error("DELETE", "/users/1", 404, "").await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        let err = dashboard.delete("1", &mut |_: &str| true).await.unwrap_err();

        assert!(matches!(err, DashboardError::Api(ApiError::NotFound { .. })));
        assert_eq!(dashboard.users().len(), 1);
        assert_eq!(
            dashboard.take_notices(),
            vec![Notice::error("Delete failed. Please try again.")]
        );
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada(), tom()]).await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        assert_eq!(dashboard.logout().unwrap(), Route::Login);
        assert!(dashboard.users().is_empty());
        assert_eq!(dashboard.phase(), &DashboardPhase::Unauthenticated);
        assert!(matches!(
            dashboard.toggle_add(),
            Err(DashboardError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_view_follows_filter_inputs() {
        let test_ctx = authenticated().await;
        test_ctx.mock_list_users(vec![ada(), tom()]).await;
        let mut dashboard = controller(&test_ctx);
        dashboard.mount().await;

        dashboard.set_gender_filter(Some(Gender::Male));
        assert_eq!(dashboard.view().users.len(), 1);

        dashboard.set_gender_filter(None);
        dashboard.set_search("kigali");
        dashboard.set_sort(SortKey::Age);
        let view = dashboard.view();
        assert_eq!(view.users.len(), 1);
        assert_eq!(view.users[0].id, "1");
        assert_eq!(view.stats.total, 2);
    }
}
