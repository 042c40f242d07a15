//! Admin sign-in, registration and sign-out.
//!
//! Each flow submits its form through [`UsersApi`] and, when the backend hands out a token,
//! starts the [`Session`]. The returned [`Route`] is where the shell should go next.

use log::info;

use crate::api::UsersApi;
use crate::form::{Form, FormError, LoginForm, RegisterForm};
use crate::guard::{Route, RouteGuard};
use crate::session::{Session, SessionError};

pub const REGISTERED_MESSAGE: &str = "Registration successful! Please login.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Form(#[from] FormError),
    /// The backend accepted the request but the token could not be persisted.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Message for the shell's error notification.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Submit the login form and start the session with the returned token.
pub async fn sign_in(
    api: &UsersApi,
    session: &mut Session,
    form: &mut Form<LoginForm>,
) -> Result<Route, AuthError> {
    let token = form
        .submit(|credentials| async move { api.login(&credentials).await })
        .await?;
    session.begin(token)?;
    info!("auth: signed in");
    Ok(RouteGuard::resolve(Route::Dashboard, session))
}

/// Submit the registration form.
///
/// When the backend signs the new admin in straight away the session starts and the
/// dashboard is next; otherwise the admin is sent to the login screen.
pub async fn register(
    api: &UsersApi,
    session: &mut Session,
    form: &mut Form<RegisterForm>,
) -> Result<Route, AuthError> {
    let token = form
        .submit(|registration| async move { api.register(&registration).await })
        .await?;
    match token {
        Some(token) => {
            session.begin(token)?;
            info!("auth: registered and signed in");
        }
        None => info!("auth: registered, sign-in required"),
    }
    Ok(RouteGuard::resolve(Route::Dashboard, session))
}

/// End the session. Always lands on the login screen.
pub fn sign_out(session: &mut Session) -> Result<Route, SessionError> {
    session.end()?;
    Ok(RouteGuard::resolve(Route::Dashboard, session))
}
