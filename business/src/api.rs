//! Admin and users API client.
//!
//! Every operation is a single round trip. Protected calls read the bearer token from the
//! [`Session`] they are handed; nothing here touches persisted state. Failures are mapped
//! into [`ApiError`] with the backend's `{ "message": ... }` surfaced verbatim when present
//! and a per-operation fallback otherwise.

use log::{error, info, warn};

use crate::BusinessConfig;
use crate::http::{Client, HttpError, RequestBuilder, Response};
use crate::model::{
    ErrorBody, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserDraft,
};
use crate::session::Session;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 401, or rejected credentials on login.
    #[error("{message}")]
    Auth { message: String },
    /// 4xx on a mutation or registration.
    #[error("{message}")]
    Validation { status: u16, message: String },
    /// 404 on update or delete.
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The request never completed.
    #[error("Network error: {0}")]
    Network(String),
    /// A 2xx response whose body could not be read.
    #[error("Failed to parse server response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        if err.timed_out {
            Self::Network(format!("request timed out ({})", err.message))
        } else {
            Self::Network(err.message)
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Login,
    Register,
    ListUsers,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::ListUsers => "list_users",
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed. Please try again.",
            Self::Register => "Registration failed",
            Self::ListUsers => "Failed to fetch users. Please try again.",
            Self::CreateUser => "Failed to add user. Please try again.",
            Self::UpdateUser => "Update failed. Please try again.",
            Self::DeleteUser => "Delete failed. Please try again.",
        }
    }

    fn error_for(self, status: u16, message: Option<String>) -> ApiError {
        let msg = || {
            message
                .clone()
                .unwrap_or_else(|| self.fallback_message().to_owned())
        };
        match (self, status) {
            (Self::Login, _) => ApiError::Auth { message: msg() },
            (Self::Register, _) => ApiError::Validation {
                status,
                message: msg(),
            },
            // The list view shows a fixed prompt regardless of what the backend says.
            (Self::ListUsers, 401) => ApiError::Auth {
                message: SESSION_EXPIRED_MESSAGE.to_owned(),
            },
            (Self::ListUsers, _) => ApiError::Server {
                status,
                message: self.fallback_message().to_owned(),
            },
            (_, 401) => ApiError::Auth {
                message: message
                    .clone()
                    .unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_owned()),
            },
            (Self::UpdateUser | Self::DeleteUser, 404) => ApiError::NotFound { message: msg() },
            (_, 400..=499) => ApiError::Validation {
                status,
                message: msg(),
            },
            _ => ApiError::Server {
                status,
                message: msg(),
            },
        }
    }
}

/// Extracts `{ "message": ... }` from an error body, ignoring blank messages.
fn extract_error_message(response: &Response) -> Option<String> {
    response
        .json::<ErrorBody>()
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.trim().is_empty())
}

fn failure(op: Operation, response: &Response) -> ApiError {
    let err = op.error_for(response.status, extract_error_message(response));
    if response.status >= 500 {
        error!("{}: server returned {}: {err}", op.name(), response.status);
    } else {
        warn!("{}: server returned {}: {err}", op.name(), response.status);
    }
    err
}

/// Client for the admin (`/admin/*`) and users (`/users`) endpoints.
#[derive(Debug, Clone)]
pub struct UsersApi {
    config: BusinessConfig,
}

impl UsersApi {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    fn request(&self, builder: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        builder
            .bearer(session.and_then(Session::token))
            .timeout(self.config.request_timeout)
    }

    async fn send(op: Operation, request: RequestBuilder) -> ApiResult<Response> {
        request.send().await.map_err(|e| {
            error!("{}: request failed: {e}", op.name());
            ApiError::from(e)
        })
    }

    fn with_json<T: serde::Serialize>(
        request: RequestBuilder,
        body: &T,
    ) -> ApiResult<RequestBuilder> {
        request
            .json(body)
            .map_err(|e| ApiError::Decode(format!("failed to serialize request: {e}")))
    }

    /// POST `/admin/login`, returning the session token.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<String> {
        let op = Operation::Login;
        info!("login: signing in as '{}'", credentials.email);

        let request = Self::with_json(
            self.request(Client::post(self.config.endpoint("/admin/login")), None),
            credentials,
        )?;
        let response = Self::send(op, request).await?;

        if !response.is_success() {
            return Err(failure(op, &response));
        }

        let body: LoginResponse = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("server did not return a session token".to_owned()))
    }

    /// POST `/admin/register`. Some backends sign the new admin in immediately, in which case
    /// the token is returned.
    pub async fn register(&self, registration: &RegisterRequest) -> ApiResult<Option<String>> {
        let op = Operation::Register;
        info!("register: creating admin '{}'", registration.email);

        let request = Self::with_json(
            self.request(Client::post(self.config.endpoint("/admin/register")), None),
            registration,
        )?;
        let response = Self::send(op, request).await?;

        if !response.is_success() {
            return Err(failure(op, &response));
        }

        let body = if response.has_body() {
            response.json::<RegisterResponse>().unwrap_or_default()
        } else {
            RegisterResponse::default()
        };
        Ok(body.token.filter(|t| !t.is_empty()))
    }

    /// GET `/users`
    pub async fn list_users(&self, session: &Session) -> ApiResult<Vec<User>> {
        let op = Operation::ListUsers;
        let request = self.request(Client::get(self.config.endpoint("/users")), Some(session));
        let response = Self::send(op, request).await?;

        if !response.is_success() {
            return Err(failure(op, &response));
        }

        let users: Vec<User> = response.json().map_err(|e| {
            error!("list_users: failed to parse user list: {e}");
            ApiError::Decode(e.to_string())
        })?;
        info!("list_users: fetched {} user(s)", users.len());
        Ok(users)
    }

    /// POST `/users`
    ///
    /// The created record is returned when the backend echoes it; callers refetch the list
    /// either way.
    pub async fn create_user(
        &self,
        session: &Session,
        draft: &UserDraft,
    ) -> ApiResult<Option<User>> {
        let op = Operation::CreateUser;
        let request = Self::with_json(
            self.request(Client::post(self.config.endpoint("/users")), Some(session)),
            draft,
        )?;
        let response = Self::send(op, request).await?;

        if !response.is_success() {
            return Err(failure(op, &response));
        }

        info!("create_user: created '{}'", draft.names);
        Ok(response.json::<User>().ok())
    }

    /// PUT `/users/{id}`
    pub async fn update_user(
        &self,
        session: &Session,
        id: &str,
        draft: &UserDraft,
    ) -> ApiResult<Option<User>> {
        let op = Operation::UpdateUser;
        let request = Self::with_json(
            self.request(
                Client::put(self.config.endpoint(&format!("/users/{id}"))),
                Some(session),
            ),
            draft,
        )?;
        let response = Self::send(op, request).await?;

        if !response.is_success() {
            return Err(failure(op, &response));
        }

        info!("update_user: updated {id}");
        Ok(response.json::<User>().ok())
    }

    /// DELETE `/users/{id}`
    ///
    /// A repeated delete of the same id surfaces as [`ApiError::NotFound`].
    pub async fn delete_user(&self, session: &Session, id: &str) -> ApiResult<()> {
        let op = Operation::DeleteUser;
        let request = self.request(
            Client::delete(self.config.endpoint(&format!("/users/{id}"))),
            Some(session),
        );
        let response = Self::send(op, request).await?;

        if !response.is_success() {
            return Err(failure(op, &response));
        }

        info!("delete_user: deleted {id}");
        Ok(())
    }
}
