//! Business layer of the Roster admin console: session, API client, forms and the
//! dashboard controller. Presentation lives in `roster-cli`.

pub mod api;
pub mod auth;
mod config;
pub mod dashboard;
pub mod form;
pub mod guard;
pub mod http;
mod model;
pub mod session;
mod test_utils;
pub mod view;

pub use api::{ApiError, ApiResult, SESSION_EXPIRED_MESSAGE, UsersApi};
pub use auth::{AuthError, REGISTERED_MESSAGE, register, sign_in, sign_out};
pub use config::{
    BusinessConfig, ConfigError, DEFAULT_API_BASE_URL, UnauthorizedPolicy, validate_base_url,
};
pub use dashboard::{
    Confirm, DELETE_PROMPT, DashboardController, DashboardError, DashboardMode, DashboardPhase,
    Notice, NoticeLevel,
};
pub use form::{
    FieldSpec, Form, FormError, FormSchema, LoginField, LoginForm, RegisterField, RegisterForm,
    UserField, UserForm,
};
pub use guard::{Route, RouteGuard};
pub use model::{
    AdminRole, Gender, LoginRequest, ParseGenderError, RegisterRequest, User, UserDraft,
};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};
pub use view::{DerivedView, SortKey, UserFilter, UserStats, derive_view};
