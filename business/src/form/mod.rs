//! Controlled-input forms.
//!
//! Each form kind implements [`FormSchema`]: a field enum, the rules for each field and a
//! conversion from validated values into the request payload. [`Form`] holds the draft
//! (values, errors, submitting flag) and is the same for every kind.
//!
//! ## Lifecycle
//!
//! 1. Created empty or pre-populated (edit mode)
//! 2. `on_change` per keystroke; clears that field's error only
//! 3. `submit` validates, blocks on errors or when a submission is already in flight, then
//!    runs the call. Success clears the draft; failure keeps it for a retry.

mod kinds;
mod rules;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

use log::{info, warn};

use crate::api::ApiError;

pub use kinds::{LoginField, LoginForm, RegisterField, RegisterForm, UserField, UserForm};
pub use rules::{Rule, looks_like_email};

/// Declared schema entry for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<F: 'static> {
    pub field: F,
    pub label: &'static str,
    pub rules: &'static [Rule],
    /// Input should be masked when entered or echoed.
    pub secret: bool,
}

impl<F> FieldSpec<F> {
    pub const fn new(field: F, label: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            field,
            label,
            rules,
            secret: false,
        }
    }

    pub const fn secret(field: F, label: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            field,
            label,
            rules,
            secret: true,
        }
    }

    /// The allowed values when the field is restricted by [`Rule::OneOf`].
    pub fn options(&self) -> Option<&'static [&'static str]> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::OneOf(options) => Some(*options),
            _ => None,
        })
    }
}

pub trait FormSchema: Sized {
    type Field: Copy + Ord + Debug + 'static;
    type Payload;

    /// Used in log lines.
    const NAME: &'static str;
    const FIELDS: &'static [FieldSpec<Self::Field>];

    /// Converts validated values into the request payload.
    ///
    /// Only called after every rule passed, so `None` means the rules and the conversion
    /// disagree.
    fn payload(values: &FieldValues<Self::Field>) -> Option<Self::Payload>;
}

/// Current text of every field, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<F: Ord> {
    values: BTreeMap<F, String>,
}

impl<F: Copy + Ord> FieldValues<F> {
    pub fn get(&self, field: F) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn trimmed(&self, field: F) -> String {
        self.get(field).trim().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Client-side validation failed; nothing was sent.
    #[error("{message}")]
    Invalid { message: String },
    #[error("A submission is already in progress")]
    InFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Holds the submitting flag for the duration of a call, and lowers it on drop so a
/// cancelled submit does not leave the form stuck.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct Form<S: FormSchema> {
    values: FieldValues<S::Field>,
    errors: BTreeMap<S::Field, String>,
    submitting: bool,
    submit_error: Option<String>,
    _schema: PhantomData<S>,
}

impl<S: FormSchema> Debug for Form<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values may hold passwords; only show which fields are filled.
        let filled: Vec<S::Field> = self
            .values
            .values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| *k)
            .collect();
        f.debug_struct("Form")
            .field("kind", &S::NAME)
            .field("filled", &filled)
            .field("errors", &self.errors)
            .field("submitting", &self.submitting)
            .field("submit_error", &self.submit_error)
            .finish()
    }
}

impl<S: FormSchema> Default for Form<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FormSchema> Form<S> {
    pub fn new() -> Self {
        Self {
            values: FieldValues {
                values: S::FIELDS
                    .iter()
                    .map(|spec| (spec.field, String::new()))
                    .collect(),
            },
            errors: BTreeMap::new(),
            submitting: false,
            submit_error: None,
            _schema: PhantomData,
        }
    }

    pub fn with_values(values: impl IntoIterator<Item = (S::Field, String)>) -> Self {
        let mut form = Self::new();
        form.values.values.extend(values);
        form
    }

    pub fn value(&self, field: S::Field) -> &str {
        self.values.get(field)
    }

    /// Update one field and clear its stored error. Other fields are not re-validated.
    pub fn on_change(&mut self, field: S::Field, value: impl Into<String>) {
        self.values.values.insert(field, value.into());
        self.errors.remove(&field);
    }

    /// Run every rule and replace the error map. Returns whether the form is valid.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for spec in S::FIELDS {
            let value = self.values.get(spec.field);
            let failed = spec
                .rules
                .iter()
                .find_map(|rule| rule.check(spec.label, value));
            if let Some(message) = failed {
                self.errors.insert(spec.field, message);
            }
        }
        self.errors.is_empty()
    }

    pub fn error(&self, field: S::Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Field errors in schema order.
    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        S::FIELDS
            .iter()
            .filter_map(|spec| {
                self.errors
                    .get(&spec.field)
                    .map(|message| (spec.label, message.as_str()))
            })
            .collect()
    }

    /// Message of the last failed submission, kept until the next attempt.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Discard the draft.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validate and, when clean, hand the payload to `call`.
    ///
    /// Success clears the draft. Failure leaves values untouched and records the message so
    /// the caller can show it and let the admin retry.
    pub async fn submit<T, Fut>(
        &mut self,
        call: impl FnOnce(S::Payload) -> Fut,
    ) -> Result<T, FormError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if self.submitting {
            return Err(FormError::InFlight);
        }

        if !self.validate() {
            let message = self
                .errors()
                .first()
                .map(|(_, message)| (*message).to_owned())
                .unwrap_or_default();
            info!("{}: blocked by validation: {message}", S::NAME);
            return Err(FormError::Invalid { message });
        }

        let Some(payload) = S::payload(&self.values) else {
            warn!("{}: validated values did not convert to a payload", S::NAME);
            return Err(FormError::Invalid {
                message: "Please check the form and try again".to_owned(),
            });
        };

        self.submit_error = None;
        let result = {
            let _in_flight = InFlight::start(&mut self.submitting);
            call(payload).await
        };

        match result {
            Ok(value) => {
                self.reset();
                Ok(value)
            }
            Err(err) => {
                self.submit_error = Some(err.to_string());
                Err(FormError::Api(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_login_with_malformed_email_never_calls() {
        let mut form = Form::<LoginForm>::new();
        form.on_change(LoginField::Email, "foo");
        form.on_change(LoginField::Password, "secret123");

        let mut called = false;
        let result = block_on(form.submit(|_| {
            called = true;
            async { Ok::<_, ApiError>(()) }
        }));

        assert!(!called);
        assert_eq!(
            result,
            Err(FormError::Invalid {
                message: "Email is invalid".to_owned()
            })
        );
        assert_eq!(form.error(LoginField::Email), Some("Email is invalid"));
        assert_eq!(form.value(LoginField::Email), "foo");
    }

    #[test]
    fn test_login_with_short_password_is_rejected() {
        let mut form = Form::<LoginForm>::new();
        form.on_change(LoginField::Email, "admin@example.com");
        form.on_change(LoginField::Password, "12345");

        assert!(!form.validate());
        assert_eq!(
            form.error(LoginField::Password),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(form.error(LoginField::Email), None);
    }

    #[test]
    fn test_empty_login_reports_required() {
        let mut form = Form::<LoginForm>::new();
        assert!(!form.validate());
        assert_eq!(
            form.errors(),
            vec![
                ("Email", "Email is required"),
                ("Password", "Password is required")
            ]
        );
    }

    #[test]
    fn test_on_change_clears_only_that_field() {
        let mut form = Form::<LoginForm>::new();
        form.validate();
        form.on_change(LoginField::Email, "a");

        assert_eq!(form.error(LoginField::Email), None);
        assert_eq!(form.error(LoginField::Password), Some("Password is required"));
    }

    #[test]
    fn test_successful_submit_clears_draft() {
        let mut form = Form::<LoginForm>::new();
        form.on_change(LoginField::Email, "admin@example.com");
        form.on_change(LoginField::Password, "secret123");

        let token = block_on(form.submit(|credentials| async move {
            assert_eq!(credentials.email, "admin@example.com");
            Ok::<_, ApiError>("tok".to_owned())
        }))
        .unwrap();

        assert_eq!(token, "tok");
        assert_eq!(form.value(LoginField::Email), "");
        assert!(!form.submitting);
        assert!(form.submit_error().is_none());
    }

    #[test]
    fn test_failed_submit_keeps_draft_for_retry() {
        let mut form = Form::<LoginForm>::new();
        form.on_change(LoginField::Email, "admin@example.com");
        form.on_change(LoginField::Password, "secret123");

        let result = block_on(form.submit(|_| async {
            Err::<(), _>(ApiError::Auth {
                message: "Invalid credentials".to_owned(),
            })
        }));

        assert!(matches!(result, Err(FormError::Api(ApiError::Auth { .. }))));
        assert_eq!(form.value(LoginField::Email), "admin@example.com");
        assert_eq!(form.submit_error(), Some("Invalid credentials"));
        assert!(!form.submitting);
    }

    #[tokio::test]
    async fn test_cancelled_submit_does_not_block_the_next_one() {
        let mut form = Form::<LoginForm>::new();
        form.on_change(LoginField::Email, "admin@example.com");
        form.on_change(LoginField::Password, "secret123");

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            form.submit(|_| std::future::pending::<Result<String, ApiError>>()),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(!form.submitting);

        let token = form
            .submit(|_| async { Ok::<_, ApiError>("tok".to_owned()) })
            .await
            .unwrap();
        assert_eq!(token, "tok");
    }

    #[test]
    fn test_debug_hides_values() {
        let mut form = Form::<LoginForm>::new();
        form.on_change(LoginField::Password, "hunter22");
        let debug = format!("{form:?}");
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("Password"));
    }
}
