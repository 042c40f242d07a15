//! Wire types for the admin and users endpoints.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Decoded through [`FromStr`], so the backend's casing does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown gender '{0}', expected Male, Female or Other")]
pub struct ParseGenderError(pub String);

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseGenderError(s.to_owned()))
    }
}

impl TryFrom<String> for Gender {
    type Error = ParseGenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A user record owned by the backend.
///
/// The backend names the identifier `_id`; `id` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub names: String,
    pub age: u32,
    pub residence: String,
    pub guardian: String,
    pub gender: Gender,
}

impl User {
    /// The editable fields of this record, used to pre-populate an edit form.
    pub fn draft(&self) -> UserDraft {
        UserDraft {
            names: self.names.clone(),
            age: self.age,
            residence: self.residence.clone(),
            guardian: self.guardian.clone(),
            gender: self.gender,
        }
    }
}

/// Request body for `POST /users` and `PUT /users/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub names: String,
    pub age: u32,
    pub residence: String,
    pub guardian: String,
    pub gender: Gender,
}

impl UserDraft {
    pub fn into_user(self, id: impl Into<String>) -> User {
        User {
            id: id.into(),
            names: self.names,
            age: self.age,
            residence: self.residence,
            guardian: self.guardian,
            gender: self.gender,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub const ALL: [Self; 2] = [Self::Admin, Self::SuperAdmin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown role '{s}', expected admin or super_admin"))
    }
}

/// Request payload for `POST /admin/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

/// Request payload for `POST /admin/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    pub token: Option<String>,
}

/// Error body convention of the backend: `{ "message": "..." }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}
