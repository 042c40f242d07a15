//! Test utilities for business layer testing with mock servers.
//!
//! Provides a [`TestContext`] wrapping a wiremock server, a [`UsersApi`] pointed at it and an
//! in-memory [`Session`], plus helpers for mounting the backend's endpoints.
//!
//! # Example
//!
//! ```ignore
//! let mut test_ctx = TestContext::new().await;
//! test_ctx.set_authenticated("test_token");
//! test_ctx.mock_list_users(vec![user("1", "Ada", 12, Gender::Female, "Kigali", "Grace")]).await;
//!
//! let users = test_ctx.api.list_users(&test_ctx.session).await.unwrap();
//! ```

#![cfg(test)]

use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

use crate::{BusinessConfig, Gender, Session, User, UsersApi};

pub const TEST_TOKEN: &str = "test_token";

/// A user record fixture.
pub fn user(
    id: &str,
    names: &str,
    age: u32,
    gender: Gender,
    residence: &str,
    guardian: &str,
) -> User {
    User {
        id: id.to_owned(),
        names: names.to_owned(),
        age,
        residence: residence.to_owned(),
        guardian: guardian.to_owned(),
        gender,
    }
}

/// Test context that holds a mock server and a client configured to use it.
pub struct TestContext {
    pub mock_server: MockServer,
    pub api: UsersApi,
    pub session: Session,
}

impl TestContext {
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let api = UsersApi::new(BusinessConfig::new(mock_server.uri()));

        Self {
            mock_server,
            api,
            session: Session::in_memory(),
        }
    }

    pub fn set_authenticated(&mut self, token: &str) {
        self.session
            .begin(token)
            .expect("in-memory session should accept a token");
    }

    /// Number of requests the mock server has seen.
    pub async fn request_count(&self) -> usize {
        self.mock_server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    // =========================================================================
    // Mock endpoint helpers
    // =========================================================================

    pub async fn mock_login(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": token
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_login_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/admin/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "message": message
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_users(&self, users: Vec<User>) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(users))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_list_users_error(&self, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "message": message
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create_user(&self, created: &User) {
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}")))
            .respond_with(ResponseTemplate::new(201).set_body_json(created))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_mutation_error(
        &self,
        http_method: &str,
        route: &str,
        status: u16,
        message: &str,
    ) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "message": message
            })))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_update_user(&self, updated: &User) {
        Mock::given(method("PUT"))
            .and(path(format!("/users/{}", updated.id)))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_delete_user(&self, id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/users/{id}")))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.mock_server)
            .await;
    }
}
