//! A stateful fake of the users backend for round-trip tests.

use std::sync::{Arc, Mutex, PoisonError};

use roster_business::{BusinessConfig, Session, User, UserDraft, UsersApi};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "integration-token";

/// In-memory users collection served over `/users`.
#[derive(Clone, Default)]
pub struct FakeUsers {
    users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<Mutex<u32>>,
}

impl FakeUsers {
    pub fn snapshot(&self) -> Vec<User> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn message(status: u16, message: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_json(serde_json::json!({ "message": message }))
    }
}

impl Respond for FakeUsers {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(format!("Bearer {TOKEN}").as_str());
        if !authorized {
            return Self::message(401, "Token is not valid");
        }

        let id = request
            .url
            .path()
            .strip_prefix("/users/")
            .map(str::to_owned);
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);

        match (request.method.as_str(), id) {
            ("GET", None) => ResponseTemplate::new(200).set_body_json(&*users),
            ("POST", None) => {
                let Ok(draft) = serde_json::from_slice::<UserDraft>(&request.body) else {
                    return Self::message(400, "Invalid user payload");
                };
                let mut next_id = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
                *next_id += 1;
                let user = draft.into_user(format!("u{next_id}"));
                users.push(user.clone());
                ResponseTemplate::new(201).set_body_json(user)
            }
            ("PUT", Some(id)) => {
                let Ok(draft) = serde_json::from_slice::<UserDraft>(&request.body) else {
                    return Self::message(400, "Invalid user payload");
                };
                match users.iter_mut().find(|u| u.id == id) {
                    Some(user) => {
                        *user = draft.into_user(id);
                        ResponseTemplate::new(200).set_body_json(user.clone())
                    }
                    None => Self::message(404, "User not found"),
                }
            }
            ("DELETE", Some(id)) => {
                let before = users.len();
                users.retain(|u| u.id != id);
                if users.len() == before {
                    Self::message(404, "User not found")
                } else {
                    ResponseTemplate::new(204)
                }
            }
            _ => Self::message(405, "Method not allowed"),
        }
    }
}

pub struct Backend {
    pub server: MockServer,
    pub users: FakeUsers,
}

impl Backend {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let users = FakeUsers::default();

        Mock::given(path_regex(r"^/users(/[^/]+)?$"))
            .respond_with(users.clone())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": TOKEN
            })))
            .mount(&server)
            .await;

        Self { server, users }
    }

    pub fn api(&self) -> UsersApi {
        UsersApi::new(BusinessConfig::new(self.server.uri()))
    }

    pub fn signed_in_session() -> Session {
        let mut session = Session::in_memory();
        session
            .begin(TOKEN)
            .expect("in-memory session should accept a token");
        session
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
