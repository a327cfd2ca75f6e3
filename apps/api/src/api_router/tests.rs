use reqwest::{Client, StatusCode};
use rolegate_core::SubjectId;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use super::build_router;
use crate::auth::SUBJECT_ID_HEADER;
use crate::seed;
use crate::state::AppState;
use crate::test_support::memory_state;

struct TestServer {
    base_url: String,
    client: Client,
}

impl TestServer {
    async fn spawn(state: AppState) -> Self {
        let app = build_router(state, Some("http://localhost:5173")).unwrap_or_else(|_| unreachable!());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{address}"),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str, subject: Option<SubjectId>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(subject) = subject {
            request = request.header(SUBJECT_ID_HEADER, subject.to_string());
        }
        request.send().await.unwrap_or_else(|_| unreachable!())
    }

    async fn post(&self, path: &str, subject: SubjectId, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header(SUBJECT_ID_HEADER, subject.to_string())
            .json(&body)
            .send()
            .await
            .unwrap_or_else(|_| unreachable!())
    }
}

async fn seeded_state() -> (AppState, SubjectId) {
    let state = memory_state();
    seed::run(&state, Some("root@example.com"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let root = state
        .subject_service
        .get_subject_by_email("root@example.com")
        .await
        .unwrap_or_else(|_| unreachable!());
    (state, root.id())
}

async fn register_plain_subject(state: &AppState, email: &str) -> SubjectId {
    state
        .subject_service
        .register_subject(rolegate_application::RegisterSubjectInput {
            email: email.to_owned(),
            display_name: None,
            is_active: true,
            is_superuser: false,
        })
        .await
        .unwrap_or_else(|_| unreachable!())
        .id()
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn(memory_state()).await;

    let response = server.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap_or_else(|_| unreachable!());
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn guarded_route_without_subject_is_unauthorized() {
    let (state, _) = seeded_state().await;
    let server = TestServer::spawn(state).await;

    let response = server.get("/api/roles", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_subject_header_is_unauthorized() {
    let server = TestServer::spawn(memory_state()).await;

    let response = server
        .client
        .get(server.url("/api/me"))
        .header(SUBJECT_ID_HEADER, "not-a-number")
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn subject_without_permission_is_forbidden() {
    let (state, _) = seeded_state().await;
    let plain = register_plain_subject(&state, "plain@example.com").await;
    let server = TestServer::spawn(state).await;

    let response = server.get("/api/roles", Some(plain)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn me_returns_hydrated_subject() {
    let (state, root) = seeded_state().await;
    let server = TestServer::spawn(state).await;

    let response = server.get("/api/me", Some(root)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap_or_else(|_| unreachable!());
    assert_eq!(body["email"], "root@example.com");
    assert_eq!(body["is_superuser"], true);
    assert_eq!(body["roles"][0]["name"], "admin");
    assert_eq!(
        body["permissions"],
        json!(["users.delete", "users.edit", "users.view"])
    );
}

#[tokio::test]
async fn granted_role_opens_guarded_routes() {
    let (state, root) = seeded_state().await;
    let viewer = register_plain_subject(&state, "viewer@example.com").await;
    let server = TestServer::spawn(state).await;

    let created = server
        .post(
            "/api/roles",
            root,
            json!({ "name": "viewer", "permissions": ["users.view"] }),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let role: Value = created.json().await.unwrap_or_else(|_| unreachable!());
    let role_id = role["role_id"].as_i64().unwrap_or_else(|| unreachable!());

    let duplicate = server
        .post("/api/roles", root, json!({ "name": "viewer" }))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    assert_eq!(
        server.get("/api/subjects", Some(viewer)).await.status(),
        StatusCode::FORBIDDEN
    );

    let assigned = server
        .post(
            format!("/api/subjects/{viewer}/roles/{role_id}").as_str(),
            root,
            Value::Null,
        )
        .await;
    assert_eq!(assigned.status(), StatusCode::OK);

    assert_eq!(
        server.get("/api/subjects", Some(viewer)).await.status(),
        StatusCode::OK
    );

    let forbidden_create = server
        .post("/api/permissions", viewer, json!({ "name": "reports.view" }))
        .await;
    assert_eq!(forbidden_create.status(), StatusCode::FORBIDDEN);

    let check = server
        .get(
            format!("/api/subjects/{viewer}/access?permission=users.edit").as_str(),
            Some(viewer),
        )
        .await;
    assert_eq!(check.status(), StatusCode::OK);
    let body: Value = check.json().await.unwrap_or_else(|_| unreachable!());
    assert_eq!(body["allowed"], false);
}

#[tokio::test]
async fn superuser_flag_requires_admin_role() {
    let (state, root) = seeded_state().await;
    let plain = register_plain_subject(&state, "plain@example.com").await;
    let server = TestServer::spawn(state).await;

    let denied = server
        .client
        .put(server.url(format!("/api/subjects/{plain}/superuser").as_str()))
        .header(SUBJECT_ID_HEADER, plain.to_string())
        .json(&json!({ "is_superuser": true }))
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let granted = server
        .client
        .put(server.url(format!("/api/subjects/{plain}/superuser").as_str()))
        .header(SUBJECT_ID_HEADER, root.to_string())
        .json(&json!({ "is_superuser": true }))
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(granted.status(), StatusCode::OK);
    let body: Value = granted.json().await.unwrap_or_else(|_| unreachable!());
    assert_eq!(body["is_superuser"], true);
}

#[tokio::test]
async fn unknown_routes_are_not_found_before_authentication() {
    let server = TestServer::spawn(memory_state()).await;

    let response = server.get("/api/unknown", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
