//! HTTP server for the trigger gateway.
//!
//! - `POST /trigger` - accepts token-bearing or signed trigger requests and
//!   converts them into backend build actions
//! - `GET /health` - liveness probe
//!
//! Requests are handled independently and statelessly; the only shared state
//! is the read-only directory and the backend gateway.

use std::sync::Arc;

pub mod health;
pub mod trigger;

pub use health::health_handler;
pub use trigger::{StatusDocument, trigger_handler};

use crate::backend::BackendGateway;
use crate::registry::Directory;

/// Shared application state, passed to handlers via axum's `State`.
pub struct AppState<G> {
    inner: Arc<AppStateInner<G>>,
}

// Manual impl: cloning shares the Arc and must not require `G: Clone`.
impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<G> {
    /// Read-only directory of projects, packages, and tokens.
    directory: Directory,

    /// Gateway executing backend commands.
    gateway: G,
}

impl<G> AppState<G> {
    pub fn new(directory: Directory, gateway: G) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { directory, gateway }),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.inner.directory
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<G>(state: AppState<G>) -> axum::Router
where
    G: BackendGateway + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/trigger", post(trigger_handler::<G>))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::auth::{compute_signature, format_signature_header};
    use crate::backend::{BackendCommand, RecordingBackend};
    use crate::test_utils::{base_directory, bound_token, token};
    use crate::types::TokenKind;

    const BACKEND_OK: &str = "<status code=\"ok\" />\n";

    fn app(directory: Directory) -> (axum::Router, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::replying(BACKEND_OK));
        let state = AppState::new(directory, Arc::clone(&backend));
        (build_router(state), backend)
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn signed_post(uri: &str, header_name: &str, body: &[u8], secret: &str) -> Request<Body> {
        let signature = format_signature_header(&compute_signature(body, secret.as_bytes()));
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header_name, signature)
            .header("content-type", "application/json")
            .body(Body::from(body.to_vec()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ─── Authentication ───

    #[tokio::test]
    async fn request_without_token_is_forbidden() {
        let (app, backend) = app(base_directory());

        let response = app.oneshot(post("/trigger")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_string(response).await;
        assert!(body.contains("No valid token"));
        assert!(body.contains("\"code\":\"forbidden\""));
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn unknown_token_id_is_forbidden_even_with_valid_signature() {
        let mut directory = base_directory();
        directory
            .tokens
            .push(token(7, "svc", TokenKind::Service, "tom", None));
        let (app, backend) = app(directory);

        let body = br#"{"hello":"world"}"#;
        let request = signed_post("/trigger?id=99", "x-obs-signature", body, "svc");
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn workflow_token_reads_as_token_not_found() {
        let mut directory = base_directory();
        directory
            .tokens
            .push(token(3, "wf-secret", TokenKind::Workflow, "foo", None));
        let (app, backend) = app(directory);

        // Even a fully valid bearer credential: the kind routes elsewhere.
        let request = Request::builder()
            .method("POST")
            .uri("/trigger?project=project&package=package_trigger")
            .header("authorization", "Token wf-secret")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(body.contains("Token not found"));
        assert!(backend.commands().is_empty());
    }

    // ─── Rebuild ───

    #[tokio::test]
    async fn rebuild_with_bound_package_succeeds() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            1,
            "reb",
            TokenKind::Rebuild,
            "foo",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let response = app.oneshot(post("/trigger?id=1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, BACKEND_OK);
        assert_eq!(
            backend.commands()[0].path_and_query(),
            "/build/project?cmd=rebuild&package=package_trigger"
        );
    }

    #[tokio::test]
    async fn rebuild_without_any_package_is_bad_request() {
        let mut directory = base_directory();
        directory
            .tokens
            .push(token(1, "reb", TokenKind::Rebuild, "foo", None));
        let (app, backend) = app(directory);

        let response = app
            .oneshot(post("/trigger?id=1&project=project"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains(
            "A package must be provided for the operations rebuild, release and runservice"
        ));
        assert!(body.contains("\"code\":\"bad_request\""));
        // The precondition fired before any lookup or dispatch.
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn rebuild_via_authorization_header_needs_no_signature() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            1,
            "reb",
            TokenKind::Rebuild,
            "foo",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let request = Request::builder()
            .method("POST")
            .uri("/trigger")
            .header("authorization", "Token reb")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.commands().len(), 1);
    }

    // ─── Release ───

    #[tokio::test]
    async fn release_copies_into_each_target() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            1,
            "rel",
            TokenKind::Release,
            "foo",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let response = app
            .oneshot(post("/trigger?id=1&package=package_trigger"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let commands = backend.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].path_and_query(),
            "/build/target_project/target_repository/x86_64/package_trigger\
             ?cmd=copy&oproject=project&opackage=package_trigger\
             &orepository=package_test_repository&resign=1&multibuild=1"
        );
    }

    #[tokio::test]
    async fn release_for_unknown_project_is_not_found() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            1,
            "rel",
            TokenKind::Release,
            "foo",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let response = app.oneshot(post("/trigger?id=1&project=foo")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn release_denied_on_source_rights() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            1,
            "rel",
            TokenKind::Release,
            "mrfluffy",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let response = app
            .oneshot(post("/trigger?id=1&package=package_trigger"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn release_denied_on_target_rights_names_the_project() {
        let mut directory = base_directory();
        // mrfluffy gets package-level source rights but nothing on the
        // release target's project.
        directory
            .projects
            .iter_mut()
            .find(|p| p.name.as_str() == "project")
            .unwrap()
            .packages
            .iter_mut()
            .find(|p| p.name.as_str() == "package_trigger")
            .unwrap()
            .maintainers
            .insert("mrfluffy".into());
        directory.tokens.push(bound_token(
            1,
            "rel",
            TokenKind::Release,
            "mrfluffy",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let response = app
            .oneshot(post("/trigger?id=1&package=package_trigger"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_string(response).await;
        assert!(body.contains("\"code\":\"trigger_project_not_authorized\""));
        assert!(
            body.contains("You don't have permission to release into project target_project.")
        );
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn release_without_release_targets_is_not_found() {
        let mut directory = base_directory();
        // Strip the configured targets from the source repository.
        directory
            .projects
            .iter_mut()
            .find(|p| p.name.as_str() == "project")
            .unwrap()
            .repositories
            .iter_mut()
            .for_each(|r| r.release_targets.clear());
        directory.tokens.push(bound_token(
            1,
            "rel",
            TokenKind::Release,
            "foo",
            "project",
            "package_trigger",
        ));
        let (app, backend) = app(directory);

        let response = app
            .oneshot(post("/trigger?id=1&package=package_trigger"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(backend.commands().is_empty());
    }

    // ─── Service ───

    #[tokio::test]
    async fn service_with_valid_signature_succeeds_on_each_header() {
        for header_name in ["x-obs-signature", "x-hub-signature-256", "x-pagure-signature-256"] {
            let mut directory = base_directory();
            directory.tokens.push(bound_token(
                2,
                "svc",
                TokenKind::Service,
                "tom",
                "home:tom",
                "apache2",
            ));
            let (app, backend) = app(directory);

            let body = br#"{"hello":"world"}"#;
            let request = signed_post(
                "/trigger?id=2&project=home:tom&package=apache2",
                header_name,
                body,
                "svc",
            );
            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "header {header_name}");
            let commands = backend.commands();
            assert_eq!(commands.len(), 1, "header {header_name}");
            assert_eq!(
                commands[0],
                BackendCommand::TriggerServices {
                    project: "home:tom".into(),
                    package: "apache2".into(),
                    user: "tom".into(),
                }
            );
        }
    }

    #[tokio::test]
    async fn service_with_invalid_signature_is_forbidden() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            2,
            "svc",
            TokenKind::Service,
            "tom",
            "home:tom",
            "apache2",
        ));
        let (app, backend) = app(directory);

        let body = br#"{"hello":"world"}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/trigger?id=2&project=home:tom&package=apache2")
            .header("x-obs-signature", "sha256=invalid")
            .body(Body::from(body.to_vec()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(backend.commands().is_empty());
    }

    #[tokio::test]
    async fn service_resolved_by_signature_alone_uses_bound_package() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            2,
            "svc",
            TokenKind::Service,
            "tom",
            "home:tom",
            "apache2",
        ));
        let (app, backend) = app(directory);

        let body = br#"{"action":"push"}"#;
        let request = signed_post("/trigger", "x-hub-signature-256", body, "svc");
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.commands().len(), 1);
    }

    #[tokio::test]
    async fn service_tolerates_non_string_parameter_shapes() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            2,
            "svc",
            TokenKind::Service,
            "tom",
            "home:tom",
            "apache2",
        ));
        let (app, backend) = app(directory);

        // Nested object and integer values, as GitLab/GitHub send them.
        let body = br#"{"a_hash":{"integer1":123},"integer2":456}"#;
        let request = signed_post("/trigger", "x-obs-signature", body, "svc");
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.commands().len(), 1);
    }

    // ─── Backend failures ───

    #[tokio::test]
    async fn backend_failure_is_surfaced_not_swallowed() {
        let mut directory = base_directory();
        directory.tokens.push(bound_token(
            1,
            "reb",
            TokenKind::Rebuild,
            "foo",
            "project",
            "package_trigger",
        ));
        let backend = Arc::new(RecordingBackend::failing_transport("connection refused"));
        let state = AppState::new(directory, Arc::clone(&backend));
        let app = build_router(state);

        let response = app.oneshot(post("/trigger?id=1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(body.contains("\"code\":\"backend_error\""));
    }

    // ─── Health ───

    #[tokio::test]
    async fn health_returns_200() {
        let (app, _backend) = app(base_directory());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }
}
