use axum::Router;
use graphdesk_auth::CALLBACK_PATH;

use crate::{
    dispatch::{Guard, RegistryError, RouteRegistry},
    handlers::{auth, files, health::livez, mail, root},
    state::AppState,
};

const AUTHENTICATED: &[Guard] = &[Guard::Authenticated];

/// Every route the server answers.
///
/// # Errors
///
/// Returns `DuplicateRoute` if a verb and path pair is registered twice.
pub fn routes() -> Result<RouteRegistry, RegistryError> {
    let mut registry = RouteRegistry::new();

    registry
        .get("/", root::index, &[])?
        .get("/login-page", root::login_page, &[])?
        .get("/login", auth::login, &[])?
        .get(CALLBACK_PATH, auth::callback, &[])?
        .post(CALLBACK_PATH, auth::callback_form, &[])?
        .get("/disconnect", auth::disconnect, AUTHENTICATED)?
        .get("/sendMail", mail::compose, AUTHENTICATED)?
        .post("/sendMail", mail::send, AUTHENTICATED)?
        .get("/files", files::files, AUTHENTICATED)?
        .get("/browse/{driveId}/{itemId}", files::browse, AUTHENTICATED)?
        .get("/livez", livez, &[])?;

    Ok(registry)
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Result<Router, RegistryError> {
    let registry = routes()?;
    tracing::info!(routes = registry.descriptors().count(), "Routes registered");
    Ok(registry.into_router(state))
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use graphdesk_auth::{AuthConfig, AuthState, SessionStore};
    use graphdesk_client::{ClientError, GraphApi};
    use graphdesk_core::{
        auth::{
            OidcClaims, OidcLogin, OidcProviderClient, Principal, Result as AuthResult,
            SessionRepository, UserProfile,
        },
        drive::{Drive, DriveItem, SharingLink, UploadedItem},
        mail::SendMailRequest,
        pagination::Page,
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::render::{ErrorRenderer, HtmlErrorRenderer, RenderedError};

    #[derive(Default, Clone, Copy)]
    enum GraphMode {
        #[default]
        Healthy,
        TokenExpired,
        Panics,
    }

    /// In-process Graph double that records every call.
    #[derive(Default)]
    struct FakeGraph {
        mode: GraphMode,
        calls: Mutex<Vec<String>>,
        sent: Mutex<Vec<SendMailRequest>>,
    }

    impl FakeGraph {
        fn with_mode(mode: GraphMode) -> Self {
            Self {
                mode,
                ..Self::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn item(name: &str) -> DriveItem {
        serde_json::from_value(json!({
            "id": name,
            "name": name,
            "size": 12,
            "file": { "mimeType": "text/plain" }
        }))
        .unwrap()
    }

    #[async_trait]
    impl GraphApi for FakeGraph {
        async fn get_user_profile(&self, _token: &str) -> Result<UserProfile, ClientError> {
            self.record("get_user_profile");
            match self.mode {
                GraphMode::Healthy => Ok(UserProfile::new("Ada", "ada@example.com")),
                GraphMode::TokenExpired => Err(ClientError::Upstream {
                    status: 403,
                    code: "InvalidAuthenticationToken".to_string(),
                    message: "Access token has expired.".to_string(),
                    body: Some(json!({
                        "error": {
                            "code": "InvalidAuthenticationToken",
                            "message": "Access token has expired."
                        }
                    })),
                }),
                GraphMode::Panics => panic!("graph exploded"),
            }
        }

        async fn get_drives(&self, _token: &str) -> Result<Vec<Drive>, ClientError> {
            self.record("get_drives");
            Ok(vec![Drive {
                id: "d1".to_string(),
                drive_type: Some("business".to_string()),
                owner: None,
                quota: None,
            }])
        }

        async fn get_drive_root(
            &self,
            _token: &str,
            drive_id: &str,
        ) -> Result<Page<DriveItem>, ClientError> {
            self.record(format!("get_drive_root {drive_id}"));
            Ok(Page::new(vec![item("root.txt")], Some("next-1".to_string())))
        }

        async fn browse_by_id(
            &self,
            _token: &str,
            drive_id: &str,
            item_id: &str,
        ) -> Result<Page<DriveItem>, ClientError> {
            self.record(format!("browse_by_id {drive_id} {item_id}"));
            Ok(Page::new(vec![item("a.txt")], Some("next-1".to_string())))
        }

        async fn browse_by_url(
            &self,
            _token: &str,
            url: &str,
        ) -> Result<Page<DriveItem>, ClientError> {
            self.record(format!("browse_by_url {url}"));
            match url {
                "next-1" => Ok(Page::new(vec![item("b.txt")], Some("next-2".to_string()))),
                _ => Ok(Page::last(vec![item("c.txt")])),
            }
        }

        async fn get_profile_photo(&self, _token: &str) -> Result<Option<Vec<u8>>, ClientError> {
            self.record("get_profile_photo");
            Ok(Some(vec![1, 2, 3]))
        }

        async fn upload_file(
            &self,
            _token: &str,
            _bytes: Vec<u8>,
        ) -> Result<UploadedItem, ClientError> {
            self.record("upload_file");
            Ok(UploadedItem {
                id: "photo-1".to_string(),
                web_url: None,
            })
        }

        async fn get_sharing_link(
            &self,
            _token: &str,
            item_id: &str,
        ) -> Result<SharingLink, ClientError> {
            self.record(format!("get_sharing_link {item_id}"));
            Ok(SharingLink {
                web_url: "https://1drv.ms/i/photo-1".to_string(),
                link_type: Some("view".to_string()),
            })
        }

        async fn send_mail(
            &self,
            _token: &str,
            request: &SendMailRequest,
        ) -> Result<(), ClientError> {
            self.record("send_mail");
            self.sent.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    /// Identity provider double that accepts any code.
    struct FakeProvider;

    #[async_trait]
    impl OidcProviderClient for FakeProvider {
        async fn authorization_url(
            &self,
            state: &str,
            _nonce: &str,
            _pkce_challenge: &str,
        ) -> AuthResult<String> {
            Ok(format!("https://idp.example.com/authorize?state={state}"))
        }

        async fn exchange_code(
            &self,
            code: &str,
            _pkce_verifier: &str,
            _nonce: &str,
        ) -> AuthResult<OidcLogin> {
            Ok(OidcLogin {
                claims: OidcClaims {
                    issuer: "https://idp.example.com".to_string(),
                    subject: "sub-1".to_string(),
                    email: Some("ada@example.com".to_string()),
                    preferred_username: None,
                    name: Some("Ada".to_string()),
                },
                access_token: format!("token-for-{code}"),
                refresh_token: None,
            })
        }
    }

    /// Counts how many times the error page is rendered.
    struct CountingRenderer {
        inner: HtmlErrorRenderer,
        renders: AtomicUsize,
    }

    impl ErrorRenderer for CountingRenderer {
        fn render(&self, error: RenderedError) -> Response {
            self.renders.fetch_add(1, Ordering::SeqCst);
            self.inner.render(error)
        }
    }

    struct Harness {
        app: Router,
        sessions: SessionStore,
        graph: Arc<FakeGraph>,
        renderer: Arc<CountingRenderer>,
    }

    impl Harness {
        fn new(graph: FakeGraph) -> Self {
            let sessions = SessionStore::new();
            let config = AuthConfig::from_vars(|_| None).unwrap();
            let provider: Arc<dyn OidcProviderClient> = Arc::new(FakeProvider);
            let auth =
                AuthState::with_provider(Arc::new(sessions.clone()), config, Some(provider));
            let graph = Arc::new(graph);
            let renderer = Arc::new(CountingRenderer {
                inner: HtmlErrorRenderer::new(false),
                renders: AtomicUsize::new(0),
            });
            let state = AppState::new(auth, graph.clone(), renderer.clone());

            Self {
                app: create_app(state).unwrap(),
                sessions,
                graph,
                renderer,
            }
        }

        async fn sign_in(&self) -> String {
            let id = self
                .sessions
                .create_session(Principal {
                    profile: UserProfile::new("Ada", "ada@example.com"),
                    access_token: "token".to_string(),
                    refresh_token: None,
                })
                .await
                .unwrap();
            format!("graphdesk_session={id}")
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.app.clone().oneshot(request).await.unwrap()
        }

        fn renders(&self) -> usize {
            self.renderer.renders.load(Ordering::SeqCst)
        }
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, cookie: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[test]
    fn route_table_has_no_duplicates() {
        let registry = routes().unwrap();
        assert_eq!(registry.descriptors().count(), 11);

        let guarded: Vec<_> = registry
            .descriptors()
            .filter(|d| d.guards.contains(&Guard::Authenticated))
            .map(|d| format!("{} {}", d.verb, d.path))
            .collect();
        assert_eq!(
            guarded,
            vec![
                "GET /browse/{driveId}/{itemId}",
                "GET /disconnect",
                "GET /files",
                "GET /sendMail",
                "POST /sendMail",
            ]
        );
    }

    #[tokio::test]
    async fn test_livez() {
        let h = Harness::new(FakeGraph::default());

        let response = h.send(get("/livez", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_renders_not_found_once() {
        let h = Harness::new(FakeGraph::default());

        let response = h.send(get("/nope", None)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Not Found"));
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_verb_renders_not_found() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let response = h.send(post_form("/files", &cookie, "")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(h.graph.calls().is_empty());
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_guard_declines_without_calling_handler() {
        let h = Harness::new(FakeGraph::default());

        let response = h.send(get("/files", None)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Sign in required"));
        assert!(h.graph.calls().is_empty());
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_cookie_is_declined() {
        let h = Harness::new(FakeGraph::default());

        let response = h
            .send(get("/sendMail", Some("graphdesk_session=forged")))
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_expired_page_has_sign_out_guidance() {
        let h = Harness::new(FakeGraph::with_mode(GraphMode::TokenExpired));
        let cookie = h.sign_in().await;

        let response = h.send(post_form("/sendMail", &cookie, "default_email=")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let html = body_text(response).await;
        assert!(html.contains(
            "InvalidAuthenticationToken Expired token. Please sign out and sign in again."
        ));
        assert!(!html.contains("innerError"));
        assert_eq!(h.renders(), 1);
        assert!(h.graph.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handler_panic_renders_other_once() {
        let h = Harness::new(FakeGraph::with_mode(GraphMode::Panics));
        let cookie = h.sign_in().await;

        let response = h.send(post_form("/sendMail", &cookie, "")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("graph exploded"));
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_browse_walks_every_page() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let response = h.send(get("/browse/d1/folder", Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        let a = html.find("a.txt").unwrap();
        let b = html.find("b.txt").unwrap();
        let c = html.find("c.txt").unwrap();
        assert!(a < b && b < c);
        assert_eq!(
            h.graph.calls(),
            vec![
                "browse_by_id d1 folder",
                "browse_by_url next-1",
                "browse_by_url next-2"
            ]
        );
        assert_eq!(h.renders(), 0);
    }

    #[tokio::test]
    async fn test_files_walks_first_drive_root() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let response = h.send(get("/files", Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        let root = html.find("root.txt").unwrap();
        let b = html.find("b.txt").unwrap();
        let c = html.find("c.txt").unwrap();
        assert!(root < b && b < c);
        assert_eq!(
            h.graph.calls(),
            vec![
                "get_drives",
                "get_drive_root d1",
                "browse_by_url next-1",
                "browse_by_url next-2"
            ]
        );
    }

    #[tokio::test]
    async fn test_compose_fetches_profile_from_graph() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let response = h.send(get("/sendMail", Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Hi, Ada!"));
        assert!(html.contains("value=\"ada@example.com\""));
        assert_eq!(h.graph.calls(), vec!["get_user_profile"]);
    }

    #[tokio::test]
    async fn test_compose_with_expired_token_renders_guidance() {
        let h = Harness::new(FakeGraph::with_mode(GraphMode::TokenExpired));
        let cookie = h.sign_in().await;

        let response = h.send(get("/sendMail", Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response)
            .await
            .contains("Please sign out and sign in again."));
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_rejected_form_body_is_rendered_once() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let request = Request::builder()
            .method("POST")
            .uri("/sendMail")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"default_email":"bob@example.com"}"#))
            .unwrap();
        let response = h.send(request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("Invalid form"));
        assert!(h.graph.calls().is_empty());
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_rejected_path_segment_is_rendered_once() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        // Percent-encoded invalid UTF-8 cannot be decoded into a String
        let response = h.send(get("/browse/d1/%FF", Some(&cookie))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.graph.calls().is_empty());
        assert_eq!(h.renders(), 1);
    }

    #[tokio::test]
    async fn test_send_mail_defaults_to_own_address() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let response = h.send(post_form("/sendMail", &cookie, "default_email=")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("ada@example.com"));

        let sent = h.graph.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        let message = &sent[0].message;
        assert_eq!(message.to_recipients[0].email_address.address, "ada@example.com");
        assert_eq!(message.attachments.len(), 1);
        assert!(message.body.content.contains("https://1drv.ms/i/photo-1"));
        assert_eq!(
            h.graph.calls(),
            vec![
                "get_user_profile",
                "get_profile_photo",
                "upload_file",
                "get_sharing_link photo-1",
                "send_mail"
            ]
        );
    }

    #[tokio::test]
    async fn test_send_mail_to_submitted_address() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let response = h
            .send(post_form("/sendMail", &cookie, "default_email=bob%40example.com"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let sent = h.graph.sent.lock().unwrap().clone();
        assert_eq!(
            sent[0].message.to_recipients[0].email_address.address,
            "bob@example.com"
        );
    }

    #[tokio::test]
    async fn test_root_redirects_by_session() {
        let h = Harness::new(FakeGraph::default());
        let cookie = h.sign_in().await;

        let anonymous = h.send(get("/", None)).await;
        assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&anonymous), "/login-page");

        let signed_in = h.send(get("/", Some(&cookie))).await;
        assert_eq!(location(&signed_in), "/sendMail");

        let login_page = h.send(get("/login-page", Some(&cookie))).await;
        assert_eq!(location(&login_page), "/");
    }

    #[tokio::test]
    async fn test_login_page_offers_sign_in() {
        let h = Harness::new(FakeGraph::default());

        let response = h.send(get("/login-page", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("href=\"/login\""));
    }

    #[tokio::test]
    async fn test_login_callback_and_logout() {
        let h = Harness::new(FakeGraph::default());

        // Sign in
        let response = h.send(get("/login", None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let state = location(&response)
            .split("state=")
            .nth(1)
            .unwrap()
            .to_string();

        let callback = format!("/token?code=abc&state={state}");
        let response = h.send(get(&callback, None)).await;
        assert_eq!(location(&response), "/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let response = h.send(get("/sendMail", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Hi, Ada!"));

        // A consumed flow cannot be replayed
        let replay = h.send(get(&callback, None)).await;
        assert_eq!(replay.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Sign out
        let response = h.send(get("/disconnect", Some(&cookie))).await;
        assert_eq!(location(&response), "/");
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("graphdesk_session=;"));
        assert!(h.sessions.is_empty().await);

        let response = h.send(get("/sendMail", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_provider_error_on_callback_is_rendered() {
        let h = Harness::new(FakeGraph::default());

        let response = h
            .send(get(
                "/token?error=access_denied&error_description=User%20cancelled",
                None,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response)
            .await
            .contains("Sign-in failed: access_denied User cancelled"));
        assert_eq!(h.renders(), 1);
    }
}
