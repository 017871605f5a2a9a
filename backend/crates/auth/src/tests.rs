//! Crate-level tests: HTTP scenarios through the router and store behavior
//! under concurrency.

#[cfg(test)]
mod router_tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use chrono::Utc;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::config::AuthConfig;
    use crate::application::token::TokenIssuer;
    use crate::domain::entity::{ActingIdentity, NewUser, User, UserPatch};
    use crate::domain::repository::{EditRecordRepository, UserRepository};
    use crate::domain::value_object::{
        Email, Permission, PermissionSet, ProfileName, RoleName, UserId,
    };
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::presentation::router::auth_router_generic;

    const ALICE_PASSWORD: &str = "Wonderland-42!";
    const ADMIN_PASSWORD: &str = "Qu33n-of-Hearts";

    struct TestApp {
        router: Router,
        repo: InMemoryAuthRepository,
        tokens: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    }

    struct TestResponse {
        status: StatusCode,
        headers: HeaderMap,
        body: Value,
    }

    impl TestApp {
        fn new() -> Self {
            let config = Arc::new(AuthConfig {
                cookie_secure: false,
                ..AuthConfig::with_secret("router-test-secret")
            });
            let tokens = Arc::new(TokenIssuer::from_config(&config).unwrap());
            let repo = InMemoryAuthRepository::with_default_roles();
            let router = auth_router_generic(repo.clone(), config.clone(), tokens.clone());

            Self {
                router,
                repo,
                tokens,
                config,
            }
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> TestResponse {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::COOKIE, format!("authToken={}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

            TestResponse {
                status,
                headers,
                body,
            }
        }

        async fn register_alice(&self) -> (UserId, String) {
            let response = self
                .send(
                    "POST",
                    "/register",
                    None,
                    Some(json!({
                        "email": "alice@example.com",
                        "password": ALICE_PASSWORD,
                        "fullName": "Alice Liddell",
                        "givenName": "Alice",
                        "familyName": "Liddell",
                        "role": "customer",
                    })),
                )
                .await;
            assert_eq!(response.status, StatusCode::OK, "{}", response.body);

            let user_id = response.body["userId"].as_str().unwrap().parse().unwrap();
            let token = response.body["authToken"].as_str().unwrap().to_string();
            (user_id, token)
        }

        /// Seed an admin directly in the store and log in
        async fn admin_token(&self) -> String {
            self.admin_token_with(BTreeMap::new()).await
        }

        async fn admin_token_with(&self, overrides: BTreeMap<Permission, bool>) -> String {
            let mut admin = User::new(NewUser {
                email: Email::new("queen@example.com").unwrap(),
                password_hash: self.config.password_hasher().hash(ADMIN_PASSWORD).unwrap(),
                role: RoleName::new("admin").unwrap(),
                full_name: ProfileName::from_db("Queen of Hearts"),
                given_name: ProfileName::from_db("Queen"),
                family_name: ProfileName::from_db("Hearts"),
            });
            admin.permission_overrides = overrides;
            self.repo.create(&admin).await.unwrap();

            let response = self
                .send(
                    "POST",
                    "/login",
                    None,
                    Some(json!({ "email": "queen@example.com", "password": ADMIN_PASSWORD })),
                )
                .await;
            assert_eq!(response.status, StatusCode::OK);
            response.body["authToken"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn test_register_customer_issues_cookie_without_admin_permissions() {
        let app = TestApp::new();
        let (user_id, token) = app.register_alice().await;

        let claims = app.tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "customer");
        assert!(!claims.has_permission(Permission::DeleteUser));
        assert!(!claims.has_permission(Permission::ListUsers));
        assert_eq!(claims.exp - claims.iat, 3600);

        let response = app.send("GET", "/me", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["email"], "alice@example.com");
        assert!(response.body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_register_sets_http_only_cookie() {
        let app = TestApp::new();
        let response = app
            .send(
                "POST",
                "/register",
                None,
                Some(json!({
                    "email": "bob@example.com",
                    "password": ALICE_PASSWORD,
                    "fullName": "Bob",
                    "givenName": "Bob",
                    "familyName": "Builder",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "User Registered!");
        let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("authToken="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[tokio::test]
    async fn test_customer_cannot_delete_users() {
        let app = TestApp::new();
        let (user_id, token) = app.register_alice().await;

        let response = app
            .send("DELETE", &format!("/{}", user_id), Some(&token), None)
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);

        let response = app.send("GET", "/list", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);

        assert!(app.repo.find_by_id(&user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_restricted_role_forbidden() {
        let app = TestApp::new();
        let response = app
            .send(
                "POST",
                "/register",
                None,
                Some(json!({
                    "email": "mallory@example.com",
                    "password": ALICE_PASSWORD,
                    "fullName": "Mallory",
                    "givenName": "Mallory",
                    "familyName": "Evil",
                    "role": "admin",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert!(
            app.repo
                .find_by_email(&Email::new("mallory@example.com").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let app = TestApp::new();
        app.register_alice().await;

        let response = app
            .send(
                "POST",
                "/register",
                None,
                Some(json!({
                    "email": "Alice@Example.com",
                    "password": ALICE_PASSWORD,
                    "fullName": "Alice Again",
                    "givenName": "Alice",
                    "familyName": "Again",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let app = TestApp::new();
        let response = app
            .send(
                "POST",
                "/register",
                None,
                Some(json!({
                    "email": "weak@example.com",
                    "password": "password",
                    "fullName": "Weak",
                    "givenName": "Weak",
                    "familyName": "Password",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = TestApp::new();
        app.register_alice().await;

        let response = app
            .send(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "alice@example.com", "password": "Not-Her-Password" })),
            )
            .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.headers.get(header::SET_COOKIE).is_none());
        assert!(response.body.get("authToken").is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_email_matches_wrong_password() {
        let app = TestApp::new();
        app.register_alice().await;

        let unknown = app
            .send(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "nobody@example.com", "password": ALICE_PASSWORD })),
            )
            .await;
        let wrong = app
            .send(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "alice@example.com", "password": "Not-Her-Password" })),
            )
            .await;

        assert_eq!(unknown.status, wrong.status);
        assert_eq!(unknown.body["detail"], wrong.body["detail"]);
    }

    #[tokio::test]
    async fn test_login_success() {
        let app = TestApp::new();
        let (user_id, _) = app.register_alice().await;

        let response = app
            .send(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "ALICE@example.com ", "password": ALICE_PASSWORD })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "Welcome back!");
        assert_eq!(response.body["userId"], user_id.to_string());
        assert!(response.headers.get(header::SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_expired_token_rejected_at_gate() {
        let app = TestApp::new();
        let (user_id, _) = app.register_alice().await;
        let alice = app.repo.find_by_id(&user_id).await.unwrap().unwrap();

        let stale = app
            .tokens
            .issue_at(
                &alice,
                &PermissionSet::new(),
                Utc::now() - chrono::Duration::hours(2),
            )
            .unwrap();

        let response = app.send("GET", "/me", Some(&stale.token), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers["X-Auth-Required"], "true");
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let app = TestApp::new();
        let response = app.send("GET", "/me", None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bearer_token_accepted() {
        let app = TestApp::new();
        let (_, token) = app.register_alice().await;

        let request = Request::builder()
            .method("GET")
            .uri("/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_me_reissues_token() {
        let app = TestApp::new();
        let (user_id, token) = app.register_alice().await;

        let response = app
            .send(
                "PUT",
                "/me",
                Some(&token),
                Some(json!({ "email": "alice@wonderland.example" })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.get(header::SET_COOKIE).is_some());
        let new_token = response.body["authToken"].as_str().unwrap();
        assert_eq!(app.tokens.verify(new_token).unwrap().email, "alice@wonderland.example");

        let edits = app.repo.list_edits(user_id.as_uuid()).await.unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].acting_user.user_id, user_id);
    }

    #[tokio::test]
    async fn test_admin_manages_users() {
        let app = TestApp::new();
        let (alice_id, _) = app.register_alice().await;
        let admin = app.admin_token().await;

        let response = app.send("GET", "/list", Some(&admin), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_array().unwrap().len(), 2);

        let response = app
            .send("GET", &format!("/{}", alice_id), Some(&admin), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["fullName"], "Alice Liddell");

        let response = app
            .send(
                "PUT",
                &format!("/{}", alice_id),
                Some(&admin),
                Some(json!({ "givenName": "Alicia", "password": "Down-the-Rabbit-Hole" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.get(header::SET_COOKIE).is_none());
        assert!(response.body.get("authToken").is_none());
        assert_eq!(response.body["user"]["givenName"], "Alicia");

        let edits = app.repo.list_edits(alice_id.as_uuid()).await.unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].acting_user.email, "queen@example.com");
        assert_eq!(edits[0].changes["password"], "[REDACTED]");

        let response = app
            .send("DELETE", &format!("/{}", alice_id), Some(&admin), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body["message"],
            format!("User {} deleted!", alice_id)
        );

        let response = app
            .send("GET", &format!("/{}", alice_id), Some(&admin), None)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_revoked_read_overrides_deny_admin() {
        let app = TestApp::new();
        let (alice_id, _) = app.register_alice().await;
        let token = app
            .admin_token_with(BTreeMap::from([
                (Permission::ListUsers, false),
                (Permission::ReadUser, false),
            ]))
            .await;

        let claims = app.tokens.verify(&token).unwrap();
        assert_eq!(claims.role, "admin");
        assert!(!claims.has_permission(Permission::ListUsers));

        let response = app.send("GET", "/list", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);

        let response = app
            .send("GET", &format!("/{}", alice_id), Some(&token), None)
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);

        // Untouched permissions still apply
        let response = app
            .send(
                "PUT",
                &format!("/{}", alice_id),
                Some(&token),
                Some(json!({ "fullName": "Alice P. Liddell" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    }

    #[tokio::test]
    async fn test_granted_list_override_admits_customer() {
        let app = TestApp::new();
        let (alice_id, _) = app.register_alice().await;

        let patch = UserPatch {
            permission_overrides: Some(BTreeMap::from([(Permission::ListUsers, true)])),
            ..Default::default()
        };
        let actor = ActingIdentity {
            user_id: alice_id,
            email: "alice@example.com".to_string(),
        };
        app.repo.update(&alice_id, &patch, &actor).await.unwrap();

        let response = app
            .send(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "alice@example.com", "password": ALICE_PASSWORD })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let token = response.body["authToken"].as_str().unwrap().to_string();

        let response = app.send("GET", "/list", Some(&token), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_array().unwrap().len(), 1);

        let response = app
            .send("GET", &format!("/{}", alice_id), Some(&token), None)
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_user_id() {
        let app = TestApp::new();
        let admin = app.admin_token().await;

        let response = app.send("GET", "/not-a-uuid", Some(&admin), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stale_permissions_survive_until_expiry() {
        let app = TestApp::new();
        let admin = app.admin_token().await;
        let queen = app
            .repo
            .find_by_email(&Email::new("queen@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();

        app.repo.delete(&queen.user_id).await.unwrap();

        // The snapshot still admits the list route
        let response = app.send("GET", "/list", Some(&admin), None).await;
        assert_eq!(response.status, StatusCode::OK);

        // Identity lookups fail once the account is gone
        let response = app.send("GET", "/me", Some(&admin), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let app = TestApp::new();
        let response = app.send("POST", "/logout", None, None).await;

        assert_eq!(response.status, StatusCode::OK);
        let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("authToken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}

#[cfg(test)]
mod store_tests {
    use std::sync::Arc;

    use crate::domain::entity::user::fixtures::user;
    use crate::domain::entity::{ActingIdentity, UserPatch};
    use crate::domain::repository::{EditRecordRepository, UserRepository};
    use crate::domain::value_object::{Email, ProfileName};
    use crate::infra::memory::InMemoryAuthRepository;

    #[tokio::test]
    async fn test_concurrent_updates_to_different_fields() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let alice = user("alice@example.com", "customer");
        repo.create(&alice).await.unwrap();

        let actor = ActingIdentity {
            user_id: alice.user_id,
            email: "alice@example.com".to_string(),
        };

        let email_patch = UserPatch {
            email: Some(Email::new("alice@wonderland.example").unwrap()),
            ..Default::default()
        };
        let name_patch = UserPatch {
            full_name: Some(ProfileName::from_db("Alice Pleasance Liddell")),
            ..Default::default()
        };

        let first = tokio::spawn({
            let repo = repo.clone();
            let actor = actor.clone();
            let id = alice.user_id;
            async move { repo.update(&id, &email_patch, &actor).await }
        });
        let second = tokio::spawn({
            let repo = repo.clone();
            let actor = actor.clone();
            let id = alice.user_id;
            async move { repo.update(&id, &name_patch, &actor).await }
        });

        assert!(first.await.unwrap().unwrap().is_some());
        assert!(second.await.unwrap().unwrap().is_some());

        let stored = repo.find_by_id(&alice.user_id).await.unwrap().unwrap();
        assert_eq!(stored.email.as_str(), "alice@wonderland.example");
        assert_eq!(stored.full_name.as_str(), "Alice Pleasance Liddell");

        let edits = repo.list_edits(alice.user_id.as_uuid()).await.unwrap();
        assert_eq!(edits.len(), 2);
    }
}
