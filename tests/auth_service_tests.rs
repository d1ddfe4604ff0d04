//! Session lifecycle tests
//!
//! Exercise the authentication service end-to-end over the in-memory store:
//! login, introspection, refresh, revocation, and the compromise handling
//! around failed refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use keygate::auth::{jwt, AuthError, AuthService};
use keygate::models::{CreateUserRequest, User};
use keygate::store::{AuthStore, MemoryStore};
use keygate::users::UserService;

const SECRET: &str = "test-secret";
const ACCESS_TTL_SECONDS: i64 = 900;
const REFRESH_TTL_DAYS: i64 = 7;

// Minimum bcrypt cost keeps the suite fast.
const BCRYPT_COST: u32 = 4;

struct Harness {
    store: Arc<MemoryStore>,
    auth: AuthService<MemoryStore>,
    users: UserService<MemoryStore>,
    user: User,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let auth = AuthService::new(
        store.clone(),
        SECRET.to_string(),
        ACCESS_TTL_SECONDS,
        REFRESH_TTL_DAYS,
    );
    let users = UserService::new(store.clone(), BCRYPT_COST);

    let user = users
        .create_user(CreateUserRequest {
            email: "a@x.com".to_string(),
            name: Some("Test User".to_string()),
            password: "p1".to_string(),
        })
        .await
        .expect("seed user");

    Harness {
        store,
        auth,
        users,
        user,
    }
}

#[tokio::test]
async fn login_then_authenticate_round_trips() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    let claims = h.auth.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.user_id().unwrap(), h.user.id);
    assert_eq!(claims.role, "tenant");
}

#[tokio::test]
async fn wrong_password_creates_no_session() {
    let h = harness().await;

    let err = h.auth.password_login("a@x.com", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(h.store.session_count(), 0);
}

#[tokio::test]
async fn unknown_email_is_indistinguishable_from_wrong_password() {
    let h = harness().await;

    let wrong_password = h.auth.password_login("a@x.com", "wrong").await.unwrap_err();
    let unknown_email = h.auth.password_login("b@x.com", "p1").await.unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(h.store.session_count(), 0);
}

#[tokio::test]
async fn refresh_reuses_the_session_and_advances_updated_at() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();
    let session_id = h
        .auth
        .authenticate(&pair.access_token)
        .await
        .unwrap()
        .session_id()
        .unwrap();

    let mut tx = h.store.begin().await.unwrap();
    let before = h
        .store
        .find_session(&mut tx, session_id)
        .await
        .unwrap()
        .unwrap();
    drop(tx);

    tokio::time::sleep(Duration::from_millis(10)).await;

    let refreshed = h.auth.refresh_login(&pair.refresh_token).await.unwrap();

    // Same session, same refresh token, new access token.
    let claims = h.auth.authenticate(&refreshed.access_token).await.unwrap();
    assert_eq!(claims.session_id().unwrap(), session_id);
    assert_eq!(refreshed.refresh_token, pair.refresh_token);

    let mut tx = h.store.begin().await.unwrap();
    let after = h
        .store
        .find_session(&mut tx, session_id)
        .await
        .unwrap()
        .unwrap();
    drop(tx);

    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(h.store.session_count(), 1);
}

#[tokio::test]
async fn logout_revokes_and_is_idempotent() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();

    h.auth.logout(&pair.access_token).await.unwrap();
    assert_eq!(h.store.session_count(), 0);

    let err = h.auth.authenticate(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionNotFound));

    // Second logout with the same token still succeeds.
    h.auth.logout(&pair.access_token).await.unwrap();
}

#[tokio::test]
async fn expired_refresh_token_revokes_its_session() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();
    let session_id = h
        .auth
        .authenticate(&pair.access_token)
        .await
        .unwrap()
        .session_id()
        .unwrap();

    // An expired token for the live session, signed with the real secret.
    let expired = jwt::sign_refresh_token(session_id, SECRET, -1).unwrap();

    let err = h.auth.refresh_login(&expired).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
    assert_eq!(h.store.session_count(), 0);

    // The still-unexpired refresh token now references a dead session.
    let err = h.auth.refresh_login(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionNotFound));
}

#[tokio::test]
async fn garbage_refresh_token_revokes_nothing() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();

    let err = h.auth.refresh_login("not.a.token").await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid(_)));
    assert_eq!(h.store.session_count(), 1);

    // A token signed with a different secret must not trigger revocation
    // either, even though it decodes structurally.
    let session_id = h
        .auth
        .authenticate(&pair.access_token)
        .await
        .unwrap()
        .session_id()
        .unwrap();
    let forged = jwt::sign_refresh_token(session_id, "other-secret", -1).unwrap();

    let err = h.auth.refresh_login(&forged).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid(_)));
    assert_eq!(h.store.session_count(), 1);
}

#[tokio::test]
async fn logout_honors_an_expired_access_token() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();
    let session_id = h
        .auth
        .authenticate(&pair.access_token)
        .await
        .unwrap()
        .session_id()
        .unwrap();

    let expired = jwt::sign_access_token(&h.user, session_id, SECRET, -10).unwrap();

    h.auth.logout(&expired).await.unwrap();
    assert_eq!(h.store.session_count(), 0);
}

#[tokio::test]
async fn logout_with_garbage_token_is_a_no_op_success() {
    let h = harness().await;

    h.auth.password_login("a@x.com", "p1").await.unwrap();

    h.auth.logout("not.a.token").await.unwrap();
    assert_eq!(h.store.session_count(), 1);
}

#[tokio::test]
async fn each_login_opens_its_own_session() {
    let h = harness().await;

    let first = h.auth.password_login("a@x.com", "p1").await.unwrap();
    let second = h.auth.password_login("a@x.com", "p1").await.unwrap();
    assert_eq!(h.store.session_count(), 2);

    // Logging out of one session leaves the other live.
    h.auth.logout(&first.access_token).await.unwrap();
    assert_eq!(h.store.session_count(), 1);
    h.auth.authenticate(&second.access_token).await.unwrap();
}

#[tokio::test]
async fn deleting_the_user_invalidates_their_sessions() {
    let h = harness().await;

    let pair = h.auth.password_login("a@x.com", "p1").await.unwrap();
    h.users.delete_user(h.user.id).await.unwrap();

    let err = h.auth.authenticate(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionNotFound));
}
