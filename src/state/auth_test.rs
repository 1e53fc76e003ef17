use axum::Json;
use axum::Router;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use serde_json::{Value, json};

use super::*;
use crate::net::api::ApiClient;
use crate::test_support::{mint_token, spawn_api, unreachable_api, user_json};
use crate::util::storage::{FileStorage, MemoryStorage};

const FAR_FUTURE: u64 = 4_000_000_000;
const NOW: u64 = 1_800_000_000;

/// Memory storage whose removal of one key always fails.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_remove: Option<&'static str>,
}

impl KeyValueStorage for FlakyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_remove == Some(key) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.remove_item(key)
    }
}

fn seeded(token: Option<&str>, user: Option<Value>) -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    if let Some(token) = token {
        storage.set_item(TOKEN_KEY, token).unwrap();
    }
    if let Some(user) = user {
        storage.set_item(USER_KEY, &user.to_string()).unwrap();
    }
    storage
}

fn offline_store(storage: MemoryStorage) -> AuthStore<MemoryStorage> {
    AuthStore::new(AuthService::new(unreachable_api()), storage)
}

fn store_for(api: ApiClient) -> AuthStore<MemoryStorage> {
    AuthStore::new(AuthService::new(api), MemoryStorage::new())
}

fn login_form() -> LoginForm {
    LoginForm { email: "asha@example.com".to_owned(), password: "Str0ng!Pass".to_owned() }
}

async fn signed_in_store(router: Router) -> AuthStore<MemoryStorage> {
    let token = mint_token("u1", FAR_FUTURE);
    let reply = json!({ "token": token, "user": user_json("u1") });
    let router = router.route(
        "/auth/signin",
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );
    let mut store = store_for(spawn_api(router).await);
    store.login(&login_form()).await.unwrap();
    store
}

// =============================================================================
// restore
// =============================================================================

#[test]
fn restore_without_token_returns_false_and_clears_storage() {
    let mut store = offline_store(seeded(None, Some(user_json("u1"))));
    assert!(!store.restore_at(NOW));
    assert!(!store.is_authenticated());
    assert!(store.storage().is_empty());
}

#[test]
fn restore_valid_session_populates_state() {
    let token = mint_token("u1", FAR_FUTURE);
    let mut store = offline_store(seeded(Some(&token), Some(user_json("u1"))));

    assert!(store.restore_at(NOW));
    assert!(store.is_authenticated());
    assert_eq!(store.token(), Some(token.as_str()));
    assert_eq!(store.user().map(|u| u.id.as_str()), Some("u1"));
    assert_eq!(store.state().expires_at, Some(FAR_FUTURE));
    assert_eq!(store.storage().len(), 2);
}

#[test]
fn restore_expired_session_returns_false_and_clears_storage() {
    let token = mint_token("u1", NOW - 1);
    let mut store = offline_store(seeded(Some(&token), Some(user_json("u1"))));

    assert!(!store.restore_at(NOW));
    assert!(!store.is_authenticated());
    assert_eq!(store.storage().get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(store.storage().get_item(USER_KEY).unwrap(), None);
}

#[test]
fn restore_token_expiring_now_is_expired() {
    let token = mint_token("u1", NOW);
    let mut store = offline_store(seeded(Some(&token), Some(user_json("u1"))));
    assert!(!store.restore_at(NOW));
}

#[test]
fn restore_token_without_user_clears_token() {
    let token = mint_token("u1", FAR_FUTURE);
    let mut store = offline_store(seeded(Some(&token), None));
    assert!(!store.restore_at(NOW));
    assert!(store.storage().is_empty());
}

#[test]
fn restore_garbage_token_or_user_clears_storage() {
    let mut store = offline_store(seeded(Some("garbage"), Some(user_json("u1"))));
    assert!(!store.restore_at(NOW));
    assert!(store.storage().is_empty());

    let token = mint_token("u1", FAR_FUTURE);
    let mut storage = seeded(Some(&token), None);
    storage.set_item(USER_KEY, "{broken").unwrap();
    let mut store = offline_store(storage);
    assert!(!store.restore_at(NOW));
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn corrupt_session_file_is_cleared_and_login_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{truncated").unwrap();

    let token = mint_token("u1", FAR_FUTURE);
    let reply = json!({ "token": token, "user": user_json("u1") });
    let router = Router::new().route(
        "/auth/signin",
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );
    let api = spawn_api(router).await;
    let mut store = AuthStore::new(AuthService::new(api), FileStorage::new(&path));

    assert!(!store.restore());
    assert_eq!(store.storage().get_item(TOKEN_KEY).unwrap(), None);

    store.login(&login_form()).await.unwrap();
    assert!(store.is_authenticated());

    let mut reopened = AuthStore::new(AuthService::new(unreachable_api()), FileStorage::new(&path));
    assert!(reopened.restore());
    assert_eq!(reopened.user().map(|u| u.id.as_str()), Some("u1"));

    std::fs::write(&path, "{truncated").unwrap();
    reopened.logout().unwrap();
    assert_eq!(reopened.storage().get_item(USER_KEY).unwrap(), None);
}

// =============================================================================
// check_session / require_token
// =============================================================================

#[test]
fn check_session_clears_once_expired() {
    let token = mint_token("u1", NOW + 60);
    let mut store = offline_store(seeded(Some(&token), Some(user_json("u1"))));
    assert!(store.restore_at(NOW));

    assert!(store.check_session_at(NOW + 59));
    assert!(!store.check_session_at(NOW + 60));
    assert!(!store.is_authenticated());
    assert!(store.storage().is_empty());
}

#[test]
fn require_token_distinguishes_missing_and_expired() {
    let mut store = offline_store(MemoryStorage::new());
    assert!(matches!(store.require_token_at(NOW), Err(AuthStoreError::NotAuthenticated)));

    let token = mint_token("u1", NOW + 10);
    let mut store = offline_store(seeded(Some(&token), Some(user_json("u1"))));
    assert!(store.restore_at(NOW));
    assert_eq!(store.require_token_at(NOW).unwrap(), token);
    assert!(matches!(store.require_token_at(NOW + 10), Err(AuthStoreError::SessionExpired)));
    assert!(matches!(store.require_token_at(NOW + 10), Err(AuthStoreError::NotAuthenticated)));
}

// =============================================================================
// logout
// =============================================================================

#[test]
fn logout_clears_both_keys() {
    let token = mint_token("u1", FAR_FUTURE);
    let mut store = offline_store(seeded(Some(&token), Some(user_json("u1"))));
    assert!(store.restore_at(NOW));

    store.logout().unwrap();
    assert!(!store.is_authenticated());
    assert_eq!(store.state(), &AuthState::default());
    assert!(store.storage().is_empty());
}

#[test]
fn logout_without_session_still_clears_storage() {
    let mut store = offline_store(seeded(Some("stale"), Some(user_json("u1"))));
    store.logout().unwrap();
    assert!(store.storage().is_empty());
}

#[test]
fn logout_removes_user_even_when_token_removal_fails() {
    let mut storage = FlakyStorage { fail_remove: Some(TOKEN_KEY), ..FlakyStorage::default() };
    storage.set_item(TOKEN_KEY, "tok").unwrap();
    storage.set_item(USER_KEY, &user_json("u1").to_string()).unwrap();
    let mut store = AuthStore::new(AuthService::new(unreachable_api()), storage);

    let err = store.logout().unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
    assert_eq!(store.storage().get_item(USER_KEY).unwrap(), None);
    assert!(!store.is_authenticated());
}

// =============================================================================
// flows
// =============================================================================

#[tokio::test]
async fn login_persists_token_and_user() {
    let store = signed_in_store(Router::new()).await;

    assert!(store.is_authenticated());
    assert_eq!(store.state().expires_at, Some(FAR_FUTURE));
    assert_eq!(store.storage().get_item(TOKEN_KEY).unwrap().as_deref(), store.token());
    let saved: User = load_json(store.storage(), USER_KEY).unwrap().unwrap();
    assert_eq!(saved.id, "u1");
}

#[tokio::test]
async fn login_failure_leaves_store_signed_out() {
    let router = Router::new().route(
        "/auth/signin",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))) }),
    );
    let mut store = store_for(spawn_api(router).await);

    let err = store.login(&login_form()).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!store.is_authenticated());
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn login_rejects_already_expired_token() {
    let reply = json!({ "token": mint_token("u1", 1), "user": user_json("u1") });
    let router = Router::new().route(
        "/auth/signin",
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );
    let mut store = store_for(spawn_api(router).await);

    assert!(matches!(store.login(&login_form()).await, Err(AuthStoreError::SessionExpired)));
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn signup_does_not_start_session_until_verified() {
    let reply = json!({ "token": mint_token("u1", FAR_FUTURE), "user": user_json("u1") });
    let router = Router::new()
        .route("/auth/signup", post(|| async { (StatusCode::CREATED, Json(json!({ "message": "OTP sent" }))) }))
        .route(
            "/auth/verify",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        );
    let mut store = store_for(spawn_api(router).await);

    let form = SignupForm {
        first_name: "Asha".to_owned(),
        last_name: "Rao".to_owned(),
        email: "asha@example.com".to_owned(),
        password: "Str0ng!Pass".to_owned(),
        confirm_password: "Str0ng!Pass".to_owned(),
    };
    assert_eq!(store.signup(&form).await.unwrap().message, "OTP sent");
    assert!(!store.is_authenticated());

    let user = store
        .verify_otp(&OtpForm { email: "asha@example.com".to_owned(), otp: "123456".to_owned() })
        .await
        .unwrap();
    assert_eq!(user.id, "u1");
    assert!(store.is_authenticated());
    assert_eq!(store.storage().len(), 2);
}

#[tokio::test]
async fn refresh_user_updates_saved_user() {
    let router = Router::new().route(
        "/auth/user-details",
        get(|| async {
            let mut user = user_json("u1");
            user["phone"] = json!("9876543210");
            Json(json!({ "user": user }))
        }),
    );
    let mut store = signed_in_store(router).await;

    let user = store.refresh_user().await.unwrap();
    assert_eq!(user.phone.as_deref(), Some("9876543210"));
    let saved: User = load_json(store.storage(), USER_KEY).unwrap().unwrap();
    assert_eq!(saved.phone.as_deref(), Some("9876543210"));
}

#[tokio::test]
async fn rejected_token_ends_session() {
    let router = Router::new().route(
        "/auth/user-details",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))) }),
    );
    let mut store = signed_in_store(router).await;

    assert!(matches!(store.refresh_user().await, Err(AuthStoreError::SessionExpired)));
    assert!(!store.is_authenticated());
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn server_errors_keep_session() {
    let router = Router::new().route(
        "/auth/user-details",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "db down" }))) }),
    );
    let mut store = signed_in_store(router).await;

    let err = store.refresh_user().await.unwrap_err();
    assert_eq!(err.to_string(), "db down");
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn update_profile_replaces_user() {
    let router = Router::new().route(
        "/auth/update",
        put(|mut multipart: Multipart| async move {
            let mut user = user_json("u1");
            while let Some(field) = multipart.next_field().await.unwrap() {
                if field.name() == Some("lastName") {
                    user["lastName"] = json!(field.text().await.unwrap());
                }
            }
            Json(json!({ "user": user, "message": "Profile updated" }))
        }),
    );
    let mut store = signed_in_store(router).await;

    let mut form = ProfileForm::from_user(store.user().unwrap());
    form.last_name = "Rao-Kulkarni".to_owned();
    let user = store.update_profile(&form, None).await.unwrap();

    assert_eq!(user.last_name, "Rao-Kulkarni");
    assert_eq!(store.user().map(|u| u.last_name.as_str()), Some("Rao-Kulkarni"));
}

#[tokio::test]
async fn profile_update_requires_session() {
    let mut store = offline_store(MemoryStorage::new());
    let form = ProfileForm { first_name: "Asha".to_owned(), last_name: "Rao".to_owned(), ..ProfileForm::default() };
    assert!(matches!(store.update_profile(&form, None).await, Err(AuthStoreError::NotAuthenticated)));
}
