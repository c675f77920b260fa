// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-factor flow against a real (in-memory) credential store.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tagvault_auth::{AuthService, AuthState, EntryInput, SessionRegistry, VaultService};
use tagvault_config::CryptoConfig;
use tagvault_core::{AuthError, CredentialStore, TagvaultError};
use tagvault_storage::SqliteStore;
use tagvault_vault::KeyManager;

struct Fixture {
    store: Arc<SqliteStore>,
    auth: AuthService,
    vault: VaultService,
}

async fn fixture() -> Fixture {
    let cost = CryptoConfig {
        scrypt_log_n: 10,
        scrypt_r: 8,
        scrypt_p: 1,
        password_memory_cost: 1024,
        password_iterations: 1,
        password_parallelism: 1,
    };
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let dyn_store: Arc<dyn CredentialStore> = store.clone();
    let auth = AuthService::new(
        Arc::clone(&dyn_store),
        Arc::new(KeyManager::new(cost).unwrap()),
        Arc::new(SessionRegistry::new(Duration::from_secs(60))),
    );
    Fixture {
        store,
        auth,
        vault: VaultService::new(dyn_store),
    }
}

fn pw(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn input(name: &str, password: &str) -> EntryInput {
    EntryInput {
        name: name.to_string(),
        password: password.to_string(),
        ..EntryInput::default()
    }
}

async fn full_session(f: &Fixture, user: &str, tag: &str) -> String {
    f.auth.register(user, pw("pw1"), tag).await.unwrap();
    let login = f.auth.login(user, pw("pw1"), None).await.unwrap();
    f.auth.verify_token(Some(login.session_id.as_str()), tag).await.unwrap();
    login.session_id
}

#[tokio::test]
async fn wrong_password_leaves_unauthenticated() {
    let f = fixture().await;
    f.auth.register("alice", pw("pw1"), "TAGX").await.unwrap();

    let err = f.auth.login("alice", pw("wrong"), None).await.unwrap_err();
    assert!(matches!(err, TagvaultError::Auth(AuthError::InvalidCredentials)));

    let unknown = f.auth.login("nobody", pw("pw1"), None).await.unwrap_err();
    assert_eq!(unknown.to_string(), err.to_string());
    assert!(f.auth.sessions().is_empty());
}

#[tokio::test]
async fn listing_requires_token_after_password() {
    let f = fixture().await;
    f.auth.register("alice", pw("pw1"), "TAGX").await.unwrap();
    let login = f.auth.login("alice", pw("pw1"), None).await.unwrap();
    assert_eq!(login.state, AuthState::PasswordVerified);
    let sid = Some(login.session_id.as_str());

    assert!(matches!(
        f.auth.context(sid).await,
        Err(TagvaultError::Auth(AuthError::NotAuthorized))
    ));

    let mismatch = f.auth.verify_token(sid, "TAGY").await.unwrap_err();
    assert!(matches!(mismatch, TagvaultError::Auth(AuthError::TokenMismatch)));
    assert_eq!(f.auth.status(sid).await, AuthState::PasswordVerified);

    assert_eq!(
        f.auth.verify_token(sid, " TAGX ").await.unwrap(),
        AuthState::FullyAuthenticated
    );
    let ctx = f.auth.context(sid).await.unwrap();
    assert!(f.vault.list(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn entries_round_trip_through_the_vault() {
    let f = fixture().await;
    let sid = full_session(&f, "alice", "TAGX").await;
    let ctx = f.auth.context(Some(sid.as_str())).await.unwrap();

    let id = f.vault.add(&ctx, input("site", "secret")).await.unwrap();
    let listed = f.vault.list(&ctx).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].password, "secret");
    assert!(listed[0].decryptable);

    f.vault.update(&ctx, &id, input("site", "rotated")).await.unwrap();
    assert_eq!(f.vault.list(&ctx).await.unwrap()[0].password, "rotated");

    f.vault.delete(&ctx, &id).await.unwrap();
    assert!(matches!(
        f.vault.delete(&ctx, &id).await,
        Err(TagvaultError::NotFound(_))
    ));
}

#[tokio::test]
async fn entries_survive_a_new_login() {
    let f = fixture().await;
    let sid = full_session(&f, "alice", "TAGX").await;
    let ctx = f.auth.context(Some(sid.as_str())).await.unwrap();
    f.vault.add(&ctx, input("site", "secret")).await.unwrap();
    f.auth.logout(Some(sid.as_str())).await;

    let login = f.auth.login("alice", pw("pw1"), None).await.unwrap();
    f.auth.verify_token(Some(login.session_id.as_str()), "TAGX").await.unwrap();
    let ctx = f.auth.context(Some(login.session_id.as_str())).await.unwrap();
    assert_eq!(f.vault.list(&ctx).await.unwrap()[0].password, "secret");
}

#[tokio::test]
async fn tampered_entry_is_isolated_in_listing() {
    let f = fixture().await;
    let sid = full_session(&f, "alice", "TAGX").await;
    let ctx = f.auth.context(Some(sid.as_str())).await.unwrap();
    let bad = f.vault.add(&ctx, input("a-broken", "one")).await.unwrap();
    f.vault.add(&ctx, input("b-fine", "two")).await.unwrap();

    let target = bad.clone();
    f.store
        .database()
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE vault_entries SET encrypted_secret = X'00112233445566778899AABBCCDDEEFF00' WHERE entry_id = ?1",
                [target],
            )
        })
        .await
        .unwrap();

    let listed = f.vault.list(&ctx).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, bad);
    assert!(!listed[0].decryptable);
    assert_eq!(listed[0].password, "[undecryptable]");
    assert!(listed[1].decryptable);
    assert_eq!(listed[1].password, "two");
}

#[tokio::test]
async fn other_users_cannot_touch_entries() {
    let f = fixture().await;
    let alice = full_session(&f, "alice", "TAG-A").await;
    let bob = full_session(&f, "bob", "TAG-B").await;
    let alice_ctx = f.auth.context(Some(alice.as_str())).await.unwrap();
    let bob_ctx = f.auth.context(Some(bob.as_str())).await.unwrap();

    let id = f.vault.add(&alice_ctx, input("site", "secret")).await.unwrap();
    assert!(matches!(
        f.vault.delete(&bob_ctx, &id).await,
        Err(TagvaultError::NotFound(_))
    ));
    assert!(matches!(
        f.vault.update(&bob_ctx, &id, input("x", "y")).await,
        Err(TagvaultError::NotFound(_))
    ));
    assert!(f.vault.list(&bob_ctx).await.unwrap().is_empty());
    assert_eq!(f.vault.list(&alice_ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let f = fixture().await;
    f.auth.register("alice", pw("pw1"), "TAGX").await.unwrap();
    assert!(matches!(
        f.auth.register("alice", pw("pw2"), "TAGY").await,
        Err(TagvaultError::DuplicateIdentity)
    ));
    assert!(matches!(
        f.auth.register("bob", pw("pw2"), "TAGX").await,
        Err(TagvaultError::DuplicateIdentity)
    ));
}

#[tokio::test]
async fn registration_validates_input() {
    let f = fixture().await;
    for (user, pass, tag) in [("", "pw", "T"), ("u", "", "T"), ("u", "pw", "  ")] {
        assert!(matches!(
            f.auth.register(user, pw(pass), tag).await,
            Err(TagvaultError::Validation(_))
        ));
    }
    let long = "x".repeat(65);
    assert!(matches!(
        f.auth.register(&long, pw("pw"), "T").await,
        Err(TagvaultError::Validation(_))
    ));
}

#[tokio::test]
async fn login_replaces_previous_session() {
    let f = fixture().await;
    let first = full_session(&f, "alice", "TAGX").await;
    let second = f.auth.login("alice", pw("pw1"), Some(first.as_str())).await.unwrap();

    assert_ne!(first, second.session_id);
    assert_eq!(f.auth.status(Some(first.as_str())).await, AuthState::Unauthenticated);
    assert_eq!(
        f.auth.status(Some(second.session_id.as_str())).await,
        AuthState::PasswordVerified
    );
}

#[tokio::test]
async fn logout_clears_access() {
    let f = fixture().await;
    let sid = full_session(&f, "alice", "TAGX").await;
    f.auth.logout(Some(sid.as_str())).await;
    assert_eq!(f.auth.status(Some(sid.as_str())).await, AuthState::Unauthenticated);
    assert!(f.auth.context(Some(sid.as_str())).await.is_err());
    assert!(f.auth.verify_token(Some(sid.as_str()), "TAGX").await.is_err());
}

#[tokio::test]
async fn token_provisioning_runs_once() {
    let f = fixture().await;
    f.auth.register("alice", pw("pw1"), "TAGX").await.unwrap();

    assert!(matches!(
        f.auth.initialize_token(None).await,
        Err(TagvaultError::Auth(AuthError::NotAuthorized))
    ));

    let login = f.auth.login("alice", pw("pw1"), None).await.unwrap();
    let sid = Some(login.session_id.as_str());
    let grant = f.auth.initialize_token(sid).await.unwrap();
    assert_eq!(grant.secret_hex.len(), 64);
    assert_eq!(grant.counter, 0);
    assert_eq!(f.auth.status(sid).await, AuthState::PasswordVerified);

    assert!(matches!(
        f.auth.initialize_token(sid).await,
        Err(TagvaultError::Conflict(_))
    ));

    f.auth.verify_token(sid, "TAGX").await.unwrap();
    let ctx = f.auth.context(sid).await.unwrap();
    assert_eq!(f.auth.advance_token_counter(&ctx).await.unwrap(), 1);
    assert_eq!(f.auth.advance_token_counter(&ctx).await.unwrap(), 2);
}

#[tokio::test]
async fn change_password_keeps_entries_readable() {
    let f = fixture().await;
    let sid = full_session(&f, "alice", "TAGX").await;
    let ctx = f.auth.context(Some(sid.as_str())).await.unwrap();
    f.vault.add(&ctx, input("site", "secret")).await.unwrap();

    let wrong = f.auth.change_password(&ctx, pw("nope"), pw("pw2")).await;
    assert!(matches!(wrong, Err(TagvaultError::Auth(AuthError::InvalidCredentials))));

    f.auth.change_password(&ctx, pw("pw1"), pw("pw2")).await.unwrap();
    assert_eq!(f.vault.list(&ctx).await.unwrap()[0].password, "secret");
    f.auth.logout(Some(sid.as_str())).await;

    assert!(f.auth.login("alice", pw("pw1"), None).await.is_err());
    let login = f.auth.login("alice", pw("pw2"), None).await.unwrap();
    f.auth.verify_token(Some(login.session_id.as_str()), "TAGX").await.unwrap();
    let ctx = f.auth.context(Some(login.session_id.as_str())).await.unwrap();
    assert_eq!(f.vault.list(&ctx).await.unwrap()[0].password, "secret");
}

#[tokio::test]
async fn entry_input_is_validated() {
    let f = fixture().await;
    let sid = full_session(&f, "alice", "TAGX").await;
    let ctx = f.auth.context(Some(sid.as_str())).await.unwrap();
    assert!(matches!(
        f.vault.add(&ctx, input(" ", "pw")).await,
        Err(TagvaultError::Validation(_))
    ));
    assert!(matches!(
        f.vault.add(&ctx, input("site", "")).await,
        Err(TagvaultError::Validation(_))
    ));
}
