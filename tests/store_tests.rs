//! CRUD contract tests for the user store.

use roster::db::{NewUser, Store, StoreError, UserChanges};

async fn spawn_store() -> Store {
    let db_path = std::env::temp_dir().join(format!("roster-store-test-{}.db", uuid::Uuid::new_v4()));

    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to create store")
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        status: true,
        role: false,
    }
}

#[tokio::test]
async fn created_user_is_retrievable_with_fields_intact() {
    let store = spawn_store().await;

    let created = store
        .create_user(new_user("alice", "alice@example.com"))
        .await
        .expect("create user");

    let fetched = store.get_user(created.id).await.expect("get user");
    assert_eq!(fetched.username, "alice");
    assert_eq!(fetched.email, "alice@example.com");
    assert!(fetched.status);
    assert!(!fetched.role);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn duplicate_username_or_email_rejected_without_new_row() {
    let store = spawn_store().await;

    store
        .create_user(new_user("alice", "alice@example.com"))
        .await
        .expect("first create");

    let err = store
        .create_user(new_user("alice", "other@example.com"))
        .await
        .expect_err("duplicate username must fail");
    assert!(matches!(err, StoreError::Duplicate { field: "username", .. }));

    let err = store
        .create_user(new_user("bob", "alice@example.com"))
        .await
        .expect_err("duplicate email must fail");
    assert!(matches!(err, StoreError::Duplicate { field: "email", .. }));

    let users = store.list_users().await.expect("list");
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn absent_ids_fail_with_not_found() {
    let store = spawn_store().await;

    assert!(matches!(
        store.get_user(999).await,
        Err(StoreError::NotFound(999))
    ));

    let changes = UserChanges {
        username: "ghost".to_string(),
        email: "ghost@example.com".to_string(),
        status: false,
        role: false,
    };
    assert!(matches!(
        store.update_user(999, changes).await,
        Err(StoreError::NotFound(999))
    ));

    assert!(matches!(
        store.delete_user(999).await,
        Err(StoreError::NotFound(999))
    ));
}

#[tokio::test]
async fn delete_removes_exactly_that_row() {
    let store = spawn_store().await;

    let alice = store
        .create_user(new_user("alice", "alice@example.com"))
        .await
        .expect("create alice");
    let bob = store
        .create_user(new_user("bob", "bob@example.com"))
        .await
        .expect("create bob");

    store.delete_user(alice.id).await.expect("delete alice");

    assert!(matches!(
        store.get_user(alice.id).await,
        Err(StoreError::NotFound(_))
    ));

    let remaining = store.list_users().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, bob.id);
}

#[tokio::test]
async fn update_replaces_fields_in_place() {
    let store = spawn_store().await;

    let created = store
        .create_user(new_user("alice", "alice@example.com"))
        .await
        .expect("create");

    let updated = store
        .update_user(
            created.id,
            UserChanges {
                username: "alicia".to_string(),
                email: "alicia@example.com".to_string(),
                status: false,
                role: true,
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.username, "alicia");
    assert!(!updated.status);
    assert!(updated.role);

    let fetched = store.get_user(created.id).await.expect("get");
    assert_eq!(fetched, updated);
}
