//! Integration tests for the user store using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tollgate_core::error::TollgateError;
use tollgate_core::models::user::{CreateUser, UpdateUser};
use tollgate_core::repository::UserRepository;
use tollgate_db::repository::SurrealUserRepository;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> SurrealUserRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tollgate_db::run_migrations(&db).await.unwrap();
    SurrealUserRepository::new(db)
}

fn alice() -> CreateUser {
    CreateUser {
        username: "alice".into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
        role_id: 2,
        first_name: "Alice".into(),
        last_name: "Liddell".into(),
        email: "alice@example.com".into(),
        is_admin: false,
        is_active: true,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = setup().await;

    let user = repo.create(alice()).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.role_id, 2);
    assert!(user.is_active);
    assert!(!user.is_admin);

    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.id, user.id);
    assert_eq!(by_id.username, user.username);
    assert_eq!(by_id.password_hash, user.password_hash);

    let by_name = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(by_name.email, "alice@example.com");
}

#[tokio::test]
async fn ids_are_numeric_and_distinct() {
    let repo = setup().await;

    let first = repo.create(alice()).await.unwrap();
    let second = repo
        .create(CreateUser {
            username: "bob".into(),
            email: "bob@example.com".into(),
            ..alice()
        })
        .await
        .unwrap();

    assert!(first.id > 0);
    assert!(second.id > first.id);
}

#[tokio::test]
async fn duplicate_username_is_already_exists() {
    let repo = setup().await;
    repo.create(alice()).await.unwrap();

    let err = repo.create(alice()).await.unwrap_err();
    assert!(
        matches!(err, TollgateError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let repo = setup().await;

    assert!(matches!(
        repo.get_by_id(999).await,
        Err(TollgateError::NotFound { .. })
    ));
    assert!(matches!(
        repo.get_by_username("nobody").await,
        Err(TollgateError::NotFound { .. })
    ));
}

#[tokio::test]
async fn ids_beyond_storable_range_are_not_found() {
    let repo = setup().await;
    let huge = i64::MAX as u64 + 1;

    for id in [huge, u64::MAX] {
        assert!(matches!(
            repo.get_by_id(id).await,
            Err(TollgateError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update(id, UpdateUser::default()).await,
            Err(TollgateError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(id).await,
            Err(TollgateError::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let repo = setup().await;
    let user = repo.create(alice()).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                role_id: Some(9),
                is_admin: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role_id, 9);
    assert!(updated.is_admin);
    assert_eq!(updated.first_name, "Alice");
    assert_eq!(updated.password_hash, user.password_hash);
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let repo = setup().await;

    let err = repo
        .update(
            42,
            UpdateUser {
                role_id: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TollgateError::NotFound { .. }));
}

#[tokio::test]
async fn delete_removes_user() {
    let repo = setup().await;
    let user = repo.create(alice()).await.unwrap();

    repo.delete(user.id).await.unwrap();

    assert!(matches!(
        repo.get_by_username("alice").await,
        Err(TollgateError::NotFound { .. })
    ));
    assert!(matches!(
        repo.delete(user.id).await,
        Err(TollgateError::NotFound { .. })
    ));
}
