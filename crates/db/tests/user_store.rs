//! Integration tests for the users repository.

use sqlx::SqlitePool;
use stencil_db::models::user::{NewUser, UserChanges, UserResponse};
use stencil_db::repositories::UserRepo;

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: None,
        password_hash: "$argon2id$stub".to_string(),
        role: "admin".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_find_update_delete(pool: SqlitePool) {
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
    let user = UserRepo::create(&pool, &new_user("ana")).await.unwrap();
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);

    let found = UserRepo::find_by_username(&pool, "ana").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    let updated = UserRepo::update(
        &pool,
        user.id,
        &UserChanges {
            email: Some("ana@example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.email.as_deref(), Some("ana@example.com"));
    assert_eq!(updated.password_hash, user.password_hash);

    assert!(UserRepo::delete(&pool, user.id).await.unwrap());
    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_rejected(pool: SqlitePool) {
    UserRepo::create(&pool, &new_user("ana")).await.unwrap();
    let err = UserRepo::create(&pool, &new_user("ana")).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("expected database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_omits_password_hash(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("ana")).await.unwrap();
    let json = serde_json::to_value(UserResponse::from(user)).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["role"], "admin");
}
