//! First-start admin provisioning.

use mimo_api::bootstrap::ensure_admin;
use mimo_api::config::AdminBootstrap;
use mimo_db::repositories::UserRepo;
use sqlx::SqlitePool;

fn admin(password: &str) -> AdminBootstrap {
    AdminBootstrap {
        email: "dona@mimo.test".to_string(),
        password: password.to_string(),
        name: "Dona Mimo".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn creates_admin_once(pool: SqlitePool) {
    assert!(ensure_admin(&pool, &admin("senha-forte-1")).await.unwrap());
    assert!(!ensure_admin(&pool, &admin("outra-senha-2")).await.unwrap());

    let user = UserRepo::find_by_email(&pool, "dona@mimo.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, "admin");
    assert_ne!(user.password_hash, "senha-forte-1");
    assert_eq!(UserRepo::list(&pool).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_password_is_refused(pool: SqlitePool) {
    assert!(ensure_admin(&pool, &admin("curta")).await.is_err());
    assert!(UserRepo::find_by_email(&pool, "dona@mimo.test")
        .await
        .unwrap()
        .is_none());
}
