use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::{
    auth::password::hash_password, config::AppConfig, products::dto::ProductInput,
    state::AppState,
};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

pub const DEMO_EMAIL: &str = "test@example.com";
const DEMO_PASSWORD: &str = "test123";

fn demo_products() -> Vec<ProductInput> {
    vec![
        ProductInput {
            name: "Smartphone".into(),
            description: "Modern smartphone with a good camera".into(),
            price: 29999.99,
            stock: 10,
        },
        ProductInput {
            name: "Laptop".into(),
            description: "Powerful laptop for work and games".into(),
            price: 59999.99,
            stock: 5,
        },
        ProductInput {
            name: "Headphones".into(),
            description: "Wireless headphones with noise cancelling".into(),
            price: 7999.99,
            stock: 15,
        },
    ]
}

/// Inserts the demo user and catalog. Safe to run on every start: existing
/// rows (by email / by name) are left alone.
pub async fn seed_demo_data(state: &AppState) -> anyhow::Result<()> {
    if state.users.find_by_email(DEMO_EMAIL).await?.is_none() {
        let hash = hash_password(DEMO_PASSWORD)?;
        state.users.create(DEMO_EMAIL, &hash).await?;
        warn!(email = DEMO_EMAIL, "demo user created; do not enable seeding in production");
    }

    let mut inserted = 0;
    for product in demo_products() {
        if state.products.find_by_name(&product.name).await?.is_none() {
            state.products.create(&product).await?;
            inserted += 1;
        }
    }
    info!(inserted, "demo products seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::password::verify_password, testing};

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let (state, users) = testing::fake_with_users();
        seed_demo_data(&state).await.expect("first seed");
        seed_demo_data(&state).await.expect("second seed");

        assert_eq!(users.len(), 1);
        let products = state.products.list(0, 100).await.unwrap();
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].name, "Smartphone");
    }

    #[tokio::test]
    async fn demo_user_can_log_in() {
        let state = AppState::fake();
        seed_demo_data(&state).await.expect("seed");
        let user = state.users.find_by_email(DEMO_EMAIL).await.unwrap().expect("user");
        assert!(user.is_active);
        assert!(verify_password(DEMO_PASSWORD, &user.password_hash));
    }
}
