use anyhow::Context;
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub seed_demo_data: bool,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| get(key).with_context(|| format!("{key} must be set"));

        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("SECRET_KEY")?,
            algorithm: parse_hmac_algorithm(&required("ALGORITHM")?)?,
            ttl_minutes: parse_ttl_minutes(&required("ACCESS_TOKEN_EXPIRE_MINUTES")?)?,
        };

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {v}"))?,
            None => 10,
        };
        let port = match get("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a port: {v}"))?,
            None => 8080,
        };

        Ok(Self {
            database_url,
            max_connections,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            seed_demo_data: get("SEED_DEMO_DATA")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            jwt,
        })
    }
}

// Only shared-secret algorithms make sense with a single SECRET_KEY.
fn parse_hmac_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    match name.trim().to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => anyhow::bail!("ALGORITHM must be one of HS256, HS384, HS512 (got {other})"),
    }
}

fn parse_ttl_minutes(raw: &str) -> anyhow::Result<i64> {
    let minutes = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("ACCESS_TOKEN_EXPIRE_MINUTES is not a number: {raw}"))?;
    anyhow::ensure!(minutes > 0, "ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
    Ok(minutes)
}
