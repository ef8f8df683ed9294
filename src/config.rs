use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Exact origin the frontend is served from. When unset, CORS is permissive.
    pub frontend_origin: Option<String>,
    /// Directory served for non-API paths.
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let frontend_origin = std::env::var("FRONTEND_ORIGIN").ok();
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "frontend".into());
        Ok(Self {
            database_url,
            frontend_origin,
            static_dir,
        })
    }
}
