use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_access_token: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub api_base_url: String,
    pub search_debounce: Duration,
    pub local_store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cinenotes.db?mode=rwc".to_string());

        let tmdb_access_token = non_empty_var("TMDB_ACCESS_TOKEN");
        let tmdb_api_key = non_empty_var("TMDB_API_KEY");
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}/api"));

        let search_debounce_ms: u64 =
            std::env::var("SEARCH_DEBOUNCE_MS").ok().and_then(|s| s.parse().ok()).unwrap_or(500);

        let local_store_path = std::env::var("LOCAL_STORE_PATH")
            .unwrap_or_else(|_| "cinenotes-local.json".to_string())
            .into();

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_access_token,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_rps,
            api_base_url,
            search_debounce: Duration::from_millis(search_debounce_ms),
            local_store_path,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
