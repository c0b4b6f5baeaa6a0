use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::MovieId};

/// The catalog refuses pages beyond this one.
pub const MAX_PAGES: u32 = 500;

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const LANGUAGE: &str = "en-US";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Popular,
    NowPlaying,
    Upcoming,
    TopRated,
}

impl Category {
    pub const ALL: [Category; 4] =
        [Category::Popular, Category::NowPlaying, Category::Upcoming, Category::TopRated];

    pub fn endpoint(self) -> &'static str {
        match self {
            Category::Popular => "/movie/popular",
            Category::NowPlaying => "/movie/now_playing",
            Category::Upcoming => "/movie/upcoming",
            Category::TopRated => "/movie/top_rated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Popular => "Popular",
            Category::NowPlaying => "Now Playing",
            Category::Upcoming => "Upcoming",
            Category::TopRated => "Top Rated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

impl MovieSummary {
    pub fn poster_url(&self) -> Option<String> {
        poster_url(self.poster_path.as_deref())
    }

    pub fn release_year(&self) -> Option<&str> {
        release_year(self.release_date.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub original_language: Option<String>,
    pub tagline: Option<String>,
}

impl MovieDetails {
    pub fn poster_url(&self) -> Option<String> {
        poster_url(self.poster_path.as_deref())
    }

    pub fn release_year(&self) -> Option<&str> {
        release_year(self.release_date.as_deref())
    }
}

impl From<MovieDetails> for MovieSummary {
    fn from(d: MovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            overview: d.overview,
            poster_path: d.poster_path,
            release_date: d.release_date,
            vote_average: d.vote_average,
        }
    }
}

fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty()).map(|p| format!("{POSTER_BASE_URL}{p}"))
}

fn release_year(date: Option<&str>) -> Option<&str> {
    date.and_then(|d| d.split('-').next()).filter(|y| !y.is_empty())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<MovieSummary>,
    pub total_pages: u32,
}

/// Read-only source of movie metadata.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list(&self, category: Category, page: u32) -> AppResult<MoviePage>;

    /// Free-text search. A blank query yields an empty page.
    async fn search(&self, query: &str, page: u32) -> AppResult<MoviePage>;

    async fn details(&self, movie_id: MovieId) -> AppResult<MovieDetails>;
}

#[derive(Clone, Debug)]
pub enum TmdbAuth {
    /// v4 read access token, sent as a bearer header.
    Bearer(String),
    /// v3 key, sent as the `api_key` query parameter.
    ApiKey(String),
    None,
}

impl TmdbAuth {
    pub fn from_config(access_token: Option<String>, api_key: Option<String>) -> Self {
        match (access_token, api_key) {
            (Some(token), _) => TmdbAuth::Bearer(token),
            (None, Some(key)) => TmdbAuth::ApiKey(key),
            (None, None) => TmdbAuth::None,
        }
    }
}

pub struct TmdbClient {
    client: reqwest::Client,
    auth: TmdbAuth,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, auth: TmdbAuth, base_url: String, rps: u32) -> Self {
        if matches!(auth, TmdbAuth::None) {
            tracing::warn!("no TMDB credentials configured, catalog requests will be rejected");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { client, auth, base_url, limiter }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        self.limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(url).query(&[("language", LANGUAGE)]).query(query);
        req = match &self.auth {
            TmdbAuth::Bearer(token) => req.bearer_auth(token),
            TmdbAuth::ApiKey(key) => req.query(&[("api_key", key)]),
            TmdbAuth::None => req,
        };

        tracing::debug!(path = %path, "catalog request");
        Ok(req.send().await?.error_for_status()?.json().await?)
    }
}

fn capped(mut page: MoviePage) -> MoviePage {
    page.total_pages = page.total_pages.min(MAX_PAGES);
    page
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn list(&self, category: Category, page: u32) -> AppResult<MoviePage> {
        let page = page.clamp(1, MAX_PAGES);
        let resp = self.fetch(category.endpoint(), &[("page", page.to_string())]).await?;
        Ok(capped(resp))
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(MoviePage { page: 1, ..Default::default() });
        }

        let page = page.clamp(1, MAX_PAGES);
        let resp = self
            .fetch(
                "/search/movie",
                &[
                    ("query", query.to_string()),
                    ("page", page.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;
        Ok(capped(resp))
    }

    async fn details(&self, movie_id: MovieId) -> AppResult<MovieDetails> {
        self.fetch(&format!("/movie/{movie_id}"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_url_prefixes_image_host() {
        let movie = MovieSummary {
            id: 550,
            title: "Fight Club".into(),
            overview: String::new(),
            poster_path: Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg".into()),
            release_date: Some("1999-10-15".into()),
            vote_average: 8.4,
        };
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg")
        );
        assert_eq!(movie.release_year(), Some("1999"));
    }

    #[test]
    fn missing_release_date_has_no_year() {
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
        assert_eq!(poster_url(Some("")), None);
    }

    #[test]
    fn total_pages_is_capped() {
        let page = capped(MoviePage { page: 1, results: vec![], total_pages: 40_000 });
        assert_eq!(page.total_pages, MAX_PAGES);
    }

    #[test]
    fn bearer_token_wins_over_api_key() {
        let auth = TmdbAuth::from_config(Some("tok".into()), Some("key".into()));
        assert!(matches!(auth, TmdbAuth::Bearer(t) if t == "tok"));
        let auth = TmdbAuth::from_config(None, Some("key".into()));
        assert!(matches!(auth, TmdbAuth::ApiKey(k) if k == "key"));
    }

    mod stub {
        use std::sync::{Arc, Mutex};

        use axum::{
            Json, Router,
            extract::State,
            http::{HeaderMap, Uri, header::AUTHORIZATION},
        };
        use serde_json::{Value, json};

        pub type Seen = Arc<Mutex<Vec<String>>>;

        async fn respond(State(seen): State<Seen>, uri: Uri, headers: HeaderMap) -> Json<Value> {
            let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).unwrap_or("-");
            seen.lock().unwrap().push(format!("{uri} {auth}"));

            if uri.path() == "/movie/550" {
                Json(json!({
                    "id": 550,
                    "title": "Fight Club",
                    "runtime": 139,
                    "genres": [{ "id": 18, "name": "Drama" }],
                }))
            } else {
                Json(json!({
                    "page": 2,
                    "results": [{ "id": 348, "title": "Alien", "poster_path": null }],
                    "total_pages": 900,
                }))
            }
        }

        /// Serves canned catalog responses and returns its base url.
        pub async fn spawn(seen: Seen) -> String {
            let app = Router::new().fallback(respond).with_state(seen);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            format!("http://{addr}")
        }
    }

    #[tokio::test]
    async fn client_sends_language_auth_and_paging() {
        let seen = stub::Seen::default();
        let base = stub::spawn(seen.clone()).await;
        let client = TmdbClient::new(reqwest::Client::new(), TmdbAuth::Bearer("tok".into()), base, 50);

        let page = client.list(Category::TopRated, 2).await.unwrap();
        assert_eq!(page.total_pages, MAX_PAGES);
        assert_eq!(page.results[0].title, "Alien");

        let details = client.details(550).await.unwrap();
        assert_eq!(details.runtime, Some(139));
        assert_eq!(details.genres[0].name, "Drama");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("/movie/top_rated?"));
        assert!(seen[0].contains("language=en-US"));
        assert!(seen[0].contains("page=2"));
        assert!(seen[0].ends_with(" Bearer tok"));
        assert!(seen[1].starts_with("/movie/550?language=en-US"));
    }

    #[tokio::test]
    async fn search_uses_api_key_and_skips_blank_queries() {
        let seen = stub::Seen::default();
        let base = stub::spawn(seen.clone()).await;
        let client = TmdbClient::new(reqwest::Client::new(), TmdbAuth::ApiKey("key".into()), base, 50);

        let empty = client.search("   ", 3).await.unwrap();
        assert!(empty.results.is_empty());
        assert!(seen.lock().unwrap().is_empty());

        let found = client.search(" alien ", 1).await.unwrap();
        assert_eq!(found.results.len(), 1);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("/search/movie?"));
        assert!(seen[0].contains("query=alien"));
        assert!(seen[0].contains("include_adult=false"));
        assert!(seen[0].contains("api_key=key"));
        assert!(seen[0].ends_with(" -"));
    }

    #[test]
    fn details_tolerate_sparse_payloads() {
        let details: MovieDetails =
            serde_json::from_str(r#"{"id": 7, "title": "Sparse", "poster_path": null}"#).unwrap();
        assert!(details.genres.is_empty());
        assert_eq!(details.runtime, None);
        let summary = MovieSummary::from(details);
        assert_eq!(summary.id, 7);
    }
}
