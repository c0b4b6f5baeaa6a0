use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use super::AnnotationStore;
use crate::{
    error::{AppError, AppResult, ErrorBody},
    models::{
        Collection, CollectionId, CreateCollectionRequest, MovieEntry, MovieId, MovieIdRequest,
        NoteBody, Rating, RatingBody, Success,
    },
};

/// Client for the annotation service's `/api` surface.
#[derive(Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let resp = self.client.delete(self.url(path)).send().await?;
        check(resp).await?;
        Ok(())
    }
}

/// Maps an error response back onto the shared error taxonomy.
async fn check(resp: Response) -> AppResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error.message,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };

    Err(match status {
        StatusCode::BAD_REQUEST => AppError::BadRequest(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Internal(anyhow::anyhow!("annotation service returned {status}: {message}")),
    })
}

fn movie_ids(entries: Vec<MovieEntry>) -> Vec<MovieId> {
    entries.into_iter().map(|e| e.movie_id).collect()
}

#[async_trait]
impl AnnotationStore for RemoteStore {
    async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        self.get("/collections").await
    }

    async fn get_collection(&self, id: CollectionId) -> AppResult<Collection> {
        self.get(&format!("/collections/{id}")).await
    }

    async fn create_collection(&self, name: &str) -> AppResult<Collection> {
        let body = CreateCollectionRequest { name: Some(name.to_string()) };
        self.post("/collections", &body).await
    }

    async fn delete_collection(&self, id: CollectionId) -> AppResult<()> {
        self.delete(&format!("/collections/{id}")).await
    }

    async fn add_movie_to_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()> {
        let body = MovieIdRequest { movie_id: Some(movie_id) };
        let _: Success = self.post(&format!("/collections/{collection_id}/movies"), &body).await?;
        Ok(())
    }

    async fn remove_movie_from_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()> {
        self.delete(&format!("/collections/{collection_id}/movies/{movie_id}")).await
    }

    async fn list_collection_movies(&self, collection_id: CollectionId) -> AppResult<Vec<MovieId>> {
        let entries: Vec<MovieEntry> =
            self.get(&format!("/collections/{collection_id}/movies")).await?;
        Ok(movie_ids(entries))
    }

    async fn get_note(&self, movie_id: MovieId) -> AppResult<String> {
        let body: NoteBody = self.get(&format!("/movies/{movie_id}/notes")).await?;
        Ok(body.note.unwrap_or_default())
    }

    async fn set_note(&self, movie_id: MovieId, note: &str) -> AppResult<()> {
        let body = NoteBody { note: Some(note.to_string()) };
        let _: Success = self.post(&format!("/movies/{movie_id}/notes"), &body).await?;
        Ok(())
    }

    async fn delete_note(&self, movie_id: MovieId) -> AppResult<()> {
        self.delete(&format!("/movies/{movie_id}/notes")).await
    }

    async fn get_rating(&self, movie_id: MovieId) -> AppResult<Rating> {
        let body: RatingBody = self.get(&format!("/movies/{movie_id}/ratings")).await?;
        body.rating.map(Rating::new).transpose().map(Option::unwrap_or_default)
    }

    async fn set_rating(&self, movie_id: MovieId, rating: Rating) -> AppResult<()> {
        let body = RatingBody { rating: Some(rating.into()) };
        let _: Success = self.post(&format!("/movies/{movie_id}/ratings"), &body).await?;
        Ok(())
    }

    async fn delete_rating(&self, movie_id: MovieId) -> AppResult<()> {
        self.delete(&format!("/movies/{movie_id}/ratings")).await
    }

    async fn list_wishlist(&self) -> AppResult<Vec<MovieId>> {
        let entries: Vec<MovieEntry> = self.get("/wishlist").await?;
        Ok(movie_ids(entries))
    }

    async fn add_to_wishlist(&self, movie_id: MovieId) -> AppResult<()> {
        let body = MovieIdRequest { movie_id: Some(movie_id) };
        let _: Success = self.post("/wishlist", &body).await?;
        Ok(())
    }

    async fn remove_from_wishlist(&self, movie_id: MovieId) -> AppResult<()> {
        self.delete(&format!("/wishlist/{movie_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{AppState, db, routes, store::{SqlStore, contract}};

    async fn remote() -> RemoteStore {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        let app = routes::router(Arc::new(AppState::new(Arc::new(SqlStore::new(db)))));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        RemoteStore::new(reqwest::Client::new(), format!("http://{addr}/api/"))
    }

    #[tokio::test]
    async fn collections() {
        contract::collections(&remote().await).await;
    }

    #[tokio::test]
    async fn memberships() {
        contract::memberships(&remote().await).await;
    }

    #[tokio::test]
    async fn notes_and_ratings() {
        contract::notes_and_ratings(&remote().await).await;
    }

    #[tokio::test]
    async fn wishlist() {
        contract::wishlist(&remote().await).await;
    }

    #[tokio::test]
    async fn error_messages_survive_the_round_trip() {
        let store = remote().await;
        match store.get_collection(77).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Collection not found"),
            other => panic!("expected not found, got {other:?}"),
        }
        match store.create_collection(" ").await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Name is required"),
            other => panic!("expected bad request, got {other:?}"),
        }
    }
}
