//! Persistence port for user annotations.
//!
//! Collections, notes, ratings and the wishlist are reachable through one
//! [`AnnotationStore`] trait. The service runs on [`SqlStore`]; front ends pick
//! either [`RemoteStore`] (talks to the service) or [`LocalStore`] (a JSON
//! document on the device). The backends never share data.

mod local;
mod remote;
mod sql;

use async_trait::async_trait;

pub use local::LocalStore;
pub use remote::RemoteStore;
pub use sql::SqlStore;

use crate::{
    error::AppResult,
    models::{Collection, CollectionId, MovieId, Rating},
};

#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Returns all collections, newest first.
    async fn list_collections(&self) -> AppResult<Vec<Collection>>;

    /// Fails with `NotFound` if the collection does not exist.
    async fn get_collection(&self, id: CollectionId) -> AppResult<Collection>;

    /// Creates a collection from an untrimmed name.
    /// Fails with `BadRequest` if the name is blank.
    async fn create_collection(&self, name: &str) -> AppResult<Collection>;

    /// Deletes a collection together with its memberships.
    async fn delete_collection(&self, id: CollectionId) -> AppResult<()>;

    /// Adds a movie to a collection. Adding it twice is a no-op.
    async fn add_movie_to_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()>;

    async fn remove_movie_from_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()>;

    /// Returns member movie ids in the order they were added.
    async fn list_collection_movies(&self, collection_id: CollectionId) -> AppResult<Vec<MovieId>>;

    /// Returns the movie's note, or an empty string if none was saved.
    async fn get_note(&self, movie_id: MovieId) -> AppResult<String>;

    async fn set_note(&self, movie_id: MovieId, note: &str) -> AppResult<()>;

    async fn delete_note(&self, movie_id: MovieId) -> AppResult<()>;

    /// Returns the movie's rating, or zero if it was never rated.
    async fn get_rating(&self, movie_id: MovieId) -> AppResult<Rating>;

    async fn set_rating(&self, movie_id: MovieId, rating: Rating) -> AppResult<()>;

    async fn delete_rating(&self, movie_id: MovieId) -> AppResult<()>;

    /// Returns wishlisted movie ids in the order they were added.
    async fn list_wishlist(&self) -> AppResult<Vec<MovieId>>;

    async fn add_to_wishlist(&self, movie_id: MovieId) -> AppResult<()>;

    async fn remove_from_wishlist(&self, movie_id: MovieId) -> AppResult<()>;

    async fn is_in_wishlist(&self, movie_id: MovieId) -> AppResult<bool> {
        Ok(self.list_wishlist().await?.contains(&movie_id))
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every backend must share, run against each implementation.

    use super::AnnotationStore;
    use crate::{error::AppError, models::Rating};

    pub async fn collections(store: &dyn AnnotationStore) {
        assert!(store.list_collections().await.unwrap().is_empty());

        let blank = store.create_collection("   ").await;
        assert!(matches!(blank, Err(AppError::BadRequest(_))));
        assert!(store.list_collections().await.unwrap().is_empty());

        let first = store.create_collection("  Favorites ").await.unwrap();
        assert_eq!(first.name, "Favorites");
        let second = store.create_collection("Noir").await.unwrap();
        assert_ne!(first.id, second.id);

        let listed = store.list_collections().await.unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        assert_eq!(store.get_collection(first.id).await.unwrap(), first);

        store.delete_collection(second.id).await.unwrap();
        assert!(matches!(store.get_collection(second.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.delete_collection(second.id).await, Err(AppError::NotFound(_))));
    }

    pub async fn memberships(store: &dyn AnnotationStore) {
        let favorites = store.create_collection("Favorites").await.unwrap();
        let other = store.create_collection("Other").await.unwrap();

        store.add_movie_to_collection(favorites.id, 100).await.unwrap();
        store.add_movie_to_collection(favorites.id, 100).await.unwrap();
        store.add_movie_to_collection(favorites.id, 7).await.unwrap();
        store.add_movie_to_collection(other.id, 100).await.unwrap();

        assert_eq!(store.list_collection_movies(favorites.id).await.unwrap(), vec![100, 7]);

        let missing = store.add_movie_to_collection(9_999, 1).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        store.remove_movie_from_collection(favorites.id, 7).await.unwrap();
        let again = store.remove_movie_from_collection(favorites.id, 7).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));

        store.delete_collection(favorites.id).await.unwrap();
        let gone = store.list_collection_movies(favorites.id).await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));
        assert_eq!(store.list_collection_movies(other.id).await.unwrap(), vec![100]);
    }

    pub async fn notes_and_ratings(store: &dyn AnnotationStore) {
        assert_eq!(store.get_note(42).await.unwrap(), "");
        assert_eq!(store.get_rating(42).await.unwrap(), Rating::default());

        store.set_note(42, "rewatch in winter").await.unwrap();
        store.set_note(42, "").await.unwrap();
        assert_eq!(store.get_note(42).await.unwrap(), "");
        store.set_note(42, "seen it").await.unwrap();
        assert_eq!(store.get_note(42).await.unwrap(), "seen it");

        store.set_rating(42, Rating::new(3).unwrap()).await.unwrap();
        store.set_rating(42, Rating::new(5).unwrap()).await.unwrap();
        assert_eq!(store.get_rating(42).await.unwrap().get(), 5);

        store.delete_note(42).await.unwrap();
        assert_eq!(store.get_note(42).await.unwrap(), "");
        assert!(matches!(store.delete_note(42).await, Err(AppError::NotFound(_))));

        store.delete_rating(42).await.unwrap();
        assert_eq!(store.get_rating(42).await.unwrap().get(), 0);
        assert!(matches!(store.delete_rating(42).await, Err(AppError::NotFound(_))));
    }

    pub async fn wishlist(store: &dyn AnnotationStore) {
        store.add_to_wishlist(42).await.unwrap();
        store.add_to_wishlist(42).await.unwrap();
        store.add_to_wishlist(8).await.unwrap();

        assert_eq!(store.list_wishlist().await.unwrap(), vec![42, 8]);
        assert!(store.is_in_wishlist(8).await.unwrap());

        store.remove_from_wishlist(8).await.unwrap();
        assert!(!store.is_in_wishlist(8).await.unwrap());
        assert!(matches!(store.remove_from_wishlist(8).await, Err(AppError::NotFound(_))));
    }
}
