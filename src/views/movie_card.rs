use std::sync::Arc;

use tracing::warn;

use super::Notice;
use crate::{
    catalog::MovieSummary,
    models::{Collection, CollectionId, Rating},
    store::AnnotationStore,
};

/// A catalog movie with the user's annotations laid over it.
pub struct MovieCard {
    store: Arc<dyn AnnotationStore>,
    pub movie: MovieSummary,
    pub liked: bool,
    pub rating: Rating,
    pub note: String,
    pub collections: Vec<Collection>,
    pub note_dialog_open: bool,
    pub collections_dialog_open: bool,
    pub details_dialog_open: bool,
    pub notice: Option<Notice>,
}

impl MovieCard {
    pub fn new(store: Arc<dyn AnnotationStore>, movie: MovieSummary) -> Self {
        Self {
            store,
            movie,
            liked: false,
            rating: Rating::default(),
            note: String::new(),
            collections: Vec::new(),
            note_dialog_open: false,
            collections_dialog_open: false,
            details_dialog_open: false,
            notice: None,
        }
    }

    pub fn has_note(&self) -> bool {
        !self.note.is_empty()
    }

    /// Fetches wishlist status, rating, note and collections concurrently.
    pub async fn load(&mut self) {
        let id = self.movie.id;
        let store = &*self.store;
        let result = futures::try_join!(
            store.is_in_wishlist(id),
            store.get_rating(id),
            store.get_note(id),
            store.list_collections(),
        );

        match result {
            Ok((liked, rating, note, collections)) => {
                self.liked = liked;
                self.rating = rating;
                self.note = note;
                self.collections = collections;
            },
            Err(err) => {
                warn!(movie_id = id, error = %err, "failed to load annotations");
                self.notice = Some(Notice::error("Error loading movie data."));
            },
        }
    }

    pub async fn toggle_like(&mut self) {
        let id = self.movie.id;
        let result = if self.liked {
            self.store.remove_from_wishlist(id).await
        } else {
            self.store.add_to_wishlist(id).await
        };

        match result {
            Ok(()) => self.liked = !self.liked,
            Err(err) => {
                warn!(movie_id = id, error = %err, "failed to update wishlist");
                self.notice = Some(Notice::error("Error updating wishlist."));
            },
        }
    }

    pub async fn rate(&mut self, rating: Rating) {
        match self.store.set_rating(self.movie.id, rating).await {
            Ok(()) => self.rating = rating,
            Err(err) => {
                warn!(movie_id = self.movie.id, error = %err, "failed to update rating");
                self.notice = Some(Notice::error("Error updating rating."));
            },
        }
    }

    pub fn open_note_dialog(&mut self) {
        self.note_dialog_open = true;
    }

    pub fn close_note_dialog(&mut self) {
        self.note_dialog_open = false;
    }

    pub fn edit_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    /// Saves the note being edited; the dialog stays open if saving fails.
    pub async fn save_note(&mut self) {
        match self.store.set_note(self.movie.id, &self.note).await {
            Ok(()) => self.note_dialog_open = false,
            Err(err) => {
                warn!(movie_id = self.movie.id, error = %err, "failed to save note");
                self.notice = Some(Notice::error("Error saving note."));
            },
        }
    }

    pub fn open_collections_dialog(&mut self) {
        self.collections_dialog_open = true;
    }

    pub fn close_collections_dialog(&mut self) {
        self.collections_dialog_open = false;
    }

    pub async fn add_to_collection(&mut self, collection_id: CollectionId) {
        match self.store.add_movie_to_collection(collection_id, self.movie.id).await {
            Ok(()) => self.collections_dialog_open = false,
            Err(err) => {
                warn!(movie_id = self.movie.id, collection_id, error = %err, "failed to add to collection");
                self.notice = Some(Notice::error("Error adding to collection."));
            },
        }
    }

    pub fn open_details(&mut self) {
        self.details_dialog_open = true;
    }

    pub fn close_details(&mut self) {
        self.details_dialog_open = false;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        store::SqlStore,
        views::fakes::details,
    };

    async fn store() -> Arc<dyn AnnotationStore> {
        Arc::new(SqlStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap()))
    }

    fn movie(id: i64) -> MovieSummary {
        details(id, "Heat").into()
    }

    #[tokio::test]
    async fn load_overlays_annotations() {
        let store = store().await;
        let c = store.create_collection("Crime").await.unwrap();
        store.add_to_wishlist(949).await.unwrap();
        store.set_rating(949, Rating::new(5).unwrap()).await.unwrap();
        store.set_note(949, "diner scene").await.unwrap();

        let mut card = MovieCard::new(store, movie(949));
        card.load().await;

        assert!(card.liked);
        assert_eq!(card.rating.get(), 5);
        assert!(card.has_note());
        assert_eq!(card.collections, vec![c]);
        assert!(card.notice.is_none());
    }

    #[tokio::test]
    async fn toggle_like_round_trips_through_the_store() {
        let store = store().await;
        let mut card = MovieCard::new(store.clone(), movie(949));

        card.toggle_like().await;
        assert!(card.liked);
        assert_eq!(store.list_wishlist().await.unwrap(), vec![949]);

        card.toggle_like().await;
        assert!(!card.liked);
        assert!(store.list_wishlist().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_a_note_closes_the_dialog() {
        let store = store().await;
        let mut card = MovieCard::new(store.clone(), movie(949));

        card.open_note_dialog();
        card.edit_note("rewatch");
        card.save_note().await;

        assert!(!card.note_dialog_open);
        assert_eq!(store.get_note(949).await.unwrap(), "rewatch");
    }

    #[tokio::test]
    async fn adding_to_missing_collection_raises_a_notice() {
        let store = store().await;
        let mut card = MovieCard::new(store, movie(949));

        card.open_collections_dialog();
        card.add_to_collection(12345).await;

        assert!(card.collections_dialog_open);
        assert!(card.notice.as_ref().is_some_and(Notice::is_error));
        card.dismiss_notice();
        assert!(card.notice.is_none());
    }

    #[tokio::test]
    async fn rating_updates_local_state() {
        let store = store().await;
        let mut card = MovieCard::new(store.clone(), movie(949));

        card.rate(Rating::new(3).unwrap()).await;

        assert_eq!(card.rating.get(), 3);
        assert_eq!(store.get_rating(949).await.unwrap().get(), 3);
    }
}
