use std::sync::Arc;

use futures::future::try_join_all;
use tracing::warn;

use super::Notice;
use crate::{
    catalog::{Catalog, MovieDetails},
    error::AppResult,
    models::MovieId,
    store::AnnotationStore,
};

pub struct WishlistView {
    store: Arc<dyn AnnotationStore>,
    catalog: Arc<dyn Catalog>,
    pub movies: Vec<MovieDetails>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl WishlistView {
    pub fn new(store: Arc<dyn AnnotationStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { store, catalog, movies: Vec::new(), loading: true, notice: None }
    }

    pub fn is_empty(&self) -> bool {
        !self.loading && self.movies.is_empty()
    }

    /// Reloads wishlisted ids and fetches every movie's details in parallel.
    /// A single failed fetch fails the whole load.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.fetch().await {
            Ok(movies) => self.movies = movies,
            Err(err) => {
                warn!(error = %err, "failed to load wishlist");
                self.notice = Some(Notice::error("Error loading wishlist. Please try again later."));
            },
        }
        self.loading = false;
    }

    async fn fetch(&self) -> AppResult<Vec<MovieDetails>> {
        let ids = self.store.list_wishlist().await?;
        fetch_details(&*self.catalog, &ids).await
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

pub(super) async fn fetch_details(
    catalog: &dyn Catalog,
    ids: &[MovieId],
) -> AppResult<Vec<MovieDetails>> {
    try_join_all(ids.iter().map(|id| catalog.details(*id))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, store::SqlStore, views::fakes::FakeCatalog};

    async fn store() -> Arc<dyn AnnotationStore> {
        Arc::new(SqlStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap()))
    }

    #[tokio::test]
    async fn loads_details_for_every_entry() {
        let store = store().await;
        store.add_to_wishlist(1).await.unwrap();
        store.add_to_wishlist(2).await.unwrap();
        let catalog = Arc::new(FakeCatalog::with_movies(&[(1, "Alien"), (2, "Aliens"), (3, "Other")]));

        let mut view = WishlistView::new(store, catalog);
        view.load().await;

        let titles: Vec<_> = view.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "Aliens"]);
        assert!(view.notice.is_none());
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn one_failed_fetch_is_one_aggregate_error() {
        let store = store().await;
        store.add_to_wishlist(1).await.unwrap();
        store.add_to_wishlist(2).await.unwrap();
        let mut catalog = FakeCatalog::with_movies(&[(1, "Alien"), (2, "Aliens")]);
        catalog.failing.insert(2);

        let mut view = WishlistView::new(store, Arc::new(catalog));
        view.load().await;

        assert!(view.movies.is_empty());
        let notice = view.notice.clone().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "Error loading wishlist. Please try again later.");
    }

    #[tokio::test]
    async fn empty_wishlist_is_not_an_error() {
        let mut view = WishlistView::new(store().await, Arc::new(FakeCatalog::default()));
        view.load().await;
        assert!(view.is_empty());
        assert!(view.notice.is_none());
    }
}
