use std::sync::Arc;

use tracing::warn;

use super::{Notice, wishlist::fetch_details};
use crate::{
    catalog::{Catalog, MovieDetails},
    models::{Collection, CollectionId},
    store::AnnotationStore,
};

pub struct CollectionsView {
    store: Arc<dyn AnnotationStore>,
    catalog: Arc<dyn Catalog>,
    pub collections: Vec<Collection>,
    pub selected: Option<Collection>,
    pub selected_movies: Vec<MovieDetails>,
    pub dialog_open: bool,
    pub new_name: String,
    pub notice: Option<Notice>,
}

impl CollectionsView {
    pub fn new(store: Arc<dyn AnnotationStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            store,
            catalog,
            collections: Vec::new(),
            selected: None,
            selected_movies: Vec::new(),
            dialog_open: false,
            new_name: String::new(),
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        match self.store.list_collections().await {
            Ok(collections) => self.collections = collections,
            Err(err) => {
                warn!(error = %err, "failed to load collections");
                self.notice = Some(Notice::error("Failed to load collections"));
            },
        }
    }

    pub fn open_dialog(&mut self) {
        self.dialog_open = true;
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
    }

    /// Creates a collection from `new_name`. Blank names are ignored.
    pub async fn create(&mut self) {
        let name = self.new_name.trim().to_string();
        if name.is_empty() {
            return;
        }

        match self.store.create_collection(&name).await {
            Ok(_) => {
                self.new_name.clear();
                self.dialog_open = false;
                self.notice = Some(Notice::success("Collection created successfully"));
                self.load().await;
            },
            Err(err) => {
                warn!(error = %err, "failed to create collection");
                self.notice = Some(Notice::error("Failed to create collection"));
            },
        }
    }

    pub async fn delete(&mut self, id: CollectionId) {
        match self.store.delete_collection(id).await {
            Ok(()) => {
                self.notice = Some(Notice::success("Collection deleted successfully"));
                if self.selected.as_ref().is_some_and(|c| c.id == id) {
                    self.close_selection();
                }
                self.load().await;
            },
            Err(err) => {
                warn!(collection_id = id, error = %err, "failed to delete collection");
                self.notice = Some(Notice::error("Failed to delete collection"));
            },
        }
    }

    /// Opens a collection and fetches the details of its movies in parallel.
    pub async fn select(&mut self, id: CollectionId) {
        let result = async {
            let collection = self.store.get_collection(id).await?;
            let ids = self.store.list_collection_movies(id).await?;
            let movies = fetch_details(&*self.catalog, &ids).await?;
            Ok::<_, crate::error::AppError>((collection, movies))
        }
        .await;

        match result {
            Ok((collection, movies)) => {
                self.selected = Some(collection);
                self.selected_movies = movies;
            },
            Err(err) => {
                warn!(collection_id = id, error = %err, "failed to open collection");
                self.notice = Some(Notice::error("Failed to load collection movies"));
            },
        }
    }

    pub fn close_selection(&mut self) {
        self.selected = None;
        self.selected_movies.clear();
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
