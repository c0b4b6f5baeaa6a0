use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::AnnotationStore;
use crate::{
    error::{AppError, AppResult},
    models::{Collection, CollectionId, MovieId, Rating, collection_name, now_ms},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalDocument {
    #[serde(default)]
    collections: Vec<LocalCollection>,
    #[serde(default)]
    notes: BTreeMap<MovieId, String>,
    #[serde(default)]
    ratings: BTreeMap<MovieId, Rating>,
    #[serde(default)]
    wishlist: Vec<MovieId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalCollection {
    id: CollectionId,
    name: String,
    created_at: Timestamp,
    #[serde(default)]
    movies: Vec<MovieId>,
}

impl LocalCollection {
    fn to_collection(&self) -> Collection {
        Collection { id: self.id, name: self.name.clone(), created_at: self.created_at }
    }
}

impl LocalDocument {
    fn collection(&self, id: CollectionId) -> AppResult<&LocalCollection> {
        self.collections
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Collection not found"))
    }

    fn collection_mut(&mut self, id: CollectionId) -> AppResult<&mut LocalCollection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Collection not found"))
    }

    /// Collection ids are wall-clock milliseconds, bumped past the largest id in use.
    fn next_collection_id(&self, now: i64) -> CollectionId {
        let max = self.collections.iter().map(|c| c.id).max().unwrap_or(0);
        now.max(max + 1)
    }
}

/// Device-local store persisted as a single JSON document.
///
/// Every mutation rewrites the whole file. Ids are not compatible with the
/// service's ids and nothing is ever synchronized with it.
pub struct LocalStore {
    path: PathBuf,
    doc: Mutex<LocalDocument>,
}

impl LocalStore {
    /// Opens the document at `path`, starting empty if it does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => LocalDocument::default(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), "opened local store");
        Ok(Self { path, doc: Mutex::new(doc) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the document and only swaps the copy in
    /// once it is on disk. A failed change or write leaves the store as it was.
    async fn update<T: Send>(
        &self,
        change: impl FnOnce(&mut LocalDocument) -> AppResult<T> + Send,
    ) -> AppResult<T> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *doc = next;
        Ok(out)
    }

    async fn persist(&self, doc: &LocalDocument) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AnnotationStore for LocalStore {
    async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        let doc = self.doc.lock().await;
        let mut out: Vec<Collection> = doc.collections.iter().map(|c| c.to_collection()).collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn get_collection(&self, id: CollectionId) -> AppResult<Collection> {
        let doc = self.doc.lock().await;
        Ok(doc.collection(id)?.to_collection())
    }

    async fn create_collection(&self, name: &str) -> AppResult<Collection> {
        let name = collection_name(name)?;
        let now = now_ms();
        let created_at = Timestamp::from_millisecond(now)?;

        self.update(|doc| {
            let collection =
                LocalCollection { id: doc.next_collection_id(now), name, created_at, movies: Vec::new() };
            let out = collection.to_collection();
            doc.collections.push(collection);
            Ok(out)
        })
        .await
    }

    async fn delete_collection(&self, id: CollectionId) -> AppResult<()> {
        self.update(|doc| {
            doc.collection(id)?;
            doc.collections.retain(|c| c.id != id);
            Ok(())
        })
        .await
    }

    async fn add_movie_to_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()> {
        self.update(|doc| {
            let collection = doc.collection_mut(collection_id)?;
            if !collection.movies.contains(&movie_id) {
                collection.movies.push(movie_id);
            }
            Ok(())
        })
        .await
    }

    async fn remove_movie_from_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()> {
        self.update(|doc| {
            let not_found = || AppError::not_found("Movie not found in collection");
            let collection = doc.collection_mut(collection_id).map_err(|_| not_found())?;
            let pos = collection.movies.iter().position(|m| *m == movie_id).ok_or_else(not_found)?;
            collection.movies.remove(pos);
            Ok(())
        })
        .await
    }

    async fn list_collection_movies(&self, collection_id: CollectionId) -> AppResult<Vec<MovieId>> {
        let doc = self.doc.lock().await;
        Ok(doc.collection(collection_id)?.movies.clone())
    }

    async fn get_note(&self, movie_id: MovieId) -> AppResult<String> {
        let doc = self.doc.lock().await;
        Ok(doc.notes.get(&movie_id).cloned().unwrap_or_default())
    }

    async fn set_note(&self, movie_id: MovieId, note: &str) -> AppResult<()> {
        let note = note.to_string();
        self.update(|doc| {
            doc.notes.insert(movie_id, note);
            Ok(())
        })
        .await
    }

    async fn delete_note(&self, movie_id: MovieId) -> AppResult<()> {
        self.update(|doc| {
            doc.notes.remove(&movie_id).ok_or_else(|| AppError::not_found("Note not found"))?;
            Ok(())
        })
        .await
    }

    async fn get_rating(&self, movie_id: MovieId) -> AppResult<Rating> {
        let doc = self.doc.lock().await;
        Ok(doc.ratings.get(&movie_id).copied().unwrap_or_default())
    }

    async fn set_rating(&self, movie_id: MovieId, rating: Rating) -> AppResult<()> {
        self.update(|doc| {
            doc.ratings.insert(movie_id, rating);
            Ok(())
        })
        .await
    }

    async fn delete_rating(&self, movie_id: MovieId) -> AppResult<()> {
        self.update(|doc| {
            doc.ratings.remove(&movie_id).ok_or_else(|| AppError::not_found("Rating not found"))?;
            Ok(())
        })
        .await
    }

    async fn list_wishlist(&self) -> AppResult<Vec<MovieId>> {
        Ok(self.doc.lock().await.wishlist.clone())
    }

    async fn add_to_wishlist(&self, movie_id: MovieId) -> AppResult<()> {
        self.update(|doc| {
            if !doc.wishlist.contains(&movie_id) {
                doc.wishlist.push(movie_id);
            }
            Ok(())
        })
        .await
    }

    async fn remove_from_wishlist(&self, movie_id: MovieId) -> AppResult<()> {
        self.update(|doc| {
            let pos = doc
                .wishlist
                .iter()
                .position(|m| *m == movie_id)
                .ok_or_else(|| AppError::not_found("Movie not found in wishlist"))?;
            doc.wishlist.remove(pos);
            Ok(())
        })
        .await
    }
}
