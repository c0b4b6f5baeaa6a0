use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
    sea_query::{Expr, OnConflict, SimpleExpr},
};

use super::AnnotationStore;
use crate::{
    entities::{collection, collection_movie, movie_note, movie_rating, wishlist_entry},
    error::{AppError, AppResult},
    models::{
        Collection, CollectionId, MovieId, Rating, collection_name, now_ms, timestamp_from_ms,
    },
};

/// SQLite-backed store used by the annotation service.
#[derive(Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find_collection(&self, id: CollectionId) -> AppResult<collection::Model> {
        collection::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Collection not found"))
    }
}

fn to_collection(model: collection::Model) -> AppResult<Collection> {
    Ok(Collection { id: model.id, name: model.name, created_at: timestamp_from_ms(model.created_at)? })
}

/// Insertion order for tables keyed by movie id.
fn rowid() -> SimpleExpr {
    Expr::cust("rowid")
}

#[async_trait]
impl AnnotationStore for SqlStore {
    async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        collection::Entity::find()
            .order_by_desc(collection::Column::CreatedAt)
            .order_by_desc(collection::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_collection)
            .collect()
    }

    async fn get_collection(&self, id: CollectionId) -> AppResult<Collection> {
        to_collection(self.find_collection(id).await?)
    }

    async fn create_collection(&self, name: &str) -> AppResult<Collection> {
        let name = collection_name(name)?;
        let model = collection::ActiveModel {
            id: NotSet,
            name: Set(name),
            created_at: Set(now_ms()),
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(collection_id = model.id, name = %model.name, "created collection");
        to_collection(model)
    }

    async fn delete_collection(&self, id: CollectionId) -> AppResult<()> {
        let res = collection::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("Collection not found"));
        }
        tracing::debug!(collection_id = id, "deleted collection");
        Ok(())
    }

    async fn add_movie_to_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()> {
        self.find_collection(collection_id).await?;

        let model = collection_movie::ActiveModel {
            collection_id: Set(collection_id),
            movie_id: Set(movie_id),
            added_at: Set(now_ms()),
        };

        collection_movie::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    collection_movie::Column::CollectionId,
                    collection_movie::Column::MovieId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn remove_movie_from_collection(
        &self,
        collection_id: CollectionId,
        movie_id: MovieId,
    ) -> AppResult<()> {
        let res = collection_movie::Entity::delete_many()
            .filter(collection_movie::Column::CollectionId.eq(collection_id))
            .filter(collection_movie::Column::MovieId.eq(movie_id))
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            return Err(AppError::not_found("Movie not found in collection"));
        }
        Ok(())
    }

    async fn list_collection_movies(&self, collection_id: CollectionId) -> AppResult<Vec<MovieId>> {
        self.find_collection(collection_id).await?;

        let ids = collection_movie::Entity::find()
            .select_only()
            .column(collection_movie::Column::MovieId)
            .filter(collection_movie::Column::CollectionId.eq(collection_id))
            .order_by_asc(collection_movie::Column::AddedAt)
            .order_by(rowid(), Order::Asc)
            .into_tuple::<MovieId>()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn get_note(&self, movie_id: MovieId) -> AppResult<String> {
        let note = movie_note::Entity::find_by_id(movie_id).one(&self.db).await?;
        Ok(note.map(|n| n.note).unwrap_or_default())
    }

    async fn set_note(&self, movie_id: MovieId, note: &str) -> AppResult<()> {
        let model = movie_note::ActiveModel {
            movie_id: Set(movie_id),
            note: Set(note.to_string()),
            updated_at: Set(now_ms()),
        };

        movie_note::Entity::insert(model)
            .on_conflict(
                OnConflict::column(movie_note::Column::MovieId)
                    .update_columns([movie_note::Column::Note, movie_note::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn delete_note(&self, movie_id: MovieId) -> AppResult<()> {
        let res = movie_note::Entity::delete_by_id(movie_id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("Note not found"));
        }
        Ok(())
    }

    async fn get_rating(&self, movie_id: MovieId) -> AppResult<Rating> {
        match movie_rating::Entity::find_by_id(movie_id).one(&self.db).await? {
            Some(row) => Rating::new(row.rating as i64).map_err(|_| {
                AppError::Internal(anyhow::anyhow!("stored rating {} out of range", row.rating))
            }),
            None => Ok(Rating::default()),
        }
    }

    async fn set_rating(&self, movie_id: MovieId, rating: Rating) -> AppResult<()> {
        let model = movie_rating::ActiveModel {
            movie_id: Set(movie_id),
            rating: Set(rating.get() as i32),
            updated_at: Set(now_ms()),
        };

        movie_rating::Entity::insert(model)
            .on_conflict(
                OnConflict::column(movie_rating::Column::MovieId)
                    .update_columns([movie_rating::Column::Rating, movie_rating::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn delete_rating(&self, movie_id: MovieId) -> AppResult<()> {
        let res = movie_rating::Entity::delete_by_id(movie_id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("Rating not found"));
        }
        Ok(())
    }

    async fn list_wishlist(&self) -> AppResult<Vec<MovieId>> {
        let ids = wishlist_entry::Entity::find()
            .select_only()
            .column(wishlist_entry::Column::MovieId)
            .order_by_asc(wishlist_entry::Column::AddedAt)
            .order_by(rowid(), Order::Asc)
            .into_tuple::<MovieId>()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn add_to_wishlist(&self, movie_id: MovieId) -> AppResult<()> {
        let model = wishlist_entry::ActiveModel { movie_id: Set(movie_id), added_at: Set(now_ms()) };

        wishlist_entry::Entity::insert(model)
            .on_conflict(
                OnConflict::column(wishlist_entry::Column::MovieId).do_nothing().to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn remove_from_wishlist(&self, movie_id: MovieId) -> AppResult<()> {
        let res = wishlist_entry::Entity::delete_by_id(movie_id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("Movie not found in wishlist"));
        }
        Ok(())
    }

    async fn is_in_wishlist(&self, movie_id: MovieId) -> AppResult<bool> {
        Ok(wishlist_entry::Entity::find_by_id(movie_id).one(&self.db).await?.is_some())
    }
}
