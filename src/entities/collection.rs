use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::collection_movie::Entity")]
    CollectionMovie,
}

impl Related<super::collection_movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionMovie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
