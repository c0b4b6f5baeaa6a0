use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(pk_auto(Collections::Id))
                    .col(string(Collections::Name))
                    .col(big_integer(Collections::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_collections_created_at")
                    .table(Collections::Table)
                    .col(Collections::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CollectionMovies::Table)
                    .if_not_exists()
                    .col(integer(CollectionMovies::CollectionId))
                    .col(big_integer(CollectionMovies::MovieId))
                    .col(big_integer(CollectionMovies::AddedAt))
                    .primary_key(
                        Index::create()
                            .col(CollectionMovies::CollectionId)
                            .col(CollectionMovies::MovieId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collection_movies_collection")
                            .from(CollectionMovies::Table, CollectionMovies::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieNotes::Table)
                    .if_not_exists()
                    .col(big_integer(MovieNotes::MovieId).primary_key())
                    .col(text(MovieNotes::Note))
                    .col(big_integer(MovieNotes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieRatings::Table)
                    .if_not_exists()
                    .col(big_integer(MovieRatings::MovieId).primary_key())
                    .col(
                        integer(MovieRatings::Rating)
                            .check(Expr::col(MovieRatings::Rating).between(0, 5)),
                    )
                    .col(big_integer(MovieRatings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wishlist::Table)
                    .if_not_exists()
                    .col(big_integer(Wishlist::MovieId).primary_key())
                    .col(big_integer(Wishlist::AddedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wishlist::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieRatings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieNotes::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CollectionMovies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Collections::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Collections {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CollectionMovies {
    Table,
    CollectionId,
    MovieId,
    AddedAt,
}

#[derive(DeriveIden)]
enum MovieNotes {
    Table,
    MovieId,
    Note,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MovieRatings {
    Table,
    MovieId,
    Rating,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Wishlist {
    Table,
    MovieId,
    AddedAt,
}
