//! Create genre table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Genre::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Genre::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Genre::Slug).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Genre::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: slug (the genre's external identity)
        manager
            .create_index(
                Index::create()
                    .name("idx_genre_slug")
                    .table(Genre::Table)
                    .col(Genre::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Genre {
    Table,
    Id,
    Name,
    Slug,
    CreatedAt,
}
