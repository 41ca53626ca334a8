//! Create review table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Review::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Review::TitleId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::Text).text().not_null())
                    .col(ColumnDef::new(Review::Score).small_integer().not_null())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Review::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_title")
                            .from(Review::Table, Review::TitleId)
                            .to(Title::Table, Title::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_author")
                            .from(Review::Table, Review::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (author_id, title_id) - one review per user per title.
        // Concurrent duplicate creations race to this constraint; exactly one wins.
        manager
            .create_index(
                Index::create()
                    .name("idx_review_author_title")
                    .table(Review::Table)
                    .col(Review::AuthorId)
                    .col(Review::TitleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: title_id (scoped listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_title_id")
                    .table(Review::Table)
                    .col(Review::TitleId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_review_created_at")
                    .table(Review::Table)
                    .col(Review::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    TitleId,
    AuthorId,
    Text,
    Score,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Title {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
