use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum NewsArticles {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Content,
    Category,
    ImageUrl,
    AuthorId,
    Published,
    Featured,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NewsArticles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsArticles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NewsArticles::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(NewsArticles::Slug)
                            .string_len(120)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(NewsArticles::Excerpt).string_len(500).null())
                    .col(ColumnDef::new(NewsArticles::Content).text().not_null())
                    .col(ColumnDef::new(NewsArticles::Category).string_len(50).not_null())
                    .col(ColumnDef::new(NewsArticles::ImageUrl).string_len(500).null())
                    .col(ColumnDef::new(NewsArticles::AuthorId).integer().not_null())
                    .col(
                        ColumnDef::new(NewsArticles::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(NewsArticles::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(NewsArticles::PublishedAt).timestamp().null())
                    .col(
                        ColumnDef::new(NewsArticles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(NewsArticles::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_news_articles_author_id")
                            .from(NewsArticles::Table, NewsArticles::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_news_articles_category")
                    .table(NewsArticles::Table)
                    .col(NewsArticles::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NewsArticles::Table).to_owned())
            .await
    }
}
