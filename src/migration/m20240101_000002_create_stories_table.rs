use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Stories {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Content,
    StoryType,
    MediaUrl,
    ThumbnailUrl,
    AuthorId,
    Published,
    Featured,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stories::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Stories::Slug)
                            .string_len(120)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Stories::Excerpt).string_len(500).null())
                    .col(ColumnDef::new(Stories::Content).text().not_null())
                    .col(ColumnDef::new(Stories::StoryType).string_len(10).not_null())
                    .col(ColumnDef::new(Stories::MediaUrl).string_len(500).null())
                    .col(ColumnDef::new(Stories::ThumbnailUrl).string_len(500).null())
                    .col(ColumnDef::new(Stories::AuthorId).integer().not_null())
                    .col(
                        ColumnDef::new(Stories::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Stories::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Stories::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Stories::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stories_author_id")
                            .from(Stories::Table, Stories::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stories_published_created")
                    .table(Stories::Table)
                    .col(Stories::Published)
                    .col(Stories::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stories::Table).to_owned())
            .await
    }
}
