use sea_orm_migration::prelude::*;

use super::m20240101_000004_create_events_table::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum EventRsvps {
    Table,
    Id,
    EventId,
    Name,
    Email,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventRsvps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventRsvps::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventRsvps::EventId).integer().not_null())
                    .col(ColumnDef::new(EventRsvps::Name).string_len(100).not_null())
                    .col(ColumnDef::new(EventRsvps::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(EventRsvps::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_rsvps_event_id")
                            .from(EventRsvps::Table, EventRsvps::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One registration per email per event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_rsvps_event_email")
                    .table(EventRsvps::Table)
                    .col(EventRsvps::EventId)
                    .col(EventRsvps::Email)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventRsvps::Table).to_owned())
            .await
    }
}
