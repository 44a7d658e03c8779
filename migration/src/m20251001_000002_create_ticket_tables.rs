use sea_orm_migration::prelude::*;

use super::m20251001_000001_create_identity_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Named counters used to allocate human-readable ticket IDs
        manager
            .create_table(
                Table::create()
                    .table(TicketSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TicketSequences::Name).string().not_null().primary_key())
                    .col(ColumnDef::new(TicketSequences::LastValue).big_integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(TicketSequences::Table)
                    .columns([TicketSequences::Name, TicketSequences::LastValue])
                    .values_panic(["tickets".into(), 0i64.into()])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::TicketId).string().not_null().unique_key())
                    .col(ColumnDef::new(Tickets::Title).string().not_null())
                    .col(ColumnDef::new(Tickets::Description).text().not_null())
                    .col(ColumnDef::new(Tickets::Category).string_len(20).not_null())
                    .col(ColumnDef::new(Tickets::Priority).string_len(20).not_null())
                    .col(ColumnDef::new(Tickets::Status).string_len(20).not_null().default("open"))
                    .col(ColumnDef::new(Tickets::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Tickets::AssignedTo).string().null())
                    .col(ColumnDef::new(Tickets::EscalatedTo).string().null())
                    .col(ColumnDef::new(Tickets::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::UpdatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::Deadline).date().null())
                    .col(ColumnDef::new(Tickets::ResolvedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_created_by")
                            .from(Tickets::Table, Tickets::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_assigned_to")
                            .from(Tickets::Table, Tickets::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_escalated_to")
                            .from(Tickets::Table, Tickets::EscalatedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_created_by")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_status")
                    .table(Tickets::Table)
                    .col(Tickets::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comments::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).string().not_null())
                    .col(ColumnDef::new(Comments::Content).text().not_null())
                    .col(ColumnDef::new(Comments::IsInternal).boolean().not_null().default(false))
                    .col(ColumnDef::new(Comments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Comments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_ticket_id")
                            .from(Comments::Table, Comments::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author_id")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_ticket_id")
                    .table(Comments::Table)
                    .col(Comments::TicketId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attachments::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(Attachments::FileLocator).string().not_null())
                    .col(ColumnDef::new(Attachments::OriginalFilename).string().not_null())
                    .col(ColumnDef::new(Attachments::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Attachments::UploadedBy).string().not_null())
                    .col(ColumnDef::new(Attachments::UploadedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_ticket_id")
                            .from(Attachments::Table, Attachments::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_uploaded_by")
                            .from(Attachments::Table, Attachments::UploadedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketNotifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketNotifications::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(TicketNotifications::UserId).string().not_null())
                    .col(ColumnDef::new(TicketNotifications::NotificationType).string_len(50).not_null())
                    .col(ColumnDef::new(TicketNotifications::SentAt).big_integer().not_null())
                    .col(ColumnDef::new(TicketNotifications::IsRead).boolean().not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_notifications_ticket_id")
                            .from(TicketNotifications::Table, TicketNotifications::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_notifications_user_id")
                            .from(TicketNotifications::Table, TicketNotifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_notifications_user_id")
                    .table(TicketNotifications::Table)
                    .col(TicketNotifications::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketNotifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TicketSequences::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TicketSequences {
    Table,
    Name,
    LastValue,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    TicketId,
    Title,
    Description,
    Category,
    Priority,
    Status,
    CreatedBy,
    AssignedTo,
    EscalatedTo,
    CreatedAt,
    UpdatedAt,
    Deadline,
    ResolvedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    TicketId,
    AuthorId,
    Content,
    IsInternal,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    TicketId,
    FileLocator,
    OriginalFilename,
    FileSize,
    UploadedBy,
    UploadedAt,
}

#[derive(DeriveIden)]
enum TicketNotifications {
    Table,
    Id,
    TicketId,
    UserId,
    NotificationType,
    SentAt,
    IsRead,
}
