use sea_orm_migration::prelude::*;

use super::m20251001_000001_create_identity_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMessages::SenderId).string().not_null())
                    .col(ColumnDef::new(ChatMessages::ReceiverId).string().not_null())
                    .col(ColumnDef::new(ChatMessages::Message).text().not_null())
                    .col(ColumnDef::new(ChatMessages::IsRead).boolean().not_null().default(false))
                    .col(ColumnDef::new(ChatMessages::SentAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_messages_sender_id")
                            .from(ChatMessages::Table, ChatMessages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_messages_receiver_id")
                            .from(ChatMessages::Table, ChatMessages::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_messages_pair")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::SenderId)
                    .col(ChatMessages::ReceiverId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessages::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    Id,
    SenderId,
    ReceiverId,
    Message,
    IsRead,
    SentAt,
}
