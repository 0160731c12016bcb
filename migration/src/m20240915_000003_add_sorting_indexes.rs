use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Requests are listed most-recent-first scoped to either side of
        // the pair
        manager
            .create_index(
                Index::create()
                    .name("connection_requests_from_created_at")
                    .table((
                        Alias::new("connect_platform"),
                        Alias::new("connection_requests"),
                    ))
                    .col(Alias::new("from_member_id"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("connection_requests_to_created_at")
                    .table((
                        Alias::new("connect_platform"),
                        Alias::new("connection_requests"),
                    ))
                    .col(Alias::new("to_member_id"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("connections_member_b")
                    .table((Alias::new("connect_platform"), Alias::new("connections")))
                    .col(Alias::new("member_b"))
                    .to_owned(),
            )
            .await?;

        // Notification feeds are read recipient-scoped, unread-first
        manager
            .create_index(
                Index::create()
                    .name("notifications_recipient_read_created_at")
                    .table((Alias::new("connect_platform"), Alias::new("notifications")))
                    .col(Alias::new("recipient_member_id"))
                    .col(Alias::new("read"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("notifications_recipient_read_created_at")
                    .table((Alias::new("connect_platform"), Alias::new("notifications")))
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("connections_member_b")
                    .table((Alias::new("connect_platform"), Alias::new("connections")))
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("connection_requests_to_created_at")
                    .table((
                        Alias::new("connect_platform"),
                        Alias::new("connection_requests"),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("connection_requests_from_created_at")
                    .table((
                        Alias::new("connect_platform"),
                        Alias::new("connection_requests"),
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
