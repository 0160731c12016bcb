use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE connect_platform.users (
                    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                    member_id varchar(64) NOT NULL UNIQUE,
                    username varchar(150) NOT NULL UNIQUE,
                    email varchar(255) NOT NULL UNIQUE,
                    full_name varchar(255) NOT NULL,
                    contact varchar(30) NOT NULL UNIQUE,
                    company_name varchar(255) NOT NULL DEFAULT '',
                    password varchar(255) NOT NULL,
                    created_at timestamptz NOT NULL DEFAULT now(),
                    updated_at timestamptz NOT NULL DEFAULT now()
                );

                CREATE TYPE connect_platform.request_status AS ENUM ('pending', 'accepted', 'rejected');

                CREATE TABLE connect_platform.connection_requests (
                    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                    from_member_id varchar(64) NOT NULL
                        REFERENCES connect_platform.users(member_id) ON DELETE CASCADE,
                    to_member_id varchar(64) NOT NULL
                        REFERENCES connect_platform.users(member_id) ON DELETE CASCADE,
                    message text NOT NULL DEFAULT '',
                    status connect_platform.request_status NOT NULL DEFAULT 'pending',
                    created_at timestamptz NOT NULL DEFAULT now(),
                    responded_at timestamptz,
                    CONSTRAINT connection_requests_no_self CHECK (from_member_id <> to_member_id),
                    CONSTRAINT connection_requests_pair_key UNIQUE (from_member_id, to_member_id)
                );

                CREATE TABLE connect_platform.connections (
                    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                    member_a varchar(64) NOT NULL
                        REFERENCES connect_platform.users(member_id) ON DELETE CASCADE,
                    member_b varchar(64) NOT NULL
                        REFERENCES connect_platform.users(member_id) ON DELETE CASCADE,
                    connected_at timestamptz NOT NULL DEFAULT now(),
                    CONSTRAINT connections_canonical_order CHECK (member_a < member_b),
                    CONSTRAINT connections_pair_key UNIQUE (member_a, member_b)
                );

                CREATE TABLE connect_platform.notifications (
                    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                    recipient_member_id varchar(64) NOT NULL
                        REFERENCES connect_platform.users(member_id) ON DELETE CASCADE,
                    actor_member_id varchar(64)
                        REFERENCES connect_platform.users(member_id) ON DELETE SET NULL,
                    verb varchar(100) NOT NULL,
                    message text NOT NULL DEFAULT '',
                    read boolean NOT NULL DEFAULT false,
                    created_at timestamptz NOT NULL DEFAULT now()
                );
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS connect_platform.notifications;
                DROP TABLE IF EXISTS connect_platform.connections;
                DROP TABLE IF EXISTS connect_platform.connection_requests;
                DROP TYPE IF EXISTS connect_platform.request_status;
                DROP TABLE IF EXISTS connect_platform.users;
            "#,
            )
            .await?;

        Ok(())
    }
}
