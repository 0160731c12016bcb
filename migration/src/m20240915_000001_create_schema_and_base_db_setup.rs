use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS connect_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO connect_platform, public;")
            .await?;

        // Grant the base DB user that will execute all platform queries
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE connect TO connect;
                    GRANT ALL ON SCHEMA connect_platform TO connect;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA connect_platform GRANT ALL ON TABLES TO connect;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA connect_platform GRANT ALL ON SEQUENCES TO connect;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA connect_platform GRANT ALL ON FUNCTIONS TO connect;
                END $$;
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA connect_platform REVOKE ALL ON FUNCTIONS FROM connect;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA connect_platform REVOKE ALL ON SEQUENCES FROM connect;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA connect_platform REVOKE ALL ON TABLES FROM connect;
                    REVOKE ALL ON SCHEMA connect_platform FROM connect;
                    REVOKE ALL PRIVILEGES ON DATABASE connect FROM connect;
                END $$;
            "#,
            )
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS connect_platform CASCADE;")
            .await?;

        Ok(())
    }
}
