//! Create template_versions table.
//!
//! A client version belongs to at most one template, enforced by the unique
//! key on `client_version_id`.

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
                CREATE TABLE IF NOT EXISTS template_versions (
                    template_id BIGINT NOT NULL,
                    client_version_id BIGINT NOT NULL,
                    PRIMARY KEY (template_id, client_version_id),
                    UNIQUE KEY uq_template_versions_version (client_version_id),
                    CONSTRAINT fk_template_versions_template FOREIGN KEY (template_id)
                        REFERENCES test_templates(id) ON DELETE CASCADE,
                    CONSTRAINT fk_template_versions_version FOREIGN KEY (client_version_id)
                        REFERENCES client_versions(id) ON DELETE CASCADE
                ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS template_versions")
            .await?;

        Ok(())
    }
}
