//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_test_categories;
mod m20260301_000002_create_test_types;
mod m20260301_000003_create_client_versions;
mod m20260301_000004_create_test_templates;
mod m20260301_000005_create_template_versions;
mod m20260301_000006_create_reports;
mod m20260301_000007_create_test_results;
mod m20260301_000008_create_api_keys;
mod m20260301_000009_create_server_metadata;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_test_categories::Migration),
            Box::new(m20260301_000002_create_test_types::Migration),
            Box::new(m20260301_000003_create_client_versions::Migration),
            Box::new(m20260301_000004_create_test_templates::Migration),
            Box::new(m20260301_000005_create_template_versions::Migration),
            Box::new(m20260301_000006_create_reports::Migration),
            Box::new(m20260301_000007_create_test_results::Migration),
            Box::new(m20260301_000008_create_api_keys::Migration),
            Box::new(m20260301_000009_create_server_metadata::Migration),
        ]
    }
}
