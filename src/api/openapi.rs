//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Test Panel Server",
        version = "0.3.0",
        description = "API server for client-version test reports, test templates and SQL backups"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        api::health::info,
        // Test listing
        api::tests::list_tests,
        // Catalog endpoints
        api::catalog::list_versions,
        api::catalog::upsert_version,
        api::catalog::create_category,
        api::catalog::delete_category,
        api::catalog::upsert_test_type,
        // Template endpoints
        api::templates::list_templates,
        api::templates::create_template,
        api::templates::update_template,
        api::templates::delete_template,
        api::templates::set_default_template,
        api::templates::assign_versions,
        api::templates::template_coverage,
        // Reports
        api::submit::submit_report,
        api::reports::list_reports,
        // Backup endpoints
        api::backup::export_database,
        api::backup::import_database,
        // Auth endpoints
        api::user::current_user,
        services::auth_admin::create_api_key,
        services::auth_admin::list_api_keys,
        services::auth_admin::get_api_key,
        services::auth_admin::revoke_api_key,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::health::ServerInfoResponse,
            // Catalog
            models::CategoryInfo,
            models::TestInfo,
            models::AppliedTemplate,
            models::TestsResponse,
            models::VersionInfo,
            models::UpsertVersionRequest,
            models::CreateCategoryRequest,
            models::UpsertTestTypeRequest,
            api::catalog::VersionListResponse,
            api::catalog::TestTypeResponse,
            // Templates
            models::TemplateSource,
            models::TemplateSummary,
            models::TemplateRequest,
            models::AssignVersionsRequest,
            models::CoverageEntry,
            models::CoverageResponse,
            api::templates::TemplateListResponse,
            api::templates::AssignVersionsResponse,
            // Reports
            models::TestStatus,
            models::report::SubmitMeta,
            models::report::ResultEntry,
            models::SubmitReportRequest,
            models::CreatedReport,
            models::SubmitResponse,
            models::ReportSummary,
            models::ReportListResponse,
            // Backup
            services::sql_script::ImportMode,
            models::StatementFailure,
            models::ImportSummary,
            // Auth
            models::ApiKeyRole,
            models::ApiKeyCreateResponse,
            models::ApiKeyListItem,
            models::CreateApiKeyRequest,
            services::auth_admin::ListApiKeysResponse,
            api::user::CallerInfo,
            api::user::UserResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Tests", description = "Tests visible to a client version"),
        (name = "Catalog", description = "Client versions, categories and test definitions"),
        (name = "Templates", description = "Test templates and version assignment"),
        (name = "Reports", description = "Report submission and listing"),
        (name = "Backup", description = "SQL export and import"),
        (name = "Auth", description = "Caller identity and API key management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-API-Key"),
                    ),
                ),
            );
            components.add_security_scheme(
                "admin_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Admin-Key"),
                    ),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_admin_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/admin/import"));
        assert!(doc.paths.paths.contains_key("/api/v1/templates/{id}/coverage"));
        assert!(doc.paths.paths.contains_key("/api/v1/tests"));
        assert!(doc.paths.paths.contains_key("/api/v1/reports"));
        assert!(doc.paths.paths.contains_key("/api/v1/user"));
    }
}
