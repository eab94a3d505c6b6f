//! Domain models for the test panel.

pub mod api_key;
pub mod backup;
pub mod catalog;
pub mod report;
pub mod status;
pub mod template;

// Re-export commonly used types
pub use api_key::{
    ApiKey, ApiKeyCreateResponse, ApiKeyListItem, ApiKeyRole, AuthenticatedCaller,
    CreateApiKeyRequest,
};
pub use backup::{ImportReport, ImportSummary, StatementFailure};
pub use catalog::{
    AppliedTemplate, CategoryInfo, CreateCategoryRequest, TestInfo, TestsQuery, TestsResponse,
    UpsertTestTypeRequest, UpsertVersionRequest, VersionInfo, VersionsQuery,
};
pub use report::{
    CreatedReport, ReportFilter, ReportListResponse, ReportSummary, ReportsQuery,
    SubmitReportRequest, SubmitResponse,
};
pub use status::TestStatus;
pub use template::{
    AssignVersionsRequest, CoverageEntry, CoverageQuery, CoverageResponse, TemplateRequest,
    TemplateSource, TemplateSummary,
};
