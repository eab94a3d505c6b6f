//! SeaORM entity definitions for the MySQL database.

pub mod api_key;
pub mod client_version;
pub mod report;
pub mod server_metadata;
pub mod template_version;
pub mod test_category;
pub mod test_result;
pub mod test_template;
pub mod test_type;
