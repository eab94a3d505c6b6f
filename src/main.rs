//! Test panel server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use test_panel_lib::api::{self, ApiDoc};
use test_panel_lib::auth::AdminKey;
use test_panel_lib::config::{ADMIN_KEY_HEADER, API_KEY_HEADER, Config};
use test_panel_lib::db::DbPool;
use test_panel_lib::db::backup::{self, BACKUPS_TO_KEEP};
use test_panel_lib::db::version::SERVER_VERSION;
use test_panel_lib::middleware::RequestLogger;

/// Headroom on top of the import limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Test Panel Server {}", SERVER_VERSION);
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and TP_ADMIN_KEY");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    // Check the stored version before migrating so the dump has the old schema
    let version = match pool.check_version().await {
        Ok(version) => version,
        Err(e) => {
            error!("Failed to check server version: {}", e);
            std::process::exit(1);
        }
    };

    if version.needs_backup {
        info!("Minor version bump detected, creating backup...");
        match backup::create_backup(&pool, &config.backup_dir, SERVER_VERSION).await {
            Ok(path) => info!("Backup created at: {}", path.display()),
            Err(e) => error!("Failed to create backup: {}", e),
        }

        if let Err(e) = backup::cleanup_old_backups(&config.backup_dir, BACKUPS_TO_KEEP).await {
            warn!("Failed to cleanup old backups: {}", e);
        }
    }

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    if version.changed
        && let Err(e) = pool.update_stored_version(SERVER_VERSION).await
    {
        error!("Failed to update stored version: {}", e);
    }

    if let Err(e) = pool.ensure_default_template().await {
        warn!("Could not ensure default template: {}", e);
    }

    // Prepare shared state
    let bind_address = config.bind_address();
    let admin_key = AdminKey::new(config.admin_key.clone());
    let is_development = config.is_development();
    let payload_limit = config.max_import_size + MULTIPART_OVERHEAD;

    if !admin_key.is_configured() {
        info!("No admin key configured; admin routes require an admin API key");
    }
    info!(
        "Import limit: {}MB, client version matching: {}",
        config.max_import_size / 1024 / 1024,
        config.version_match.as_str()
    );

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let openapi = ApiDoc::openapi();
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        // Same-origin only in production
        let origins = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
        } else {
            Cors::default()
        };
        let cors = origins
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-api-key"),
                header::HeaderName::from_static("x-admin-key"),
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(admin_key.clone()))
            .app_data(config.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .app_data(web::JsonConfig::default().limit(payload_limit))
            .service(web::scope("/api/v1").configure(api::configure_api))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    });

    info!(
        "Authenticate with the {} or {} header",
        API_KEY_HEADER, ADMIN_KEY_HEADER
    );

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
