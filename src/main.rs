mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::database::Datastores;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::templates::TemplateEngine;
use crate::features::catalog::{routes as catalog_routes, CatalogService};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::reports::{routes as reports_routes, ReportService, ReportState};
use crate::modules::mail::{build_mailer, Mailer};
use crate::modules::storage::PhotoStore;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

/// Shared services handed to every feature router
struct AppServices {
    catalog: Arc<CatalogService>,
    reports: Arc<ReportService>,
    notifications: Arc<NotificationService>,
    dashboard: Arc<DashboardService>,
    templates: Arc<TemplateEngine>,
}

impl AppServices {
    fn new(
        config: &Config,
        stores: &Datastores,
        photos: Arc<PhotoStore>,
        mailer: Arc<dyn Mailer>,
        templates: Arc<TemplateEngine>,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(
            stores.catalog.clone(),
            stores.sites.clone(),
        ));

        let reports = Arc::new(ReportService::new(
            stores.reports.clone(),
            Arc::clone(&photos),
        ));

        let notifications = Arc::new(NotificationService::new(
            stores.notifications.clone(),
            Arc::clone(&catalog),
            photos,
            Arc::clone(&templates),
            mailer,
            config.mail.recipient.clone(),
            config.app.public_base_url.clone(),
        ));

        let dashboard = Arc::new(DashboardService::new(
            stores.reports.clone(),
            Arc::clone(&catalog),
        ));

        Self {
            catalog,
            reports,
            notifications,
            dashboard,
            templates,
        }
    }
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

fn build_router(config: &Config, services: AppServices) -> Router {
    let AppServices {
        catalog,
        reports,
        notifications,
        dashboard,
        templates,
    } = services;

    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    }
    .modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(
                Arc::new(credentials),
                "swagger",
            )))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let report_state = ReportState {
        reports,
        catalog: Arc::clone(&catalog),
        notifications: Arc::clone(&notifications),
        templates: Arc::clone(&templates),
    };

    // Admin views and the manual notification endpoint
    let admin_routes = Router::new()
        .merge(reports_routes::admin_routes(report_state.clone()))
        .merge(notifications_routes::admin_routes(
            Arc::clone(&notifications),
            Arc::clone(&templates),
        ))
        .merge(dashboard_routes::admin_routes(
            Arc::clone(&dashboard),
            Arc::clone(&templates),
        ));

    let admin_routes = if let Some(credentials) = config.admin.credentials() {
        tracing::info!("Admin basic auth enabled");
        admin_routes.route_layer(from_fn(middleware::basic_auth_middleware(
            Arc::new(credentials),
            "admin",
        )))
    } else {
        tracing::warn!("Admin views are open (ADMIN_USERNAME/ADMIN_PASSWORD not set)");
        admin_routes
    };

    // Citizen pages, the confirmation callback and chart data
    let public_routes = Router::new()
        .merge(catalog_routes::routes(catalog, Arc::clone(&templates)))
        .merge(reports_routes::public_routes(report_state))
        .merge(notifications_routes::public_routes(
            notifications,
            Arc::clone(&templates),
        ))
        .merge(dashboard_routes::public_routes(dashboard, templates));

    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(swagger)
        .merge(admin_routes)
        .merge(public_routes)
        .merge(health_route)
        .nest_service("/static", ServeDir::new(&config.storage.static_dir))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let stores = Datastores::connect_lazy(&config.database)?;
    tracing::info!("Datastore pools created");

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        // An unreachable store must not keep the portal down
        match stores.migrate().await {
            Ok(()) => tracing::info!("Database migrations completed successfully"),
            Err(e) => tracing::error!("Migration failed, continuing with existing schema: {}", e),
        }
    }

    let photos = Arc::new(PhotoStore::new(config.storage.static_dir.clone()));
    photos
        .ensure_upload_dir()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare upload directory: {}", e))?;
    tracing::info!("Photo uploads stored in {}", photos.upload_dir().display());

    let mailer = build_mailer(&config.mail)
        .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?;

    let templates = Arc::new(TemplateEngine::from_dir(&config.storage.templates_dir));
    if templates.template_exists("base.html") {
        tracing::info!(
            "Templates loaded from {}",
            config.storage.templates_dir.display()
        );
    } else {
        tracing::warn!(
            "No base.html under {}, pages will fail to render",
            config.storage.templates_dir.display()
        );
    }

    let services = AppServices::new(&config, &stores, photos, mailer, templates);
    let app = build_router(&config, services);

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
