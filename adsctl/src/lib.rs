//! # adsctl: Control Layer for Ad Campaign Metrics
//!
//! `adsctl` is a REST backend for managing advertising entities and keeping their
//! cost-per-click metrics in sync with an external ads platform. It stores campaigns, the ad
//! groups inside them and the keywords inside those, and lets clients either overwrite CPC
//! values directly or pull the current ones from the platform. Alongside the ad hierarchy it
//! keeps one demographics record per user (age range and gender), with aggregate views and
//! batch refreshes.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer.
//! Persistence goes through the storage traits in [`db::store`], implemented for PostgreSQL
//! (production) and for an in-process store (tests and local runs). The ads platform sits
//! behind the [`ads_platform::AdsPlatform`] trait, with a deterministic mock and a Google Ads
//! client.
//!
//! ### Request Flow
//!
//! Requests to `/api/v1/*` are decoded by the extractors in [`api::extract`], which reject
//! malformed identifiers, queries and bodies with a `400`. Handlers then call one of the
//! services on [`AppState`]:
//!
//! - [`services::CpcService`], one per entity type, for CRUD and CPC overwrite/refresh
//! - [`services::DemographicsService`] for per-user records, aggregates and batch refreshes
//!
//! Every failure surfaces as an [`errors::Error`], which renders as `{"error": "..."}` with a
//! status code matching its kind.
//!
//! ### Background Services
//!
//! When `demographics.background_refresh.enabled` is set, a [`services::StaleRefreshDaemon`]
//! periodically refreshes demographics records that have not been updated from the platform
//! within the configured window. It stops when the application shuts down.
//!
//! ## Getting Started
//!
//! ```no_run
//! use adsctl::{Application, Config, telemetry};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = adsctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Database Setup
//!
//! With an external database, migrations run automatically on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! adsctl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod ads_platform;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod services;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use crate::{
    config::{CorsOrigin, DatabaseConfig, PoolSettings},
    db::{
        DemographicsStore, EntityStore, InMemoryStore, PostgresStore,
        models::{ad_groups::AdGroup, campaigns::Campaign, keywords::Keyword},
    },
    openapi::ApiDoc,
    services::{CpcService, DemographicsService, StaleRefreshDaemon},
};
use axum::{
    Json, Router, http,
    http::HeaderValue,
    routing::{get, post, put},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;

/// Application state shared across all request handlers.
///
/// Every field is cheap to clone: the services hold their store and platform behind `Arc`s.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .campaigns(campaigns)
///     .ad_groups(ad_groups)
///     .keywords(keywords)
///     .demographics(demographics)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub campaigns: CpcService<Campaign>,
    pub ad_groups: CpcService<AdGroup>,
    pub keywords: CpcService<Keyword>,
    pub demographics: DemographicsService,
}

/// Get the adsctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Wire every service to one store and the configured ads platform.
fn build_state<S>(store: S, config: &Config) -> anyhow::Result<AppState>
where
    S: EntityStore<Campaign> + EntityStore<AdGroup> + EntityStore<Keyword> + DemographicsStore + 'static,
{
    let store = Arc::new(store);
    let platform = ads_platform::create_platform(&config.ads_platform)?;
    let timeout = config.ads_platform.request_timeout();

    Ok(AppState::builder()
        .config(config.clone())
        .campaigns(CpcService::<Campaign>::new(store.clone(), platform.clone(), timeout))
        .ad_groups(CpcService::<AdGroup>::new(store.clone(), platform.clone(), timeout))
        .keywords(CpcService::<Keyword>::new(store.clone(), platform.clone(), timeout))
        .demographics(DemographicsService::new(
            store,
            platform,
            timeout,
            config.demographics.refresh_concurrency,
        ))
        .build())
}

async fn connect_pool(url: &str, settings: &PoolSettings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(Some(settings.idle_timeout))
        .max_lifetime(Some(settings.max_lifetime))
        .connect(url)
        .await?;
    Ok(pool)
}

/// Open the configured backend and build the application state on top of it.
///
/// Returns the pool as well when the backend is PostgreSQL, so it can be closed on shutdown.
async fn setup_storage(config: &Config) -> anyhow::Result<(AppState, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::External { url, pool } => {
            info!("Using external database");
            let pool = connect_pool(url, pool).await?;
            migrator().run(&pool).await?;
            let state = build_state(PostgresStore::new(pool.clone()), config)?;
            Ok((state, Some(pool)))
        }
        DatabaseConfig::Memory => {
            info!("Using in-memory storage: data will be lost on shutdown");
            Ok((build_state(InMemoryStore::new(), config)?, None))
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let wildcard = config.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard));

    let allow_origin = if wildcard {
        if config.cors.allow_credentials {
            anyhow::bail!("cors.allow_credentials cannot be combined with a wildcard origin");
        }
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::HeaderName::from_bytes(config.auth.user_header.as_bytes())?,
        ])
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Routes nested under `/api/v1`
fn api_routes() -> Router<AppState> {
    use api::handlers::{ad_groups, campaigns, demographics, info, keywords};

    Router::new()
        .route("/", get(info::get_info))
        // Campaigns of the identified user
        .route("/campaigns", get(campaigns::list_campaigns).post(campaigns::create_campaign))
        .route("/campaigns/{id}", get(campaigns::get_campaign).delete(campaigns::delete_campaign))
        .route("/campaigns/{id}/cpc", put(campaigns::update_campaign_cpc))
        .route("/campaigns/{id}/refresh-cpc", post(campaigns::refresh_campaign_cpc))
        // Ad groups
        .route(
            "/campaigns/{id}/adgroups",
            get(ad_groups::list_ad_groups).post(ad_groups::create_ad_group),
        )
        .route("/adgroups/{id}", get(ad_groups::get_ad_group).delete(ad_groups::delete_ad_group))
        .route("/adgroups/{id}/cpc", put(ad_groups::update_ad_group_cpc))
        .route("/adgroups/{id}/refresh-cpc", post(ad_groups::refresh_ad_group_cpc))
        // Keywords
        .route("/adgroups/{id}/keywords", get(keywords::list_keywords).post(keywords::create_keyword))
        .route("/keywords/{id}", get(keywords::get_keyword).delete(keywords::delete_keyword))
        .route("/keywords/{id}/cpc", put(keywords::update_keyword_cpc))
        .route("/keywords/{id}/refresh-cpc", post(keywords::refresh_keyword_cpc))
        // Demographics
        .route(
            "/demographics/users/{user_id}",
            get(demographics::get_user_demographics).put(demographics::update_user_demographics),
        )
        .route("/demographics/summary", get(demographics::get_demographics_summary))
        .route("/demographics/performance", get(demographics::get_demographics_performance))
        .route("/demographics/refresh/all", post(demographics::refresh_all_demographics))
        .route("/demographics/refresh/stale", post(demographics::refresh_stale_demographics))
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - API routes under `/api/v1`
/// - Health check and OpenAPI documentation
/// - Optional Prometheus metrics
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .nest("/api/v1", api_routes().with_state(state.clone()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled. The layer installs the global recorder, so the
    // service counters show up on the same endpoint.
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Container for background services and their lifecycle management.
///
/// # Graceful Shutdown
///
/// The struct provides a [`shutdown`](BackgroundServices::shutdown) method to gracefully
/// stop all background tasks. When dropped, the `drop_guard` will automatically cancel
/// the shutdown token, signaling all tasks to stop.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: CancellationToken,
    // Pub so that we can disarm it if we want to
    pub drop_guard: Option<DropGuard>,
}

impl BackgroundServices {
    /// Gracefully shutdown all background tasks
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();

        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

/// Start the background tasks enabled in the configuration
fn setup_background_services(state: &AppState, shutdown_token: CancellationToken) -> BackgroundServices {
    let mut background_tasks = Vec::new();

    let refresh = &state.config.demographics.background_refresh;
    if refresh.enabled {
        let daemon = StaleRefreshDaemon::new(state.demographics.clone(), refresh.interval, refresh.older_than);
        let token = shutdown_token.clone();
        background_tasks.push(tokio::spawn(async move { daemon.run(token).await }));
    } else {
        debug!("Background demographics refresh disabled");
    }

    let drop_guard = shutdown_token.clone().drop_guard();
    BackgroundServices {
        background_tasks,
        shutdown_token,
        drop_guard: Some(drop_guard),
    }
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens storage, runs migrations and starts background
///    services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, gracefully stops all services
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting ads control layer with configuration: {:#?}", config);

        let (app_state, pool) = setup_storage(&config).await?;
        let bg_services = setup_background_services(&app_state, CancellationToken::new());
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Ads control layer listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        self.bg_services.shutdown().await;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::BackgroundRefreshConfig;
    use std::time::Duration;

    fn memory_config() -> Config {
        Config {
            database: DatabaseConfig::Memory,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_application_serves_health_and_docs() {
        let app = Application::new(memory_config()).await.unwrap();
        let (server, bg_services) = app.into_test_server();

        let response = server.get("/healthz").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.text(), "OK");

        let response = server.get("/openapi.json").await;
        assert_eq!(response.status_code().as_u16(), 200);
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/keywords/{id}/refresh-cpc"].is_object());

        let response = server.get("/api/v1").await;
        assert_eq!(response.status_code().as_u16(), 200);
        let info: serde_json::Value = response.json();
        assert_eq!(info["status"], "ok");
        assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));

        // Metrics are off by default
        assert_eq!(server.get("/internal/metrics").await.status_code().as_u16(), 404);

        bg_services.shutdown().await;
    }

    #[tokio::test]
    async fn test_background_refresh_starts_and_stops() {
        let mut config = memory_config();
        config.demographics.background_refresh = BackgroundRefreshConfig {
            enabled: true,
            interval: Duration::from_secs(3600),
            older_than: Duration::from_secs(24 * 3600),
        };

        let app = Application::new(config).await.unwrap();
        assert_eq!(app.bg_services.background_tasks.len(), 1);

        tokio::time::timeout(Duration::from_secs(5), app.bg_services.shutdown())
            .await
            .expect("background tasks should stop on shutdown");
    }

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let mut config = memory_config();
        config.cors.allowed_origins = vec![CorsOrigin::Url("https://ads.example.com".parse().unwrap())];
        config.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_ok());

        config.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        assert!(create_cors_layer(&config).is_err());

        config.cors.allow_credentials = false;
        assert!(create_cors_layer(&config).is_ok());
    }
}
