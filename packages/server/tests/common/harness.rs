//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in a binary. Each harness
//! gets its own freshly migrated database inside it, so tests never see each
//! other's rows.

use anyhow::{Context, Result};
use asset_brain::bootstrap;
use asset_brain::kernel::PgRecordStore;
use asset_brain::server::build_app;
use axum::Router;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    host: String,
    port: u16,
    admin_pool: PgPool,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?.to_string();
        let port = postgres.get_host_port_ipv4(5432).await?;
        let admin_pool = PgPool::connect(&database_url(&host, port, "postgres"))
            .await
            .context("Failed to connect to Postgres")?;

        Ok(Self {
            host,
            port,
            admin_pool,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

fn database_url(host: &str, port: u16, database: &str) -> String {
    format!("postgresql://postgres:postgres@{}:{}/{}", host, port, database)
}

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     ctx.seed().await;
///     let response = ctx.app().oneshot(request).await.unwrap();
/// }
/// ```
pub struct TestHarness {
    /// Pool on this test's private, migrated database
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    /// Create an empty, migrated database inside the shared container.
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let database = format!(
            "asset_brain_test_{}",
            DATABASE_COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        sqlx::query(&format!("CREATE DATABASE {}", database))
            .execute(&infra.admin_pool)
            .await
            .with_context(|| format!("Failed to create database {}", database))?;

        let db_pool = PgPool::connect(&database_url(&infra.host, infra.port, &database))
            .await
            .context("Failed to connect to test database")?;
        bootstrap::run_migrations(&db_pool).await?;

        Ok(Self { db_pool })
    }

    /// Load the sample portfolio and users.
    pub async fn seed(&self) {
        bootstrap::seed_sample_data(&self.db_pool)
            .await
            .expect("Failed to seed sample data");
    }

    pub fn record_store(&self) -> Arc<PgRecordStore> {
        Arc::new(PgRecordStore::new(self.db_pool.clone()))
    }

    /// The full router backed by this harness's database.
    pub fn app(&self) -> Router {
        build_app(
            self.db_pool.clone(),
            self.record_store(),
            vec!["http://localhost:3000".to_string()],
        )
    }
}
