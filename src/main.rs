use buildemy_checkout::config::Config;
use buildemy_checkout::domain::ports::{CheckoutProviderRef, EnrollmentStoreRef};
use buildemy_checkout::infrastructure::in_memory::{
    FixedWindowRateLimiter, InMemoryCourseCatalog, InMemoryEnrollmentStore, InMemoryUserDirectory,
    SimulatedCheckoutProvider,
};
use buildemy_checkout::infrastructure::rest_checkout::RestCheckoutProvider;
use buildemy_checkout::interfaces::csv::seed_reader::{CourseReader, UserReader};
use buildemy_checkout::interfaces::http::router;
use buildemy_checkout::state::AppState;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Course seed CSV (id,slug,title,price,stripe_price_id)
    #[arg(long)]
    courses: Option<PathBuf>,

    /// User seed CSV (id,email,name,token,stripe_customer_id)
    #[arg(long)]
    users: Option<PathBuf>,

    /// Path to persistent enrollment database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Listen port; overrides BUILDEMY_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.port = port;
    }
    let port = config.port;

    let enrollments: EnrollmentStoreRef = match cli.db_path {
        Some(path) => open_enrollment_store(path)?,
        None => Arc::new(InMemoryEnrollmentStore::new()),
    };

    let courses = InMemoryCourseCatalog::new();
    if let Some(path) = cli.courses {
        let file = File::open(path).into_diagnostic()?;
        for course in CourseReader::new(file).courses() {
            courses.insert(course.into_diagnostic()?).await;
        }
    }

    let users = InMemoryUserDirectory::new();
    if let Some(path) = cli.users {
        let file = File::open(path).into_diagnostic()?;
        for record in UserReader::new(file).users() {
            let (user, token) = record.into_diagnostic()?;
            users.insert(user, &token).await;
        }
    }

    let provider: CheckoutProviderRef = match &config.stripe_secret_key {
        Some(key) => Arc::new(RestCheckoutProvider::new(
            config.stripe_api_base.clone(),
            key.clone(),
        )),
        None => {
            warn!("STRIPE_SECRET_KEY not set, using simulated checkout provider");
            Arc::new(SimulatedCheckoutProvider::new())
        }
    };

    let rate_limiter = Arc::new(FixedWindowRateLimiter::new(
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_max_attempts,
    ));

    let state = AppState::new(
        config,
        enrollments,
        Arc::new(courses),
        Arc::new(users),
        provider,
        rate_limiter,
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .into_diagnostic()?;
    info!("listening on port {port}");
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_enrollment_store(path: PathBuf) -> Result<EnrollmentStoreRef> {
    use buildemy_checkout::infrastructure::rocksdb::RocksDbEnrollmentStore;
    let store = RocksDbEnrollmentStore::open(path).into_diagnostic()?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_enrollment_store(_path: PathBuf) -> Result<EnrollmentStoreRef> {
    warn!("built without the storage-rocksdb feature; enrollments will be kept in memory");
    Ok(Arc::new(InMemoryEnrollmentStore::new()))
}
