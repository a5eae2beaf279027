use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use apalis::prelude::{Monitor, WorkerBuilder, WorkerFactoryFn};
use apalis_cron::CronStream;
use aula::{
    application::{
        analytics::AnalyticsService,
        catalog::CatalogService,
        engagement::EngagementService,
        error::AppError,
        jobs::{
            PurgeNotificationsContext, process_purge_notifications_job,
            purge_notifications_schedule,
        },
        notifications::NotificationService,
        orders::OrderService,
        repos::{CoursesRepo, NotificationsRepo, OrdersRepo, SessionsRepo, UsersRepo},
        sessions::SessionService,
    },
    cache::{CacheConfig, CourseCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        mailer::build_mailer,
        telemetry,
    },
};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(config::ServeArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings)?;

    let monitor_handle = spawn_job_monitor(app.notifications.clone());

    let result = serve_http(&settings, app.api_state).await;

    monitor_handle.abort();
    let _ = monitor_handle.await;

    result
}

struct ApplicationContext {
    api_state: ApiState,
    notifications: Arc<NotificationService>,
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApplicationContext, AppError> {
    let courses_repo: Arc<dyn CoursesRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let notifications_repo: Arc<dyn NotificationsRepo> = repositories.clone();
    let orders_repo: Arc<dyn OrdersRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();

    let course_cache = Arc::new(CourseCache::new(&CacheConfig::from(&settings.cache)));
    let mailer = build_mailer(&settings.mail).map_err(AppError::from)?;

    let sessions = Arc::new(SessionService::new(sessions_repo, users_repo.clone()));
    let catalog = Arc::new(CatalogService::new(courses_repo.clone(), course_cache));
    let engagement = Arc::new(EngagementService::new(
        courses_repo.clone(),
        notifications_repo.clone(),
        mailer.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(notifications_repo.clone()));
    let orders = Arc::new(OrderService::new(
        orders_repo.clone(),
        courses_repo.clone(),
        users_repo.clone(),
        notifications_repo,
        mailer,
    ));
    let analytics = Arc::new(AnalyticsService::new(users_repo, courses_repo, orders_repo));

    let rate_limiter = Arc::new(http::ApiRateLimiter::new(
        Duration::from_secs(u64::from(settings.rate_limit.window_seconds.get())),
        settings.rate_limit.max_requests.get(),
    ));

    let api_state = ApiState {
        sessions,
        catalog,
        engagement,
        notifications: notifications.clone(),
        orders,
        analytics,
        db: repositories,
        rate_limiter,
    };

    Ok(ApplicationContext {
        api_state,
        notifications,
    })
}

fn spawn_job_monitor(notifications: Arc<NotificationService>) -> tokio::task::JoinHandle<()> {
    let purge_ctx = PurgeNotificationsContext { notifications };
    let purge_worker = WorkerBuilder::new("purge-notifications-worker")
        .data(purge_ctx)
        .backend(CronStream::new(purge_notifications_schedule()))
        .build_fn(process_purge_notifications_job);

    let monitor = Monitor::new().register(purge_worker);

    tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "job monitor stopped");
        }
    })
}

async fn serve_http(settings: &config::Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(api_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "aula::runtime",
        addr = %settings.server.addr,
        "Listening"
    );

    // The drain channel fires once a shutdown signal lands, switching the
    // server wait into the bounded grace period below.
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel();
    let shutdown = async move {
        wait_for_shutdown_signal().await;
        let _ = drain_tx.send(());
    };

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        _ = drain_rx => {}
    }

    let grace = settings.server.graceful_shutdown;
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
            info!(target = "aula::runtime", "Shutdown complete");
        }
        Err(_) => {
            warn!(
                target = "aula::runtime",
                grace_secs = grace.as_secs(),
                "Grace period elapsed with connections still open"
            );
        }
    }

    Ok(())
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            error!(error = %err, "failed to register SIGTERM handler");
            return std::future::pending().await;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(err) => {
            error!(error = %err, "failed to register SIGINT handler");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!(target = "aula::runtime", "Received SIGTERM");
        }
        _ = sigint.recv() => {
            info!(target = "aula::runtime", "Received SIGINT");
        }
    }
}

#[cfg(test)]
mod tests {}
