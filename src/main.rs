use std::{process, sync::Arc};

use postsync::{
    application::{
        cache::PostCache,
        error::AppError,
        posts::PostService,
        repos::PostsRepo,
        search::{SearchError, SearchIndex},
    },
    cache::{CacheConfig, PostCacheStore},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        search::ElasticsearchIndex,
        telemetry,
    },
};
use tokio::signal;
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
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Reindex(args) => run_reindex(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let index = init_search_index(&settings)?;

    if let Err(err) = index.ensure_index().await {
        warn!(
            target = "postsync::startup",
            index = index.index_name(),
            error = %err,
            "search index is not reachable; writes will fail until it is"
        );
    }

    let posts = build_post_service(repositories.clone(), index, &settings);
    let state = ApiState {
        posts: Arc::new(posts),
        db: repositories.as_ref().clone(),
    };

    serve_http(&settings, state).await
}

async fn run_reindex(
    settings: config::Settings,
    args: config::ReindexArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let index = init_search_index(&settings)?;
    index.ensure_index().await.map_err(search_failure)?;

    let service = build_post_service(repositories, index, &settings);

    info!(
        target = "postsync::reindex",
        batch_size = args.batch_size,
        "Starting reindex"
    );

    let summary = service
        .reindex_all(args.batch_size)
        .await
        .map_err(AppError::from)?;

    info!(
        target = "postsync::reindex",
        indexed = summary.indexed,
        failed = summary.failed.len(),
        "Reindex finished"
    );

    if !summary.failed.is_empty() {
        return Err(AppError::unexpected(format!(
            "failed to index {} post(s): {:?}",
            summary.failed.len(),
            summary.failed
        )));
    }

    Ok(())
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

fn init_search_index(settings: &config::Settings) -> Result<Arc<ElasticsearchIndex>, AppError> {
    ElasticsearchIndex::from_settings(&settings.search)
        .map(Arc::new)
        .map_err(search_failure)
}

fn build_post_service(
    repositories: Arc<PostgresRepositories>,
    index: Arc<ElasticsearchIndex>,
    settings: &config::Settings,
) -> PostService {
    let records: Arc<dyn PostsRepo> = repositories;
    let cache: Arc<dyn PostCache> = Arc::new(PostCacheStore::new(&CacheConfig::from(
        &settings.cache,
    )));
    let index: Arc<dyn SearchIndex> = index;

    PostService::new(records, cache, index, settings.consistency_policy())
}

fn search_failure(err: SearchError) -> AppError {
    AppError::from(InfraError::search(err.to_string()))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state, settings.server.request_timeout);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "postsync::startup",
        addr = %settings.server.addr,
        "HTTP server listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(
            target = "postsync::shutdown",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
    info!(target = "postsync::shutdown", "shutdown signal received");
}
