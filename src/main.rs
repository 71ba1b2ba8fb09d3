use std::{future::IntoFuture, process, sync::Arc};

use presswire::{
    application::{
        error::AppError,
        facade::ContentApi,
        scope::RequestScope,
        seo::{PageMetadata, PostHead},
    },
    cache::{CacheConfig, FetchCache},
    config::{self, LiveEnv, MetadataArgs, PathsArgs, PathsKind},
    infra::{
        error::InfraError,
        graphql::GraphqlClient,
        http::{self, AppState},
        telemetry,
    },
};
use serde::Serialize;
use tokio::sync::Notify;
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

    let content = build_content_api(&settings)?;

    match command {
        config::Command::Serve(_) => run_serve(settings, content).await,
        config::Command::Paths(args) => run_paths(&content, args).await,
        config::Command::Metadata(args) => run_metadata(&settings, &content, args).await,
    }
}

fn build_content_api(settings: &config::Settings) -> Result<ContentApi, AppError> {
    let cache = Arc::new(FetchCache::new(&CacheConfig::from(&settings.cache)));
    let client = GraphqlClient::new(&settings.content, Arc::clone(&cache))?;
    match LiveEnv::process().content(&settings.content) {
        Ok(content) if content.graphql_url.is_none() => {
            warn!("no GraphQL endpoint is set yet; content queries fail until GRAPHQL_URL is provided");
        }
        Ok(_) => {}
        Err(err) => warn!(error = %err, "GRAPHQL_URL is invalid; content queries will fail"),
    }
    Ok(ContentApi::new(Arc::new(client), cache))
}

async fn run_serve(settings: config::Settings, content: ContentApi) -> Result<(), AppError> {
    let state = AppState {
        content,
        site: Arc::new(settings.site.clone()),
        env: LiveEnv::process(),
        revalidate_token: settings.cache.revalidate_token.clone(),
    };
    let router = http::build_router(state);

    let addr = settings.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| InfraError::Bind { addr, source })?;
    info!(addr = %addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown({
            let shutdown = Arc::clone(&shutdown);
            async move { shutdown.notified().await }
        })
        .into_future();
    tokio::pin!(server);

    let result = tokio::select! {
        result = &mut server => result,
        _ = tokio::signal::ctrl_c() => {
            info!(
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "shutdown signal received; draining connections"
            );
            shutdown.notify_one();
            match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("graceful shutdown timed out; dropping open connections");
                    Ok(())
                }
            }
        }
    };

    result.map_err(|err| AppError::from(InfraError::from(err)))
}

async fn run_paths(content: &ContentApi, args: PathsArgs) -> Result<(), AppError> {
    let slugs = match args.kind {
        PathsKind::Posts => content.get_post_paths(None).await?,
        PathsKind::Categories => content.get_category_paths(None).await?,
    };
    print_json(&slugs.unwrap_or_default())
}

async fn run_metadata(
    settings: &config::Settings,
    content: &ContentApi,
    args: MetadataArgs,
) -> Result<(), AppError> {
    let scope = RequestScope::default();
    match content.get_post(&scope, &args.slug).await? {
        Some(post) => {
            let site = LiveEnv::process().site(&settings.site);
            print_json(&PostHead::for_post(&post, &site))
        }
        None => {
            warn!(slug = %args.slug, "post not found");
            print_json(&PageMetadata::not_found())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
