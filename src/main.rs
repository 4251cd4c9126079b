use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod costs;
mod dates;
mod error;
mod report;
mod routes;
mod schemas;
mod seed;
mod store;
mod users;

use config::{Command, Config};
use routes::AppState;
use store::{MemoryStore, MongoStore, Store};

async fn open_store(config: &Config) -> std::io::Result<Arc<dyn Store>> {
    if config.in_memory {
        warn!("using the in-memory store, nothing will be persisted");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let uri = config
        .mongodb_uri
        .as_deref()
        .ok_or_else(|| std::io::Error::other("MONGODB_URI is required"))?;
    let store = MongoStore::connect(uri, &config.database)
        .await
        .map_err(|err| std::io::Error::other(format!("failed to connect: {err}")))?;
    Ok(Arc::new(store))
}

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_header(header::CONTENT_TYPE)
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

async fn serve(config: Config, store: Arc<dyn Store>) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        store,
        local_offset: config.report_utc_offset,
    });
    let allowed_origins = config.allowed_origins.clone();

    info!(host = %config.host, port = config.port, "listening");
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::to(routes::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    let store = open_store(&config).await?;

    let result = match config.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, store.clone()).await,
        Command::ResetDb => seed::reset_database(store.as_ref())
            .await
            .map(|user| info!(id = %user.id, "database reset"))
            .map_err(|err| std::io::Error::other(err.to_string())),
    };

    store.shutdown().await;
    result
}
