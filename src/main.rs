#[macro_use]
extern crate diesel;

use clap::Parser;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use opentelemetry::{
    sdk::{trace, Resource},
    KeyValue,
};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

mod catalog;
mod cmd;
mod config;
mod error;
mod framing;
mod input;
mod models;
mod reconcile;
mod schema;
mod store;

use store::PgStore;

#[derive(Parser, Debug)]
#[command(version, author, about = "Board game catalog synchronization")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: cmd::Command,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = config::load_config(&args.config)
        .map_err(|e| format!("Failed to load {}: {}", args.config, e))
        .unwrap();

    // Install tracing framework, with a Jaeger sink when configured
    let jaeger = config.tracing_config.as_ref().and_then(|t| t.jaeger.clone());
    let telemetry = jaeger.as_ref().map(|endpoint| {
        let tracer = opentelemetry_jaeger::new_agent_pipeline()
            .with_endpoint(endpoint)
            .with_service_name("boardgame-catalog")
            .with_trace_config(trace::config().with_resource(Resource::new(vec![KeyValue::new(
                "version",
                env!("CARGO_PKG_VERSION"),
            )])))
            .install_simple()
            .expect("Failed to install jaeger tracing");
        tracing_opentelemetry::layer().with_tracer(tracer)
    });
    let subscriber = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(telemetry);
    tracing::subscriber::set_global_default(subscriber).expect("Failed to install tracing");
    if jaeger.is_some() {
        tracing::info!("Installed jaeger tracing");
    }

    // Connect to database
    tracing::info!("Connecting to postgres...");
    let manager =
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.db_config.database_url);
    let pool = Pool::builder(manager).build().expect("Failed to create connection pool");

    let response = match PgStore::connect(&pool).await {
        Ok(mut store) => cmd::run(&mut store, &config.batch_config, &args.command).await,
        Err(e) => framing::failure(&e),
    };

    let body = serde_json::to_string_pretty(&response.body)
        .unwrap_or_else(|_| response.body.to_string());
    println!("{}", body);
    tracing::info!(status = response.status, "done");

    if jaeger.is_some() {
        opentelemetry::global::shutdown_tracer_provider();
    }
    if !response.is_success() {
        std::process::exit(1);
    }
}
