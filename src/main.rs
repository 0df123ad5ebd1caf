//! Armature demo server.
//!
//! Loads an XML site configuration, registers a small set of handlers,
//! and serves them over HTTP. Meant as a runnable reference for wiring
//! the dispatcher into a binary, not as an application in itself.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use armature::config::load_document;
use armature::dispatch::{ActionOutcome, Dispatcher, HandlerRegistry};
use armature::observability::init_logging;
use armature::session::SessionConfig;
use armature::view::JsonRenderer;
use armature::{Environment, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "armature", about = "Armature demo server")]
struct Args {
    /// Path to the XML site configuration
    #[arg(long, default_value = "config/site.xml")]
    config: String,

    /// Runtime environment (production or development)
    #[arg(long, default_value = "production")]
    environment: String,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,
}

#[derive(Default)]
struct HomeHandler {
    visits: u32,
}

#[derive(Default)]
struct AccountHandler;

fn build_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry
        .handler("index", HomeHandler::default)
        .action("index", |handler: &mut HomeHandler, ctx| {
            handler.visits += 1;
            let greeting = ctx
                .session
                .read("name")?
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_else(|| "stranger".into());
            Ok(ActionOutcome::model(json!({
                "greeting": greeting,
                "visits": handler.visits,
                "params": ctx.params,
            }))?)
        })
        .action("remember", |_: &mut HomeHandler, ctx| {
            let name = ctx
                .params
                .first()
                .cloned()
                .unwrap_or_else(|| "stranger".into());
            ctx.session.write("name", json!(name))?;
            Ok(ActionOutcome::redirect("index", "index", Vec::new()))
        });

    registry
        .handler("account", AccountHandler::default)
        .access_level(5)
        .action("index", |_: &mut AccountHandler, ctx| {
            Ok(ActionOutcome::model(json!({
                "access_level": ctx.session.access_level()?,
            }))?)
        });

    registry
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args = Args::parse();
    let environment = Environment::from_str(&args.environment)?;

    tracing::info!(
        config = %args.config,
        environment = %environment.as_str(),
        "armature starting"
    );

    let config = load_document(Path::new(&args.config), environment)?;
    let dispatcher = Dispatcher::new(
        config,
        build_registry(),
        JsonRenderer,
        SessionConfig::default(),
    )?;

    let listener = TcpListener::bind(&args.bind).await?;
    let server = HttpServer::new(Arc::new(dispatcher));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
