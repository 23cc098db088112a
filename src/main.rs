use anyhow::Result;
use clap::{Parser, Subcommand};
use graphchat::catalog;
use graphchat::graph::{GraphBackend, TigerGraphClient};
use graphchat::http::HttpServer;
use graphchat::llm::AzureOpenAiClient;
use graphchat::{AppContext, Config};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "graphchat")]
#[command(version)]
#[command(about = "Chat with a TigerGraph social network through an Azure OpenAI assistant")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web server (default)
    Serve,
    /// Check configuration, TigerGraph and Azure OpenAI connectivity
    Verify,
    /// Print the query catalog
    Queries,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server().await?,
        Command::Verify => run_verification().await?,
        Command::Queries => print_catalog(),
    }

    Ok(())
}

async fn run_server() -> Result<()> {
    log::info!("Starting graphchat v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("TigerGraph host: {}", config.graph.host);
    log::info!("Graph: {}", config.graph.graph_name);
    log::info!("Azure OpenAI deployment: {}", config.llm.deployment);
    for descriptor in catalog::domain_queries() {
        log::info!(
            "  {} -> {}",
            descriptor.tool_name,
            descriptor.installed_query.unwrap_or_default()
        );
    }

    let context = Arc::new(AppContext::initialize(config).await?);
    HttpServer::new(context).run().await?;
    Ok(())
}

/// Walk through every external dependency the server needs at startup
async fn run_verification() -> Result<()> {
    log::info!("Verifying graphchat setup v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("✓ Configuration loaded, required environment variables set");

    let graph = TigerGraphClient::connect(&config.graph, config.graph_credentials()?).await?;
    log::info!("✓ TigerGraph connection successful: {}", graph.echo().await?);

    match graph.vertex_types().await {
        Ok(types) => log::info!("✓ Vertex types: {}", types.join(", ")),
        Err(e) => log::warn!("Could not read vertex types: {}", e),
    }

    let installed = graph.installed_queries().await?;
    let mut missing = Vec::new();
    for name in catalog::installed_query_names() {
        if installed.iter().any(|q| q == name) {
            log::info!("✓ Installed query: {}", name);
        } else {
            log::error!("Missing installed query: {}", name);
            missing.push(name);
        }
    }

    let model = AzureOpenAiClient::new(config.llm_endpoint()?, config.llm_api_key()?, &config.llm)?;
    let reply = model.ping().await?;
    log::info!("✓ Azure OpenAI connection successful: {}", reply.trim());

    if !missing.is_empty() {
        anyhow::bail!(
            "{} installed quer{} missing: {}. Install them on graph {} before serving.",
            missing.len(),
            if missing.len() == 1 { "y is" } else { "ies are" },
            missing.join(", "),
            config.graph.graph_name
        );
    }

    log::info!("✓ Setup verification complete");
    Ok(())
}

fn print_catalog() {
    println!("Available tools:");
    for descriptor in catalog::list_all() {
        match descriptor.installed_query {
            Some(installed) => println!("  {} (query {})", descriptor.tool_name, installed),
            None => println!("  {} (vertex listing)", descriptor.tool_name),
        }
        println!("      {}", descriptor.description);
        for param in descriptor.params {
            let optional = if param.is_optional() { ", optional" } else { "" };
            println!("      - {}{}: {}", param.name, optional, param.description);
        }
        for question in descriptor.example_questions {
            println!("      e.g. \"{}\"", question);
        }
    }
}
