use anyhow::Context;
use prashna::{
    AppError, AppState, PrashnaConfig, build_app,
    cli::{Cli, Commands, output::Output},
    utils::toml_config::{ConfigError, EmbeddingConfig, LlmConfig, ServerConfig, VectorStoreConfig},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let (config, config_found) = match PrashnaConfig::load(&cli.config) {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound(_)) => (PrashnaConfig::default(), false),
        Err(e) => {
            output.error(&e.to_string());
            return Err(e).context("Failed to load configuration");
        }
    };

    init_tracing(&config.server, cli.verbose);
    if !config_found {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command() {
        Commands::Serve => serve(config, &output).await,
        Commands::Index => index(config, &output).await,
        Commands::Ask { question } => ask(config, question, &output).await,
        Commands::Config { validate } => show_config(&config, &cli, *validate, &output),
    }
}

/// Logs go to stderr so command output on stdout stays clean.
/// `RUST_LOG` overrides the configured level.
fn init_tracing(server: &ServerConfig, verbose: bool) {
    let level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prashna={level},tower_http={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn fail(output: &Output, err: AppError) -> anyhow::Error {
    output.error(&err.user_message());
    anyhow::Error::new(err)
}

async fn serve(config: PrashnaConfig, output: &Output) -> anyhow::Result<()> {
    output.banner();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config)
        .await
        .map_err(|e| fail(output, e))?;

    let index = state
        .knowledge_base
        .ensure_built()
        .await
        .map_err(|e| fail(output, e))?;
    if let Some(report) = state.knowledge_base.last_report() {
        output.index_report(&report);
    }
    if index.is_empty() {
        output.hint("Add documents to the source directory and POST /api/index/rebuild");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    output.success(&format!("Listening on http://{}", addr));
    tracing::info!(%addr, "Server started");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn index(config: PrashnaConfig, output: &Output) -> anyhow::Result<()> {
    let state = AppState::from_config(config)
        .await
        .map_err(|e| fail(output, e))?;

    state
        .knowledge_base
        .rebuild()
        .await
        .map_err(|e| fail(output, e))?;

    if let Some(report) = state.knowledge_base.last_report() {
        output.index_report(&report);
    }
    output.success("Index built");
    Ok(())
}

async fn ask(config: PrashnaConfig, question: &str, output: &Output) -> anyhow::Result<()> {
    prashna::rag::qa::validate_query(question).map_err(|e| fail(output, e))?;

    let state = AppState::from_config(config)
        .await
        .map_err(|e| fail(output, e))?;

    state
        .knowledge_base
        .ensure_built()
        .await
        .map_err(|e| fail(output, e))?;

    let outcome = state
        .assistant
        .ask(question)
        .await
        .map_err(|e| fail(output, e))?;

    output.ask_outcome(&outcome);
    Ok(())
}

fn show_config(
    config: &PrashnaConfig,
    cli: &Cli,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    output.header("Configuration");
    output.kv("file", &cli.config.display().to_string());

    let llm = match &config.llm {
        LlmConfig::OpenAI { model, .. } => format!("openai ({})", model),
        LlmConfig::Ollama { model, .. } => format!("ollama ({})", model),
    };
    let embeddings = match &config.embeddings {
        EmbeddingConfig::OpenAI { model, .. } => format!("openai ({})", model),
        EmbeddingConfig::Ollama { model, .. } => format!("ollama ({})", model),
    };
    let store = match &config.vector_store {
        VectorStoreConfig::Memory => "memory".to_string(),
        VectorStoreConfig::Pinecone { index_host, .. } => format!("pinecone ({})", index_host),
    };

    output.kv("server", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("llm", &llm);
    output.kv("embeddings", &embeddings);
    output.kv("vector store", &store);
    output.kv(
        "documents",
        &format!(
            "{} ({})",
            config.rag.source_directory.display(),
            config.rag.glob
        ),
    );
    output.kv(
        "chunking",
        &format!(
            "{} / size {} / overlap {}",
            config.rag.chunking_strategy, config.rag.chunk_size, config.rag.chunk_overlap
        ),
    );
    output.kv("collection", &config.rag.index_collection_name);
    output.kv("retrieval k", &config.rag.retrieval_k.to_string());
    output.kv(
        "translation",
        &format!(
            "{} → {}",
            config.translation.source_language, config.translation.target_language
        ),
    );

    if validate {
        match config.validate_env() {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                return Err(e).context("Configuration validation failed");
            }
        }
    }

    Ok(())
}
