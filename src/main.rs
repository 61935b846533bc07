use anyhow::Context;
use clap::Parser;
use kindred_api::{AppState, RestApi, UserActivity, DEFAULT_EXPLAIN_LIMIT, DEFAULT_MAX_K};
use kindred_core::{source_from_path_with_table, Engine, EngineHandle, DEFAULT_TABLE};
use kindred_explain::{ChatCompletionsExplainer, DisabledExplainer, Explainer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Content-based product recommendations over an in-memory catalog
#[derive(Parser, Debug)]
#[command(name = "kindred")]
#[command(about = "Similar-product recommendations from catalog text", long_about = None)]
struct Args {
    /// Catalog file (.json, .jsonl/.ndjson, .db/.sqlite/.sqlite3)
    #[arg(short, long, env = "KINDRED_CATALOG", default_value = "./data/db.sqlite3")]
    catalog: PathBuf,

    /// Table to read when the catalog is a SQLite database
    #[arg(long, env = "KINDRED_TABLE", default_value = DEFAULT_TABLE)]
    table: String,

    /// HTTP API port
    #[arg(long, env = "KINDRED_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// JSON file mapping user ids to viewed product ids
    #[arg(long, env = "KINDRED_ACTIVITY")]
    activity: Option<PathBuf>,

    /// API key for the explanation service; explanations fall back to a
    /// fixed sentence when unset
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Chat model used for explanations
    #[arg(long, env = "KINDRED_LLM_MODEL", default_value = kindred_explain::DEFAULT_MODEL)]
    llm_model: String,

    /// OpenAI-compatible base URL for explanations
    #[arg(long, env = "KINDRED_LLM_BASE_URL", default_value = kindred_explain::DEFAULT_BASE_URL)]
    llm_base_url: String,

    /// Upper bound on k for any request
    #[arg(long, env = "KINDRED_MAX_K", default_value_t = DEFAULT_MAX_K)]
    max_k: usize,

    /// Explanation calls per request; later results get the fallback text
    #[arg(long, env = "KINDRED_EXPLAIN_LIMIT", default_value_t = DEFAULT_EXPLAIN_LIMIT)]
    explain_limit: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn build_engine(args: &Args) -> anyhow::Result<Engine> {
    let source = source_from_path_with_table(&args.catalog, &args.table)?;

    let catalog = source
        .load()
        .with_context(|| format!("loading catalog from {}", source.describe()))?;
    if catalog.is_empty() {
        warn!("Catalog {} contains no products", source.describe());
    }
    Engine::build(catalog).context("building similarity engine")
}

fn build_explainer(args: &Args) -> anyhow::Result<Box<dyn Explainer>> {
    match args.llm_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            let explainer = ChatCompletionsExplainer::new(key)?
                .with_model(&args.llm_model)
                .with_base_url(&args.llm_base_url);
            info!("Explanations enabled with model {}", explainer.model());
            Ok(Box::new(explainer))
        }
        None => {
            warn!("No LLM API key configured; using fallback explanations");
            Ok(Box::new(DisabledExplainer))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting kindred v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("HTTP API port: {}", args.http_port);

    let engine = build_engine(&args)?;
    let explainer = build_explainer(&args)?;

    let activity = match &args.activity {
        Some(path) => UserActivity::from_json_file(path)
            .with_context(|| format!("reading user activity from {:?}", path))?,
        None => UserActivity::default(),
    };
    info!("User activity loaded for {} users", activity.len());

    let state = Arc::new(
        AppState::new(EngineHandle::new(engine), explainer)
            .with_activity(activity)
            .with_max_k(args.max_k)
            .with_explain_limit(args.explain_limit),
    );

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("kindred started successfully");
    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
