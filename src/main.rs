use anyhow::Context;
use clap::{Parser, ValueEnum};
use edualign_api::{AppState, RestApi};
use edualign_core::{ScoreScale, SuggestionPolicy, Vectorizer};
use edualign_matching::{gemini, GeminiClient, GeminiConfig, Matcher, MatcherConfig};
use edualign_storage::{CollegeCatalog, MatchHistory};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ScaleArg {
    /// Scores already normalized to [0, 1]
    Unit,
    /// Raw 0-10 survey scores
    Ten,
}

impl From<ScaleArg> for ScoreScale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Unit => ScoreScale::Unit,
            ScaleArg::Ten => ScoreScale::Ten,
        }
    }
}

/// College matching service
#[derive(Parser, Debug)]
#[command(name = "edualign")]
#[command(about = "Match students to colleges by lived experience", long_about = None)]
struct Args {
    /// JSON array of college records
    #[arg(short, long, default_value = "./data/colleges.json")]
    catalog: PathBuf,

    /// Scale of the experience scores in the catalog
    #[arg(long, value_enum, default_value_t = ScaleArg::Unit)]
    score_scale: ScaleArg,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Append served matches to this JSON lines file
    #[arg(long)]
    history: Option<PathBuf>,

    /// JSON file overriding the slider suggestion rules
    #[arg(long)]
    suggestion_policy: Option<PathBuf>,

    /// Generation API key; matching uses similarity only when unset
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, default_value = gemini::DEFAULT_MODEL)]
    gemini_model: String,

    #[arg(long, default_value = gemini::DEFAULT_BASE_URL)]
    gemini_base_url: String,

    /// Deadline for one generation call
    #[arg(long, default_value_t = 15_000)]
    generation_timeout_ms: u64,

    /// Candidates sent to the generator
    #[arg(long, default_value_t = 20)]
    prefilter_size: usize,

    /// Largest accepted top_n
    #[arg(long, default_value_t = 50)]
    max_top_n: usize,
}

fn build_matcher(args: &Args) -> anyhow::Result<Matcher> {
    let config = MatcherConfig {
        prefilter_size: args.prefilter_size.max(1),
        max_top_n: args.max_top_n.max(1),
        generation_timeout: Duration::from_millis(args.generation_timeout_ms),
        ..MatcherConfig::default()
    };

    let api_key = args
        .gemini_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let Some(api_key) = api_key else {
        warn!("GEMINI_API_KEY not set, matches will use similarity ranking only");
        return Ok(Matcher::new(config));
    };

    let client = GeminiClient::new(GeminiConfig {
        model: args.gemini_model.clone(),
        base_url: args.gemini_base_url.clone(),
        timeout: config.generation_timeout,
        ..GeminiConfig::new(api_key)
    })
    .context("building generation client")?;
    info!("Generated matching enabled with model {}", client.model());

    Ok(Matcher::with_generator(config, Arc::new(client)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting EduAlign v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("HTTP API port: {}", args.http_port);

    let catalog = CollegeCatalog::load_or_empty(&args.catalog, args.score_scale.into())
        .with_context(|| format!("loading college catalog {}", args.catalog.display()))?;

    let policy = match &args.suggestion_policy {
        Some(path) => SuggestionPolicy::from_file(path)
            .with_context(|| format!("loading suggestion policy {}", path.display()))?,
        None => SuggestionPolicy::default(),
    };

    let matcher = build_matcher(&args)?;
    let mut state = AppState::new(catalog, Vectorizer::new(policy), matcher);
    if let Some(path) = &args.history {
        let history = MatchHistory::open(path)
            .with_context(|| format!("opening match history {}", path.display()))?;
        info!("Recording match history to {}", history.path().display());
        state = state.with_history(history);
    }
    let state = Arc::new(state);

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("EduAlign started successfully");
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
