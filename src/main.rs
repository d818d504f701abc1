use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use blind_match::config::Settings;
use blind_match::core::{BlindMatcher, Catalog, CompatibilityScorer, FallbackPolicy};
use blind_match::routes::{self, matches::AppState};
use blind_match::services::{AiModels, CachedScorer, OpenRouterClient, ScoreCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

/// Build the external scorer chain: provider client behind the score cache.
fn build_ai(settings: &Settings) -> (Option<Arc<OpenRouterClient>>, Option<Arc<dyn CompatibilityScorer>>, Option<ScoreCache>) {
    if !settings.ai.is_usable() {
        warn!("AI scoring disabled (enabled={}, api key set={}), using local scoring only",
            settings.ai.enabled, !settings.ai.api_key.trim().is_empty());
        return (None, None, None);
    }

    let models = AiModels {
        scoring: settings.ai.scoring_model.clone(),
        generation: settings.ai.generation_model.clone(),
    };

    let client = match OpenRouterClient::new(
        settings.ai.endpoint.clone(),
        settings.ai.api_key.clone(),
        settings.ai.app_name.clone(),
        models,
        settings.ai.max_tokens,
        Duration::from_secs(settings.ai.timeout_secs),
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create AI client ({}), using local scoring only", e);
            return (None, None, None);
        }
    };

    let cache = ScoreCache::new(settings.cache.score_cache_size, settings.cache.ttl_secs);
    let scorer: Arc<dyn CompatibilityScorer> =
        Arc::new(CachedScorer::new(client.clone(), cache.clone()));

    info!(
        "AI client initialized (model: {}, cache: {} entries, TTL: {}s)",
        settings.ai.scoring_model, settings.cache.score_cache_size, settings.cache.ttl_secs
    );

    (Some(Arc::new(client)), Some(scorer), Some(cache))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Blind Match compatibility service...");

    let catalog = Catalog::global();
    info!(
        "Catalog loaded ({} education levels, {} job categories)",
        catalog.education_levels().len(),
        catalog.job_categories().len()
    );

    let (ai, external, score_cache) = build_ai(&settings);

    let policy = FallbackPolicy::new(external, Duration::from_secs(settings.ai.timeout_secs));
    let matcher = BlindMatcher::new(policy);

    // Build application state
    let app_state = AppState {
        matcher,
        ai,
        score_cache,
        matching: settings.matching.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
