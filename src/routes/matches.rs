use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::MatchingSettings;
use crate::core::{is_safe, normalize, score_breakdown, aggregate, BlindMatcher, NormalizedProfile};
use crate::models::{
    BlindMessageRequest, BlindMessageResponse, BlindSelectRequest, BlindSelectResponse,
    ChatAnalysisRequest, CompatibilityRequest, CompatibilityResponse, CompatibilityResult,
    ErrorResponse, HealthResponse, PairRequest, RankRequest, RankResponse, SafetyCheckRequest,
    SafetyCheckResponse,
};
use crate::services::{review_message, spawn_best_effort, AiError, OpenRouterClient, ScoreCache};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: BlindMatcher,
    pub ai: Option<Arc<OpenRouterClient>>,
    pub score_cache: Option<ScoreCache>,
    pub matching: MatchingSettings,
}

impl AppState {
    /// State without any language model; every score is local.
    pub fn local_only(matching: MatchingSettings) -> Self {
        Self {
            matcher: BlindMatcher::local_only(),
            ai: None,
            score_cache: None,
            matching,
        }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/compatibility", web::post().to(compatibility))
        .route("/matches/rank", web::post().to(rank_matches))
        .route("/blind/select", web::post().to(select_blind_match))
        .route("/blind/message", web::post().to(send_blind_message))
        .route("/blind/date-suggestion", web::post().to(date_suggestion))
        .route("/chat/analyze", web::post().to(analyze_chat))
        .route("/safety/check", web::post().to(safety_check));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "Validation failed",
        errors.to_string(),
    )
}

fn ai_disabled() -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
        "AI unavailable",
        "No language model is configured".to_string(),
    )
}

fn ai_failed(context: &str, err: AiError) -> HttpResponse {
    tracing::error!("{}: {}", context, err);
    error_response(actix_web::http::StatusCode::BAD_GATEWAY, context, err.to_string())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        ai_enabled: state.ai.is_some(),
        cached_scores: state.score_cache.as_ref().map(|c| c.stats().entries),
    })
}

/// Local compatibility of one pair with its factor breakdown
///
/// POST /api/v1/compatibility
async fn compatibility(req: web::Json<CompatibilityRequest>) -> impl Responder {
    let user = normalize(&req.user);
    let candidate = normalize(&req.candidate);

    let factors = score_breakdown(&user, &candidate);
    let score = aggregate(&factors);

    tracing::debug!("Compatibility {:?} -> {:?}: {:.2}", user.id, candidate.id, score);

    HttpResponse::Ok().json(CompatibilityResponse {
        score,
        factors: factors.to_vec(),
    })
}

/// Rank a candidate pool by local score
///
/// POST /api/v1/matches/rank
///
/// Request body:
/// ```json
/// {
///   "user": { "age": 28, "hobbies": ["music"] },
///   "candidates": [{ "id": "c1", "age": 27 }],
///   "limit": 20
/// }
/// ```
async fn rank_matches(
    state: web::Data<AppState>,
    req: web::Json<RankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }
    if req.candidates.len() > state.matching.max_candidates {
        return too_many_candidates(req.candidates.len(), state.matching.max_candidates);
    }

    let limit = req
        .limit
        .unwrap_or(state.matching.default_limit)
        .min(state.matching.max_limit) as usize;

    let user = normalize(&req.user);
    let candidates: Vec<NormalizedProfile> = req.candidates.iter().map(normalize).collect();

    let matches = state.matcher.rank_candidates(&user, &candidates, limit);

    tracing::info!(
        "Ranked {} candidates for {:?}, returning {}",
        candidates.len(),
        user.id,
        matches.len()
    );

    HttpResponse::Ok().json(RankResponse {
        matches,
        total_candidates: candidates.len(),
    })
}

fn too_many_candidates(given: usize, max: usize) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "Too many candidates",
        format!("{} candidates given, at most {} allowed", given, max),
    )
}

/// Pick the blind match for a user
///
/// POST /api/v1/blind/select
///
/// Request body:
/// ```json
/// {
///   "user": { "id": "u1", "age": 28 },
///   "candidates": [{ "id": "c1", "age": 27 }, { "id": "c2", "age": 35 }]
/// }
/// ```
///
/// An empty pool, or one where nobody scores above zero, is not an error:
/// the response carries a null `matchedProfileId`.
async fn select_blind_match(
    state: web::Data<AppState>,
    req: web::Json<BlindSelectRequest>,
) -> impl Responder {
    if req.candidates.len() > state.matching.max_candidates {
        return too_many_candidates(req.candidates.len(), state.matching.max_candidates);
    }

    let user = normalize(&req.user);
    let candidates: Vec<NormalizedProfile> = req.candidates.iter().map(normalize).collect();

    let response = match state.matcher.select_best_match(&user, &candidates).await {
        Some(best) => BlindSelectResponse {
            result: best.to_result(),
            candidate_index: Some(best.index),
        },
        None => BlindSelectResponse {
            result: CompatibilityResult::no_match(),
            candidate_index: None,
        },
    };

    tracing::info!(
        "Blind match for {:?}: {:?} (score {:.2}, from {} candidates)",
        user.id,
        response.result.matched_profile_id,
        response.result.score,
        candidates.len()
    );

    HttpResponse::Ok().json(response)
}

/// Accept a blind-match message
///
/// POST /api/v1/blind/message
///
/// The message is checked against the content filter before it is accepted.
/// When both profiles are supplied an ice-breaker suggestion is attached; a
/// failed suggestion is logged and left out. A review of the message runs
/// in the background after the response is built.
async fn send_blind_message(
    state: web::Data<AppState>,
    req: web::Json<BlindMessageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    if !is_safe(&req.message) {
        return error_response(
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "Inappropriate content",
            "The message was rejected by the content filter".to_string(),
        );
    }

    let ice_breaker = match (&state.ai, &req.user, &req.partner) {
        (Some(ai), Some(user), Some(partner)) => {
            match ai.ice_breaker(&normalize(user), &normalize(partner)).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!("Failed to generate ice-breaker for match {}: {}", req.match_id, e);
                    None
                }
            }
        }
        _ => None,
    };

    let response = BlindMessageResponse {
        message_id: uuid::Uuid::new_v4().to_string(),
        match_id: req.match_id.clone(),
        message: req.message.clone(),
        timestamp: chrono::Utc::now(),
        ice_breaker,
    };

    spawn_best_effort(
        "message-review",
        review_message(req.match_id.clone(), req.message.clone(), state.ai.clone()),
    );

    HttpResponse::Ok().json(response)
}

/// Suggest a date for two profiles
///
/// POST /api/v1/blind/date-suggestion
async fn date_suggestion(
    state: web::Data<AppState>,
    req: web::Json<PairRequest>,
) -> impl Responder {
    let Some(ai) = &state.ai else {
        return ai_disabled();
    };

    match ai.date_suggestion(&normalize(&req.user), &normalize(&req.partner)).await {
        Ok(suggestion) => HttpResponse::Ok().json(suggestion),
        Err(e) => ai_failed("Failed to generate date suggestion", e),
    }
}

/// Analyse a conversation
///
/// POST /api/v1/chat/analyze
async fn analyze_chat(
    state: web::Data<AppState>,
    req: web::Json<ChatAnalysisRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }
    let Some(ai) = &state.ai else {
        return ai_disabled();
    };

    match ai.chat_analysis(&req.messages).await {
        Ok(analysis) => HttpResponse::Ok().json(analysis),
        Err(e) => ai_failed("Failed to analyse conversation", e),
    }
}

/// Content filter check
///
/// POST /api/v1/safety/check
async fn safety_check(req: web::Json<SafetyCheckRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    HttpResponse::Ok().json(SafetyCheckResponse {
        safe: is_safe(&req.text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn test_app_state() -> AppState {
        AppState::local_only(MatchingSettings::default())
    }

    macro_rules! init_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_app_state()))
                    .configure(crate::routes::configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = init_app!();
        let req = test::TestRequest::get().uri("/api/v1/health").to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["aiEnabled"], false);
    }

    #[actix_web::test]
    async fn test_compatibility_endpoint() {
        let app = init_app!();
        let profile = json!({ "age": 30, "height": 170, "seriousness": 5 });
        let req = test::TestRequest::post()
            .uri("/api/v1/compatibility")
            .set_json(json!({ "user": profile, "candidate": profile }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["score"], 50.0);
        assert_eq!(body["factors"].as_array().unwrap().len(), 6);
        assert_eq!(body["factors"][0]["factor"], "age");
    }

    #[actix_web::test]
    async fn test_blind_select_picks_best() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/blind/select")
            .set_json(json!({
                "user": { "id": "u", "age": 30, "seriousness": 5 },
                "candidates": [
                    { "id": "older", "age": 50, "seriousness": 5 },
                    { "id": "peer", "age": 31, "seriousness": 6 }
                ]
            }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["matchedProfileId"], "peer");
        assert_eq!(body["candidateIndex"], 1);
        assert_eq!(body["source"], "local");
    }

    #[actix_web::test]
    async fn test_blind_select_empty_pool() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/blind/select")
            .set_json(json!({ "user": { "age": 30 }, "candidates": [] }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert!(body["matchedProfileId"].is_null());
        assert!(body["candidateIndex"].is_null());
        assert_eq!(body["score"], 0.0);
    }

    #[actix_web::test]
    async fn test_rank_requires_candidates() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/rank")
            .set_json(json!({ "user": { "age": 30 }, "candidates": [] }))
            .to_request();

        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unsafe_message_is_rejected() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/blind/message")
            .set_json(json!({ "matchId": "m1", "userId": "u1", "message": "you idiot" }))
            .to_request();

        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_message_accepted_without_ai() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/blind/message")
            .set_json(json!({ "match_id": "m1", "user_id": "u1", "message": "Hi there!" }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["matchId"], "m1");
        assert!(body["iceBreaker"].is_null());
        assert!(body["messageId"].as_str().is_some());
    }

    #[actix_web::test]
    async fn test_date_suggestion_without_ai() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/blind/date-suggestion")
            .set_json(json!({ "user": {}, "partner": {} }))
            .to_request();

        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_safety_check() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/safety/check")
            .set_json(json!({ "text": "free money!!" }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["safe"], false);
    }
}
