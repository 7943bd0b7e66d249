use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use edualign_core::finance::{
    budget_tracker, estimate_semester_cost, find_alternatives, graduation_plan,
    BudgetTrackerRequest, CostEstimate, PlanRequest,
};
use edualign_core::predictions::predict;
use edualign_core::{College, CollegePrediction, ExperienceDimension, StudentProfile};
use edualign_storage::HistoryEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{json_error, query_error, ApiError};
use crate::state::AppState;

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const MAX_SEARCH_LIMIT: usize = 500;
pub const DEFAULT_ALTERNATIVES_LIMIT: usize = 10;
pub const MAX_PREDICTION_IDS: usize = 20;

type State = web::Data<Arc<AppState>>;

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct MatchRequest {
    preferences: BTreeMap<String, f64>,
    #[serde(default)]
    top_n: Option<usize>,
    #[serde(default)]
    profile: Option<StudentProfile>,
}

#[derive(Serialize)]
struct MatchResponse<'a> {
    matches: &'a [edualign_core::MatchResult],
    used_fallback: bool,
}

#[derive(Deserialize)]
struct SuggestRequest {
    profile: StudentProfile,
    #[serde(default)]
    preferences: BTreeMap<String, f64>,
}

#[derive(Serialize)]
struct DimensionInfo {
    key: ExperienceDimension,
    label: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
    state: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct FinancialPlanRequest {
    institution_id: u32,
    #[serde(flatten)]
    plan: PlanRequest,
}

#[derive(Deserialize)]
struct AlternativesRequest {
    budget_per_semester: f64,
    #[serde(default)]
    state: Option<String>,
    #[serde(default = "default_true")]
    in_state: bool,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct PredictionsRequest {
    #[serde(default)]
    profile: StudentProfile,
    #[serde(alias = "unitids")]
    institution_ids: Vec<u32>,
}

#[derive(Serialize)]
struct PredictionView<'a> {
    #[serde(flatten)]
    prediction: &'a CollegePrediction,
    narrative: &'a str,
}

#[derive(Serialize)]
struct PredictionsResponse<'a> {
    predictions: Vec<PredictionView<'a>>,
    unknown_ids: Vec<u32>,
    suggested_sliders: BTreeMap<ExperienceDimension, u8>,
    used_fallback: bool,
}

#[derive(Deserialize)]
struct CompareRequest {
    institution_ids: Vec<u32>,
    #[serde(default = "default_true")]
    in_state: bool,
    #[serde(default = "default_true")]
    on_campus: bool,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every route; the caller provides `web::Data<Arc<AppState>>`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/health", web::get().to(health))
        .route("/api/dimensions", web::get().to(dimensions))
        .route("/api/match", web::post().to(match_colleges))
        .route("/api/suggest-sliders", web::post().to(suggest_sliders))
        .route("/api/predictions", web::post().to(predictions))
        .route("/api/colleges", web::get().to(search_colleges))
        .route("/api/colleges/{id}", web::get().to(get_college))
        .route("/api/financial-plan", web::post().to(financial_plan))
        .route("/api/alternatives", web::post().to(alternatives))
        .route("/api/budget-tracker", web::post().to(track_budget))
        .route("/api/compare", web::post().to(compare))
        .route("/api/history/summary", web::get().to(history_summary));
}

async fn health(state: State) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "colleges": state.catalog.len(),
        "candidates": state.catalog.candidate_count(),
        "generation_enabled": state.matcher.has_generator(),
    })))
}

async fn dimensions() -> ActixResult<HttpResponse> {
    let dims: Vec<DimensionInfo> = ExperienceDimension::ALL
        .into_iter()
        .map(|key| DimensionInfo {
            key,
            label: key.label(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(dims))
}

async fn match_colleges(
    state: State,
    req: web::Json<MatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let prefs = state.vectorizer.validate(&req.preferences)?;
    let top_n = state
        .matcher
        .check_top_n(req.top_n.unwrap_or(state.matcher.config().default_top_n))?;

    let outcome = state
        .matcher
        .match_colleges(&prefs, req.profile.as_ref(), state.catalog.candidates(), top_n)
        .await;

    if state.history.is_some() {
        let ids = outcome.results().iter().map(|r| r.institution_id).collect();
        let entry = HistoryEntry::new(&prefs, top_n, outcome.used_fallback(), ids);
        let shared = Arc::clone(state.get_ref());
        let written = web::block(move || {
            if let Some(history) = &shared.history {
                history.record(&entry);
            }
        })
        .await;
        if let Err(e) = written {
            tracing::warn!(error = %e, "Match history writer unavailable");
        }
    }

    tracing::info!(
        top_n,
        returned = outcome.results().len(),
        used_fallback = outcome.used_fallback(),
        "Served match request"
    );

    Ok(HttpResponse::Ok().json(MatchResponse {
        matches: outcome.results(),
        used_fallback: outcome.used_fallback(),
    }))
}

async fn suggest_sliders(
    state: State,
    req: web::Json<SuggestRequest>,
) -> Result<HttpResponse, ApiError> {
    let prefs = state
        .vectorizer
        .vectorize(&req.preferences, Some(&req.profile))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "suggested_sliders": prefs.to_sliders()
    })))
}

async fn predictions(
    state: State,
    req: web::Json<PredictionsRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let count = req.institution_ids.len();
    if count == 0 || count > MAX_PREDICTION_IDS {
        return Err(ApiError::BadRequest(format!(
            "institution_ids must list between 1 and {MAX_PREDICTION_IDS} colleges, got {count}"
        )));
    }

    let mut unknown_ids = Vec::new();
    let mut found = Vec::with_capacity(count);
    for id in req.institution_ids {
        match state.catalog.get(id) {
            Some(college) => found.push(predict(&req.profile, college, state.catalog.earnings())),
            None => unknown_ids.push(id),
        }
    }

    let narratives = state.matcher.narrate(&req.profile, &found).await;
    tracing::info!(
        requested = count,
        predicted = found.len(),
        used_fallback = narratives.used_fallback,
        "Served prediction request"
    );

    Ok(HttpResponse::Ok().json(PredictionsResponse {
        predictions: found
            .iter()
            .zip(&narratives.texts)
            .map(|(prediction, narrative)| PredictionView {
                prediction,
                narrative,
            })
            .collect(),
        unknown_ids,
        suggested_sliders: state.vectorizer.suggest(&req.profile).to_sliders(),
        used_fallback: narratives.used_fallback,
    }))
}

async fn search_colleges(
    state: State,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    if limit == 0 || limit > MAX_SEARCH_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}, got {limit}"
        )));
    }

    let hits = state
        .catalog
        .search(query.search.as_deref(), query.state.as_deref(), limit);
    let colleges: Vec<&College> = hits.iter().map(|c| c.as_ref()).collect();
    Ok(HttpResponse::Ok().json(colleges))
}

async fn get_college(state: State, path: web::Path<u32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let college = state
        .catalog
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("College not found: {id}")))?;
    Ok(HttpResponse::Ok().json(college.as_ref()))
}

async fn financial_plan(
    state: State,
    req: web::Json<FinancialPlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let college = state
        .catalog
        .get(req.institution_id)
        .ok_or_else(|| ApiError::NotFound(format!("College not found: {}", req.institution_id)))?;
    let plan = graduation_plan(college, &req.plan)?;
    Ok(HttpResponse::Ok().json(plan))
}

async fn alternatives(
    state: State,
    req: web::Json<AlternativesRequest>,
) -> Result<HttpResponse, ApiError> {
    let limit = req.limit.unwrap_or(DEFAULT_ALTERNATIVES_LIMIT).min(MAX_SEARCH_LIMIT);
    let found = find_alternatives(
        state.catalog.all().iter().map(|c| c.as_ref()),
        req.budget_per_semester,
        req.state.as_deref(),
        req.in_state,
        limit,
    )?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "alternatives": found })))
}

async fn track_budget(req: web::Json<BudgetTrackerRequest>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(budget_tracker(&req)?))
}

async fn compare(state: State, req: web::Json<CompareRequest>) -> Result<HttpResponse, ApiError> {
    let estimates: Vec<CostEstimate> = req
        .institution_ids
        .iter()
        .filter_map(|&id| state.catalog.get(id))
        .map(|c| estimate_semester_cost(c, req.in_state, req.on_campus))
        .collect();
    Ok(HttpResponse::Ok().json(serde_json::json!({ "colleges": estimates })))
}

async fn history_summary(state: State) -> Result<HttpResponse, ApiError> {
    if state.history.is_none() {
        return Err(ApiError::NotFound("Match history is disabled".to_string()));
    }

    // the summary rereads the whole file, keep it off the worker thread
    let shared = Arc::clone(state.get_ref());
    let summary = web::block(move || match &shared.history {
        Some(history) => history.summary().map_err(|e| {
            tracing::error!(error = %e, "Failed to read match history");
            ApiError::Internal(format!("Failed to read match history: {e}"))
        }),
        None => Err(ApiError::NotFound("Match history is disabled".to_string())),
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Match history reader unavailable: {e}")))??;
    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use edualign_core::{CollegeRecord, ScoreScale, Vectorizer};
    use edualign_matching::{GenerationError, Generator, Matcher, MatcherConfig, Prompt};
    use edualign_storage::{CollegeCatalog, MatchHistory};
    use futures_util::future::BoxFuture;
    use serde_json::{json, Value};

    struct DownGenerator;

    impl Generator for DownGenerator {
        fn name(&self) -> &str {
            "down"
        }

        fn generate<'a>(&'a self, _prompt: &'a Prompt) -> BoxFuture<'a, Result<String, GenerationError>> {
            Box::pin(async { Err(GenerationError::RateLimited) })
        }
    }

    struct ScriptedGenerator(String);

    impl Generator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate<'a>(&'a self, _prompt: &'a Prompt) -> BoxFuture<'a, Result<String, GenerationError>> {
            Box::pin(async move { Ok(self.0.clone()) })
        }
    }

    fn experience(values: [f64; 8]) -> Value {
        let map: serde_json::Map<String, Value> = ExperienceDimension::ALL
            .iter()
            .zip(values)
            .map(|(d, v)| (d.as_str().to_string(), json!(v)))
            .collect();
        Value::Object(map)
    }

    fn catalog() -> CollegeCatalog {
        let records: Vec<CollegeRecord> = serde_json::from_value(json!([
            {
                "id": 1, "name": "Alpha University", "city": "Atlanta", "state": "GA",
                "tuition_in_state": 10000.0, "tuition_out_of_state": 30000.0,
                "room_board_on_campus": 12000.0, "room_board_off_campus": 9000.0,
                "books_supplies": 1000.0, "other_expenses": 2000.0,
                "ADM_RATE": 0.2, "SAT_AVG": 1400.0, "MD_EARN_WNE_P10": 70000.0, "C150_4": 0.85,
                "experience": experience([0.9, 0.2, 0.5, 0.8, 0.5, 0.5, 0.5, 0.5])
            },
            {
                "id": 2, "name": "Beta College", "city": "Columbus", "state": "OH",
                "tuition_in_state": 4000.0, "room_board_off_campus": 6000.0,
                "median_earnings_10yr": 45000.0,
                "experience": experience([0.3, 0.9, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5])
            },
            { "id": 3, "name": "Gamma Institute", "state": "GA" }
        ]))
        .unwrap();
        CollegeCatalog::from_records(records, ScoreScale::Unit)
    }

    fn state_with(matcher: Matcher) -> web::Data<Arc<AppState>> {
        web::Data::new(Arc::new(AppState::new(catalog(), Vectorizer::default(), matcher)))
    }

    fn preferences() -> Value {
        json!({
            "academic_intensity": 8, "social_life": 3, "inclusivity": 5, "career_support": 5,
            "collaboration_vs_competition": 5, "mental_health_culture": 5,
            "campus_safety": 5, "overall_satisfaction": 5
        })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn test_health_and_dimensions() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["colleges"], 3);
        assert_eq!(body["candidates"], 2);
        assert_eq!(body["generation_enabled"], false);

        let req = test::TestRequest::get().uri("/api/dimensions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 8);
        assert_eq!(body[0]["key"], "academic_intensity");
        assert_eq!(body[7]["label"], "overall satisfaction");
    }

    #[actix_web::test]
    async fn test_match_uses_fallback_when_generation_fails() {
        let matcher = Matcher::with_generator(MatcherConfig::default(), Arc::new(DownGenerator));
        let app = app!(state_with(matcher));

        let req = test::TestRequest::post()
            .uri("/api/match")
            .set_json(json!({ "preferences": preferences(), "top_n": 2 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["used_fallback"], true);
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["institution_id"], 1);
        assert!(matches[0]["explanation"]
            .as_str()
            .unwrap()
            .starts_with("Alpha University has a"));
    }

    #[actix_web::test]
    async fn test_match_rejects_invalid_input() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));

        let mut missing = preferences();
        missing.as_object_mut().unwrap().remove("campus_safety");
        let mut out_of_range = preferences();
        out_of_range["social_life"] = json!(11);
        let mut unknown = preferences();
        unknown["parking"] = json!(5);

        for body in [
            json!({ "preferences": missing }),
            json!({ "preferences": out_of_range }),
            json!({ "preferences": unknown }),
            json!({ "preferences": preferences(), "top_n": 0 }),
            json!({ "preferences": preferences(), "top_n": 51 }),
            json!({ "top_n": 4 }),
        ] {
            let req = test::TestRequest::post().uri("/api/match").set_json(&body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "accepted {body}");
            let err: Value = test::read_body_json(resp).await;
            assert!(err["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_suggest_sliders_keeps_supplied_values() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));
        let req = test::TestRequest::post()
            .uri("/api/suggest-sliders")
            .set_json(json!({
                "profile": { "major": "Nursing", "gpa": 3.8 },
                "preferences": { "social_life": 9 }
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["suggested_sliders"]["social_life"], 9);
        assert_eq!(body["suggested_sliders"]["campus_safety"], 8);
    }

    #[actix_web::test]
    async fn test_predictions_without_generation_use_templates() {
        let matcher = Matcher::with_generator(MatcherConfig::default(), Arc::new(DownGenerator));
        let app = app!(state_with(matcher));

        let req = test::TestRequest::post()
            .uri("/api/predictions")
            .set_json(json!({
                "profile": { "sat": 1500, "major": "Nursing" },
                "institution_ids": [1, 99, 3]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["used_fallback"], true);
        assert_eq!(body["unknown_ids"], json!([99]));
        assert_eq!(body["suggested_sliders"].as_object().unwrap().len(), 8);

        let predictions = body["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 2);
        // sat 100 over average: 0.2 * 1.2
        let alpha = &predictions[0];
        assert_eq!(alpha["institution_id"], 1);
        assert_eq!(alpha["admission"]["chance"], 0.24);
        assert_eq!(alpha["admission"]["category"], "Reach");
        assert_eq!(alpha["earnings"]["percentile"], 50);
        assert_eq!(alpha["graduation"]["probability"], 0.85);
        assert!(alpha["narrative"]
            .as_str()
            .unwrap()
            .starts_with("Alpha University is a reach school for you with an estimated 24% admission chance."));

        let gamma = &predictions[1];
        assert_eq!(gamma["admission"]["category"], "Unknown");
        assert_eq!(gamma["narrative"], "Insufficient data for a prediction.");
    }

    #[actix_web::test]
    async fn test_predictions_with_generated_narratives() {
        let reply = json!({
            "narratives": [{ "college_name": "Alpha University", "narrative": "A reach worth trying." }]
        });
        let matcher = Matcher::with_generator(
            MatcherConfig::default(),
            Arc::new(ScriptedGenerator(reply.to_string())),
        );
        let app = app!(state_with(matcher));

        let req = test::TestRequest::post()
            .uri("/api/predictions")
            .set_json(json!({ "unitids": [1] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["used_fallback"], false);
        assert_eq!(body["predictions"][0]["narrative"], "A reach worth trying.");
        assert_eq!(body["predictions"][0]["admission"]["chance"], 0.2);
    }

    #[actix_web::test]
    async fn test_predictions_reject_bad_id_lists() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));
        let too_many: Vec<u32> = (1..=21).collect();

        for body in [
            json!({ "institution_ids": [] }),
            json!({ "institution_ids": too_many }),
            json!({ "profile": { "gpa": 3.5 } }),
        ] {
            let req = test::TestRequest::post().uri("/api/predictions").set_json(&body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "accepted {body}");
        }
    }

    #[actix_web::test]
    async fn test_college_lookup_and_search() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));

        let req = test::TestRequest::get().uri("/api/colleges/2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Beta College");

        let req = test::TestRequest::get().uri("/api/colleges/99").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/colleges?state=ga").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<u64> = body.as_array().unwrap().iter().map(|c| c["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 3]);

        let req = test::TestRequest::get().uri("/api/colleges?limit=0").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_financial_endpoints() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));

        let req = test::TestRequest::post()
            .uri("/api/financial-plan")
            .set_json(json!({ "institution_id": 1, "budget_per_semester": 15000.0, "total_savings": 50000.0 }))
            .to_request();
        let plan: Value = test::call_and_read_body_json(&app, req).await;
        // (10000 + 12000 + 1000 + 2000) / 2
        assert_eq!(plan["semester_total"], 12500.0);
        assert_eq!(plan["total_cost"], 100000.0);
        assert_eq!(plan["affordable_semesters"], 4);

        let req = test::TestRequest::post()
            .uri("/api/financial-plan")
            .set_json(json!({ "institution_id": 3, "budget_per_semester": 1.0, "total_savings": 1.0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/alternatives")
            .set_json(json!({ "budget_per_semester": 7000.0 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["alternatives"][0]["institution_id"], 2);
        assert_eq!(body["alternatives"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri("/api/budget-tracker")
            .set_json(json!({ "total_cost": 80000.0, "semesters_completed": 2, "total_semesters": 8, "amount_spent": 20000.0 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["on_track"], true);

        let req = test::TestRequest::post()
            .uri("/api/compare")
            .set_json(json!({ "institution_ids": [2, 99, 1], "in_state": false }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let colleges = body["colleges"].as_array().unwrap();
        assert_eq!(colleges.len(), 2);
        assert_eq!(colleges[0]["institution_id"], 2);
        assert_eq!(colleges[1]["tuition"], 30000.0);
    }

    #[actix_web::test]
    async fn test_history_summary() {
        let app = app!(state_with(Matcher::new(MatcherConfig::default())));
        let req = test::TestRequest::get().uri("/api/history/summary").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let dir = tempfile::tempdir().unwrap();
        let history = MatchHistory::open(dir.path().join("matches.jsonl")).unwrap();
        let state = AppState::new(catalog(), Vectorizer::default(), Matcher::new(MatcherConfig::default()))
            .with_history(history);
        let app = app!(web::Data::new(Arc::new(state)));

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/match")
                .set_json(json!({ "preferences": preferences(), "top_n": 1 }))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::get().uri("/api/history/summary").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_matches"], 2);
        assert_eq!(body["fallback_count"], 2);
        assert_eq!(body["top_institutions"][0]["institution_id"], 1);
        assert_eq!(body["top_institutions"][0]["count"], 2);
    }

    #[actix_web::test]
    async fn test_history_summary_over_existing_file_serves_concurrent_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.jsonl");
        {
            let history = MatchHistory::open(&path).unwrap();
            let prefs = edualign_core::PreferenceVector::default();
            for i in 0..50u32 {
                history
                    .append(&HistoryEntry::new(&prefs, 2, i % 2 == 0, vec![1 + i % 2]))
                    .unwrap();
            }
        }

        let state = AppState::new(catalog(), Vectorizer::default(), Matcher::new(MatcherConfig::default()))
            .with_history(MatchHistory::open(&path).unwrap());
        let app = app!(web::Data::new(Arc::new(state)));

        let reads = (0..4).map(|_| {
            let req = test::TestRequest::get().uri("/api/history/summary").to_request();
            test::call_and_read_body_json::<_, _, Value>(&app, req)
        });
        for body in futures_util::future::join_all(reads).await {
            assert_eq!(body["total_matches"], 50);
            assert_eq!(body["fallback_count"], 25);
        }
    }
}
