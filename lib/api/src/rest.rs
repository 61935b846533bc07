use crate::activity::UserActivity;
use crate::error::ApiError;
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use futures_util::future::join_all;
use kindred_core::{EngineHandle, ProductRecord};
use kindred_explain::{Explainer, FallbackExplainer, FALLBACK_EXPLANATION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_K: usize = 50;
/// Explainer calls allowed per request; later results get the fallback text.
pub const DEFAULT_EXPLAIN_LIMIT: usize = 3;
const DEFAULT_SIMILAR_K: usize = 5;
const DEFAULT_RECOMMENDATIONS_K: usize = 3;

/// Everything a request handler needs. Built once at startup and shared by
/// reference with every worker.
pub struct AppState {
    pub engine: EngineHandle,
    pub explainer: FallbackExplainer<dyn Explainer>,
    pub activity: UserActivity,
    pub max_k: usize,
    pub explain_limit: usize,
}

impl AppState {
    pub fn new(engine: EngineHandle, explainer: Box<dyn Explainer>) -> Self {
        Self {
            engine,
            explainer: FallbackExplainer::new(explainer),
            activity: UserActivity::default(),
            max_k: DEFAULT_MAX_K,
            explain_limit: DEFAULT_EXPLAIN_LIMIT,
        }
    }

    pub fn with_activity(mut self, activity: UserActivity) -> Self {
        self.activity = activity;
        self
    }

    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = max_k;
        self
    }

    pub fn with_explain_limit(mut self, explain_limit: usize) -> Self {
        self.explain_limit = explain_limit;
        self
    }

    fn clamp_k(&self, requested: Option<usize>, default: usize) -> usize {
        requested.unwrap_or(default).min(self.max_k)
    }
}

#[derive(Deserialize)]
struct KQuery {
    k: Option<usize>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    products: usize,
    vocabulary: usize,
}

#[derive(Serialize)]
struct SimilarProduct {
    product_id: String,
    score: f32,
}

#[derive(Serialize)]
struct SimilarResponse {
    product_id: String,
    similar: Vec<SimilarProduct>,
}

#[derive(Serialize)]
struct ExplainedRecommendation {
    recommended_product: ProductRecord,
    score: f32,
    explanation: String,
}

#[derive(Serialize)]
struct RecommendationsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    source_product: ProductRecord,
    recommendations: Vec<ExplainedRecommendation>,
}

pub struct RestApi;

impl RestApi {
    /// Register all routes on an app. Shared by the server and tests.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/health", web::get().to(health))
            .route("/products/{id}", web::get().to(get_product))
            .route("/products/{id}/similar", web::get().to(similar_products))
            .route(
                "/products/{id}/recommendations",
                web::get().to(product_recommendations),
            )
            .route("/recommendations/{user_id}", web::get().to(user_recommendations));
    }

    pub async fn start(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
        info!("Starting HTTP server on port {}", port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(RestApi::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

async fn health(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    let engine = state.engine.current();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        products: engine.len(),
        vocabulary: engine.vocabulary_size(),
    }))
}

async fn get_product(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let engine = state.engine.current();
    match engine.product(&id) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(ApiError::ProductNotFound(id)),
    }
}

async fn similar_products(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    query: web::Query<KQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let k = state.clamp_k(query.k, DEFAULT_SIMILAR_K);
    let engine = state.engine.current();

    let similar = engine
        .recommend_scored(&id, k)?
        .into_iter()
        .map(|rec| SimilarProduct {
            product_id: rec.id,
            score: rec.score,
        })
        .collect();

    Ok(HttpResponse::Ok().json(SimilarResponse {
        product_id: id,
        similar,
    }))
}

async fn product_recommendations(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    query: web::Query<KQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let k = state.clamp_k(query.k, DEFAULT_RECOMMENDATIONS_K);
    let body = explained_recommendations(&state, &id, k, None).await?;
    Ok(HttpResponse::Ok().json(body))
}

async fn user_recommendations(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    query: web::Query<KQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    if !state.activity.contains_user(&user_id) {
        return Err(ApiError::UserNotFound(user_id));
    }
    let product_id = state
        .activity
        .last_viewed(&user_id)
        .ok_or_else(|| ApiError::NoActivity(user_id.clone()))?
        .to_string();
    debug!("User {} last viewed {}", user_id, product_id);

    let k = state.clamp_k(query.k, DEFAULT_RECOMMENDATIONS_K);
    let body = explained_recommendations(&state, &product_id, k, Some(user_id)).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Rank first, then decorate each result with an explanation. The ranking
/// is fixed before any explainer runs, and explainer failures only change
/// the explanation text. Only the first `explain_limit` results reach the
/// explainer.
async fn explained_recommendations(
    state: &AppState,
    product_id: &str,
    k: usize,
    user_id: Option<String>,
) -> Result<RecommendationsResponse, ApiError> {
    let engine = state.engine.current();
    let ranked = engine.recommend_scored(product_id, k)?;
    let source = engine
        .product(product_id)
        .cloned()
        .ok_or_else(|| ApiError::ProductNotFound(product_id.to_string()))?;

    let records: Vec<(ProductRecord, f32)> = ranked
        .into_iter()
        .filter_map(|rec| engine.product(&rec.id).cloned().map(|r| (r, rec.score)))
        .collect();

    let explained = records.len().min(state.explain_limit);
    let mut explanations = join_all(
        records[..explained]
            .iter()
            .map(|(record, _)| state.explainer.explain_or_fallback(&source, record)),
    )
    .await;
    explanations.resize(records.len(), FALLBACK_EXPLANATION.to_string());

    let recommendations = records
        .into_iter()
        .zip(explanations)
        .map(|((recommended_product, score), explanation)| ExplainedRecommendation {
            recommended_product,
            score,
            explanation,
        })
        .collect();

    Ok(RecommendationsResponse {
        user_id,
        source_product: source,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use async_trait::async_trait;
    use kindred_core::{Catalog, Engine};
    use kindred_explain::{DisabledExplainer, ExplainError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NameExplainer;

    #[async_trait]
    impl Explainer for NameExplainer {
        async fn explain(
            &self,
            source: &ProductRecord,
            recommended: &ProductRecord,
        ) -> Result<String, ExplainError> {
            Ok(format!("Because you viewed {}: {}", source.name, recommended.name))
        }
    }

    fn state(explainer: Box<dyn Explainer>) -> Arc<AppState> {
        let catalog = Catalog::from_records(vec![
            ProductRecord::new("A", "red cotton shirt", "Apparel", ""),
            ProductRecord::new("B", "blue cotton shirt", "Apparel", ""),
            ProductRecord::new("C", "wireless bluetooth speaker", "Audio", ""),
        ])
        .unwrap();
        let mut activity = UserActivity::new();
        activity.record_view("user123", "C");
        activity.record_view("user123", "A");

        Arc::new(
            AppState::new(EngineHandle::new(Engine::build(catalog).unwrap()), explainer)
                .with_activity(activity)
                .with_max_k(2),
        )
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["products"], 3);
    }

    #[actix_web::test]
    async fn test_get_product() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get().uri("/products/B").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["product_id"], "B");
        assert_eq!(body["name"], "blue cotton shirt");

        let req = test::TestRequest::get().uri("/products/Z").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_similar() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get()
            .uri("/products/A/similar?k=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["product_id"], "A");
        assert_eq!(body["similar"].as_array().unwrap().len(), 1);
        assert_eq!(body["similar"][0]["product_id"], "B");
    }

    #[actix_web::test]
    async fn test_k_capped_by_max_k() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get()
            .uri("/products/A/similar?k=40")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["similar"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_unknown_product_is_404() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get()
            .uri("/products/nonexistent/similar")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Product not found: nonexistent");
    }

    #[actix_web::test]
    async fn test_recommendations_with_explanations() {
        let app = app!(state(Box::new(NameExplainer)));
        let req = test::TestRequest::get()
            .uri("/products/A/recommendations?k=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["source_product"]["product_id"], "A");
        assert!(body.get("user_id").is_none());
        let recs = body["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["recommended_product"]["product_id"], "B");
        assert_eq!(
            recs[0]["explanation"],
            "Because you viewed red cotton shirt: blue cotton shirt"
        );
    }

    #[actix_web::test]
    async fn test_explainer_failure_keeps_ranking() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get()
            .uri("/products/A/recommendations")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let recs = body["recommendations"].as_array().unwrap();
        let ids: Vec<&str> = recs
            .iter()
            .map(|r| r["recommended_product"]["product_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["B", "C"]);
        assert!(recs.iter().all(|r| r["explanation"] == FALLBACK_EXPLANATION));
    }

    #[actix_web::test]
    async fn test_user_recommendations() {
        let app = app!(state(Box::new(DisabledExplainer)));
        let req = test::TestRequest::get()
            .uri("/recommendations/user123?k=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user_id"], "user123");
        assert_eq!(body["source_product"]["product_id"], "A");
        assert_eq!(
            body["recommendations"][0]["recommended_product"]["product_id"],
            "B"
        );

        let req = test::TestRequest::get()
            .uri("/recommendations/nobody")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    struct CountingExplainer {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Explainer for CountingExplainer {
        async fn explain(
            &self,
            _source: &ProductRecord,
            recommended: &ProductRecord,
        ) -> Result<String, ExplainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("explained {}", recommended.id))
        }
    }

    fn large_state(calls: Arc<AtomicUsize>, explain_limit: usize) -> Arc<AppState> {
        let records = (0..60)
            .map(|i| {
                ProductRecord::new(
                    format!("p{}", i),
                    format!("item{} shared", i % 7),
                    format!("cat{}", i % 3),
                    "",
                )
            })
            .collect();
        let engine = Engine::build(Catalog::from_records(records).unwrap()).unwrap();
        Arc::new(
            AppState::new(
                EngineHandle::new(engine),
                Box::new(CountingExplainer { calls }),
            )
            .with_explain_limit(explain_limit),
        )
    }

    #[actix_web::test]
    async fn test_explainer_calls_capped_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = large_state(calls.clone(), DEFAULT_EXPLAIN_LIMIT);
        let expected = state.engine.current().recommend("p0", DEFAULT_MAX_K).unwrap();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/products/p0/recommendations?k=1000")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(calls.load(Ordering::SeqCst), DEFAULT_EXPLAIN_LIMIT);

        let recs = body["recommendations"].as_array().unwrap();
        let ids: Vec<&str> = recs
            .iter()
            .map(|r| r["recommended_product"]["product_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, expected);

        for (i, rec) in recs.iter().enumerate() {
            if i < DEFAULT_EXPLAIN_LIMIT {
                assert_eq!(rec["explanation"], format!("explained {}", ids[i]));
            } else {
                assert_eq!(rec["explanation"], FALLBACK_EXPLANATION);
            }
        }
    }

    #[actix_web::test]
    async fn test_zero_explain_limit_skips_explainer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app!(large_state(calls.clone(), 0));

        let req = test::TestRequest::get()
            .uri("/products/p1/recommendations?k=4")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let recs = body["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 4);
        assert!(recs.iter().all(|r| r["explanation"] == FALLBACK_EXPLANATION));
    }
}
