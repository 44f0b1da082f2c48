use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use impact_sim::error::AppError;
use impact_sim::simulation::{
    Intervention, ModelStrictness, Region, SimulationRequest, SimulationResult,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimulationResponse {
    #[serde(flatten)]
    pub(crate) result: SimulationResult,
    pub(crate) strictness: ModelStrictness,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) cached: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegionCatalogResponse {
    pub(crate) regions: Vec<Region>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InterventionCatalogResponse {
    pub(crate) interventions: Vec<Intervention>,
}

pub(crate) fn simulation_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/regions",
            axum::routing::get(region_catalog_endpoint),
        )
        .route(
            "/api/v1/catalog/interventions",
            axum::routing::get(intervention_catalog_endpoint),
        )
        .route(
            "/api/v1/simulations",
            axum::routing::post(simulation_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn region_catalog_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<RegionCatalogResponse> {
    Json(RegionCatalogResponse {
        regions: state.service.regions().regions().to_vec(),
    })
}

pub(crate) async fn intervention_catalog_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<InterventionCatalogResponse> {
    Json(InterventionCatalogResponse {
        interventions: state.service.interventions().interventions().to_vec(),
    })
}

pub(crate) async fn simulation_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, AppError> {
    let prepared = state.service.prepare(payload)?;
    let strictness = prepared.strictness;

    // Waiting on a cache slot blocks, so keep it off the async workers.
    let service = Arc::clone(&state.service);
    let cache = Arc::clone(&state.cache);
    let (result, cached) = tokio::task::spawn_blocking(move || {
        cache.get_or_compute(prepared.fingerprint(), || service.run_prepared(&prepared))
    })
    .await
    .map_err(|err| AppError::Server(axum::Error::new(err)))??;

    if cached {
        debug!(
            region = %result.region_name,
            cache_entries = state.cache.len(),
            "served cached simulation"
        );
    } else {
        info!(
            region = %result.region_name,
            interventions = result.contributions.len(),
            impact_score = result.impact_score,
            "simulation computed"
        );
    }

    Ok(Json(SimulationResponse {
        result,
        strictness,
        generated_at: Utc::now(),
        cached,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::SimulationCache;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use impact_sim::simulation::SimulationService;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn test_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            service: Arc::new(SimulationService::default()),
            cache: Arc::new(SimulationCache::new(16)),
        }
    }

    fn app(state: AppState) -> axum::Router {
        simulation_routes().layer(Extension(state))
    }

    async fn post_simulation(router: axum::Router, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/simulations")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let (status, body) = get_json(app(test_state(false)), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, body) = get_json(app(test_state(true)), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn catalog_endpoints_list_builtin_entries() {
        let state = test_state(true);

        let (status, body) = get_json(app(state.clone()), "/api/v1/catalog/regions").await;
        assert_eq!(status, StatusCode::OK);
        let regions = body["regions"].as_array().expect("regions array");
        assert_eq!(regions.len(), 6);
        assert!(regions.iter().any(|region| region["id"] == "western_europe"));

        let (status, body) = get_json(app(state), "/api/v1/catalog/interventions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interventions"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn simulation_endpoint_returns_result_and_caches_repeats() {
        let state = test_state(true);
        let request = json!({
            "region": { "id": "sub_saharan_africa" },
            "interventions": [
                { "id": "vax_expanded", "intensity": 70 },
                { "id": "vector_control", "intensity": 55 }
            ]
        });

        let (status, first) = post_simulation(app(state.clone()), request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["regionName"], "Sub-Saharan Africa");
        assert_eq!(first["data"].as_array().map(Vec::len), Some(5));
        assert_eq!(first["interventionImpact"].as_array().map(Vec::len), Some(2));
        assert_eq!(first["strictness"], "standard");
        assert_eq!(first["cached"], false);
        assert!(first["livesSaved"].as_i64().expect("lives saved") > 0);
        assert!(first.get("generatedAt").is_some());

        let (status, second) = post_simulation(app(state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], true);
        assert_eq!(second["data"], first["data"]);
        assert_eq!(second["impactScore"], first["impactScore"]);
    }

    #[tokio::test]
    async fn custom_interventions_with_new_names_are_recomputed() {
        let state = test_state(true);
        let request = |name: &str| {
            json!({
                "region": { "id": "south_asia" },
                "interventions": [
                    { "id": "x", "name": name, "category": "Medical", "intensity": 40 }
                ]
            })
        };

        let (status, first) = post_simulation(app(state.clone()), request("Mobile Clinics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["interventionImpact"][0]["name"], "Mobile Clinics");

        let (status, second) = post_simulation(app(state), request("Cash Transfers")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], false);
        assert_eq!(second["interventionImpact"][0]["name"], "Cash Transfers");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_identical_requests_compute_once() {
        let state = test_state(true);
        let request = json!({
            "region": { "id": "south_america" },
            "interventions": [ { "id": "wash_infra", "intensity": 65 } ]
        });

        let (left, right) = tokio::join!(
            post_simulation(app(state.clone()), request.clone()),
            post_simulation(app(state.clone()), request)
        );

        assert_eq!(left.0, StatusCode::OK);
        assert_eq!(right.0, StatusCode::OK);
        let computed = [&left.1, &right.1]
            .iter()
            .filter(|body| body["cached"] == false)
            .count();
        assert_eq!(computed, 1);
        assert_eq!(left.1["data"], right.1["data"]);
        assert_eq!(state.cache.len(), 1);
    }

    #[tokio::test]
    async fn simulation_endpoint_rejects_out_of_range_intensity() {
        let request = json!({
            "region": { "id": "global" },
            "interventions": [ { "id": "telehealth", "intensity": 140 } ]
        });

        let (status, body) = post_simulation(app(test_state(true)), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "invalid_input");
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("telehealth"));
    }

    #[tokio::test]
    async fn simulation_endpoint_estimates_unknown_regions() {
        let request = json!({
            "region": { "name": "Atlantis" },
            "interventions": [],
            "strictness": "conservative"
        });

        let (status, body) = post_simulation(app(test_state(true)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strictness"], "conservative");
        assert_eq!(body["livesSaved"], 0);
        assert_eq!(body["estimatedBaseline"]["population"], 50_000_000);
        assert!(body["interventionImpact"]
            .as_array()
            .expect("contributions")
            .is_empty());
    }
}
