use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bench_core::extract::ExtractionResult;
use bench_core::{
    CancelToken, CharacterizationJob, GateSweep, JobConfig, SchematicTemplate, SpiceCli,
    SweepPlan, TemperatureStep,
};
use bench_models::ModelRecord;

use crate::schema::JobSummary;

pub struct HttpServerConfig {
    pub bind_addr: String,
    /// Path to the external simulator executable.
    pub simulator: PathBuf,
    pub run_timeout: Duration,
}

#[derive(Clone)]
struct ApiState {
    store: Arc<Mutex<JobStore>>,
    simulator: Arc<SpiceCli>,
}

#[derive(Default)]
struct JobStore {
    jobs: Vec<StoredJob>,
}

struct StoredJob {
    model_name: String,
    outcome: Result<ExtractionResult, String>,
}

impl JobStore {
    fn add(&mut self, model_name: String, outcome: Result<ExtractionResult, String>) -> usize {
        self.jobs.push(StoredJob {
            model_name,
            outcome,
        });
        self.jobs.len() - 1
    }
}

#[derive(Debug, Deserialize)]
struct CharacterizeRequest {
    model: ModelRecordBody,
    #[serde(default)]
    reference_current: Option<f64>,
    #[serde(default)]
    gate_sweep: Option<GateSweepBody>,
    #[serde(default)]
    temperature_step: Option<TemperatureStepBody>,
    #[serde(default)]
    keep_artifacts: bool,
}

#[derive(Debug, Deserialize)]
struct ModelRecordBody {
    name: String,
    library_path: String,
    subckt_pin_order: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GateSweepBody {
    source: Option<String>,
    start: f64,
    stop: f64,
    step: f64,
}

#[derive(Debug, Deserialize)]
struct TemperatureStepBody {
    start: f64,
    stop: f64,
    incr: f64,
}

#[derive(Debug, Serialize)]
struct CharacterizeResponse {
    job_id: usize,
    model_name: String,
    status: String,
    result: Option<ExtractionResult>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    details: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

pub async fn run(config: HttpServerConfig) -> Result<(), String> {
    let state = ApiState {
        store: Arc::new(Mutex::new(JobStore::default())),
        simulator: Arc::new(SpiceCli::new(&config.simulator).with_timeout(config.run_timeout)),
    };
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|err| format!("bind {} failed: {}", config.bind_addr, err))?;
    tracing::info!(addr = %config.bind_addr, "characterization api listening");
    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))
}

/// Blocking entry point for callers without their own async runtime.
pub fn serve(config: HttpServerConfig) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime init failed: {}", err))?;
    runtime.block_on(run(config))
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/characterize", post(characterize))
        .route("/v1/jobs/{id}", get(get_job))
        .route("/v1/summary", get(get_summary))
        .with_state(state)
}

async fn characterize(
    State(state): State<ApiState>,
    Json(payload): Json<CharacterizeRequest>,
) -> impl IntoResponse {
    let record = match ModelRecord::new(
        payload.model.name.clone(),
        PathBuf::from(&payload.model.library_path),
        payload.model.subckt_pin_order.clone(),
    ) {
        Ok(record) => record,
        Err(err) => {
            return api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_MODEL",
                &err.to_string(),
                None,
            )
        }
    };

    let mut plan = SweepPlan::default();
    if let Some(reference) = payload.reference_current {
        plan.reference_current = reference;
    }
    if let Some(gate) = payload.gate_sweep {
        plan.gate = GateSweep {
            source: gate.source.unwrap_or_else(|| "V1".to_string()),
            start: gate.start,
            stop: gate.stop,
            step: gate.step,
        };
    }
    if let Some(temp) = payload.temperature_step {
        plan.temperature = Some(TemperatureStep {
            start: temp.start,
            stop: temp.stop,
            incr: temp.incr,
        });
    }

    let job = match CharacterizationJob::new(
        SchematicTemplate::vth_test(),
        record,
        plan,
        JobConfig {
            keep_artifacts: payload.keep_artifacts,
            workdir: None,
        },
    ) {
        Ok(job) => job,
        Err(err) => {
            return api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                &err.to_string(),
                None,
            )
        }
    };

    let model_name = payload.model.name;
    let simulator = state.simulator.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        job.run(simulator.as_ref(), &CancelToken::new())
            .map_err(|err| err.diagnostic())
    })
    .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(join_err) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "JOB_PANICKED",
                &join_err.to_string(),
                None,
            )
        }
    };

    let mut store = match state.store.lock() {
        Ok(guard) => guard,
        Err(_) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "job store is unavailable",
                None,
            );
        }
    };
    let job_id = store.add(model_name, outcome);
    let response = job_to_response(job_id, &store.jobs[job_id]);
    Json(response).into_response()
}

async fn get_job(State(state): State<ApiState>, Path(id): Path<usize>) -> impl IntoResponse {
    let store = match state.store.lock() {
        Ok(guard) => guard,
        Err(_) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "job store is unavailable",
                None,
            );
        }
    };
    let Some(job) = store.jobs.get(id) else {
        return api_error(StatusCode::NOT_FOUND, "JOB_NOT_FOUND", "job_id not found", None);
    };
    Json(job_to_response(id, job)).into_response()
}

async fn get_summary(State(state): State<ApiState>) -> impl IntoResponse {
    let store = match state.store.lock() {
        Ok(guard) => guard,
        Err(_) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "job store is unavailable",
                None,
            );
        }
    };
    let succeeded = store.jobs.iter().filter(|j| j.outcome.is_ok()).count();
    Json(JobSummary {
        job_count: store.jobs.len(),
        succeeded,
        failed: store.jobs.len() - succeeded,
    })
    .into_response()
}

fn job_to_response(job_id: usize, job: &StoredJob) -> CharacterizeResponse {
    match &job.outcome {
        Ok(result) => CharacterizeResponse {
            job_id,
            model_name: job.model_name.clone(),
            status: "success".to_string(),
            result: Some(result.clone()),
            message: None,
        },
        Err(message) => CharacterizeResponse {
            job_id,
            model_name: job.model_name.clone(),
            status: "error".to_string(),
            result: None,
            message: Some(message.clone()),
        },
    }
}

fn api_error(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<Vec<String>>,
) -> axum::response::Response {
    let body = ErrorResponse {
        error: ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
            details,
        },
    };
    (status, Json(body)).into_response()
}
