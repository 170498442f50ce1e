use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::{probe_backend, Backend, GroupLayout, GroupingError, Grouper};
use crate::models::{
    CreateGroupingRequest, ErrorResponse, EvaluateGroupingRequest, EvaluationResponse, GroupingConfig,
    GroupingResponse, HealthResponse,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub defaults: GroupingConfig,
}

/// Configure all grouping routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/groupings", web::post().to(create_grouping))
        .route("/groupings/evaluate", web::post().to(evaluate_grouping));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    let milp_backend = match probe_backend() {
        Backend::Available(backend) => Some(backend.name().to_string()),
        Backend::Unavailable(_) => None,
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        milp_backend,
    })
}

/// Create grouping endpoint
///
/// POST /api/v1/groupings
///
/// Request body:
/// ```json
/// {
///   "participants": [{"id": "M1", "gender": "male"}],
///   "edges": [{"source": "M1", "target": "F1", "weight": 1.0}],
///   "rankings": [{"source": "F1", "targets": ["M1", "M2"]}],
///   "options": {"groupSize": 4, "solver": "auto"}
/// }
/// ```
async fn create_grouping(
    state: web::Data<AppState>,
    req: web::Json<CreateGroupingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_grouping request: {:?}", errors);
        return validation_failed(errors);
    }

    let config = match req.options.apply_to(&state.defaults) {
        Ok(config) => config,
        Err(e) => return grouping_error(&e),
    };
    let run_id = Uuid::new_v4();
    tracing::info!(
        "Grouping run {}: {} participants, {} edges, {} rankings, solver {:?}",
        run_id,
        req.participants.len(),
        req.edges.len(),
        req.rankings.len(),
        config.solver
    );

    let req = req.into_inner();
    let solved = web::block(move || -> Result<GroupingResponse, GroupingError> {
        let graph = req.build_graph(&config)?;
        let result = Grouper::new(config)?.solve(&graph)?;
        Ok(GroupingResponse::from_result(run_id, &graph, &result))
    })
    .await;

    match solved {
        Ok(Ok(response)) => {
            tracing::info!(
                "Grouping run {} finished: engine {:?}, score {:.2}",
                run_id,
                response.engine,
                response.total_score
            );
            HttpResponse::Ok().json(response)
        }
        Ok(Err(e)) => {
            tracing::warn!("Grouping run {} failed: {}", run_id, e);
            grouping_error(&e)
        }
        Err(e) => {
            tracing::error!("Grouping run {} did not complete: {}", run_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Solver task failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Evaluate a grouping supplied by the caller
///
/// POST /api/v1/groupings/evaluate
async fn evaluate_grouping(
    state: web::Data<AppState>,
    req: web::Json<EvaluateGroupingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for evaluate_grouping request: {:?}", errors);
        return validation_failed(errors);
    }

    let evaluated = req.options.apply_to(&state.defaults).and_then(|config| {
        let graph = req.build_graph(&config)?;
        let partition = req.partition(&graph)?;
        let violations = match GroupLayout::plan(&graph, &config) {
            Ok(layout) => layout.validate(&graph, &partition),
            Err(e) => vec![e.to_string()],
        };
        Ok(EvaluationResponse::new(&graph, &partition, violations))
    });

    match evaluated {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => grouping_error(&e),
    }
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Map an engine error to its HTTP response
pub fn grouping_error(err: &GroupingError) -> HttpResponse {
    let (mut builder, error, status_code) = match err {
        GroupingError::InvalidEdge { .. }
        | GroupingError::DuplicateParticipant { .. }
        | GroupingError::UnknownGender { .. }
        | GroupingError::InvalidConfig(_) => (HttpResponse::BadRequest(), "Invalid input", 400),
        GroupingError::Infeasible { .. } => (HttpResponse::UnprocessableEntity(), "Infeasible grouping", 422),
        GroupingError::SolverUnavailable(_) | GroupingError::SolverTimeout { .. } => {
            (HttpResponse::ServiceUnavailable(), "Exact solver unavailable", 503)
        }
        GroupingError::Backend(_) => (HttpResponse::InternalServerError(), "Solver failed", 500),
    };
    builder.json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code,
    })
}
