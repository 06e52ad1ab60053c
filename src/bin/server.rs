//! REST API server for remote command execution
//!
//! ## Endpoints
//!
//! POST /execute - Run a shell command line, credential required
//! GET /health - Liveness probe, no credential required
//!
//! Every `/execute` request flows through the same gate sequence:
//! authenticate, validate, acquire an execution slot, run, respond.

use std::sync::Arc;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::Semaphore;
use uuid::Uuid;

use terminal_api::{authenticate, validate, Config, ExecRequest, ExecutionResult, ProcessExecutor, API_KEY_HEADER};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    let port = config.port;
    let state = web::Data::new(AppState::new(config));

    info!("terminal-api listening on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .route("/health", web::get().to(health_check))
            .route("/execute", web::post().to(execute_command))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

/// Shape body-deserialization failures like every other error payload.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string()));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

// ============ API Types ============

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    /// Command line as executed
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// `null` when the process was terminated on timeout
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    pub duration_ms: u64,
}

impl ExecuteResponse {
    fn from_result(command: String, result: ExecutionResult) -> Self {
        Self {
            command,
            stdout: result.stdout,
            stderr: result.stderr,
            exit_code: result.exit_code,
            timed_out: result.timed_out,
            stdout_truncated: result.stdout_truncated,
            stderr_truncated: result.stderr_truncated,
            duration_ms: result.duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// ============ Application State ============

pub struct AppState {
    config: Config,
    /// Bounds the number of simultaneously running child processes
    gate: Arc<Semaphore>,
}

impl AppState {
    fn new(config: Config) -> Self {
        let gate = Arc::new(Semaphore::new(config.max_concurrency));
        Self { config, gate }
    }
}

// ============ Handlers ============

/// Liveness probe
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Execute a shell command line on behalf of an authenticated caller
async fn execute_command(
    req: HttpRequest,
    body: web::Json<ExecRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();

    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if authenticate(presented, &state.config).is_err() {
        return HttpResponse::Unauthorized().json(ErrorResponse::new("Unauthorized"));
    }

    let request = match validate(&body, &state.config) {
        Ok(request) => request,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())),
    };

    // One slot per running child process; the policy for a saturated gate
    // (wait or reject) comes from configuration.
    let _permit = if state.config.queue_when_busy {
        match state.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                error!("[{}] Execution gate closed unexpectedly", request_id);
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("Execution failed"));
            }
        }
    } else {
        match state.gate.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("[{}] Rejecting request: execution gate saturated", request_id);
                return HttpResponse::ServiceUnavailable()
                    .json(ErrorResponse::new("Too many concurrent executions"));
            }
        }
    };

    info!(
        "[{}] Executing command: {} in {}",
        request_id,
        request.command,
        request.working_dir.display()
    );

    match ProcessExecutor::execute(&request, &state.config).await {
        Ok(result) => {
            info!(
                "[{}] Command finished in {}ms with exit code {:?}",
                request_id,
                result.duration.as_millis(),
                result.exit_code
            );
            HttpResponse::Ok().json(ExecuteResponse::from_result(request.command, result))
        }
        Err(e) => {
            error!("[{}] Command execution failed: {}", request_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Execution failed"))
        }
    }
}
