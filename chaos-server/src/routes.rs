use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chaos_contracts::{
    validate_suggest_input, ExperimentStatusDto, MoveStepRequest, SuggestExperimentsInput,
    SuggestExperimentsOutput, ToastDto, TriggerExperimentRequest,
};
use chaos_core::dashboard::{self, DashboardSummary};
use chaos_core::integrations::{IntegrationStatus, Toggle};
use chaos_core::workflow::Workflow;
use chaos_core::{export, Error, ExperimentKind, Report};
use tracing::{info, warn};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/reports", get(list_reports))
        .route("/api/reports/:id", get(get_report))
        .route("/api/reports/:id/export", get(export_report))
        .route("/api/experiments", post(trigger_experiment))
        .route("/api/experiments/status", get(experiment_status))
        .route("/api/dashboard", get(dashboard_summary))
        .route("/api/suggestions", post(suggest_experiments))
        .route("/api/workflow", get(get_workflow))
        .route("/api/workflow/moves", post(move_workflow_step))
        .route("/api/workflow/save", post(save_workflow))
        .route("/api/integrations", get(list_integrations))
        .route("/api/integrations/:id/toggle", post(toggle_integration))
        .with_state(state)
}

/// Error response carrying a toast-shaped body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    toast: ToastDto,
}

impl ApiError {
    fn new(status: StatusCode, title: &str, description: impl Into<String>) -> Self {
        Self {
            status,
            toast: ToastDto::new(title, description),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => {
                ApiError::new(StatusCode::BAD_REQUEST, "Invalid Request", msg)
            }
            Error::UnknownExperimentKind(kind) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "Invalid Request",
                format!("Unknown experiment kind '{kind}'."),
            ),
            Error::ExperimentInFlight { id } => ApiError::new(
                StatusCode::CONFLICT,
                "Experiment Running",
                format!("Experiment {id} is still running. Please wait for it to complete."),
            ),
            Error::ReportNotFound(id) => ApiError::new(
                StatusCode::NOT_FOUND,
                "Report Not Found",
                format!("No report with id {id}."),
            ),
            Error::AlreadyFinalized(id) => ApiError::new(
                StatusCode::CONFLICT,
                "Report Finalized",
                format!("Report {id} has already finished."),
            ),
            Error::ReportNotReady(_) => ApiError::new(
                StatusCode::CONFLICT,
                "Report Not Ready",
                "Please wait for the experiment to complete.",
            ),
            Error::Export(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download Failed",
                "Could not generate the report. Please try again.",
            ),
            Error::SuggestionService(_) | Error::SuggestionSchema(_) => ApiError::new(
                StatusCode::BAD_GATEWAY,
                "An error occurred.",
                "Failed to fetch AI suggestions. Please try again.",
            ),
            Error::UnknownStep(id) => ApiError::new(
                StatusCode::NOT_FOUND,
                "Step Not Found",
                format!("No workflow step with id {id}."),
            ),
            Error::UnknownIntegration(id) => ApiError::new(
                StatusCode::NOT_FOUND,
                "Integration Not Found",
                format!("No integration with id {id}."),
            ),
            Error::Config(msg) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Suggestions Unavailable", msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.toast)).into_response()
    }
}

async fn list_reports(State(state): State<AppState>) -> Json<Vec<Report>> {
    Json(state.lab.reports())
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    state
        .lab
        .report(&id)
        .map(Json)
        .ok_or_else(|| Error::ReportNotFound(id).into())
}

async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let report = state
        .lab
        .report(&id)
        .ok_or_else(|| Error::ReportNotFound(id.clone()))?;

    let document = export::render(&report, &state.export).map_err(|e| {
        warn!(report_id = %id, error = %e, "export rejected");
        ApiError::from(e)
    })?;
    info!(report_id = %id, pages = document.pages.len(), "report exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.to_text(),
    )
        .into_response())
}

async fn trigger_experiment(
    State(state): State<AppState>,
    Json(request): Json<TriggerExperimentRequest>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let kind = request.kind.parse::<ExperimentKind>()?;
    // Finalization runs detached; clients poll the status endpoint.
    let (pending, _finalizing) = state.lab.spawn(kind, &request.name)?;
    Ok((StatusCode::ACCEPTED, Json(pending)))
}

async fn experiment_status(State(state): State<AppState>) -> Json<ExperimentStatusDto> {
    let report_id = state.lab.running_report_id();
    Json(ExperimentStatusDto {
        running: report_id.is_some(),
        report_id,
    })
}

async fn dashboard_summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(dashboard::summarize(&state.lab.reports()))
}

async fn suggest_experiments(
    State(state): State<AppState>,
    Json(input): Json<SuggestExperimentsInput>,
) -> Result<Json<SuggestExperimentsOutput>, ApiError> {
    if let Err(violations) = validate_suggest_input(&input) {
        let mut err = ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid Request",
            "Please fix the highlighted fields.",
        );
        err.toast.violations = violations;
        return Err(err);
    }

    let suggester = state.suggester()?;
    Ok(Json(suggester.suggest(&input).await?))
}

async fn get_workflow(State(state): State<AppState>) -> Json<Workflow> {
    Json(state.workflow().clone())
}

async fn move_workflow_step(
    State(state): State<AppState>,
    Json(request): Json<MoveStepRequest>,
) -> Result<Json<Workflow>, ApiError> {
    let mut workflow = state.workflow();
    workflow.move_step(&request.active_id, &request.over_id)?;
    Ok(Json(workflow.clone()))
}

async fn save_workflow(State(state): State<AppState>) -> Json<ToastDto> {
    let mut workflow = state.workflow();
    workflow.save();
    info!(workflow = %workflow.name, steps = ?workflow.step_ids(), "workflow saved");
    Json(ToastDto::new(
        "Workflow Saved!",
        "Your chaos experiment sequence has been saved.",
    ))
}

async fn list_integrations(State(state): State<AppState>) -> Json<Vec<IntegrationStatus>> {
    Json(state.integrations().list())
}

async fn toggle_integration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Toggle>, ApiError> {
    let toggle = state.integrations().toggle(&id)?;
    info!(integration = %id, connected = toggle.integration.connected, "integration toggled");
    Ok(Json(toggle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_core::config::LabConfig;
    use chaos_core::llm::{CompletionBackend, Suggester};
    use chaos_core::report::seed_reports;
    use chaos_core::score::FixedScores;
    use chaos_core::Lab;
    use futures::future::BoxFuture;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    struct CannedBackend(&'static str);

    impl CompletionBackend for CannedBackend {
        fn complete<'a>(
            &'a self,
            _preamble: &'a str,
            _prompt: &'a str,
        ) -> BoxFuture<'a, Result<String, String>> {
            let reply = self.0.to_string();
            Box::pin(async move { Ok(reply) })
        }
    }

    fn state(delay: Duration, suggester: Option<Suggester>) -> AppState {
        let lab = Lab::new(
            seed_reports(),
            LabConfig {
                finalize_delay: delay,
                score_seed: None,
            },
            FixedScores::new([8.7]),
        );
        AppState::new(lab, suggester)
    }

    async fn serve(state: AppState) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, api_router(state)).await;
        });
        addr
    }

    async fn send(
        addr: SocketAddr,
        method: &str,
        path: &str,
        body: Option<&str>,
    ) -> (u16, String, String) {
        let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
        let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
        if let Some(payload) = body {
            req.push_str("Content-Type: application/json\r\n");
            req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
        }
        req.push_str("\r\n");
        if let Some(payload) = body {
            req.push_str(payload);
        }
        stream.write_all(req.as_bytes()).await.expect("write");
        let mut response = String::new();
        stream.read_to_string(&mut response).await.expect("read");
        let (head, body) = response.split_once("\r\n\r\n").expect("separator");
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|s| s.parse::<u16>().ok())
            .expect("status");
        (status, head.to_lowercase(), body.to_string())
    }

    #[tokio::test]
    async fn lists_reports_newest_first() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let (status, _, body) = send(addr, "GET", "/api/reports", None).await;
        assert_eq!(status, 200);
        let reports: Vec<Report> = serde_json::from_str(&body).expect("json");
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].id, "rep-073");

        let (status, _, _) = send(addr, "GET", "/api/reports/rep-404", None).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn trigger_returns_pending_and_blocks_second_trigger_and_export() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let body = r#"{"kind":"pod_crash","name":"Pod Crash Test - Web Server"}"#;

        let (status, _, pending) = send(addr, "POST", "/api/experiments", Some(body)).await;
        assert_eq!(status, 202);
        let pending: Report = serde_json::from_str(&pending).expect("json");
        assert_eq!(pending.id, "rep-074");
        assert_eq!(pending.resilience_score, 0.0);

        let (status, _, toast) = send(addr, "POST", "/api/experiments", Some(body)).await;
        assert_eq!(status, 409);
        let toast: ToastDto = serde_json::from_str(&toast).expect("toast");
        assert_eq!(toast.title, "Experiment Running");

        let (status, _, toast) = send(addr, "GET", "/api/reports/rep-074/export", None).await;
        assert_eq!(status, 409);
        let toast: ToastDto = serde_json::from_str(&toast).expect("toast");
        assert_eq!(toast.title, "Report Not Ready");

        let (_, _, status_body) = send(addr, "GET", "/api/experiments/status", None).await;
        let running: ExperimentStatusDto = serde_json::from_str(&status_body).expect("status");
        assert!(running.running);
        assert_eq!(running.report_id.as_deref(), Some("rep-074"));
    }

    #[tokio::test]
    async fn unknown_kind_is_a_bad_request() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let body = r#"{"kind":"disk_fill","name":"Disk"}"#;
        let (status, _, _) = send(addr, "POST", "/api/experiments", Some(body)).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn triggered_run_finalizes_after_the_delay() {
        let addr = serve(state(Duration::from_millis(20), None)).await;
        let body = r#"{"kind":"latency","name":"API Gateway Latency Injection"}"#;
        let (status, _, _) = send(addr, "POST", "/api/experiments", Some(body)).await;
        assert_eq!(status, 202);
        wait_until_idle(addr).await;

        let (_, _, body) = send(addr, "GET", "/api/reports/rep-074", None).await;
        let report: Report = serde_json::from_str(&body).expect("json");
        assert_eq!(report.resilience_score, 8.7);
        assert_eq!(report.status, chaos_core::ReportStatus::Completed);
    }

    #[tokio::test]
    async fn export_serves_attachment_with_score() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let (status, head, body) = send(addr, "GET", "/api/reports/rep-073/export", None).await;
        assert_eq!(status, 200);
        assert!(head.contains("text/plain"));
        assert!(head.contains("filename=\"pod_deletion_test_-_checkout_service.txt\""));
        assert!(body.contains("Resilience Score: 7.5"));
        assert!(body.contains("Page 1 of"));
    }

    #[tokio::test]
    async fn dashboard_counts_history() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let (status, _, body) = send(addr, "GET", "/api/dashboard", None).await;
        assert_eq!(status, 200);
        let summary: DashboardSummary = serde_json::from_str(&body).expect("json");
        assert_eq!(summary.total_reports, 5);
        assert_eq!(summary.action_required, 1);
    }

    fn long_input() -> String {
        serde_json::json!({
            "historicalData": "checkout latency doubled after each of the last three deploys of the cart service",
            "systemBehavior": "three checkout replicas behind an envoy gateway talking to a single postgres primary"
        })
        .to_string()
    }

    #[tokio::test]
    async fn suggestions_validate_before_calling_the_service() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let short = r#"{"historicalData":"short","systemBehavior":"short"}"#;
        let (status, _, body) = send(addr, "POST", "/api/suggestions", Some(short)).await;
        assert_eq!(status, 422);
        let toast: ToastDto = serde_json::from_str(&body).expect("toast");
        assert_eq!(toast.violations.len(), 2);

        let (status, _, body) = send(addr, "POST", "/api/suggestions", Some(&long_input())).await;
        assert_eq!(status, 503);
        let toast: ToastDto = serde_json::from_str(&body).expect("toast");
        assert_eq!(toast.title, "Suggestions Unavailable");
    }

    #[tokio::test]
    async fn malformed_suggestion_reply_is_a_generic_failure() {
        let suggester = Suggester::new(CannedBackend(r#"{"experiments":["kill a pod"]}"#));
        let addr = serve(state(Duration::from_secs(60), Some(suggester))).await;
        let (status, _, body) = send(addr, "POST", "/api/suggestions", Some(&long_input())).await;
        assert_eq!(status, 502);
        let toast: ToastDto = serde_json::from_str(&body).expect("toast");
        assert_eq!(toast.description, "Failed to fetch AI suggestions. Please try again.");
    }

    #[tokio::test]
    async fn well_formed_suggestion_reply_is_returned() {
        let suggester = Suggester::new(CannedBackend(
            r#"{"experiments":["fail over postgres"],"rationale":"single primary"}"#,
        ));
        let addr = serve(state(Duration::from_secs(60), Some(suggester))).await;
        let (status, _, body) = send(addr, "POST", "/api/suggestions", Some(&long_input())).await;
        assert_eq!(status, 200);
        let out: SuggestExperimentsOutput = serde_json::from_str(&body).expect("json");
        assert_eq!(out.rationale, "single primary");
    }

    async fn wait_until_idle(addr: SocketAddr) {
        for _ in 0..100 {
            let (_, _, body) = send(addr, "GET", "/api/experiments/status", None).await;
            let status: ExperimentStatusDto = serde_json::from_str(&body).expect("status");
            if !status.running {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("experiment never finalized");
    }

    #[tokio::test]
    async fn export_of_report_with_control_characters_in_its_name_still_downloads() {
        let addr = serve(state(Duration::from_millis(20), None)).await;
        let body = r#"{"kind":"resource","name":"Drill\u0001A \"q\""}"#;
        let (status, _, _) = send(addr, "POST", "/api/experiments", Some(body)).await;
        assert_eq!(status, 202);
        wait_until_idle(addr).await;

        let (status, head, _) = send(addr, "GET", "/api/reports/rep-074/export", None).await;
        assert_eq!(status, 200);
        assert!(head.contains("filename=\"drilla_q.txt\""));
    }

    #[tokio::test]
    async fn workflow_moves_and_saves() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let (status, _, body) = send(addr, "GET", "/api/workflow", None).await;
        assert_eq!(status, 200);
        let workflow: Workflow = serde_json::from_str(&body).expect("workflow");
        assert_eq!(workflow.name, "Weekend Peak Workflow");
        assert_eq!(workflow.steps.len(), 6);

        let moved = r#"{"activeId":"5","overId":"1"}"#;
        let (status, _, body) = send(addr, "POST", "/api/workflow/moves", Some(moved)).await;
        assert_eq!(status, 200);
        let workflow: Workflow = serde_json::from_str(&body).expect("workflow");
        assert_eq!(workflow.step_ids(), vec!["5", "1", "2", "3", "4", "6"]);

        let unknown = r#"{"activeId":"42","overId":"1"}"#;
        let (status, _, _) = send(addr, "POST", "/api/workflow/moves", Some(unknown)).await;
        assert_eq!(status, 404);

        let (status, _, body) = send(addr, "POST", "/api/workflow/save", Some("")).await;
        assert_eq!(status, 200);
        let toast: ToastDto = serde_json::from_str(&body).expect("toast");
        assert_eq!(toast.title, "Workflow Saved!");

        let (_, _, body) = send(addr, "GET", "/api/workflow", None).await;
        let workflow: Workflow = serde_json::from_str(&body).expect("workflow");
        assert_eq!(workflow.step_ids()[0], "5");
    }

    #[tokio::test]
    async fn integrations_toggle_with_toast_text() {
        let addr = serve(state(Duration::from_secs(60), None)).await;
        let (_, _, body) = send(addr, "GET", "/api/integrations", None).await;
        let list: Vec<IntegrationStatus> = serde_json::from_str(&body).expect("list");
        assert_eq!(list.len(), 4);
        assert!(list.iter().all(|i| i.connected));

        let (status, _, body) = send(addr, "POST", "/api/integrations/gke/toggle", Some("")).await;
        assert_eq!(status, 200);
        let toggle: Toggle = serde_json::from_str(&body).expect("toggle");
        assert_eq!(toggle.title, "Disconnected!");
        assert!(!toggle.integration.connected);

        let (_, _, body) = send(addr, "GET", "/api/integrations", None).await;
        let list: Vec<IntegrationStatus> = serde_json::from_str(&body).expect("list");
        assert!(!list[0].connected);

        let (status, _, _) = send(addr, "POST", "/api/integrations/s3/toggle", Some("")).await;
        assert_eq!(status, 404);
    }
}
