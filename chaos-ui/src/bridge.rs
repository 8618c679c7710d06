use crate::dto::{DashboardDto, IntegrationDto, ReportDto, ToggleDto, WorkflowDto};
use chaos_contracts::{
    ExperimentStatusDto, MoveStepRequest, SuggestExperimentsInput, SuggestExperimentsOutput, ToastDto,
    TriggerExperimentRequest,
};
use js_sys::Array;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Request, RequestInit, RequestMode, Response, Url};

fn transport(detail: impl std::fmt::Display) -> ToastDto {
    ToastDto::new("An error occurred.", detail.to_string())
}

fn js_err(e: JsValue) -> ToastDto {
    transport(format!("{e:?}"))
}

async fn send(method: &str, path: &str, body: Option<String>) -> Result<Response, ToastDto> {
    let window = web_sys::window().ok_or_else(|| transport("window not available"))?;

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::SameOrigin);
    let has_body = body.is_some();
    if let Some(body) = body {
        opts.set_body(&JsValue::from_str(&body));
    }
    let request = Request::new_with_str_and_init(path, &opts).map_err(js_err)?;
    if has_body {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;
    }

    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;

    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = JsFuture::from(resp.json().map_err(js_err)?).await;
    Err(body
        .ok()
        .and_then(|v| serde_wasm_bindgen::from_value::<ToastDto>(v).ok())
        .unwrap_or_else(|| transport(format!("request failed with status {status}"))))
}

async fn call<A, R>(method: &str, path: &str, args: Option<&A>) -> Result<R, ToastDto>
where
    A: Serialize,
    R: DeserializeOwned,
{
    let body = args
        .map(|a| serde_json::to_string(a).map_err(transport))
        .transpose()?;
    let resp = send(method, path, body).await?;
    let val = JsFuture::from(resp.json().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    serde_wasm_bindgen::from_value(val).map_err(transport)
}

pub async fn fetch_reports() -> Result<Vec<ReportDto>, ToastDto> {
    call::<(), _>("GET", "/api/reports", None).await
}

pub async fn fetch_dashboard() -> Result<DashboardDto, ToastDto> {
    call::<(), _>("GET", "/api/dashboard", None).await
}

pub async fn fetch_status() -> Result<ExperimentStatusDto, ToastDto> {
    call::<(), _>("GET", "/api/experiments/status", None).await
}

pub async fn trigger_experiment(kind: &str, name: &str) -> Result<ReportDto, ToastDto> {
    let request = TriggerExperimentRequest {
        kind: kind.to_string(),
        name: name.to_string(),
    };
    call("POST", "/api/experiments", Some(&request)).await
}

pub async fn suggest(input: &SuggestExperimentsInput) -> Result<SuggestExperimentsOutput, ToastDto> {
    call("POST", "/api/suggestions", Some(input)).await
}

pub async fn fetch_workflow() -> Result<WorkflowDto, ToastDto> {
    call::<(), _>("GET", "/api/workflow", None).await
}

pub async fn move_step(active_id: &str, over_id: &str) -> Result<WorkflowDto, ToastDto> {
    let request = MoveStepRequest {
        active_id: active_id.to_string(),
        over_id: over_id.to_string(),
    };
    call("POST", "/api/workflow/moves", Some(&request)).await
}

pub async fn save_workflow() -> Result<ToastDto, ToastDto> {
    call::<(), _>("POST", "/api/workflow/save", None).await
}

pub async fn fetch_integrations() -> Result<Vec<IntegrationDto>, ToastDto> {
    call::<(), _>("GET", "/api/integrations", None).await
}

pub async fn toggle_integration(id: &str) -> Result<ToggleDto, ToastDto> {
    call::<(), _>("POST", &format!("/api/integrations/{id}/toggle"), None).await
}

/// Fetch the export for `report` and hand it to the browser as a download.
pub async fn download_report(report: &ReportDto) -> Result<(), ToastDto> {
    let path = format!("/api/reports/{}/export", report.id);
    let resp = send("GET", &path, None).await?;
    let file_name = resp
        .headers()
        .get("content-disposition")
        .ok()
        .flatten()
        .and_then(|v| attachment_file_name(&v))
        .unwrap_or_else(|| format!("{}.txt", report.name.replace(' ', "_")));

    let text = JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    let opts = BlobPropertyBag::new();
    opts.set_type("text/plain");
    let blob = Blob::new_with_str_sequence_and_options(&Array::of1(&text), &opts).map_err(js_err)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| transport("document not available"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| transport("anchor element unavailable"))?;
    anchor.set_href(&url);
    anchor.set_download(&file_name);
    anchor.click();
    Url::revoke_object_url(&url).map_err(js_err)
}

/// `attachment; filename="x.txt"` -> `x.txt`
pub fn attachment_file_name(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|v| v.trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}
