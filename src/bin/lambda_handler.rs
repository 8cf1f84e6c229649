//! AWS Lambda handler for running startup projections
//!
//! Accepts a parameter set as JSON (missing fields take the default scenario)
//! and returns every monthly record along with the summary.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use serde::Serialize;
use startup_projection::{MonthlyRecord, ProjectionEngine, RawParameters, SummaryRecord};

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub total_months: usize,
    pub summary: SummaryRecord,
    pub records: Vec<MonthlyRecord>,
    pub execution_time_ms: u64,
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message });
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body.to_string()))?)
}

fn json_response(body: &ProjectionResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let raw: RawParameters = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let params = match raw.normalize() {
        Ok(p) => p,
        Err(e) => {
            warn!("Rejected parameters: {}", e);
            return error_response(400, &e.to_string());
        }
    };

    let (result, summary) = ProjectionEngine::new(params).run();
    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!("Projected {} months in {} ms", result.len(), execution_time_ms);

    let response = ProjectionResponse {
        total_months: result.len(),
        summary,
        records: result.records,
        execution_time_ms,
    };

    json_response(&response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
