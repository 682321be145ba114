//! Assertions for RFC 7807 error bodies, independent of backend types.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Mirror of the backend's problem body.
#[derive(Debug, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Validate the error contract on raw response parts and return the parsed body.
///
/// Checks the status, the `application/problem+json` content type, the
/// `x-trace-id` header parity with the body, and the stable `code`.
pub fn assert_problem_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
) -> Problem {
    assert_eq!(
        status,
        expected_status,
        "unexpected status; body: {}",
        String::from_utf8_lossy(body)
    );

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "expected problem+json, got '{content_type}'"
    );

    let problem: Problem =
        serde_json::from_slice(body).expect("body should be a problem+json document");

    let trace_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be ASCII");
    assert_eq!(problem.trace_id, trace_header, "trace_id body/header mismatch");
    assert!(!problem.trace_id.is_empty());

    assert_eq!(problem.code, expected_code, "detail was: {}", problem.detail);
    assert_eq!(problem.status, expected_status.as_u16());
    assert!(problem.type_.ends_with(&problem.code));
    problem
}

/// Consume a test `ServiceResponse` and validate its error contract.
pub async fn assert_problem<B>(
    resp: ServiceResponse<B>,
    expected_code: &str,
    expected_status: StatusCode,
) -> Problem
where
    B: MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;
    assert_problem_parts(status, &headers, &body, expected_code, expected_status)
}

/// Like [`assert_problem`] but also requires `needle` in the detail.
pub async fn assert_problem_detail<B>(
    resp: ServiceResponse<B>,
    expected_code: &str,
    expected_status: StatusCode,
    needle: &str,
) -> Problem
where
    B: MessageBody,
{
    let problem = assert_problem(resp, expected_code, expected_status).await;
    assert!(
        problem.detail.contains(needle),
        "expected detail to contain '{needle}', got '{}'",
        problem.detail
    );
    problem
}
