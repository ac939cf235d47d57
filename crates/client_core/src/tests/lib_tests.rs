use super::*;
use std::{sync::Arc, time::Instant};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{RowId, ScaleKey};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct StubState {
    calculate_bodies: Arc<Mutex<Vec<Value>>>,
    convert_calls: Arc<Mutex<u32>>,
}

async fn stub_list_scales() -> Json<Value> {
    Json(json!([
        {"key": "uoft", "name": "University of Toronto", "scale": "4.0 Percentage"},
        {"key": "ubc", "name": "UBC", "scale": "Letter"}
    ]))
}

async fn stub_convert_grade(
    State(state): State<StubState>,
    Json(payload): Json<ConvertGradeRequest>,
) -> Response {
    *state.convert_calls.lock().await += 1;
    match payload.grade.as_str() {
        "A" => Json(json!({"gpa": 4.0})).into_response(),
        "85" => Json(json!({"gpa": 3.9})).into_response(),
        "bad" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Unrecognized grade"})),
        )
            .into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({"gpa": null})).into_response(),
    }
}

async fn stub_calculate(State(state): State<StubState>, Json(payload): Json<Value>) -> Response {
    state.calculate_bodies.lock().await.push(payload.clone());
    match payload["university"].as_str() {
        Some("unknown") => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Unknown university"})),
        )
            .into_response(),
        Some("broken") => (StatusCode::INTERNAL_SERVER_ERROR, "stack trace").into_response(),
        _ => Json(json!({
            "university": "uoft",
            "scale_used": "4.0 Percentage",
            "cGPA": 3.95,
            "total_courses": 2,
            "total_credits": 7.0,
            "year_breakdown": [
                {"year": "2021-2022", "gpa": 3.95, "credits": 7.0, "courses": 2}
            ]
        }))
        .into_response(),
    }
}

async fn spawn_grading_server(prefix: &str) -> (String, StubState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = StubState::default();
    let routes = Router::new()
        .route("/universities", get(stub_list_scales))
        .route("/convert-grade", post(stub_convert_grade))
        .route("/calculate", post(stub_calculate))
        .with_state(state.clone());
    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}{prefix}"), state)
}

/// Accepts connections and closes them without answering.
async fn spawn_dropping_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> GradingClient {
    GradingClient::new(base_url, Duration::from_secs(5)).expect("client")
}

async fn ready_session(client: &GradingClient, scale: &str) -> FormSession {
    let mut session = FormSession::default();
    let scales = client
        .list_scales()
        .await
        .map_err(|err| err.user_message());
    session.record_scales(scales);
    session.select_scale(Some(&ScaleKey::new(scale)));
    session
}

#[tokio::test]
async fn lists_scales_in_service_order() {
    let (base_url, _) = spawn_grading_server("").await;
    let scales = client_for(&base_url).list_scales().await.expect("scales");
    let keys: Vec<&str> = scales.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["uoft", "ubc"]);
    assert_eq!(scales[0].selector_label(), "University of Toronto (4.0 Percentage)");
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let (base_url, _) = spawn_grading_server("/api").await;
    let scales = client_for(&base_url).list_scales().await.expect("scales");
    assert_eq!(scales.len(), 2);
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(matches!(
        GradingClient::new("not a url", Duration::from_secs(1)),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        GradingClient::new("ftp://grades.example", Duration::from_secs(1)),
        Err(ClientError::UnsupportedScheme { .. })
    ));
    let client = client_for("http://localhost:5001");
    assert_eq!(client.base_url().as_str(), "http://localhost:5001/");
}

#[tokio::test]
async fn scale_load_failure_keeps_session_usable() {
    let base_url = spawn_dropping_server().await;
    let client = client_for(&base_url);
    let mut session = FormSession::default();
    let outcome = client.list_scales().await.map_err(|err| err.user_message());
    assert!(outcome.is_err());
    session.record_scales(outcome);

    assert_eq!(
        session.banner().map(ErrorBanner::kind),
        Some(BannerKind::LoadFailure)
    );
    let id = session.add_row();
    assert!(session.set_course(id, "CHEM".to_string()));
    assert_eq!(session.rows().len(), 2);
}

#[tokio::test]
async fn preview_shows_converted_gpa() {
    let (base_url, _) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "ubc").await;
    let id = session.rows()[0].id();

    let request = session.set_grade(id, "A".to_string()).expect("request");
    let outcome = PreviewOutcome::from_response(client.convert_grade(&request.to_wire()).await);
    assert!(session.apply_preview(PreviewResponse { request, outcome }));
    assert_eq!(session.rows()[0].preview().label(), "4.00");
}

#[tokio::test]
async fn preview_shows_invalid_for_unconvertible_values() {
    let (base_url, _) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "ubc").await;
    let id = session.rows()[0].id();

    for grade in ["Z", "bad"] {
        let request = session.set_grade(id, grade.to_string()).expect("request");
        let outcome =
            PreviewOutcome::from_response(client.convert_grade(&request.to_wire()).await);
        assert_eq!(outcome, PreviewOutcome::Unconvertible);
        assert!(session.apply_preview(PreviewResponse { request, outcome }));
        assert_eq!(session.rows()[0].preview().label(), "Invalid");
    }
}

#[tokio::test]
async fn preview_shows_error_when_server_fails() {
    let (base_url, _) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "ubc").await;
    let id = session.rows()[0].id();

    let request = session.set_grade(id, "boom".to_string()).expect("request");
    let outcome = PreviewOutcome::from_response(client.convert_grade(&request.to_wire()).await);
    assert!(matches!(outcome, PreviewOutcome::Failed(_)));
    assert!(session.apply_preview(PreviewResponse { request, outcome }));
    assert_eq!(session.rows()[0].preview().label(), "Error");
}

#[tokio::test]
async fn preview_shows_error_when_connection_drops() {
    let base_url = spawn_dropping_server().await;
    let client = client_for(&base_url);
    let request = PreviewRequest {
        row: RowId(1),
        grade: "A".to_string(),
        scale: ScaleKey::new("ubc"),
    };
    let response = client.convert_grade(&request.to_wire()).await;
    assert!(matches!(response, Err(ClientError::Transport(_))));
    assert!(matches!(
        PreviewOutcome::from_response(response),
        PreviewOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn empty_grade_never_reaches_the_service() {
    let (base_url, state) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "ubc").await;
    let id = session.rows()[0].id();

    if let Some(request) = session.set_grade(id, String::new()) {
        let _ = client.convert_grade(&request.to_wire()).await;
    }
    assert_eq!(*state.convert_calls.lock().await, 0);
    assert_eq!(session.rows()[0].preview().label(), "-");
}

#[tokio::test]
async fn submits_exactly_the_valid_entries() {
    let (base_url, state) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "uoft").await;
    let year = Some("2021-2022".parse().expect("year"));

    let chem = session.rows()[0].id();
    session.set_course(chem, "CHEM".to_string());
    session.set_grade(chem, "A".to_string());
    session.set_credits(chem, "3.0".to_string());
    session.set_academic_year(chem, year);
    let bio = session.add_row();
    session.set_course(bio, "BIO".to_string());
    session.set_grade(bio, "85".to_string());
    session.set_credits(bio, "4.0".to_string());
    session.set_academic_year(bio, year);
    let blank = session.add_row();
    session.set_grade(blank, "B".to_string());
    session.set_credits(blank, "2".to_string());

    let now = Instant::now();
    let (ticket, request) = session.begin_submission(now).expect("submission");
    let outcome = client
        .calculate(&request)
        .await
        .map_err(|err| err.user_message());
    assert!(session.finish_submission(ticket, outcome, now));

    let bodies = state.calculate_bodies.lock().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "university": "uoft",
            "courses": [
                {"course": "CHEM", "grade": "A", "credits": 3.0, "academic_year": "2021-2022"},
                {"course": "BIO", "grade": "85", "credits": 4.0, "academic_year": "2021-2022"},
                {"course": "Course", "grade": "B", "credits": 2.0, "academic_year": ""}
            ]
        })
    );

    let view = session.result_view().expect("result view");
    assert_eq!(view.header.title, "University: Uoft");
    assert_eq!(view.primary.value, "3.95");
    assert_eq!(view.years.len(), 1);
    assert!(view.alternatives.is_empty());
}

#[tokio::test]
async fn no_valid_entries_means_no_calculate_call() {
    let (base_url, state) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "uoft").await;
    let id = session.rows()[0].id();
    session.set_course(id, "CHEM".to_string());
    session.set_credits(id, "3".to_string());

    if let Ok((_, request)) = session.begin_submission(Instant::now()) {
        let _ = client.calculate(&request).await;
    }

    assert!(state.calculate_bodies.lock().await.is_empty());
    assert_eq!(
        session.banner().map(ErrorBanner::kind),
        Some(BannerKind::Validation)
    );
}

#[tokio::test]
async fn server_rejection_message_reaches_the_banner() {
    let (base_url, _) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let request = CalculateRequest {
        university: ScaleKey::new("unknown"),
        courses: Vec::new(),
    };
    match client.calculate(&request).await {
        Err(ClientError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Unknown university");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_rejection_falls_back_to_generic_message() {
    let (base_url, _) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let request = CalculateRequest {
        university: ScaleKey::new("broken"),
        courses: Vec::new(),
    };
    let err = client.calculate(&request).await.expect_err("rejected");
    assert_eq!(err.user_message(), "Calculation failed");
}

#[tokio::test]
async fn failed_calculation_keeps_previous_results() {
    let (base_url, _) = spawn_grading_server("").await;
    let client = client_for(&base_url);
    let mut session = ready_session(&client, "uoft").await;
    let id = session.rows()[0].id();
    session.set_grade(id, "85".to_string());
    session.set_credits(id, "3".to_string());

    let now = Instant::now();
    let (ticket, request) = session.begin_submission(now).expect("first");
    let outcome = client.calculate(&request).await.map_err(|e| e.user_message());
    session.finish_submission(ticket, outcome, now);

    let (ticket, mut request) = session.begin_submission(now).expect("second");
    request.university = ScaleKey::new("unknown");
    let outcome = client.calculate(&request).await.map_err(|e| e.user_message());
    session.finish_submission(ticket, outcome, now);

    assert_eq!(session.last_result().map(|r| r.cgpa), Some(3.95));
    assert_eq!(
        session.banner().map(ErrorBanner::message),
        Some("Calculation failed: Unknown university")
    );
}

#[tokio::test]
async fn missing_service_fails_every_call_with_its_reason() {
    let service = MissingGradingService::new("TLS backend unavailable");
    let err = service.list_scales().await.expect_err("no scales");
    assert_eq!(err.user_message(), "TLS backend unavailable");
    let request = CalculateRequest {
        university: ScaleKey::new("uoft"),
        courses: Vec::new(),
    };
    assert!(matches!(
        service.calculate(&request).await,
        Err(ClientError::Unavailable(_))
    ));
}
