// rest_api/src/lib.rs
// HTTP surface of the hospital backend, mounted under /api/v1.

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use anyhow::Context;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use hospital_lib::config::ServerConfig;
use hospital_lib::{Hospital, HospitalError};

pub mod handlers;
use handlers::*;

#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Hospital(#[from] HospitalError),
    /// A lookup whose absence is reported as 404 rather than 400.
    #[error(transparent)]
    NotFound(HospitalError),
}

fn status_for(err: &HospitalError) -> StatusCode {
    match err {
        HospitalError::Validation(_) | HospitalError::NotFound(_) | HospitalError::Store(_) => {
            StatusCode::BAD_REQUEST
        }
        HospitalError::Conflict(_) => StatusCode::CONFLICT,
        HospitalError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let (status, err) = match &self {
            RestApiError::Hospital(err) => (status_for(err), err),
            RestApiError::NotFound(err) => (StatusCode::NOT_FOUND, err),
        };
        match err {
            HospitalError::Store(_) | HospitalError::Unexpected(_) => {
                error!(error = %err, code = err.code(), "request failed");
            }
            _ => warn!(error = %err, code = err.code(), "request rejected"),
        }
        let body = Json(json!({ "error": err.client_message(), "code": err.code() }));
        (status, body).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub hospital: Arc<Hospital>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Turns a handler panic into the opaque 500 body.
fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };
    RestApiError::Hospital(HospitalError::Unexpected(detail)).into_response()
}

fn with_layers(routes: Router, cors_origins: &[String]) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Builds the `/api/v1` router over a hospital instance.
pub fn router(hospital: Arc<Hospital>, cors_origins: &[String]) -> Router {
    let app_state = AppState { hospital };
    let routes = Router::new()
        .route("/api/v1/health", get(health_check_handler))
        .route("/api/v1/users", post(register_user_handler))
        .route("/api/v1/users/:id", get(get_user_handler))
        .route("/api/v1/doctors", get(list_doctors_handler))
        .route(
            "/api/v1/appointments",
            get(list_appointments_handler)
                .post(create_appointment_handler)
                .put(update_appointment_handler),
        )
        .route(
            "/api/v1/billing",
            get(list_bills_handler).post(create_bill_handler).put(update_bill_handler),
        )
        .route(
            "/api/v1/medicines",
            get(list_medicines_handler)
                .post(create_medicine_handler)
                .put(update_medicine_handler),
        )
        .route("/api/v1/medicines/:id", delete(delete_medicine_handler))
        .route(
            "/api/v1/prescriptions",
            get(list_prescriptions_handler).post(create_prescription_handler),
        )
        .route("/api/v1/rooms", get(list_rooms_handler).post(assign_room_handler))
        .route("/api/v1/rooms/catalog", post(register_room_handler))
        .route("/api/v1/rooms/discharge", post(discharge_room_handler))
        .with_state(app_state);
    with_layers(routes, cors_origins)
}

/// Serves the API until `shutdown` resolves.
pub async fn start_server<F>(config: &ServerConfig, hospital: Arc<Hospital>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(hospital, &config.cors_origins);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    info!(%addr, "REST API server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed to start or run")?;

    info!("REST API server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(Hospital::in_memory()), &["*".to_string()])
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    async fn register(app: &Router, id: &str, role: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/users",
            Some(json!({
                "id": id,
                "email": format!("{}@example.com", id),
                "full_name": format!("{} {}", role, id),
                "role": role,
                "phone": "555-0100",
                "age": "41"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    #[tokio::test]
    async fn panicking_handler_becomes_internal_error() {
        async fn explode() -> &'static str {
            panic!("ward table missing")
        }
        let app = with_layers(Router::new().route("/api/v1/explode", get(explode)), &[]);

        let (status, body) = send(&app, "GET", "/api/v1/explode", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error", "code": "internal_error" }));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(&app(), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn registration_and_profile_lookup() {
        let app = app();
        let body = register(&app, "pat-1", "patient").await;
        assert_eq!(body["user"]["age"], 41);
        assert_eq!(body["patient"]["blood_group"], "O+");
        assert_eq!(body["patient"]["emergency_contact"], "555-0100");

        let (status, body) = send(&app, "GET", "/api/v1/users/pat-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "patient");

        let (status, body) = send(&app, "GET", "/api/v1/users/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn store_errors_are_generic_for_clients() {
        let app = app();
        register(&app, "pat-1", "patient").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/users",
            Some(json!({ "id": "pat-2", "email": "pat-1@example.com", "full_name": "Copy", "role": "patient" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "store_error");
        assert_eq!(body["error"], "a record with this email already exists");
    }

    #[tokio::test]
    async fn appointment_booking_and_completion() {
        let app = app();
        register(&app, "pat-1", "patient").await;
        register(&app, "doc-1", "doctor").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/appointments",
            Some(json!({
                "patient_id": "pat-1",
                "doctor_id": "doc-1",
                "appointment_date": "2025-01-10",
                "appointment_time": "10:00",
                "symptoms": "fever"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["appointment"]["status"], "pending");
        let id = body["appointment"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/api/v1/appointments?doctor_id=doc-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointments"][0]["patient"]["user"]["full_name"], "patient pat-1");
        assert_eq!(body["appointments"][0]["doctor"]["user"]["email"], "doc-1@example.com");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/appointments",
            Some(json!({ "id": id, "status": "completed", "notes": "Hydrate" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointment"]["notes"], "Hydrate");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/appointments",
            Some(json!({ "id": id, "status": "pending" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");

        let (status, body) = send(&app, "GET", "/api/v1/appointments?patient_id=ghost", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointments"], json!([]));
    }

    #[tokio::test]
    async fn medicine_stock_update_keeps_price() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/medicines",
            Some(json!({ "name": "Amoxicillin", "category": "antibiotic", "stock_quantity": 100, "price_per_unit": "10.50" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["medicine"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/medicines",
            Some(json!({ "id": id, "stock_quantity": 80 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["medicine"]["stock_quantity"], 80);
        assert_eq!(body["medicine"]["price_per_unit"], 10.5);

        let uri = format!("/api/v1/medicines/{}", id);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn second_room_assignment_is_a_conflict() {
        let app = app();
        register(&app, "pat-1", "patient").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/rooms/catalog",
            Some(json!({ "room_number": "101", "room_type": "private", "floor": 1, "daily_rate": 250 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let room_id = body["room"]["id"].as_str().unwrap().to_string();
        let admission = json!({ "patient_user_id": "pat-1", "room_id": room_id, "admission_date": "2025-01-10" });

        let (status, body) = send(&app, "POST", "/api/v1/rooms", Some(admission.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let assignment_id = body["assignment"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "POST", "/api/v1/rooms", Some(admission.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");

        let (_, body) = send(&app, "GET", "/api/v1/rooms", None).await;
        assert_eq!(body["rooms"][0]["status"], "occupied");
        assert_eq!(body["rooms"][0]["room_assignments"].as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/rooms/discharge",
            Some(json!({ "assignment_id": assignment_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", "/api/v1/rooms", None).await;
        assert_eq!(body["rooms"][0]["status"], "available");
        assert_eq!(body["rooms"][0]["room_assignments"], json!([]));
    }

    #[tokio::test]
    async fn billing_round_trip() {
        let app = app();
        register(&app, "pat-1", "patient").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/billing",
            Some(json!({ "patient_user_id": "pat-1", "consultation_fee": 500, "medicine_cost": null, "room_charges": "", "total_amount": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["bill"]["total_amount"], 500.0);
        let id = body["bill"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/billing",
            Some(json!({ "id": id, "payment_status": "paid" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bill"]["payment_status"], "paid");
        assert!(body["bill"]["payment_date"].is_string());

        let (_, body) = send(&app, "GET", "/api/v1/billing?patient_id=pat-1", None).await;
        assert_eq!(body["bills"][0]["patient"]["user"]["full_name"], "patient pat-1");
    }
}
