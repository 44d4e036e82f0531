// rest_api/src/handlers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use hospital_lib::HospitalError;
use models::medical::{
    AppointmentQuery, AppointmentUpdate, BillQuery, BillUpdate, MedicineUpdate, NewAppointment,
    NewBill, NewMedicine, NewPrescription, NewRoom, NewRoomAssignment, NewUser, PrescriptionQuery,
    RoomDischarge,
};

use crate::{AppState, RestApiError};

type Created = (StatusCode, Json<Value>);

pub async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "message": "REST API is healthy" })))
}

// --- users & doctors ---

pub async fn register_user_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<Created, RestApiError> {
    let registration = state.hospital.registration().register(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!(registration))))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RestApiError> {
    let user = state.hospital.registration().get_user(&id).await.map_err(|err| match err {
        HospitalError::NotFound(_) => RestApiError::NotFound(err),
        other => RestApiError::Hospital(other),
    })?;
    Ok(Json(json!({ "user": user })))
}

pub async fn list_doctors_handler(State(state): State<AppState>) -> Result<Json<Value>, RestApiError> {
    let doctors = state.hospital.registration().list_doctors().await?;
    Ok(Json(json!({ "doctors": doctors })))
}

// --- appointments ---

pub async fn list_appointments_handler(
    State(state): State<AppState>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, RestApiError> {
    let appointments = state.hospital.appointments().list(&query).await?;
    Ok(Json(json!({ "appointments": appointments })))
}

pub async fn create_appointment_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewAppointment>,
) -> Result<Created, RestApiError> {
    let appointment = state.hospital.appointments().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "appointment": appointment }))))
}

pub async fn update_appointment_handler(
    State(state): State<AppState>,
    Json(payload): Json<AppointmentUpdate>,
) -> Result<Json<Value>, RestApiError> {
    let appointment = state.hospital.appointments().update(&payload).await?;
    Ok(Json(json!({ "appointment": appointment })))
}

// --- billing ---

pub async fn list_bills_handler(
    State(state): State<AppState>,
    Query(query): Query<BillQuery>,
) -> Result<Json<Value>, RestApiError> {
    let bills = state.hospital.billing().list(&query).await?;
    Ok(Json(json!({ "bills": bills })))
}

pub async fn create_bill_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewBill>,
) -> Result<Created, RestApiError> {
    let bill = state.hospital.billing().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "bill": bill }))))
}

pub async fn update_bill_handler(
    State(state): State<AppState>,
    Json(payload): Json<BillUpdate>,
) -> Result<Json<Value>, RestApiError> {
    let bill = state.hospital.billing().update(&payload).await?;
    Ok(Json(json!({ "bill": bill })))
}

// --- medicines ---

pub async fn list_medicines_handler(State(state): State<AppState>) -> Result<Json<Value>, RestApiError> {
    let medicines = state.hospital.inventory().list().await?;
    Ok(Json(json!({ "medicines": medicines })))
}

pub async fn create_medicine_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewMedicine>,
) -> Result<Created, RestApiError> {
    let medicine = state.hospital.inventory().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "medicine": medicine }))))
}

pub async fn update_medicine_handler(
    State(state): State<AppState>,
    Json(payload): Json<MedicineUpdate>,
) -> Result<Json<Value>, RestApiError> {
    let medicine = state.hospital.inventory().update(&payload).await?;
    Ok(Json(json!({ "medicine": medicine })))
}

pub async fn delete_medicine_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RestApiError> {
    state.hospital.inventory().delete(&id).await?;
    Ok(Json(json!({ "message": "Medicine deleted successfully" })))
}

// --- prescriptions ---

pub async fn list_prescriptions_handler(
    State(state): State<AppState>,
    Query(query): Query<PrescriptionQuery>,
) -> Result<Json<Value>, RestApiError> {
    let prescriptions = state.hospital.prescriptions().list(&query).await?;
    Ok(Json(json!({ "prescriptions": prescriptions })))
}

pub async fn create_prescription_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewPrescription>,
) -> Result<Created, RestApiError> {
    let prescription = state.hospital.prescriptions().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "prescription": prescription }))))
}

// --- rooms ---

pub async fn list_rooms_handler(State(state): State<AppState>) -> Result<Json<Value>, RestApiError> {
    let rooms = state.hospital.rooms().list().await?;
    Ok(Json(json!({ "rooms": rooms })))
}

pub async fn assign_room_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewRoomAssignment>,
) -> Result<Created, RestApiError> {
    let assignment = state.hospital.rooms().assign(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "assignment": assignment }))))
}

pub async fn register_room_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewRoom>,
) -> Result<Created, RestApiError> {
    let room = state.hospital.rooms().register_room(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "room": room }))))
}

pub async fn discharge_room_handler(
    State(state): State<AppState>,
    Json(payload): Json<RoomDischarge>,
) -> Result<Json<Value>, RestApiError> {
    let assignment = state.hospital.rooms().discharge(&payload).await?;
    Ok(Json(json!({ "assignment": assignment })))
}
