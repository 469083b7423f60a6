//! Scheduler API routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Local;
use serde_json::json;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery},
    models::{
        AppointmentFilter, CreateAppointment, ListQuery, NewEvent, NewLocation, NewResource,
        NewUser, UpdateAppointmentStatus, UpdateUser,
    },
    state::AppState,
    validation,
};

/// Create the router for the scheduler service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/:id/reserved_minutes", get(get_reserved_minutes))
        .route("/resources", post(create_resource).get(list_resources))
        .route("/resources/:id", get(get_resource).delete(delete_resource))
        .route("/locations", post(create_location).get(list_locations))
        .route("/locations/:id", get(get_location).delete(delete_location))
        .route("/events", post(create_event).get(list_events))
        .route("/events/:id", get(get_event).delete(delete_event))
        .route(
            "/appointments",
            post(create_appointment).get(list_appointments),
        )
        .route("/appointments/export", get(export_appointments))
        .route(
            "/appointments/:id",
            get(get_appointment).delete(delete_appointment),
        )
        .route("/appointments/:id/status", patch(update_appointment_status));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .with_state(state)
}

/// Landing endpoint
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": format!("{} - API running", state.title),
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let healthy = state.health.health_check().await?;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "scheduler"
        })),
    ))
}

fn not_found(entity: &str, id: i64) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", entity, id))
}

// --- Users ---

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewUser>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_new_user(&payload).map_err(ApiError::Validation)?;

    let user = state.users.create(&payload).await?;
    info!("User created {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let users = state.users.list(page.skip, page.limit).await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    Ok(Json(user))
}

/// Update name, email or activity of a user
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateUser>,
) -> ApiResult<impl IntoResponse> {
    let current = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    let updated = payload.apply(current);
    validation::validate_name(&updated.name).map_err(ApiError::Validation)?;
    validation::validate_email(&updated.email).map_err(ApiError::Validation)?;

    let user = state
        .users
        .update(&updated)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    Ok(Json(user))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Future booked minutes of a user
pub async fn get_reserved_minutes(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let total = state.reporting.total_reserved_minutes(user_id).await?;

    Ok(Json(json!({
        "user_id": user_id,
        "reserved_minutes": total,
    })))
}

// --- Resources ---

pub async fn create_resource(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewResource>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_name(&payload.name).map_err(ApiError::Validation)?;
    validation::validate_name(&payload.resource_type).map_err(ApiError::Validation)?;

    let resource = state.resources.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn list_resources(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.resources.list(page.skip, page.limit).await?))
}

pub async fn get_resource(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let resource = state
        .resources
        .get(id)
        .await?
        .ok_or_else(|| not_found("Resource", id))?;

    Ok(Json(resource))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    state.resources.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Locations ---

pub async fn create_location(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewLocation>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_new_location(&payload).map_err(ApiError::Validation)?;

    let location = state.locations.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn list_locations(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.list(page.skip, page.limit).await?))
}

pub async fn get_location(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let location = state
        .locations
        .get(id)
        .await?
        .ok_or_else(|| not_found("Location", id))?;

    Ok(Json(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    state.locations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Events ---

pub async fn create_event(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewEvent>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_new_event(&payload).map_err(ApiError::Validation)?;

    let event = state.events.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.events.list(page.skip, page.limit).await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| not_found("Event", id))?;

    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    state.events.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Appointments ---

/// Book an appointment through the booking rules
pub async fn create_appointment(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAppointment>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_booking(&payload, Local::now().naive_local())
        .map_err(ApiError::Validation)?;

    let appointment = state.booking.create_appointment(&payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Filtered, optionally sorted appointment listing
pub async fn list_appointments(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<AppointmentFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.appointments.list_by_filter(&filter).await?))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .appointments
        .get(id)
        .await?
        .ok_or_else(|| not_found("Appointment", id))?;

    Ok(Json(appointment))
}

/// Move an appointment to another status; no booking rules apply
pub async fn update_appointment_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateAppointmentStatus>,
) -> ApiResult<impl IntoResponse> {
    let status = validation::parse_status(&payload.status).map_err(ApiError::Validation)?;

    let mut appointment = state
        .appointments
        .get(id)
        .await?
        .ok_or_else(|| not_found("Appointment", id))?;
    appointment.status = status;

    let appointment = state
        .appointments
        .update(&appointment)
        .await?
        .ok_or_else(|| not_found("Appointment", id))?;

    info!("Appointment {} is now {}", id, appointment.status);
    Ok(Json(appointment))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<impl IntoResponse> {
    state.appointments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Export all appointments to a CSV file
pub async fn export_appointments(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let path = state.reporting.export_all().await?;

    Ok(Json(json!({
        "path": path.display().to_string(),
    })))
}
