//! Input validation utilities
//!
//! These checks run at the boundary, before any request reaches a service.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{AppointmentStatus, CreateAppointment, NewEvent, NewLocation, NewUser};

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 200 {
        return Err("Name must be at most 200 characters long".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<(), String> {
    validate_name(&user.name)?;
    validate_email(&user.email)
}

/// Validate a booking request: positive duration, start strictly after `now`
pub fn validate_booking(request: &CreateAppointment, now: NaiveDateTime) -> Result<(), String> {
    if request.duration_minutes <= 0 {
        return Err("duration_minutes must be positive".to_string());
    }

    if request.start_time <= now {
        return Err("start_time must be in the future".to_string());
    }

    Ok(())
}

pub fn validate_capacity(capacity: i32) -> Result<(), String> {
    if capacity <= 0 {
        return Err("capacity must be positive".to_string());
    }
    Ok(())
}

pub fn validate_new_location(location: &NewLocation) -> Result<(), String> {
    validate_name(&location.name)?;
    validate_capacity(location.capacity)
}

pub fn validate_new_event(event: &NewEvent) -> Result<(), String> {
    validate_name(&event.title)?;

    if event.end_time <= event.start_time {
        return Err("end_time must be after start_time".to_string());
    }

    validate_capacity(event.capacity)
}

pub fn parse_status(status: &str) -> Result<AppointmentStatus, String> {
    status
        .parse::<AppointmentStatus>()
        .map_err(|e| e.to_string())
}
