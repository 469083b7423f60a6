//! Service configuration
//!
//! Settings are layered: built-in defaults, then an optional `config.yaml`
//! (or whatever file `SCHEDULER_CONFIG` names), then `SCHEDULER__*`
//! environment variables using `__` as the nesting separator, e.g.
//! `SCHEDULER__BOOKING__DAILY_LIMIT=5`.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::{BookingRules, WorkingHours};

/// Which store backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkingHoursSettings {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub title: String,
    pub bind_address: String,
    pub working_hours: WorkingHoursSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingSettings {
    pub daily_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    pub csv_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub level: String,
    /// Also write to rolling files under `dir`
    pub file: bool,
    pub dir: PathBuf,
}

/// Complete service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub booking: BookingSettings,
    pub export: ExportSettings,
    pub log: LogSettings,
    pub store: StoreKind,
}

impl Settings {
    /// Load settings from defaults, the optional config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("SCHEDULER_CONFIG").unwrap_or_else(|_| "config".to_string());
        Self::from_file(&file)
    }

    /// Same as [`Settings::load`] with an explicit (optional) config file
    pub fn from_file(file: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("app.title", "Appointment Scheduler")?
            .set_default("app.bind_address", "0.0.0.0:8001")?
            .set_default("app.working_hours.start", "08:00")?
            .set_default("app.working_hours.end", "18:00")?
            .set_default("booking.daily_limit", 3)?
            .set_default("export.csv_dir", "exports")?
            .set_default("log.level", "info")?
            .set_default("log.file", true)?
            .set_default("log.dir", "logs")?
            .set_default("store", "postgres")?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("SCHEDULER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        // fail at startup rather than on the first booking
        settings.booking_rules()?;
        Ok(settings)
    }

    pub fn working_hours(&self) -> Result<WorkingHours, ConfigError> {
        let hours = &self.app.working_hours;
        WorkingHours::parse(&hours.start, &hours.end).map_err(ConfigError::Message)
    }

    pub fn booking_rules(&self) -> Result<BookingRules, ConfigError> {
        Ok(BookingRules::new(
            self.working_hours()?,
            self.booking.daily_limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serial_test::serial;
    use std::io::Write;

    const VARS: [&str; 6] = [
        "SCHEDULER_CONFIG",
        "SCHEDULER__BOOKING__DAILY_LIMIT",
        "SCHEDULER__APP__WORKING_HOURS__START",
        "SCHEDULER__APP__WORKING_HOURS__END",
        "SCHEDULER__STORE",
        "SCHEDULER__LOG__FILE",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let settings = Settings::from_file("does-not-exist").unwrap();
        assert_eq!(settings.app.title, "Appointment Scheduler");
        assert_eq!(settings.app.bind_address, "0.0.0.0:8001");
        assert_eq!(settings.booking.daily_limit, 3);
        assert_eq!(settings.export.csv_dir, PathBuf::from("exports"));
        assert_eq!(settings.log.level, "info");
        assert!(settings.log.file);
        assert_eq!(settings.log.dir, PathBuf::from("logs"));
        assert_eq!(settings.store, StoreKind::Postgres);

        let rules = settings.booking_rules().unwrap();
        assert_eq!(
            rules.working_hours.start(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(
            rules.working_hours.end(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("SCHEDULER__BOOKING__DAILY_LIMIT", "5");
            std::env::set_var("SCHEDULER__APP__WORKING_HOURS__START", "07:30");
            std::env::set_var("SCHEDULER__STORE", "memory");
            std::env::set_var("SCHEDULER__LOG__FILE", "false");
        }

        let settings = Settings::from_file("does-not-exist").unwrap();
        assert_eq!(settings.booking.daily_limit, 5);
        assert_eq!(settings.store, StoreKind::Memory);
        assert!(!settings.log.file);
        assert_eq!(
            settings.working_hours().unwrap().start(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_yaml_file_is_layered_under_environment() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "app:\n  working_hours:\n    start: \"09:00\"\n    end: \"17:00\"\nbooking:\n  daily_limit: 2\nexport:\n  csv_dir: /tmp/scheduler-exports"
        )
        .unwrap();
        unsafe {
            std::env::set_var("SCHEDULER__BOOKING__DAILY_LIMIT", "4");
        }

        let path = file.path().to_str().unwrap().to_string();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.booking.daily_limit, 4);
        assert_eq!(
            settings.export.csv_dir,
            PathBuf::from("/tmp/scheduler-exports")
        );
        assert_eq!(
            settings.working_hours().unwrap().to_string(),
            "09:00:00 - 17:00:00"
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_inverted_working_hours_are_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("SCHEDULER__APP__WORKING_HOURS__START", "19:00");
        }

        assert!(Settings::from_file("does-not-exist").is_err());

        clear_env();
    }
}
