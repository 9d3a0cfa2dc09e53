use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Application configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for uploaded files, partitioned into category subdirectories
    pub uploads_root: PathBuf,

    /// Root directory for static public assets (maintenance page, admin UI build)
    pub public_root: PathBuf,

    /// Session token signing key (Required in production)
    pub session_secret: String,

    /// Session token lifetime in hours (default: 720 = 30 days)
    pub session_max_age_hours: i64,

    /// Initial maintenance-mode flag; runtime state lives in [`MaintenanceState`]
    pub maintenance_mode: bool,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            uploads_root: PathBuf::from("public/uploads"),
            public_root: PathBuf::from("public"),
            session_secret: "dev-secret".to_string(),
            session_max_age_hours: 720,
            maintenance_mode: false,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            uploads_root: env::var("UPLOADS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.uploads_root),

            public_root: env::var("PUBLIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.public_root),

            // Fallback for dev convenience, strictly enforced in production method
            session_secret: env::var("SESSION_SECRET").unwrap_or(default.session_secret),

            session_max_age_hours: env::var("SESSION_MAX_AGE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_max_age_hours),

            maintenance_mode: read_maintenance_env(),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (relaxed secrets, local paths)
    pub fn development() -> Self {
        Self::default()
    }

    /// Create config for production (strict security)
    pub fn production() -> Self {
        let default = Self::default();
        Self {
            uploads_root: env::var("UPLOADS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.uploads_root),
            public_root: env::var("PUBLIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.public_root),
            session_secret: env::var("SESSION_SECRET")
                .expect("CRITICAL: SESSION_SECRET must be set"),
            session_max_age_hours: env::var("SESSION_MAX_AGE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_max_age_hours),
            maintenance_mode: read_maintenance_env(),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }
}

fn read_maintenance_env() -> bool {
    env::var("MAINTENANCE_MODE")
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false)
}

/// Runtime maintenance-mode flag.
///
/// Initialized from [`AppConfig`] at startup and changed only through
/// [`MaintenanceState::set`] or an explicit [`MaintenanceState::reload_from_env`]
/// call, so the request gate never reads process environment per request.
#[derive(Debug, Default)]
pub struct MaintenanceState {
    enabled: AtomicBool,
}

impl MaintenanceState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Re-read MAINTENANCE_MODE and return the new value
    pub fn reload_from_env(&self) -> bool {
        let enabled = read_maintenance_env();
        self.set(enabled);
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.session_max_age_hours, 720);
        assert!(!config.maintenance_mode);
        assert_eq!(config.uploads_root, PathBuf::from("public/uploads"));
    }

    #[test]
    fn test_from_env_origins_fallback() {
        unsafe { env::remove_var("ALLOWED_ORIGINS") };
        let config = AppConfig::from_env();
        let default_config = AppConfig::default();
        assert_eq!(config.allowed_origins, default_config.allowed_origins);
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }

    #[test]
    fn test_maintenance_state_toggles_without_env() {
        let state = MaintenanceState::new(false);
        assert!(!state.is_enabled());
        state.set(true);
        assert!(state.is_enabled());
        state.set(false);
        assert!(!state.is_enabled());
    }
}
