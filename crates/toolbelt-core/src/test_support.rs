use std::sync::Mutex;

/// Held by tests that set `TOOLBELT_CONFIG`, `HOST`, `PORT` or the
/// `TOOLBELT_DOCTOR_*` overrides, since the environment is process-wide.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());
