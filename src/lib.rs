//! Clinical triage and pharmacy dispensation core.
//!
//! Patients submit symptom reports, a pluggable predictor attaches a
//! provisional diagnosis, and clinicians settle each case exactly once:
//! approve, reject, or correct. Settled verdicts notify the patient and land
//! in an audit trail. On the pharmacy side, prescriptions are dispensed
//! against batch-level inventory with atomic stock deduction and demand
//! signals for downstream forecasting.
//!
//! Everything persists to a single SQLite database; see [`db::sqlite`] for
//! opening and migrating it.

pub mod config;
pub mod db;
pub mod dispense;
pub mod models;
pub mod predict;
pub mod stats;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Safe to call more than once; the
/// second call is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
