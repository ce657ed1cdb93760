//! Logging utilities for regrid.
//!
//! Weight generation and weight loading are slow, blocking foreground calls;
//! these helpers give them structured, searchable log lines.

use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = generate_operation_id();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    let duration = start.elapsed();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log an error with context
pub fn log_error(error: &crate::error::RegridError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique operation ID
pub fn generate_operation_id() -> String {
    Uuid::new_v4().to_string()
}
