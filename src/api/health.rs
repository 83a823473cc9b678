/// Health check endpoints for liveness and readiness probes
///
/// Supports two types of probes:
/// - Liveness: Is the application alive? (restart if not)
/// - Readiness: Can the application serve traffic? (database reachable and migrated)

use crate::{
    context::AppContext,
    db::migrations::{applied_versions, MIGRATIONS},
    error::AppResult,
};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Health status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall status: "healthy", "degraded", or "unhealthy"
    pub status: String,

    pub version: String,

    pub uptime_seconds: f64,

    pub checks: Vec<ComponentHealth>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health status of individual component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,

    /// Status: "healthy", "degraded", or "unhealthy"
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/health/live", get(liveness_probe))
        .route("/health/ready", get(readiness_probe))
        .route("/health/detailed", get(health_detailed))
}

/// Basic health check
pub async fn health_basic() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Liveness probe. If we can respond, we're alive.
pub async fn liveness_probe() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe. Returns 503 until the database answers and every migration is applied.
pub async fn readiness_probe(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if let Err(e) = check_database(&ctx).await {
        tracing::warn!(error = %e, "readiness_probe_failed: database check failed");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    match pending_migrations(&ctx).await {
        Ok(0) => {}
        Ok(pending) => {
            tracing::warn!(pending, "readiness_probe_failed: migrations pending");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness_probe_failed: migration check failed");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    Ok(Json(serde_json::json!({
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION")
    })))
}

/// Detailed health check with all component statuses
pub async fn health_detailed(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthStatus>) {
    let start = Instant::now();

    let checks = vec![
        check_database_detailed(&ctx).await,
        check_migrations_detailed(&ctx).await,
        check_complaints_detailed(&ctx).await,
    ];

    let overall_status = determine_overall_status(&checks);

    let health = HealthStatus {
        status: overall_status.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: ctx.started_at.elapsed().as_secs_f64(),
        checks,
        message: if overall_status == "healthy" {
            None
        } else {
            Some("One or more components are unhealthy".to_string())
        },
    };

    let status_code = match overall_status.as_str() {
        "healthy" => StatusCode::OK,
        "degraded" => StatusCode::OK, // Still serving traffic
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    tracing::info!(
        status = %overall_status,
        duration_ms = start.elapsed().as_millis(),
        "health_check_completed"
    );

    (status_code, Json(health))
}

async fn check_database(ctx: &AppContext) -> AppResult<()> {
    sqlx::query("SELECT 1").fetch_one(&ctx.db).await?;
    Ok(())
}

async fn pending_migrations(ctx: &AppContext) -> AppResult<usize> {
    let applied = applied_versions(&ctx.db).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|v| v == m.version))
        .count())
}

fn component(
    name: &str,
    start: Instant,
    result: Result<(&str, serde_json::Value), String>,
) -> ComponentHealth {
    let response_time_ms = Some(start.elapsed().as_millis() as u64);
    match result {
        Ok((status, details)) => ComponentHealth {
            name: name.to_string(),
            status: status.to_string(),
            response_time_ms,
            error: None,
            details: Some(details),
        },
        Err(error) => ComponentHealth {
            name: name.to_string(),
            status: "unhealthy".to_string(),
            response_time_ms,
            error: Some(error),
            details: None,
        },
    }
}

async fn check_database_detailed(ctx: &AppContext) -> ComponentHealth {
    let start = Instant::now();
    let result = check_database(ctx)
        .await
        .map(|_| {
            (
                "healthy",
                serde_json::json!({
                    "type": "sqlite",
                    "pool_size": ctx.db.size(),
                }),
            )
        })
        .map_err(|e| e.to_string());
    component("database", start, result)
}

async fn check_migrations_detailed(ctx: &AppContext) -> ComponentHealth {
    let start = Instant::now();
    let result = pending_migrations(ctx)
        .await
        .map(|pending| {
            let status = if pending == 0 { "healthy" } else { "degraded" };
            (
                status,
                serde_json::json!({
                    "known": MIGRATIONS.len(),
                    "pending": pending,
                }),
            )
        })
        .map_err(|e| e.to_string());
    component("migrations", start, result)
}

async fn check_complaints_detailed(ctx: &AppContext) -> ComponentHealth {
    let start = Instant::now();
    let result = ctx
        .complaint_manager
        .status_summary()
        .await
        .map(|summary| ("healthy", serde_json::json!(summary)))
        .map_err(|e| e.to_string());
    component("complaints", start, result)
}

/// Determine overall health status from individual checks
fn determine_overall_status(checks: &[ComponentHealth]) -> String {
    let unhealthy_count = checks.iter().filter(|c| c.status == "unhealthy").count();
    let degraded_count = checks.iter().filter(|c| c.status == "degraded").count();

    if unhealthy_count > 0 {
        "unhealthy".to_string()
    } else if degraded_count > 0 {
        "degraded".to_string()
    } else {
        "healthy".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, status: &str) -> ComponentHealth {
        ComponentHealth {
            name: name.to_string(),
            status: status.to_string(),
            response_time_ms: Some(5),
            error: None,
            details: None,
        }
    }

    #[test]
    fn test_determine_overall_status() {
        assert_eq!(
            determine_overall_status(&[check("database", "healthy"), check("complaints", "healthy")]),
            "healthy"
        );
        assert_eq!(
            determine_overall_status(&[check("database", "healthy"), check("migrations", "degraded")]),
            "degraded"
        );
        assert_eq!(
            determine_overall_status(&[check("database", "unhealthy"), check("migrations", "degraded")]),
            "unhealthy"
        );
    }

    #[test]
    fn test_failed_component_carries_error() {
        let health = component("database", Instant::now(), Err("locked".to_string()));
        assert_eq!(health.status, "unhealthy");
        assert_eq!(health.error.as_deref(), Some("locked"));

        let json = serde_json::to_string(&health).unwrap();
        assert!(!json.contains("details"));
    }
}
