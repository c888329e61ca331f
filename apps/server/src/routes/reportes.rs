//! # Report Routes
//!
//! Daily sales summary over active invoices.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::types::Capacidad;

#[derive(Debug, Default, Deserialize)]
pub struct ReporteVentasQuery {
    /// Day to summarize, `YYYY-MM-DD`. Defaults to today.
    pub fecha: Option<String>,
}

/// GET /api/reportes/ventas?fecha=YYYY-MM-DD
pub async fn ventas_del_dia(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReporteVentasQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !claims.rol.puede(Capacidad::VerReportes) {
        return Err(ApiError::forbidden("Su cargo no puede ver reportes"));
    }

    let fecha = match query.fecha.as_deref() {
        Some(texto) => NaiveDate::parse_from_str(texto, "%Y-%m-%d")
            .map_err(|_| ApiError::validation("fecha tiene formato inválido, use YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let resumen = state.db.facturas().resumen_del_dia(fecha).await?;

    Ok(Json(json!({
        "success": true,
        "resumen": resumen,
    })))
}
