//! # Company Info Routes
//!
//! The singleton row every invoice snapshots. Reads fall back to built-in
//! defaults; updating is an Administrador operation.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::types::{Capacidad, Empresa};
use ferro_core::validation::validar_nombre;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaRequest {
    pub nombre: String,
    pub nit: String,
    pub direccion: String,
    pub telefono: String,
    pub email: String,
}

/// GET /api/empresa
pub async fn obtener(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let empresa = state.db.empresa().obtener().await?;

    Ok(Json(json!({
        "success": true,
        "empresa": empresa,
    })))
}

/// PUT /api/empresa
pub async fn actualizar(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(solicitud): Json<EmpresaRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !claims.rol.puede(Capacidad::GestionarUsuarios) {
        return Err(ApiError::forbidden(
            "Su cargo no puede modificar los datos de la empresa",
        ));
    }

    validar_nombre(&solicitud.nombre)?;
    if solicitud.nit.trim().is_empty() {
        return Err(ApiError::validation("nit es requerido"));
    }

    let empresa = Empresa {
        nombre: solicitud.nombre.trim().to_string(),
        nit: solicitud.nit.trim().to_string(),
        direccion: solicitud.direccion.trim().to_string(),
        telefono: solicitud.telefono.trim().to_string(),
        email: solicitud.email.trim().to_string(),
    };

    state.db.empresa().guardar(&empresa).await?;

    Ok(Json(json!({
        "success": true,
        "empresa": empresa,
    })))
}
