//! # Client Routes
//!
//! Client registry. Any authenticated session can read and register
//! clients - cashiers create them at the counter mid-sale.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::validation::validar_nombre;
use ferro_db::repository::cliente::DatosCliente;

#[derive(Debug, Default, Deserialize)]
pub struct ListarClientesQuery {
    pub busqueda: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteRequest {
    #[serde(default = "tipo_documento_defecto")]
    pub tipo_documento: String,
    pub documento: String,
    pub nombre: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
}

fn tipo_documento_defecto() -> String {
    "CC".to_string()
}

impl ClienteRequest {
    fn validar(&self) -> Result<DatosCliente, ApiError> {
        validar_nombre(&self.nombre)?;
        if self.documento.trim().is_empty() {
            return Err(ApiError::validation("documento es requerido"));
        }

        Ok(DatosCliente {
            tipo_documento: self.tipo_documento.clone(),
            documento: self.documento.trim().to_string(),
            nombre: self.nombre.trim().to_string(),
            telefono: self.telefono.clone(),
            email: self.email.clone(),
            direccion: self.direccion.clone(),
        })
    }
}

/// GET /api/clientes
pub async fn listar(
    State(state): State<SharedState>,
    Query(query): Query<ListarClientesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let clientes = state
        .db
        .clientes()
        .listar(query.busqueda.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "clientes": clientes,
    })))
}

/// GET /api/clientes/:id
pub async fn obtener(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cliente = state
        .db
        .clientes()
        .obtener_por_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cliente", id))?;

    Ok(Json(json!({
        "success": true,
        "cliente": cliente,
    })))
}

/// POST /api/clientes
pub async fn crear(
    State(state): State<SharedState>,
    Json(solicitud): Json<ClienteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let datos = solicitud.validar()?;
    let cliente = state.db.clientes().crear(&datos, Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "cliente": cliente,
    })))
}

/// PUT /api/clientes/:id
pub async fn actualizar(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(solicitud): Json<ClienteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let datos = solicitud.validar()?;
    let cliente = state.db.clientes().actualizar(id, &datos).await?;

    Ok(Json(json!({
        "success": true,
        "cliente": cliente,
    })))
}
