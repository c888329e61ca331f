//! # User Management Routes
//!
//! Account administration. Every operation here requires the
//! GestionarUsuarios capability, which only Administrador carries.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::{hash_password, Claims};
use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::types::Capacidad;
use ferro_core::validation::validar_nombre;
use ferro_db::repository::usuario::{DatosEmpleado, DatosUsuario};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearUsuarioRequest {
    pub nombre: String,
    pub documento: String,
    pub telefono: Option<String>,
    pub cargo_id: i64,
    pub usuario: String,
    pub email: String,
    pub password: String,
}

fn requerir_administracion(claims: &Claims) -> Result<(), ApiError> {
    if !claims.rol.puede(Capacidad::GestionarUsuarios) {
        return Err(ApiError::forbidden("Su cargo no puede gestionar usuarios"));
    }
    Ok(())
}

/// GET /api/usuarios
pub async fn listar(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    requerir_administracion(&claims)?;

    let usuarios = state.db.usuarios().listar().await?;

    Ok(Json(json!({
        "success": true,
        "usuarios": usuarios,
    })))
}

/// POST /api/usuarios - creates the employee and its account in one call.
pub async fn crear(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(solicitud): Json<CrearUsuarioRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    requerir_administracion(&claims)?;

    validar_nombre(&solicitud.nombre)?;
    if solicitud.usuario.trim().len() < 4 {
        return Err(ApiError::validation("usuario debe tener mínimo 4 caracteres"));
    }
    if solicitud.password.len() < 8 {
        return Err(ApiError::validation(
            "contraseña debe tener mínimo 8 caracteres",
        ));
    }
    if !solicitud.email.contains('@') {
        return Err(ApiError::validation("email tiene formato inválido"));
    }

    let repo = state.db.usuarios();

    let empleado_id = repo
        .crear_empleado(&DatosEmpleado {
            nombre: solicitud.nombre.trim().to_string(),
            documento: solicitud.documento.trim().to_string(),
            telefono: solicitud.telefono.clone(),
            cargo_id: solicitud.cargo_id,
        })
        .await?;

    let usuario = repo
        .crear(
            &DatosUsuario {
                empleado_id,
                usuario: solicitud.usuario.trim().to_string(),
                email: solicitud.email.trim().to_string(),
                password_hash: hash_password(&solicitud.password)?,
            },
            Utc::now(),
        )
        .await?;

    info!(usuario = %usuario.usuario, actor = %claims.nombre, "Usuario creado");

    Ok(Json(json!({
        "success": true,
        "usuario": usuario,
    })))
}

/// POST /api/usuarios/:id/desactivar
pub async fn desactivar(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    requerir_administracion(&claims)?;

    state.db.usuarios().desactivar(id).await?;
    info!(usuario_id = %id, actor = %claims.nombre, "Usuario desactivado");

    Ok(Json(json!({ "success": true })))
}
