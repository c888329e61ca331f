//! # Product Catalog Routes
//!
//! Catalog listing with the fixed filter pipeline, plus CRUD. The filtering
//! itself lives in `ferro_core::catalogo`; this module only wires it to
//! HTTP and enforces capabilities.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::catalogo::{filtrar_catalogo, FiltroCatalogo};
use ferro_core::types::{Capacidad, EstadoProducto, Producto};
use ferro_core::validation::{validar_codigo, validar_nombre, validar_precio};
use ferro_db::repository::producto::DatosProducto;

/// Catalog item as the API exposes it: the row plus its derived fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductoDto {
    #[serde(flatten)]
    producto: Producto,
    estado: EstadoProducto,
    margen: i64,
}

impl From<Producto> for ProductoDto {
    fn from(producto: Producto) -> Self {
        let estado = producto.estado();
        let margen = producto.margen();
        ProductoDto {
            producto,
            estado,
            margen,
        }
    }
}

/// Create/update payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductoRequest {
    pub codigo: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_venta: i64,
    #[serde(default)]
    pub precio_compra: i64,
    #[serde(default)]
    pub stock_actual: i64,
    #[serde(default)]
    pub stock_minimo: i64,
    pub ubicacion: Option<String>,
    pub peso_gramos: Option<i64>,
    pub dimensiones: Option<String>,
    pub categoria_id: Option<i64>,
}

impl ProductoRequest {
    fn validar(&self) -> Result<DatosProducto, ApiError> {
        validar_codigo(&self.codigo)?;
        validar_nombre(&self.nombre)?;
        validar_precio(self.precio_venta)?;
        validar_precio(self.precio_compra)?;
        if self.stock_actual < 0 || self.stock_minimo < 0 {
            return Err(ApiError::validation("El stock no puede ser negativo"));
        }

        Ok(DatosProducto {
            codigo: self.codigo.trim().to_string(),
            nombre: self.nombre.trim().to_string(),
            descripcion: self.descripcion.clone(),
            precio_venta: self.precio_venta,
            precio_compra: self.precio_compra,
            stock_actual: self.stock_actual,
            stock_minimo: self.stock_minimo,
            ubicacion: self.ubicacion.clone(),
            peso_gramos: self.peso_gramos,
            dimensiones: self.dimensiones.clone(),
            categoria_id: self.categoria_id,
        })
    }
}

fn requerir_gestion(claims: &Claims) -> Result<(), ApiError> {
    if !claims.rol.puede(Capacidad::GestionarCatalogo) {
        return Err(ApiError::forbidden(
            "Su cargo no puede gestionar el catálogo",
        ));
    }
    Ok(())
}

/// GET /api/productos - full pipeline: search → categoría → estado →
/// pagination, with metadata over the filtered set.
pub async fn listar(
    State(state): State<SharedState>,
    Query(filtro): Query<FiltroCatalogo>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let catalogo = state.db.productos().listar_todos().await?;
    let pagina = filtrar_catalogo(catalogo, &filtro);

    let productos: Vec<ProductoDto> = pagina.productos.into_iter().map(ProductoDto::from).collect();

    Ok(Json(json!({
        "success": true,
        "productos": productos,
        "paginacion": pagina.paginacion,
    })))
}

/// GET /api/productos/:id
pub async fn obtener(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let producto = state
        .db
        .productos()
        .obtener_por_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Producto", id))?;

    Ok(Json(json!({
        "success": true,
        "producto": ProductoDto::from(producto),
    })))
}

/// POST /api/productos
pub async fn crear(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(solicitud): Json<ProductoRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    requerir_gestion(&claims)?;
    let datos = solicitud.validar()?;

    let producto = state.db.productos().crear(&datos, Utc::now()).await?;
    info!(codigo = %producto.codigo, actor = %claims.nombre, "Producto creado");

    Ok(Json(json!({
        "success": true,
        "producto": ProductoDto::from(producto),
    })))
}

/// PUT /api/productos/:id
pub async fn actualizar(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(solicitud): Json<ProductoRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    requerir_gestion(&claims)?;
    let datos = solicitud.validar()?;

    let producto = state.db.productos().actualizar(id, &datos, Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "producto": ProductoDto::from(producto),
    })))
}

/// DELETE /api/productos/:id - soft delete; history keeps its snapshots.
pub async fn desactivar(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    requerir_gestion(&claims)?;

    state.db.productos().desactivar(id, Utc::now()).await?;
    info!(producto_id = %id, actor = %claims.nombre, "Producto desactivado");

    Ok(Json(json!({ "success": true })))
}
