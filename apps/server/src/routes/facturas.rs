//! # Invoice Routes
//!
//! Sale → invoice creation, lookup with line items, filtered listing,
//! annulment, and the printable document.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::money::Money;
use ferro_core::types::{Capacidad, DetalleFactura, Factura, NuevaVenta};
use ferro_core::validation::validar_venta;
use ferro_db::FiltroFacturas;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListarFacturasQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub cliente: Option<String>,
    pub numero_factura: Option<String>,
}

/// Annulment payload.
#[derive(Debug, Deserialize)]
pub struct AnularRequest {
    #[serde(default)]
    pub motivo: String,
}

/// POST /api/ventas - the invoice-creation boundary.
///
/// The payload is validated here; the assembler trusts quantities and
/// prices once the transaction opens.
pub async fn crear_venta(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(venta): Json<NuevaVenta>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !claims.rol.puede(Capacidad::Facturar) {
        return Err(ApiError::forbidden("Su cargo no puede registrar ventas"));
    }

    validar_venta(&venta)?;

    let creada = state
        .db
        .facturas()
        .crear_desde_venta(
            &venta,
            &claims.nombre,
            Utc::now(),
            state.config.numeracion_estricta,
        )
        .await?;

    info!(
        numero = %creada.numero,
        actor = %claims.nombre,
        degradado = creada.degradado,
        "Venta registrada"
    );

    Ok(Json(json!({
        "success": true,
        "factura": creada.factura,
        "numeroFactura": creada.numero,
        "numeracionDegradada": creada.degradado,
    })))
}

/// GET /api/facturas - newest first, filtered and paginated.
pub async fn listar(
    State(state): State<SharedState>,
    Query(query): Query<ListarFacturasQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filtro = FiltroFacturas {
        page: query.page,
        limit: query.limit,
        cliente: query.cliente,
        numero_factura: query.numero_factura,
    };

    let (facturas, paginacion) = state.db.facturas().listar(&filtro).await?;

    Ok(Json(json!({
        "success": true,
        "facturas": facturas,
        "pagination": paginacion,
    })))
}

/// GET /api/facturas/:id - header plus its line items.
pub async fn obtener(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = state.db.facturas();

    let factura = repo
        .obtener_por_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Factura", id))?;
    let detalles = repo.obtener_detalles(id).await?;

    Ok(Json(json!({
        "success": true,
        "factura": factura,
        "detalles": detalles,
    })))
}

/// POST /api/facturas/:id/anular - one-way transition with audit trail.
pub async fn anular(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(solicitud): Json<AnularRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !claims.rol.puede(Capacidad::AnularFacturas) {
        return Err(ApiError::forbidden("Su cargo no puede anular facturas"));
    }

    let motivo = solicitud.motivo.trim();
    if motivo.is_empty() {
        return Err(ApiError::validation("motivo es requerido"));
    }

    let factura = state
        .db
        .facturas()
        .anular(id, motivo, &claims.nombre, Utc::now())
        .await?;

    Ok(Json(json!({
        "success": true,
        "factura": factura,
    })))
}

/// GET /api/facturas/:id/imprimir - server-rendered printable document.
pub async fn imprimir(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let repo = state.db.facturas();

    let factura = repo
        .obtener_por_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Factura", id))?;
    let detalles = repo.obtener_detalles(id).await?;

    Ok(Html(documento_imprimible(&factura, &detalles)))
}

/// Builds the printable invoice: company header, client block, line-item
/// table, totals. Generated from the same header + line-item data the
/// assembler produced.
fn documento_imprimible(factura: &Factura, detalles: &[DetalleFactura]) -> String {
    let filas: String = detalles
        .iter()
        .map(|d| {
            format!(
                "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td>\
                 <td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                escapar(&d.producto_codigo),
                escapar(&d.producto_nombre),
                d.cantidad,
                Money::from_pesos(d.precio_unitario),
                Money::from_pesos(d.subtotal_linea),
            )
        })
        .collect();

    let anulada = match factura.estado {
        ferro_core::types::EstadoFactura::Anulada => {
            "<p class=\"anulada\">FACTURA ANULADA</p>"
        }
        _ => "",
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Factura {numero}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; max-width: 720px; margin: 2em auto; }}\n\
         table {{ width: 100%; border-collapse: collapse; }}\n\
         th, td {{ border-bottom: 1px solid #ccc; padding: 4px 8px; text-align: left; }}\n\
         .num {{ text-align: right; }}\n\
         .totales {{ margin-top: 1em; text-align: right; }}\n\
         .anulada {{ color: #b00; font-weight: bold; }}\n\
         </style>\n</head>\n<body>\n\
         <h1>{empresa_nombre}</h1>\n\
         <p>NIT {empresa_nit}<br>{empresa_direccion}<br>\
         Tel. {empresa_telefono} · {empresa_email}</p>\n\
         <h2>Factura {numero}</h2>\n\
         {anulada}\n\
         <p><strong>Cliente:</strong> {cliente_nombre}<br>\
         {cliente_tipo} {cliente_documento}</p>\n\
         <table>\n<thead><tr><th>Código</th><th>Producto</th>\
         <th class=\"num\">Cant.</th><th class=\"num\">Precio</th>\
         <th class=\"num\">Subtotal</th></tr></thead>\n\
         <tbody>{filas}</tbody>\n</table>\n\
         <div class=\"totales\">\n\
         <p>Subtotal: {subtotal}<br>IVA: {iva}<br>\
         <strong>Total: {total}</strong></p>\n\
         </div>\n</body>\n</html>\n",
        numero = escapar(&factura.numero),
        empresa_nombre = escapar(&factura.empresa_nombre),
        empresa_nit = escapar(&factura.empresa_nit),
        empresa_direccion = escapar(&factura.empresa_direccion),
        empresa_telefono = escapar(&factura.empresa_telefono),
        empresa_email = escapar(&factura.empresa_email),
        anulada = anulada,
        cliente_nombre = escapar(&factura.cliente_nombre),
        cliente_tipo = escapar(&factura.cliente_tipo_documento),
        cliente_documento = escapar(&factura.cliente_documento),
        filas = filas,
        subtotal = Money::from_pesos(factura.subtotal),
        iva = Money::from_pesos(factura.iva),
        total = Money::from_pesos(factura.total),
    )
}

/// Minimal HTML escaping for snapshot text.
fn escapar(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// Unit Tests
// =============================================================================
