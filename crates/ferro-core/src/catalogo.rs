//! # Catalog Filtering
//!
//! In-memory filtering, state classification, and pagination for the product
//! catalog.
//!
//! ## Filter Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Read Pipeline                               │
//! │                                                                         │
//! │  full catalog (active + inactive)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. free-text search  (case-insensitive substring on nombre/codigo)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. categoría equality                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. estado filter     (bajo-stock | activo | inactivo, exclusive)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. pagination slice  ← LAST, so metadata reflects filtered counts     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The order is part of the contract: pagination metadata (total items,
//! total pages) must describe the FILTERED result set, never the raw table.

use serde::{Deserialize, Serialize};

use crate::types::{EstadoProducto, Producto};

/// Default page size when the caller sends none.
pub const LIMITE_PAGINA_DEFECTO: u32 = 10;

/// Upper bound on page size, to keep responses bounded.
pub const LIMITE_PAGINA_MAXIMO: u32 = 100;

// =============================================================================
// Filter & Pagination Types
// =============================================================================

/// Catalog query arguments, straight from the HTTP query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltroCatalogo {
    /// Case-insensitive substring matched against nombre and codigo.
    pub busqueda: Option<String>,
    /// Category equality filter.
    pub categoria: Option<i64>,
    /// Mutually exclusive state filter.
    pub estado: Option<EstadoProducto>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Pagination metadata, computed AFTER filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginacion {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: u32,
}

/// One page of filtered catalog plus its metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginaCatalogo {
    pub productos: Vec<Producto>,
    pub paginacion: Paginacion,
}

// =============================================================================
// Filtering
// =============================================================================

/// Applies search, category, and state filters in order, then paginates.
///
/// Deterministic: identical input and filter arguments yield an identical
/// page and identical metadata.
pub fn filtrar_catalogo(catalogo: Vec<Producto>, filtro: &FiltroCatalogo) -> PaginaCatalogo {
    let busqueda = filtro
        .busqueda
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_lowercase);

    let filtrados: Vec<Producto> = catalogo
        .into_iter()
        .filter(|p| match &busqueda {
            Some(b) => {
                p.nombre.to_lowercase().contains(b) || p.codigo.to_lowercase().contains(b)
            }
            None => true,
        })
        .filter(|p| match filtro.categoria {
            Some(cat) => p.categoria_id == Some(cat),
            None => true,
        })
        .filter(|p| match filtro.estado {
            Some(estado) => p.estado() == estado,
            None => true,
        })
        .collect();

    let limit = filtro
        .limit
        .unwrap_or(LIMITE_PAGINA_DEFECTO)
        .clamp(1, LIMITE_PAGINA_MAXIMO);
    let page = filtro.page.unwrap_or(1).max(1);

    let total = filtrados.len();
    let total_pages = (total as u32).div_ceil(limit).max(1);

    let inicio = ((page - 1) * limit) as usize;
    let productos: Vec<Producto> = filtrados
        .into_iter()
        .skip(inicio)
        .take(limit as usize)
        .collect();

    PaginaCatalogo {
        productos,
        paginacion: Paginacion {
            page,
            limit,
            total,
            total_pages,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn producto(id: i64, codigo: &str, nombre: &str, categoria: i64, stock: i64, minimo: i64, activo: bool) -> Producto {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Producto {
            id,
            codigo: codigo.to_string(),
            nombre: nombre.to_string(),
            descripcion: None,
            precio_venta: 10_000,
            precio_compra: 7_000,
            stock_actual: stock,
            stock_minimo: minimo,
            ubicacion: None,
            peso_gramos: None,
            dimensiones: None,
            categoria_id: Some(categoria),
            activo,
            creado_en: ts,
            actualizado_en: ts,
        }
    }

    fn catalogo() -> Vec<Producto> {
        vec![
            producto(1, "MART-001", "Martillo de uña", 1, 12, 3, true),
            producto(2, "MART-002", "Martillo de bola", 1, 3, 3, true),
            producto(3, "DEST-001", "Destornillador plano", 1, 0, 2, true),
            producto(4, "PINT-001", "Pintura blanca 1G", 3, 8, 2, false),
            producto(5, "TORN-001", "Tornillo drywall x100", 2, 500, 50, true),
        ]
    }

    #[test]
    fn test_busqueda_case_insensitive() {
        let filtro = FiltroCatalogo {
            busqueda: Some("martillo".to_string()),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        assert_eq!(pagina.productos.len(), 2);
        assert_eq!(pagina.paginacion.total, 2);
    }

    #[test]
    fn test_busqueda_por_codigo() {
        let filtro = FiltroCatalogo {
            busqueda: Some("dest-".to_string()),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        assert_eq!(pagina.productos.len(), 1);
        assert_eq!(pagina.productos[0].id, 3);
    }

    #[test]
    fn test_filtro_categoria() {
        let filtro = FiltroCatalogo {
            categoria: Some(1),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        assert_eq!(pagina.paginacion.total, 3);
    }

    #[test]
    fn test_filtro_estado_bajo_stock_incluye_frontera() {
        // Product 2 sits exactly at its minimum and must classify bajo-stock
        let filtro = FiltroCatalogo {
            estado: Some(EstadoProducto::BajoStock),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        let ids: Vec<i64> = pagina.productos.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_filtro_estado_inactivo_gana_a_bajo_stock() {
        // Product 4 is inactive; it must never appear under bajo-stock even
        // if its stock were low, and must appear under inactivo
        let filtro = FiltroCatalogo {
            estado: Some(EstadoProducto::Inactivo),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        assert_eq!(pagina.productos.len(), 1);
        assert_eq!(pagina.productos[0].id, 4);
    }

    #[test]
    fn test_paginacion_refleja_filtrado() {
        let filtro = FiltroCatalogo {
            categoria: Some(1),
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        // 3 filtered items, limit 2 → page 2 holds the last one
        assert_eq!(pagina.productos.len(), 1);
        assert_eq!(
            pagina.paginacion,
            Paginacion {
                page: 2,
                limit: 2,
                total: 3,
                total_pages: 2
            }
        );
    }

    #[test]
    fn test_paginacion_fuera_de_rango() {
        let filtro = FiltroCatalogo {
            page: Some(99),
            limit: Some(10),
            ..Default::default()
        };
        let pagina = filtrar_catalogo(catalogo(), &filtro);
        assert!(pagina.productos.is_empty());
        assert_eq!(pagina.paginacion.total, 5);
    }

    #[test]
    fn test_idempotencia() {
        let filtro = FiltroCatalogo {
            busqueda: Some("tor".to_string()),
            page: Some(1),
            limit: Some(5),
            ..Default::default()
        };
        let a = filtrar_catalogo(catalogo(), &filtro);
        let b = filtrar_catalogo(catalogo(), &filtro);
        assert_eq!(a.paginacion, b.paginacion);
        let ids_a: Vec<i64> = a.productos.iter().map(|p| p.id).collect();
        let ids_b: Vec<i64> = b.productos.iter().map(|p| p.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_catalogo_vacio() {
        let pagina = filtrar_catalogo(Vec::new(), &FiltroCatalogo::default());
        assert!(pagina.productos.is_empty());
        assert_eq!(pagina.paginacion.total, 0);
        assert_eq!(pagina.paginacion.total_pages, 1);
    }
}
