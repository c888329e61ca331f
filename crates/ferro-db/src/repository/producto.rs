//! # Producto Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Full-catalog fetch (filtering happens in ferro-core, in memory)
//! - CRUD with pre-checked codigo uniqueness
//! - Guarded stock adjustments
//!
//! ## Why Fetch the Whole Catalog?
//! The catalog filter contract applies search, category, and state filters
//! in a fixed order and paginates LAST, with metadata reflecting filtered
//! counts. A hardware store's catalog is a few thousand rows; pulling it
//! once and filtering in memory keeps the rules in one pure, testable place
//! (`ferro_core::catalogo`) instead of scattering them across SQL.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ferro_core::types::Producto;

/// Columns selected for every product query, in `Producto` field order.
const COLUMNAS: &str = "id, codigo, nombre, descripcion, precio_venta, precio_compra, \
     stock_actual, stock_minimo, ubicacion, peso_gramos, dimensiones, \
     categoria_id, activo, creado_en, actualizado_en";

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct DatosProducto {
    pub codigo: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_venta: i64,
    pub precio_compra: i64,
    pub stock_actual: i64,
    pub stock_minimo: i64,
    pub ubicacion: Option<String>,
    pub peso_gramos: Option<i64>,
    pub dimensiones: Option<String>,
    pub categoria_id: Option<i64>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductoRepository {
    pool: SqlitePool,
}

impl ProductoRepository {
    /// Creates a new ProductoRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductoRepository { pool }
    }

    /// Fetches the full catalog, active and inactive, ordered by nombre.
    pub async fn listar_todos(&self) -> DbResult<Vec<Producto>> {
        let sql = format!("SELECT {COLUMNAS} FROM productos ORDER BY nombre");
        let productos: Vec<Producto> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        debug!(count = productos.len(), "Catálogo cargado");
        Ok(productos)
    }

    /// Gets a product by its internal id.
    pub async fn obtener_por_id(&self, id: i64) -> DbResult<Option<Producto>> {
        let sql = format!("SELECT {COLUMNAS} FROM productos WHERE id = ?1");
        let producto: Option<Producto> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(producto)
    }

    /// Gets a product by its business codigo.
    pub async fn obtener_por_codigo(&self, codigo: &str) -> DbResult<Option<Producto>> {
        let sql = format!("SELECT {COLUMNAS} FROM productos WHERE codigo = ?1");
        let producto: Option<Producto> = sqlx::query_as(&sql)
            .bind(codigo)
            .fetch_optional(&self.pool)
            .await?;

        Ok(producto)
    }

    /// Inserts a new product.
    ///
    /// Codigo uniqueness is checked up front so the caller gets a proper
    /// duplicate error instead of a raw constraint failure.
    pub async fn crear(&self, datos: &DatosProducto, ahora: DateTime<Utc>) -> DbResult<Producto> {
        debug!(codigo = %datos.codigo, "Creando producto");

        if self.obtener_por_codigo(&datos.codigo).await?.is_some() {
            return Err(DbError::duplicado("codigo", datos.codigo.clone()));
        }

        let resultado = sqlx::query(
            "INSERT INTO productos (
                codigo, nombre, descripcion, precio_venta, precio_compra,
                stock_actual, stock_minimo, ubicacion, peso_gramos, dimensiones,
                categoria_id, activo, creado_en, actualizado_en
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?12, ?12)",
        )
        .bind(&datos.codigo)
        .bind(&datos.nombre)
        .bind(&datos.descripcion)
        .bind(datos.precio_venta)
        .bind(datos.precio_compra)
        .bind(datos.stock_actual)
        .bind(datos.stock_minimo)
        .bind(&datos.ubicacion)
        .bind(datos.peso_gramos)
        .bind(&datos.dimensiones)
        .bind(datos.categoria_id)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        let id = resultado.last_insert_rowid();
        self.obtener_por_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Producto", id))
    }

    /// Updates an existing product.
    ///
    /// When the codigo changes it must not collide with another product's.
    pub async fn actualizar(
        &self,
        id: i64,
        datos: &DatosProducto,
        ahora: DateTime<Utc>,
    ) -> DbResult<Producto> {
        debug!(id = %id, "Actualizando producto");

        if let Some(existente) = self.obtener_por_codigo(&datos.codigo).await? {
            if existente.id != id {
                return Err(DbError::duplicado("codigo", datos.codigo.clone()));
            }
        }

        let resultado = sqlx::query(
            "UPDATE productos SET
                codigo = ?2,
                nombre = ?3,
                descripcion = ?4,
                precio_venta = ?5,
                precio_compra = ?6,
                stock_actual = ?7,
                stock_minimo = ?8,
                ubicacion = ?9,
                peso_gramos = ?10,
                dimensiones = ?11,
                categoria_id = ?12,
                actualizado_en = ?13
            WHERE id = ?1",
        )
        .bind(id)
        .bind(&datos.codigo)
        .bind(&datos.nombre)
        .bind(&datos.descripcion)
        .bind(datos.precio_venta)
        .bind(datos.precio_compra)
        .bind(datos.stock_actual)
        .bind(datos.stock_minimo)
        .bind(&datos.ubicacion)
        .bind(datos.peso_gramos)
        .bind(&datos.dimensiones)
        .bind(datos.categoria_id)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        if resultado.rows_affected() == 0 {
            return Err(DbError::not_found("Producto", id));
        }

        self.obtener_por_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Producto", id))
    }

    /// Soft-deletes a product by setting activo = 0.
    ///
    /// Historical invoices keep their snapshots, so the row must survive.
    pub async fn desactivar(&self, id: i64, ahora: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Desactivando producto");

        let resultado = sqlx::query(
            "UPDATE productos SET activo = 0, actualizado_en = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        if resultado.rows_affected() == 0 {
            return Err(DbError::not_found("Producto", id));
        }

        Ok(())
    }

    /// Adjusts stock by a delta (positive restock, negative correction).
    ///
    /// Sale decrements do NOT go through here - they run inside the invoice
    /// transaction with their own guard.
    pub async fn ajustar_stock(&self, id: i64, delta: i64, ahora: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Ajustando stock");

        let resultado = sqlx::query(
            "UPDATE productos
             SET stock_actual = stock_actual + ?2, actualizado_en = ?3
             WHERE id = ?1 AND stock_actual + ?2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        if resultado.rows_affected() == 0 {
            return Err(DbError::not_found("Producto", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn contar(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE activo = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
