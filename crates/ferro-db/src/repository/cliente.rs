//! # Cliente Repository
//!
//! Client registry CRUD. Invoices snapshot client fields at creation time,
//! so edits here never rewrite billing history.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ferro_core::types::Cliente;

const COLUMNAS: &str =
    "id, tipo_documento, documento, nombre, telefono, email, direccion, activo, creado_en";

/// Input for creating or updating a client.
#[derive(Debug, Clone)]
pub struct DatosCliente {
    pub tipo_documento: String,
    pub documento: String,
    pub nombre: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
}

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClienteRepository {
    pool: SqlitePool,
}

impl ClienteRepository {
    /// Creates a new ClienteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClienteRepository { pool }
    }

    /// Lists clients, optionally filtered by a name/document substring.
    pub async fn listar(&self, busqueda: Option<&str>) -> DbResult<Vec<Cliente>> {
        let patron = format!("%{}%", busqueda.unwrap_or("").trim());

        let sql = format!(
            "SELECT {COLUMNAS} FROM clientes
             WHERE nombre LIKE ?1 OR documento LIKE ?1
             ORDER BY nombre"
        );
        let clientes: Vec<Cliente> = sqlx::query_as(&sql)
            .bind(&patron)
            .fetch_all(&self.pool)
            .await?;

        Ok(clientes)
    }

    /// Gets a client by id.
    pub async fn obtener_por_id(&self, id: i64) -> DbResult<Option<Cliente>> {
        let sql = format!("SELECT {COLUMNAS} FROM clientes WHERE id = ?1");
        let cliente: Option<Cliente> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cliente)
    }

    /// Gets a client by documento.
    pub async fn obtener_por_documento(&self, documento: &str) -> DbResult<Option<Cliente>> {
        let sql = format!("SELECT {COLUMNAS} FROM clientes WHERE documento = ?1");
        let cliente: Option<Cliente> = sqlx::query_as(&sql)
            .bind(documento)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cliente)
    }

    /// Inserts a new client. Documento uniqueness is checked up front.
    pub async fn crear(&self, datos: &DatosCliente, ahora: DateTime<Utc>) -> DbResult<Cliente> {
        debug!(documento = %datos.documento, "Creando cliente");

        if self.obtener_por_documento(&datos.documento).await?.is_some() {
            return Err(DbError::duplicado("documento", datos.documento.clone()));
        }

        let resultado = sqlx::query(
            "INSERT INTO clientes (
                tipo_documento, documento, nombre, telefono, email, direccion, activo, creado_en
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        )
        .bind(&datos.tipo_documento)
        .bind(&datos.documento)
        .bind(&datos.nombre)
        .bind(&datos.telefono)
        .bind(&datos.email)
        .bind(&datos.direccion)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        let id = resultado.last_insert_rowid();
        self.obtener_por_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Cliente", id))
    }

    /// Updates an existing client.
    pub async fn actualizar(&self, id: i64, datos: &DatosCliente) -> DbResult<Cliente> {
        if let Some(existente) = self.obtener_por_documento(&datos.documento).await? {
            if existente.id != id {
                return Err(DbError::duplicado("documento", datos.documento.clone()));
            }
        }

        let resultado = sqlx::query(
            "UPDATE clientes SET
                tipo_documento = ?2,
                documento = ?3,
                nombre = ?4,
                telefono = ?5,
                email = ?6,
                direccion = ?7
            WHERE id = ?1",
        )
        .bind(id)
        .bind(&datos.tipo_documento)
        .bind(&datos.documento)
        .bind(&datos.nombre)
        .bind(&datos.telefono)
        .bind(&datos.email)
        .bind(&datos.direccion)
        .execute(&self.pool)
        .await?;

        if resultado.rows_affected() == 0 {
            return Err(DbError::not_found("Cliente", id));
        }

        self.obtener_por_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Cliente", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
