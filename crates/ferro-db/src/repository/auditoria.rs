//! # Auditoría Repository
//!
//! Append-only audit trail for state transitions. The writer runs on the
//! caller's transaction connection so an audit row can never outlive a
//! rolled-back change, and a committed change can never lack its row.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;

/// One audit-trail entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistroAuditoria {
    pub id: i64,
    pub entidad: String,
    pub entidad_id: i64,
    pub valor_anterior: String,
    pub valor_nuevo: String,
    pub actor: String,
    pub motivo: String,
    pub creado_en: DateTime<Utc>,
}

/// Writes an audit entry on the given connection.
///
/// Called from inside multi-statement transactions (invoice annulment);
/// takes the raw connection instead of the pool for exactly that reason.
#[allow(clippy::too_many_arguments)]
pub async fn registrar_con(
    conn: &mut SqliteConnection,
    entidad: &str,
    entidad_id: i64,
    valor_anterior: &str,
    valor_nuevo: &str,
    actor: &str,
    motivo: &str,
    creado_en: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO auditoria (
            entidad, entidad_id, valor_anterior, valor_nuevo, actor, motivo, creado_en
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(entidad)
    .bind(entidad_id)
    .bind(valor_anterior)
    .bind(valor_nuevo)
    .bind(actor)
    .bind(motivo)
    .bind(creado_en)
    .execute(conn)
    .await?;

    Ok(())
}

/// Repository for reading the audit trail.
#[derive(Debug, Clone)]
pub struct AuditoriaRepository {
    pool: SqlitePool,
}

impl AuditoriaRepository {
    /// Creates a new AuditoriaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditoriaRepository { pool }
    }

    /// Lists the trail of one entity, oldest first.
    pub async fn listar_por_entidad(
        &self,
        entidad: &str,
        entidad_id: i64,
    ) -> DbResult<Vec<RegistroAuditoria>> {
        let registros: Vec<RegistroAuditoria> = sqlx::query_as(
            "SELECT id, entidad, entidad_id, valor_anterior, valor_nuevo, actor, motivo, creado_en
             FROM auditoria
             WHERE entidad = ?1 AND entidad_id = ?2
             ORDER BY id",
        )
        .bind(entidad)
        .bind(entidad_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registros)
    }
}
