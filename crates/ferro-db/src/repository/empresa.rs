//! # Empresa Repository
//!
//! The company-info singleton. Invoice creation reads this row through its
//! own transaction; this repository serves the admin-facing read/update.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use ferro_core::types::Empresa;

/// Repository for the company singleton row.
#[derive(Debug, Clone)]
pub struct EmpresaRepository {
    pool: SqlitePool,
}

impl EmpresaRepository {
    /// Creates a new EmpresaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmpresaRepository { pool }
    }

    /// Reads the company info, falling back to built-in defaults when the
    /// row has never been configured.
    pub async fn obtener(&self) -> DbResult<Empresa> {
        let empresa: Option<Empresa> = sqlx::query_as(
            "SELECT nombre, nit, direccion, telefono, email FROM empresa WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(empresa.unwrap_or_else(Empresa::por_defecto))
    }

    /// Creates or replaces the singleton row.
    pub async fn guardar(&self, empresa: &Empresa) -> DbResult<()> {
        debug!(nombre = %empresa.nombre, "Guardando datos de empresa");

        sqlx::query(
            "INSERT INTO empresa (id, nombre, nit, direccion, telefono, email)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (id) DO UPDATE SET
                 nombre = excluded.nombre,
                 nit = excluded.nit,
                 direccion = excluded.direccion,
                 telefono = excluded.telefono,
                 email = excluded.email",
        )
        .bind(&empresa.nombre)
        .bind(&empresa.nit)
        .bind(&empresa.direccion)
        .bind(&empresa.telefono)
        .bind(&empresa.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_defecto_cuando_no_configurada() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let empresa = db.empresa().obtener().await.unwrap();
        assert_eq!(empresa.nombre, Empresa::por_defecto().nombre);
    }

    #[tokio::test]
    async fn test_guardar_y_releer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.empresa();

        let propia = Empresa {
            nombre: "Ferretería El Tornillo Feliz".to_string(),
            nit: "901.234.567-8".to_string(),
            direccion: "Carrera 45 # 12-80".to_string(),
            telefono: "(604) 444-0101".to_string(),
            email: "contacto@tornillofeliz.co".to_string(),
        };
        repo.guardar(&propia).await.unwrap();

        let leida = repo.obtener().await.unwrap();
        assert_eq!(leida.nombre, propia.nombre);
        assert_eq!(leida.nit, propia.nit);

        // Saving again replaces, never duplicates
        repo.guardar(&propia).await.unwrap();
        let filas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM empresa")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(filas, 1);
    }
}
