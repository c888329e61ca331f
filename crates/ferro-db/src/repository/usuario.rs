//! # Usuario Repository
//!
//! User accounts and the failed-login lockout counter.
//!
//! ## Lockout Bookkeeping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Failed-Login Counter Lifecycle                         │
//! │                                                                         │
//! │  password mismatch ──► registrar_fallo()                               │
//! │                            │                                            │
//! │                            ├── intentos_fallidos + 1 < 5 → keep count  │
//! │                            │                                            │
//! │                            └── reaches 5 → bloqueado_hasta =           │
//! │                                now + 15 min, counter restarts at 0     │
//! │                                                                         │
//! │  password match ──► registrar_acceso_exitoso()                         │
//! │                         └── counter = 0, bloqueado_hasta = NULL,       │
//! │                             ultimo_acceso stamped                      │
//! │                                                                         │
//! │  The gate itself (status codes, role allow-list) lives in the server;  │
//! │  this repository only persists the counter and the expiry.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use ferro_core::types::{Usuario, UsuarioAcceso};
use ferro_core::{MAX_INTENTOS_LOGIN, MINUTOS_BLOQUEO};

const COLUMNAS: &str = "id, empleado_id, usuario, email, password_hash, activo, \
     intentos_fallidos, bloqueado_hasta, ultimo_acceso, creado_en";

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct DatosUsuario {
    pub empleado_id: i64,
    pub usuario: String,
    pub email: String,
    /// Already hashed - hashing is the server's concern.
    pub password_hash: String,
}

/// Input for creating an employee.
#[derive(Debug, Clone)]
pub struct DatosEmpleado {
    pub nombre: String,
    pub documento: String,
    pub telefono: Option<String>,
    pub cargo_id: i64,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UsuarioRepository {
    pool: SqlitePool,
}

impl UsuarioRepository {
    /// Creates a new UsuarioRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UsuarioRepository { pool }
    }

    /// Auth-gate lookup: active user + active employee + cargo by email OR
    /// username, in one join.
    pub async fn buscar_acceso(&self, email_o_usuario: &str) -> DbResult<Option<UsuarioAcceso>> {
        let fila: Option<UsuarioAcceso> = sqlx::query_as(
            "SELECT u.id, u.usuario, u.email, u.password_hash,
                    u.intentos_fallidos, u.bloqueado_hasta,
                    e.nombre AS empleado_nombre,
                    c.nombre AS cargo_nombre,
                    c.rol_sistema
             FROM usuarios u
             JOIN empleados e ON e.id = u.empleado_id
             JOIN cargos c ON c.id = e.cargo_id
             WHERE (u.email = ?1 OR u.usuario = ?1)
               AND u.activo = 1 AND e.activo = 1",
        )
        .bind(email_o_usuario)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fila)
    }

    /// Records a failed login. Returns the new lockout expiry when this
    /// failure crossed the threshold, `None` otherwise.
    pub async fn registrar_fallo(
        &self,
        id: i64,
        ahora: DateTime<Utc>,
    ) -> DbResult<Option<DateTime<Utc>>> {
        let intentos: i64 = sqlx::query_scalar(
            "UPDATE usuarios SET intentos_fallidos = intentos_fallidos + 1
             WHERE id = ?1
             RETURNING intentos_fallidos",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if intentos < MAX_INTENTOS_LOGIN {
            debug!(usuario_id = %id, intentos, "Intento de login fallido");
            return Ok(None);
        }

        // Threshold reached: lock 15 minutes forward and restart the
        // counter for the next cycle
        let hasta = ahora + Duration::minutes(MINUTOS_BLOQUEO);
        sqlx::query(
            "UPDATE usuarios SET bloqueado_hasta = ?2, intentos_fallidos = 0 WHERE id = ?1",
        )
        .bind(id)
        .bind(hasta)
        .execute(&self.pool)
        .await?;

        warn!(usuario_id = %id, hasta = %hasta, "Cuenta bloqueada por intentos fallidos");
        Ok(Some(hasta))
    }

    /// Records a successful login: clears counter and lockout, stamps
    /// ultimo_acceso.
    pub async fn registrar_acceso_exitoso(&self, id: i64, ahora: DateTime<Utc>) -> DbResult<()> {
        sqlx::query(
            "UPDATE usuarios
             SET intentos_fallidos = 0, bloqueado_hasta = NULL, ultimo_acceso = ?2
             WHERE id = ?1",
        )
        .bind(id)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts an employee and returns its id.
    pub async fn crear_empleado(&self, datos: &DatosEmpleado) -> DbResult<i64> {
        let resultado = sqlx::query(
            "INSERT INTO empleados (nombre, documento, telefono, cargo_id, activo)
             VALUES (?1, ?2, ?3, ?4, 1)",
        )
        .bind(&datos.nombre)
        .bind(&datos.documento)
        .bind(&datos.telefono)
        .bind(datos.cargo_id)
        .execute(&self.pool)
        .await?;

        Ok(resultado.last_insert_rowid())
    }

    /// Inserts a user account. Username and email uniqueness are checked up
    /// front for clean duplicate errors.
    pub async fn crear(&self, datos: &DatosUsuario, ahora: DateTime<Utc>) -> DbResult<Usuario> {
        debug!(usuario = %datos.usuario, "Creando usuario");

        let existente: Option<i64> =
            sqlx::query_scalar("SELECT id FROM usuarios WHERE usuario = ?1")
                .bind(&datos.usuario)
                .fetch_optional(&self.pool)
                .await?;
        if existente.is_some() {
            return Err(DbError::duplicado("usuario", datos.usuario.clone()));
        }

        let existente: Option<i64> = sqlx::query_scalar("SELECT id FROM usuarios WHERE email = ?1")
            .bind(&datos.email)
            .fetch_optional(&self.pool)
            .await?;
        if existente.is_some() {
            return Err(DbError::duplicado("email", datos.email.clone()));
        }

        let resultado = sqlx::query(
            "INSERT INTO usuarios (
                empleado_id, usuario, email, password_hash, activo,
                intentos_fallidos, creado_en
            ) VALUES (?1, ?2, ?3, ?4, 1, 0, ?5)",
        )
        .bind(datos.empleado_id)
        .bind(&datos.usuario)
        .bind(&datos.email)
        .bind(&datos.password_hash)
        .bind(ahora)
        .execute(&self.pool)
        .await?;

        let id = resultado.last_insert_rowid();
        self.obtener_por_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Usuario", id))
    }

    /// Gets a user account by id.
    pub async fn obtener_por_id(&self, id: i64) -> DbResult<Option<Usuario>> {
        let sql = format!("SELECT {COLUMNAS} FROM usuarios WHERE id = ?1");
        let usuario: Option<Usuario> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(usuario)
    }

    /// Lists all user accounts.
    pub async fn listar(&self) -> DbResult<Vec<Usuario>> {
        let sql = format!("SELECT {COLUMNAS} FROM usuarios ORDER BY usuario");
        let usuarios: Vec<Usuario> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(usuarios)
    }

    /// Deactivates a user account (it stops matching the auth lookup).
    pub async fn desactivar(&self, id: i64) -> DbResult<()> {
        let resultado = sqlx::query("UPDATE usuarios SET activo = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if resultado.rows_affected() == 0 {
            return Err(DbError::not_found("Usuario", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
