//! # Auth Gate
//!
//! Credential verification, lockout, role allow-list, and session issuance.
//!
//! ## The Gate Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     procesar_login Sequence                             │
//! │                                                                         │
//! │  1. Empty credential field?            → 400                           │
//! │     "Email/usuario y contraseña son requeridos"                        │
//! │                                                                         │
//! │  2. No active user+employee match?     → 401                           │
//! │                                                                         │
//! │  3. bloqueado_hasta still open?        → 423 (message carries the      │
//! │                                           formatted unlock time)       │
//! │                                                                         │
//! │  4. Role not in the allow-list enum?   → 403                           │
//! │                                                                         │
//! │  5. Password mismatch?                 → 401, counter + 1              │
//! │        └── fifth failure → lockout 15 minutes forward                  │
//! │                                                                         │
//! │  6. Match → reset counter, stamp ultimo_acceso, issue signed           │
//! │     HttpOnly SameSite=Strict cookie    → 200                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{cookie_de_cierre, cookie_de_sesion, verificar_password};
use crate::error::ApiError;
use crate::state::{AppState, SharedState};
use ferro_core::types::{Capacidad, RolSistema};
use ferro_core::validation::validar_credenciales;

/// Login form payload. Field names are the wire contract of the front-end
/// form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email_usuario: String,
    #[serde(default)]
    pub password: String,
}

/// What a successful login hands back (besides the cookie).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SesionEmitida {
    pub token: String,
    pub usuario_id: i64,
    pub usuario: String,
    pub nombre: String,
    pub rol: RolSistema,
    pub cargo: String,
}

/// Runs the full gate sequence. Split from the handler so the sequence is
/// testable without HTTP plumbing.
pub async fn procesar_login(
    state: &AppState,
    solicitud: &LoginRequest,
    ahora: DateTime<Utc>,
) -> Result<SesionEmitida, ApiError> {
    validar_credenciales(&solicitud.email_usuario, &solicitud.password)?;

    let usuarios = state.db.usuarios();

    let acceso = usuarios
        .buscar_acceso(solicitud.email_usuario.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Credenciales inválidas"))?;

    if let Some(hasta) = acceso.bloqueado_hasta {
        if hasta > ahora {
            return Err(ApiError::locked(format!(
                "Cuenta bloqueada por intentos fallidos. Intente nuevamente a las {}",
                hasta.format("%H:%M")
            )));
        }
    }

    let rol = RolSistema::parse(&acceso.rol_sistema)
        .filter(|rol| rol.puede(Capacidad::AccederSistema))
        .ok_or_else(|| {
            warn!(usuario = %acceso.usuario, rol = %acceso.rol_sistema, "Rol sin acceso al sistema");
            ApiError::forbidden("Su cargo no tiene acceso al sistema")
        })?;

    if !verificar_password(&solicitud.password, &acceso.password_hash) {
        usuarios.registrar_fallo(acceso.id, ahora).await?;
        return Err(ApiError::unauthorized("Credenciales inválidas"));
    }

    usuarios.registrar_acceso_exitoso(acceso.id, ahora).await?;

    let token = state.sesiones.emitir(&acceso, rol, ahora)?;

    info!(usuario = %acceso.usuario, rol = %rol.nombre(), "Inicio de sesión exitoso");

    Ok(SesionEmitida {
        token,
        usuario_id: acceso.id,
        usuario: acceso.usuario,
        nombre: acceso.empleado_nombre,
        rol,
        cargo: acceso.cargo_nombre,
    })
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    Json(solicitud): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sesion = procesar_login(&state, &solicitud, Utc::now()).await?;

    let cookie = cookie_de_sesion(&sesion.token, state.sesiones.lifetime_secs());

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "success": true,
            "usuario": {
                "id": sesion.usuario_id,
                "usuario": sesion.usuario,
                "nombre": sesion.nombre,
                "rol": sesion.rol,
                "cargo": sesion.cargo,
            },
        })),
    ))
}

/// POST /api/auth/logout - clears the session cookie.
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, cookie_de_cierre())]),
        Json(json!({ "success": true })),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::config::ServerConfig;
    use axum::http::StatusCode;
    use chrono::{Duration, TimeZone};
    use ferro_db::repository::usuario::{DatosEmpleado, DatosUsuario};
    use ferro_db::{Database, DbConfig};

    fn ahora() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 10, 0, 0).unwrap()
    }

    fn config() -> ServerConfig {
        ServerConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            jwt_secret: "secreto-de-prueba".to_string(),
            sesion_lifetime_secs: 3600,
            numeracion_estricta: false,
        }
    }

    async fn estado_con_usuario(cargo_id: i64) -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let usuarios = db.usuarios();

        let empleado_id = usuarios
            .crear_empleado(&DatosEmpleado {
                nombre: "Ana Torres".to_string(),
                documento: "52123456".to_string(),
                telefono: None,
                cargo_id,
            })
            .await
            .unwrap();

        usuarios
            .crear(
                &DatosUsuario {
                    empleado_id,
                    usuario: "atorres".to_string(),
                    email: "ana@ferro.local".to_string(),
                    password_hash: hash_password("secreta123").unwrap(),
                },
                ahora(),
            )
            .await
            .unwrap();

        AppState::new(db, config())
    }

    fn solicitud(email_usuario: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email_usuario: email_usuario.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_campos_vacios_400_mensaje_exacto() {
        let estado = estado_con_usuario(2).await;

        let err = procesar_login(&estado, &solicitud("", ""), ahora())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Email/usuario y contraseña son requeridos");
    }

    #[tokio::test]
    async fn test_usuario_inexistente_401() {
        let estado = estado_con_usuario(2).await;

        let err = procesar_login(&estado, &solicitud("nadie@ferro.local", "x"), ahora())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_exitoso_por_email_y_usuario() {
        let estado = estado_con_usuario(2).await;

        let sesion = procesar_login(&estado, &solicitud("ana@ferro.local", "secreta123"), ahora())
            .await
            .unwrap();
        assert_eq!(sesion.rol, RolSistema::Cajero);
        assert_eq!(sesion.nombre, "Ana Torres");

        // Token validates against the same manager
        let claims = estado.sesiones.validar(&sesion.token).unwrap();
        assert_eq!(claims.usuario_id(), Some(sesion.usuario_id));

        let sesion = procesar_login(&estado, &solicitud("atorres", "secreta123"), ahora())
            .await
            .unwrap();
        assert_eq!(sesion.usuario, "atorres");
    }

    #[tokio::test]
    async fn test_rol_sin_acceso_403() {
        // Cargo 3 is the seeded Bodeguero: valid credentials, no access
        let estado = estado_con_usuario(3).await;

        let err = procesar_login(&estado, &solicitud("atorres", "secreta123"), ahora())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_quinto_fallo_bloquea_y_sexto_recibe_423() {
        let estado = estado_con_usuario(2).await;
        let mala = solicitud("atorres", "clave-mala");

        for _ in 0..5 {
            let err = procesar_login(&estado, &mala, ahora()).await.unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }

        // Sixth attempt inside the window: 423 with the unlock time
        let err = procesar_login(&estado, &mala, ahora()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::LOCKED);
        let hora = (ahora() + Duration::minutes(15)).format("%H:%M").to_string();
        assert!(err.message.contains(&hora), "mensaje: {}", err.message);

        // Even the right password is rejected while locked
        let err = procesar_login(&estado, &solicitud("atorres", "secreta123"), ahora())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::LOCKED);
    }

    #[tokio::test]
    async fn test_bloqueo_expira_y_exito_resetea() {
        let estado = estado_con_usuario(2).await;
        let mala = solicitud("atorres", "clave-mala");

        for _ in 0..5 {
            procesar_login(&estado, &mala, ahora()).await.unwrap_err();
        }

        // Past the window the account opens again
        let despues = ahora() + Duration::minutes(16);
        let sesion = procesar_login(&estado, &solicitud("atorres", "secreta123"), despues)
            .await
            .unwrap();
        assert_eq!(sesion.usuario, "atorres");

        let acceso = estado
            .db
            .usuarios()
            .buscar_acceso("atorres")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(acceso.intentos_fallidos, 0);
        assert!(acceso.bloqueado_hasta.is_none());
    }
}
