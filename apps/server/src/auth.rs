//! Session authentication module.
//!
//! Signed, time-limited session tokens carried in an HttpOnly cookie, plus
//! the password-hashing helpers the login flow uses.
//!
//! ## Cookie Contract
//! `ferro_sesion=<jwt>; Path=/; HttpOnly; SameSite=Strict; Max-Age=<secs>`
//!
//! The payload carries user id, nombre, rol, and cargo; the middleware
//! validates it on every request under `/api` and injects the claims into
//! request extensions for handlers to consume.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::SharedState;
use ferro_core::types::{RolSistema, UsuarioAcceso};

/// Name of the session cookie.
pub const COOKIE_SESION: &str = "ferro_sesion";

/// Session claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Display name of the employee behind the account
    pub nombre: String,

    /// System role, parsed once at login
    pub rol: RolSistema,

    /// Cargo name (job title)
    pub cargo: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Token id (unique per session)
    pub jti: String,
}

impl Claims {
    /// User id as integer.
    pub fn usuario_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Session token manager.
#[derive(Debug, Clone)]
pub struct SesionManager {
    secret: String,
    lifetime_secs: i64,
}

impl SesionManager {
    /// Create a new session manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        SesionManager {
            secret,
            lifetime_secs,
        }
    }

    /// Session lifetime in seconds (cookie Max-Age).
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue a session token for an authenticated user.
    pub fn emitir(
        &self,
        acceso: &UsuarioAcceso,
        rol: RolSistema,
        ahora: DateTime<Utc>,
    ) -> Result<String, ApiError> {
        let exp = ahora + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: acceso.id.to_string(),
            nombre: acceso.empleado_nombre.clone(),
            rol,
            cargo: acceso.cargo_nombre.clone(),
            iat: ahora.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("No se pudo emitir la sesión: {}", e)))
    }

    /// Validate and decode a session token.
    pub fn validar(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::unauthorized("Sesión inválida o expirada"))?;

        Ok(token_data.claims)
    }
}

// =============================================================================
// Cookies
// =============================================================================

/// Builds the Set-Cookie value for a fresh session.
pub fn cookie_de_sesion(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        COOKIE_SESION, token, max_age_secs
    )
}

/// Builds the Set-Cookie value that clears the session (logout).
pub fn cookie_de_cierre() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        COOKIE_SESION
    )
}

/// Extracts the session token from the request's Cookie header.
pub fn token_de_cookies(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|par| {
        let par = par.trim();
        par.strip_prefix(COOKIE_SESION)
            .and_then(|resto| resto.strip_prefix('='))
            .map(str::to_string)
    })
}

// =============================================================================
// Middleware
// =============================================================================

/// Gate middleware for every protected route: validates the session cookie
/// and injects [`Claims`] into request extensions.
pub async fn requerir_sesion(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_de_cookies(req.headers())
        .ok_or_else(|| ApiError::unauthorized("Sesión requerida"))?;

    let claims = state.sesiones.validar(&token)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::internal(format!("No se pudo hashear la contraseña: {}", e)))
}

/// Verifies a password against a stored PHC hash. An unparseable hash
/// counts as a mismatch, never as a server error.
pub fn verificar_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn acceso() -> UsuarioAcceso {
        UsuarioAcceso {
            id: 7,
            usuario: "atorres".to_string(),
            email: "ana@ferro.local".to_string(),
            password_hash: String::new(),
            intentos_fallidos: 0,
            bloqueado_hasta: None,
            empleado_nombre: "Ana Torres".to_string(),
            cargo_nombre: "Cajero de Mostrador".to_string(),
            rol_sistema: "Cajero".to_string(),
        }
    }

    #[test]
    fn test_sesion_roundtrip() {
        let manager = SesionManager::new("test-secret".to_string(), 3600);

        let token = manager.emitir(&acceso(), RolSistema::Cajero, Utc::now()).unwrap();
        let claims = manager.validar(&token).unwrap();

        assert_eq!(claims.usuario_id(), Some(7));
        assert_eq!(claims.nombre, "Ana Torres");
        assert_eq!(claims.rol, RolSistema::Cajero);
        assert_eq!(claims.cargo, "Cajero de Mostrador");
    }

    #[test]
    fn test_sesion_expirada_rechazada() {
        let manager = SesionManager::new("test-secret".to_string(), 3600);

        // Issued far enough in the past to be expired beyond leeway
        let pasado = Utc::now() - Duration::hours(3);
        let token = manager.emitir(&acceso(), RolSistema::Cajero, pasado).unwrap();

        assert!(manager.validar(&token).is_err());
    }

    #[test]
    fn test_secreto_distinto_rechazado() {
        let emisor = SesionManager::new("secreto-a".to_string(), 3600);
        let receptor = SesionManager::new("secreto-b".to_string(), 3600);

        let token = emisor.emitir(&acceso(), RolSistema::Cajero, Utc::now()).unwrap();
        assert!(receptor.validar(&token).is_err());
    }

    #[test]
    fn test_cookie_atributos() {
        let cookie = cookie_de_sesion("abc123", 28800);
        assert!(cookie.starts_with("ferro_sesion=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=28800"));

        assert!(cookie_de_cierre().contains("Max-Age=0"));
    }

    #[test]
    fn test_token_de_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "otra=1; ferro_sesion=eltoken; mas=2".parse().unwrap(),
        );
        assert_eq!(token_de_cookies(&headers), Some("eltoken".to_string()));

        let mut sin = HeaderMap::new();
        sin.insert(COOKIE, "otra=1".parse().unwrap());
        assert_eq!(token_de_cookies(&sin), None);
    }

    #[test]
    fn test_password_hash_y_verificacion() {
        let hash = hash_password("ferret3ria!").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verificar_password("ferret3ria!", &hash));
        assert!(!verificar_password("otra-clave", &hash));
        assert!(!verificar_password("ferret3ria!", "no-es-un-hash"));
    }
}
