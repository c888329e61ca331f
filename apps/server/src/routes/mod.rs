//! # HTTP Routes
//!
//! Router assembly. Everything under `/api` except the login endpoint sits
//! behind the session-cookie middleware; `/health` is open for probes.

pub mod auth;
pub mod clientes;
pub mod empresa;
pub mod facturas;
pub mod productos;
pub mod reportes;
pub mod usuarios;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::auth::requerir_sesion;
use crate::state::SharedState;

/// Builds the full application router.
pub fn router(state: SharedState) -> Router {
    let publicas = Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login));

    let protegidas = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/ventas", post(facturas::crear_venta))
        .route("/api/facturas", get(facturas::listar))
        .route("/api/facturas/:id", get(facturas::obtener))
        .route("/api/facturas/:id/anular", post(facturas::anular))
        .route("/api/facturas/:id/imprimir", get(facturas::imprimir))
        .route(
            "/api/productos",
            get(productos::listar).post(productos::crear),
        )
        .route(
            "/api/productos/:id",
            get(productos::obtener)
                .put(productos::actualizar)
                .delete(productos::desactivar),
        )
        .route(
            "/api/clientes",
            get(clientes::listar).post(clientes::crear),
        )
        .route(
            "/api/clientes/:id",
            get(clientes::obtener).put(clientes::actualizar),
        )
        .route(
            "/api/usuarios",
            get(usuarios::listar).post(usuarios::crear),
        )
        .route("/api/usuarios/:id/desactivar", post(usuarios::desactivar))
        .route(
            "/api/empresa",
            get(empresa::obtener).put(empresa::actualizar),
        )
        .route("/api/reportes/ventas", get(reportes::ventas_del_dia))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            requerir_sesion,
        ));

    Router::new()
        .merge(publicas)
        .merge(protegidas)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: answers 200 while the pool can execute queries.
async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded" })),
        )
    }
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::config::ServerConfig;
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use ferro_db::repository::producto::DatosProducto;
    use ferro_db::repository::usuario::{DatosEmpleado, DatosUsuario};
    use ferro_db::{Database, DbConfig};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let usuarios = db.usuarios();

        // One admin, one cashier (seeded cargos: 1 admin, 2 cajero)
        for (cargo_id, nombre, usuario, email) in [
            (1, "Luis Mora", "lmora", "luis@ferro.local"),
            (2, "Ana Torres", "atorres", "ana@ferro.local"),
        ] {
            let empleado_id = usuarios
                .crear_empleado(&DatosEmpleado {
                    nombre: nombre.to_string(),
                    documento: format!("doc-{usuario}"),
                    telefono: None,
                    cargo_id,
                })
                .await
                .unwrap();
            usuarios
                .crear(
                    &DatosUsuario {
                        empleado_id,
                        usuario: usuario.to_string(),
                        email: email.to_string(),
                        password_hash: hash_password("secreta123").unwrap(),
                    },
                    Utc::now(),
                )
                .await
                .unwrap();
        }

        db.productos()
            .crear(
                &DatosProducto {
                    codigo: "MART-001".to_string(),
                    nombre: "Martillo de uña".to_string(),
                    descripcion: None,
                    precio_venta: 25_000,
                    precio_compra: 18_000,
                    stock_actual: 10,
                    stock_minimo: 2,
                    ubicacion: None,
                    peso_gramos: None,
                    dimensiones: None,
                    categoria_id: Some(1),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let config = ServerConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            jwt_secret: "secreto-de-prueba".to_string(),
            sesion_lifetime_secs: 3600,
            numeracion_estricta: false,
        };

        router(Arc::new(AppState::new(db, config)))
    }

    fn peticion_json(metodo: &str, uri: &str, cuerpo: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(metodo)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(cuerpo.to_string()))
            .unwrap()
    }

    async fn iniciar_sesion(app: &Router, usuario: &str) -> String {
        let respuesta = app
            .clone()
            .oneshot(peticion_json(
                "POST",
                "/api/auth/login",
                json!({ "email_usuario": usuario, "password": "secreta123" }),
            ))
            .await
            .unwrap();
        assert_eq!(respuesta.status(), StatusCode::OK);

        let cookie = respuesta
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    async fn cuerpo_json(respuesta: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(respuesta.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_abierto() {
        let app = app().await;
        let respuesta = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(respuesta.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_sin_sesion_401() {
        let app = app().await;
        let respuesta = app
            .oneshot(
                Request::builder()
                    .uri("/api/productos")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(respuesta.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_malo_envuelve_error() {
        let app = app().await;
        let respuesta = app
            .oneshot(peticion_json(
                "POST",
                "/api/auth/login",
                json!({ "email_usuario": "", "password": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(respuesta.status(), StatusCode::BAD_REQUEST);

        let cuerpo = cuerpo_json(respuesta).await;
        assert_eq!(cuerpo["success"], false);
        assert_eq!(cuerpo["error"], "Email/usuario y contraseña son requeridos");
    }

    #[tokio::test]
    async fn test_flujo_venta_completo() {
        let app = app().await;
        let cookie = iniciar_sesion(&app, "atorres").await;

        // Catalog behind the cookie
        let respuesta = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/productos?estado=activo")
                    .header(header::COOKIE, cookie.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(respuesta.status(), StatusCode::OK);
        let cuerpo = cuerpo_json(respuesta).await;
        assert_eq!(cuerpo["paginacion"]["total"], 1);

        // Register the sale
        let venta = json!({
            "cliente": {
                "tipoDocumento": "CC",
                "documento": "1020304050",
                "nombre": "Carlos Rojas",
                "telefono": null
            },
            "items": [{
                "productoId": 1,
                "codigo": "MART-001",
                "nombre": "Martillo de uña",
                "cantidad": 2,
                "precioUnitario": 25000
            }],
            "subtotal": 50000,
            "iva": 0,
            "total": 50000,
            "metodoPago": "efectivo",
            "montoRecibido": 60000,
            "observaciones": null
        });
        let mut peticion = peticion_json("POST", "/api/ventas", venta);
        peticion
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let respuesta = app.clone().oneshot(peticion).await.unwrap();
        assert_eq!(respuesta.status(), StatusCode::OK);

        let cuerpo = cuerpo_json(respuesta).await;
        assert_eq!(cuerpo["success"], true);
        assert!(cuerpo["numeroFactura"]
            .as_str()
            .unwrap()
            .starts_with("FAC-"));
        assert_eq!(cuerpo["factura"]["cambio"], 10000);

        // The printable document renders
        let respuesta = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/facturas/1/imprimir")
                    .header(header::COOKIE, cookie.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(respuesta.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cajero_no_gestiona_usuarios() {
        let app = app().await;
        let cookie = iniciar_sesion(&app, "atorres").await;

        let mut peticion = peticion_json(
            "POST",
            "/api/usuarios",
            json!({
                "nombre": "Nuevo Empleado",
                "documento": "123",
                "telefono": null,
                "cargoId": 2,
                "usuario": "nuevo1",
                "email": "nuevo@ferro.local",
                "password": "clave-larga-123"
            }),
        );
        peticion
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let respuesta = app.clone().oneshot(peticion).await.unwrap();
        assert_eq!(respuesta.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_gestiona_usuarios() {
        let app = app().await;
        let cookie = iniciar_sesion(&app, "lmora").await;

        let mut peticion = peticion_json(
            "POST",
            "/api/usuarios",
            json!({
                "nombre": "Nuevo Empleado",
                "documento": "123456",
                "telefono": null,
                "cargoId": 2,
                "usuario": "nuevo1",
                "email": "nuevo@ferro.local",
                "password": "clave-larga-123"
            }),
        );
        peticion
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let respuesta = app.clone().oneshot(peticion).await.unwrap();
        assert_eq!(respuesta.status(), StatusCode::OK);

        let cuerpo = cuerpo_json(respuesta).await;
        assert_eq!(cuerpo["usuario"]["usuario"], "nuevo1");
        // The hash never leaves the server
        assert!(cuerpo["usuario"].get("passwordHash").is_none());
    }
}
