//! # Factura Repository
//!
//! Invoice numbering, transactional assembly, annulment, and listing.
//!
//! ## Invoice Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  crear_desde_venta Transaction                          │
//! │                                                                         │
//! │  BEGIN ──────────────────────────────────────────────── (started)      │
//! │    │                                                                    │
//! │    ├── 1. Allocate numero ON THIS CONNECTION                           │
//! │    │      └── consecutivos_factura: UPDATE ... RETURNING valor         │
//! │    │          (the opening write, so SQLite serializes concurrent      │
//! │    │           allocators; two sales can never read the same counter)  │
//! │    │                                                                    │
//! │    ├── 2. Read empresa singleton (defaults if absent)                  │
//! │    │                                                                    │
//! │    ├── 3. INSERT header (client + company snapshots, totals,           │
//! │    │      payment fields, metadata blob)                               │
//! │    │                                                                    │
//! │    ├── 4. Per line item:                                               │
//! │    │      ├── INSERT detalle (subtotal_linea = cantidad × precio)      │
//! │    │      └── UPDATE stock WHERE stock_actual >= cantidad              │
//! │    │          └── 0 rows → insufficient stock → ROLLBACK               │
//! │    │                                                                    │
//! │  COMMIT ─────────────────────────────────────────────── (committed)    │
//! │                                                                         │
//! │  Any error on the way: the Transaction drops, sqlx issues ROLLBACK,    │
//! │  and the connection returns to the pool ─────────────── (rolled-back)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numbering Degradation
//! A database error during allocation does NOT fail the sale: the number
//! degrades to `FAC-{epoch-millis}` and the result is flagged so strict
//! deployments can reject it before anything is committed.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::auditoria;
use ferro_core::catalogo::Paginacion;
use ferro_core::money::Money;
use ferro_core::numero::{self, NumeroFactura};
use ferro_core::types::{DetalleFactura, Empresa, Factura, MetadatosFactura, NuevaVenta};
use ferro_core::CoreError;

/// Columns selected for every invoice query, in `Factura` field order.
const COLUMNAS: &str = "id, numero, cliente_tipo_documento, cliente_documento, cliente_nombre, \
     cliente_telefono, empresa_nombre, empresa_nit, empresa_direccion, empresa_telefono, \
     empresa_email, subtotal, iva, total, metodo_pago, monto_recibido, cambio, \
     observaciones, metadatos, estado, creada_por, creada_en";

// =============================================================================
// Errors & Results
// =============================================================================

/// Errors out of invoice operations: database failures or business rule
/// violations detected mid-transaction.
#[derive(Debug, Error)]
pub enum FacturaError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Regla(#[from] CoreError),
}

impl From<sqlx::Error> for FacturaError {
    fn from(err: sqlx::Error) -> Self {
        FacturaError::Db(DbError::from(err))
    }
}

/// A successfully created invoice.
#[derive(Debug, Clone)]
pub struct FacturaCreada {
    pub factura: Factura,
    pub numero: String,
    /// True when the numero came from the timestamp fallback path.
    pub degradado: bool,
}

/// Listing filters for `GET /api/facturas`.
#[derive(Debug, Clone, Default)]
pub struct FiltroFacturas {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Substring match on the client-name snapshot.
    pub cliente: Option<String>,
    /// Substring match on the invoice numero.
    pub numero_factura: Option<String>,
}

/// Daily sales summary for reporting.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenVentas {
    pub fecha: String,
    pub facturas_activas: i64,
    pub total_vendido: i64,
    pub total_iva: i64,
    pub facturas_anuladas: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct FacturaRepository {
    pool: SqlitePool,
}

impl FacturaRepository {
    /// Creates a new FacturaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FacturaRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Numbering
    // -------------------------------------------------------------------------

    /// Allocates the next invoice number for the day, on the caller's
    /// transaction connection.
    ///
    /// The increment is a write against `consecutivos_factura`, so SQLite's
    /// write serialization guarantees two in-flight sales observe different
    /// counter values. Seeding a fresh day scans existing numbers with the
    /// day prefix (newest id first) and parses the trailing counter; an
    /// unparseable suffix seeds at 0.
    ///
    /// Never fails: allocation errors degrade to `FAC-{epoch-millis}`.
    async fn asignar_numero(
        conn: &mut SqliteConnection,
        hoy: NaiveDate,
        epoch_millis: i64,
    ) -> NumeroFactura {
        match Self::asignar_numero_estricto(conn, hoy).await {
            Ok(numero) => NumeroFactura::Asignado(numero),
            Err(err) => {
                warn!(error = %err, "Asignación de numero falló, usando fallback de timestamp");
                NumeroFactura::Degradado(numero::numero_degradado(epoch_millis))
            }
        }
    }

    async fn asignar_numero_estricto(
        conn: &mut SqliteConnection,
        hoy: NaiveDate,
    ) -> Result<String, sqlx::Error> {
        let prefijo = numero::prefijo_del_dia(hoy);
        let fecha = hoy.format("%Y-%m-%d").to_string();

        // The increment comes FIRST so the transaction's opening statement
        // is a write: concurrent sales queue on the write lock instead of
        // colliding on stale read snapshots
        let incrementado: Option<i64> = sqlx::query_scalar(
            "UPDATE consecutivos_factura SET valor = valor + 1 WHERE fecha = ?1 RETURNING valor",
        )
        .bind(&fecha)
        .fetch_optional(&mut *conn)
        .await?;

        let valor = match incrementado {
            Some(valor) => valor,
            None => {
                // First sale of the day: seed from the most recent matching
                // number, by descending internal id. An unparseable suffix
                // seeds at 0.
                let ultimo: Option<String> = sqlx::query_scalar(
                    "SELECT numero FROM facturas WHERE numero LIKE ?1 ORDER BY id DESC LIMIT 1",
                )
                .bind(format!("{}%", prefijo))
                .fetch_optional(&mut *conn)
                .await?;

                let base = ultimo
                    .as_deref()
                    .and_then(|n| numero::parsear_consecutivo(n, &prefijo))
                    .unwrap_or(0);

                sqlx::query(
                    "INSERT OR IGNORE INTO consecutivos_factura (fecha, valor) VALUES (?1, ?2)",
                )
                .bind(&fecha)
                .bind(base)
                .execute(&mut *conn)
                .await?;

                sqlx::query_scalar(
                    "UPDATE consecutivos_factura SET valor = valor + 1 WHERE fecha = ?1 RETURNING valor",
                )
                .bind(&fecha)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(numero::formatear(&prefijo, valor))
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Creates an invoice (header + line items) from a sale payload as a
    /// single atomic unit.
    ///
    /// ## Arguments
    /// * `venta` - validated sale payload (quantities and prices are the
    ///   HTTP layer's responsibility)
    /// * `creada_por` - username of the cashier
    /// * `ahora` - creation instant; also determines the numbering day
    /// * `rechazar_degradados` - strict deployments refuse timestamp
    ///   fallback numbers instead of committing them
    pub async fn crear_desde_venta(
        &self,
        venta: &NuevaVenta,
        creada_por: &str,
        ahora: DateTime<Utc>,
        rechazar_degradados: bool,
    ) -> Result<FacturaCreada, FacturaError> {
        if venta.items.is_empty() {
            return Err(CoreError::VentaVacia.into());
        }

        let mut tx = self.pool.begin().await?;

        // Allocation first: its UPDATE is the transaction's opening write,
        // which is what serializes concurrent sales (see asignar_numero)
        let numero = Self::asignar_numero(
            &mut *tx,
            ahora.date_naive(),
            ahora.timestamp_millis(),
        )
        .await;

        // Company snapshot, with built-in defaults when the row is absent
        let empresa: Empresa = sqlx::query_as(
            "SELECT nombre, nit, direccion, telefono, email FROM empresa WHERE id = 1",
        )
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or_else(Empresa::por_defecto);

        if numero.es_degradado() && rechazar_degradados {
            // Transaction drops here → rollback, nothing persisted
            return Err(CoreError::NumeroDegradadoRechazado {
                numero: numero.into_string(),
            }
            .into());
        }

        let degradado = numero.es_degradado();
        let numero = numero.into_string();

        let cambio = if venta.metodo_pago.es_efectivo() {
            venta
                .monto_recibido
                .map(|recibido| {
                    Money::from_pesos(venta.total)
                        .cambio_para(Money::from_pesos(recibido))
                        .pesos()
                })
        } else {
            None
        };

        let metadatos = serde_json::to_string(&MetadatosFactura::nueva(venta.items.len(), ahora))
            .map_err(|e| DbError::Internal(e.to_string()))?;

        debug!(numero = %numero, items = venta.items.len(), "Insertando cabecera de factura");

        let resultado = sqlx::query(
            "INSERT INTO facturas (
                numero,
                cliente_tipo_documento, cliente_documento, cliente_nombre, cliente_telefono,
                empresa_nombre, empresa_nit, empresa_direccion, empresa_telefono, empresa_email,
                subtotal, iva, total, metodo_pago, monto_recibido, cambio,
                observaciones, metadatos, estado, creada_por, creada_en
            ) VALUES (
                ?1,
                ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, 'activa', ?19, ?20
            )",
        )
        .bind(&numero)
        .bind(&venta.cliente.tipo_documento)
        .bind(&venta.cliente.documento)
        .bind(&venta.cliente.nombre)
        .bind(&venta.cliente.telefono)
        .bind(&empresa.nombre)
        .bind(&empresa.nit)
        .bind(&empresa.direccion)
        .bind(&empresa.telefono)
        .bind(&empresa.email)
        .bind(venta.subtotal)
        .bind(venta.iva)
        .bind(venta.total)
        .bind(venta.metodo_pago)
        .bind(venta.monto_recibido)
        .bind(cambio)
        .bind(venta.observaciones.as_deref().unwrap_or(""))
        .bind(&metadatos)
        .bind(creada_por)
        .bind(ahora)
        .execute(&mut *tx)
        .await?;

        let factura_id = resultado.last_insert_rowid();

        for item in &venta.items {
            let subtotal_linea = Money::from_pesos(item.precio_unitario)
                .por_cantidad(item.cantidad)
                .pesos();

            sqlx::query(
                "INSERT INTO factura_detalles (
                    factura_id, producto_id, producto_codigo, producto_nombre,
                    cantidad, precio_unitario, subtotal_linea
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(factura_id)
            .bind(item.producto_id)
            .bind(&item.codigo)
            .bind(&item.nombre)
            .bind(item.cantidad)
            .bind(item.precio_unitario)
            .bind(subtotal_linea)
            .execute(&mut *tx)
            .await?;

            // Stock decrement rides the same transaction, guarded so a sale
            // can never drive stock negative
            let descuento = sqlx::query(
                "UPDATE productos
                 SET stock_actual = stock_actual - ?1, actualizado_en = ?2
                 WHERE id = ?3 AND stock_actual >= ?1",
            )
            .bind(item.cantidad)
            .bind(ahora)
            .bind(item.producto_id)
            .execute(&mut *tx)
            .await?;

            if descuento.rows_affected() == 0 {
                let disponible: Option<i64> =
                    sqlx::query_scalar("SELECT stock_actual FROM productos WHERE id = ?1")
                        .bind(item.producto_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                tx.rollback().await?;

                return Err(match disponible {
                    Some(disponible) => CoreError::StockInsuficiente {
                        codigo: item.codigo.clone(),
                        disponible,
                        solicitado: item.cantidad,
                    },
                    None => CoreError::ProductoNoEncontrado(item.codigo.clone()),
                }
                .into());
            }
        }

        tx.commit().await?;

        info!(
            numero = %numero,
            total = %Money::from_pesos(venta.total),
            items = venta.items.len(),
            degradado,
            "Factura creada"
        );

        let factura = self
            .obtener_por_id(factura_id)
            .await?
            .ok_or_else(|| DbError::not_found("Factura", factura_id))?;

        Ok(FacturaCreada {
            factura,
            numero,
            degradado,
        })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets an invoice header by id.
    pub async fn obtener_por_id(&self, id: i64) -> DbResult<Option<Factura>> {
        let sql = format!("SELECT {COLUMNAS} FROM facturas WHERE id = ?1");
        let factura: Option<Factura> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(factura)
    }

    /// Gets an invoice header by its numero.
    pub async fn obtener_por_numero(&self, numero: &str) -> DbResult<Option<Factura>> {
        let sql = format!("SELECT {COLUMNAS} FROM facturas WHERE numero = ?1");
        let factura: Option<Factura> = sqlx::query_as(&sql)
            .bind(numero)
            .fetch_optional(&self.pool)
            .await?;

        Ok(factura)
    }

    /// Gets all line items of an invoice, in insertion order.
    pub async fn obtener_detalles(&self, factura_id: i64) -> DbResult<Vec<DetalleFactura>> {
        let detalles: Vec<DetalleFactura> = sqlx::query_as(
            "SELECT id, factura_id, producto_id, producto_codigo, producto_nombre,
                    cantidad, precio_unitario, subtotal_linea
             FROM factura_detalles
             WHERE factura_id = ?1
             ORDER BY id",
        )
        .bind(factura_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(detalles)
    }

    /// Lists invoices newest-first with optional client/numero filters.
    ///
    /// Pagination metadata reflects the FILTERED count.
    pub async fn listar(&self, filtro: &FiltroFacturas) -> DbResult<(Vec<Factura>, Paginacion)> {
        let limit = filtro.limit.unwrap_or(10).clamp(1, 100);
        let page = filtro.page.unwrap_or(1).max(1);

        let patron_cliente = format!(
            "%{}%",
            filtro.cliente.as_deref().unwrap_or("").trim()
        );
        let patron_numero = format!(
            "%{}%",
            filtro.numero_factura.as_deref().unwrap_or("").trim()
        );

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM facturas WHERE cliente_nombre LIKE ?1 AND numero LIKE ?2",
        )
        .bind(&patron_cliente)
        .bind(&patron_numero)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {COLUMNAS} FROM facturas
             WHERE cliente_nombre LIKE ?1 AND numero LIKE ?2
             ORDER BY id DESC
             LIMIT ?3 OFFSET ?4"
        );
        let facturas: Vec<Factura> = sqlx::query_as(&sql)
            .bind(&patron_cliente)
            .bind(&patron_numero)
            .bind(limit as i64)
            .bind(((page - 1) * limit) as i64)
            .fetch_all(&self.pool)
            .await?;

        let paginacion = Paginacion {
            page,
            limit,
            total: total as usize,
            total_pages: (total as u32).div_ceil(limit).max(1),
        };

        Ok((facturas, paginacion))
    }

    /// Daily sales summary over active invoices, plus the annulled count.
    pub async fn resumen_del_dia(&self, fecha: NaiveDate) -> DbResult<ResumenVentas> {
        let dia = fecha.format("%Y-%m-%d").to_string();

        let (activas, total_vendido, total_iva): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total), 0), COALESCE(SUM(iva), 0)
             FROM facturas
             WHERE estado = 'activa' AND date(creada_en) = ?1",
        )
        .bind(&dia)
        .fetch_one(&self.pool)
        .await?;

        let anuladas: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM facturas WHERE estado = 'anulada' AND date(creada_en) = ?1",
        )
        .bind(&dia)
        .fetch_one(&self.pool)
        .await?;

        Ok(ResumenVentas {
            fecha: dia,
            facturas_activas: activas,
            total_vendido,
            total_iva,
            facturas_anuladas: anuladas,
        })
    }

    // -------------------------------------------------------------------------
    // Annulment
    // -------------------------------------------------------------------------

    /// Annuls an invoice: `activa → anulada`, one-way.
    ///
    /// Preconditions and effects run in ONE transaction: the guarded status
    /// flip, the motivo appended to observaciones, and the audit-trail row.
    /// An invoice that is missing or already anulada fails without writing
    /// anything.
    pub async fn anular(
        &self,
        id: i64,
        motivo: &str,
        actor: &str,
        ahora: DateTime<Utc>,
    ) -> Result<Factura, FacturaError> {
        let mut tx = self.pool.begin().await?;

        let nota = format!("[ANULADA {}] {}", ahora.format("%Y-%m-%d %H:%M"), motivo);

        let resultado = sqlx::query(
            "UPDATE facturas
             SET estado = 'anulada',
                 observaciones = CASE
                     WHEN observaciones = '' THEN ?2
                     ELSE observaciones || char(10) || ?2
                 END
             WHERE id = ?1 AND estado = 'activa'",
        )
        .bind(id)
        .bind(&nota)
        .execute(&mut *tx)
        .await?;

        if resultado.rows_affected() == 0 {
            // Missing or already annulled: no audit row, no state change
            tx.rollback().await?;
            return Err(CoreError::FacturaNoAnulable(id).into());
        }

        auditoria::registrar_con(&mut *tx, "factura", id, "activa", "anulada", actor, motivo, ahora)
            .await?;

        tx.commit().await?;

        info!(factura_id = %id, actor = %actor, "Factura anulada");

        let factura = self
            .obtener_por_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Factura", id))?;

        Ok(factura)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::producto::DatosProducto;
    use chrono::TimeZone;
    use ferro_core::types::{ClienteVenta, EstadoFactura, ItemVenta, MetodoPago};

    fn ahora() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 14, 30, 0).unwrap()
    }

    async fn db_con_productos() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.productos();
        repo.crear(
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
            ahora(),
        )
        .await
        .unwrap();
        repo.crear(
            &DatosProducto {
                codigo: "DEST-001".to_string(),
                nombre: "Destornillador plano".to_string(),
                descripcion: None,
                precio_venta: 15_000,
                precio_compra: 9_000,
                stock_actual: 5,
                stock_minimo: 1,
                ubicacion: None,
                peso_gramos: None,
                dimensiones: None,
                categoria_id: Some(1),
            },
            ahora(),
        )
        .await
        .unwrap();
        db
    }

    fn venta_efectivo() -> NuevaVenta {
        NuevaVenta {
            cliente: ClienteVenta {
                tipo_documento: "CC".to_string(),
                documento: "1020304050".to_string(),
                nombre: "Carlos Rojas".to_string(),
                telefono: Some("3001234567".to_string()),
            },
            items: vec![
                ItemVenta {
                    producto_id: 1,
                    codigo: "MART-001".to_string(),
                    nombre: "Martillo de uña".to_string(),
                    cantidad: 2,
                    precio_unitario: 25_000,
                },
                ItemVenta {
                    producto_id: 2,
                    codigo: "DEST-001".to_string(),
                    nombre: "Destornillador plano".to_string(),
                    cantidad: 1,
                    precio_unitario: 15_000,
                },
            ],
            subtotal: 65_000,
            iva: 0,
            total: 65_000,
            metodo_pago: MetodoPago::Efectivo,
            monto_recibido: Some(70_000),
            observaciones: None,
        }
    }

    #[tokio::test]
    async fn test_venta_en_efectivo_con_cambio() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let creada = repo
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), false)
            .await
            .unwrap();

        assert!(!creada.degradado);
        assert_eq!(creada.numero, "FAC-20260307-0001");
        assert_eq!(creada.factura.total, 65_000);
        assert_eq!(creada.factura.cambio, Some(5_000));
        assert_eq!(creada.factura.estado, EstadoFactura::Activa);
        assert_eq!(creada.factura.cliente_nombre, "Carlos Rojas");

        // Exactly as many persisted rows as input items, exact subtotals
        let detalles = repo.obtener_detalles(creada.factura.id).await.unwrap();
        assert_eq!(detalles.len(), 2);
        assert_eq!(detalles[0].subtotal_linea, 50_000);
        assert_eq!(detalles[1].subtotal_linea, 15_000);
        for d in &detalles {
            assert_eq!(d.subtotal_linea, d.cantidad * d.precio_unitario);
        }

        // Stock rode the same transaction
        let productos = db.productos();
        assert_eq!(productos.obtener_por_id(1).await.unwrap().unwrap().stock_actual, 8);
        assert_eq!(productos.obtener_por_id(2).await.unwrap().unwrap().stock_actual, 4);
    }

    #[tokio::test]
    async fn test_metadatos_versionados() {
        let db = db_con_productos().await;
        let creada = db
            .facturas()
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), false)
            .await
            .unwrap();

        let blob: serde_json::Value = serde_json::from_str(&creada.factura.metadatos).unwrap();
        assert_eq!(blob["cantidadProductos"], 2);
        assert_eq!(blob["sistemaVersion"], "1.0");
    }

    #[tokio::test]
    async fn test_numeracion_consecutiva_mismo_dia() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let mut venta = venta_efectivo();
        venta.items.truncate(1);
        venta.items[0].cantidad = 1;
        venta.subtotal = 25_000;
        venta.total = 25_000;
        venta.monto_recibido = Some(25_000);

        for esperado in ["FAC-20260307-0001", "FAC-20260307-0002", "FAC-20260307-0003"] {
            let creada = repo
                .crear_desde_venta(&venta, "cajero1", ahora(), false)
                .await
                .unwrap();
            assert_eq!(creada.numero, esperado);
        }
    }

    #[tokio::test]
    async fn test_numeracion_reinicia_por_dia() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let mut venta = venta_efectivo();
        venta.items.truncate(1);
        venta.items[0].cantidad = 1;
        venta.subtotal = 25_000;
        venta.total = 25_000;
        venta.monto_recibido = Some(30_000);

        let dia1 = repo.crear_desde_venta(&venta, "cajero1", ahora(), false).await.unwrap();
        assert_eq!(dia1.numero, "FAC-20260307-0001");

        let manana = Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap();
        let dia2 = repo.crear_desde_venta(&venta, "cajero1", manana, false).await.unwrap();
        assert_eq!(dia2.numero, "FAC-20260308-0001");
    }

    #[tokio::test]
    async fn test_siembra_desde_facturas_existentes() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        // A pre-existing invoice from before the sequence table had rows
        sqlx::query(
            "INSERT INTO facturas (
                numero, cliente_tipo_documento, cliente_documento, cliente_nombre,
                empresa_nombre, empresa_nit, empresa_direccion, empresa_telefono, empresa_email,
                subtotal, iva, total, metodo_pago, creada_por, creada_en
            ) VALUES ('FAC-20260307-0041', 'CC', '1', 'X', 'E', 'N', 'D', 'T', 'M',
                      1000, 0, 1000, 'efectivo', 'cajero1', ?1)",
        )
        .bind(ahora())
        .execute(db.pool())
        .await
        .unwrap();

        let mut venta = venta_efectivo();
        venta.items.truncate(1);
        venta.items[0].cantidad = 1;
        venta.subtotal = 25_000;
        venta.total = 25_000;
        venta.monto_recibido = Some(25_000);

        let creada = repo.crear_desde_venta(&venta, "cajero1", ahora(), false).await.unwrap();
        assert_eq!(creada.numero, "FAC-20260307-0042");
    }

    #[tokio::test]
    async fn test_atomicidad_stock_insuficiente() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let mut venta = venta_efectivo();
        // Second line asks for more than the 5 in stock
        venta.items[1].cantidad = 6;

        let err = repo
            .crear_desde_venta(&venta, "cajero1", ahora(), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FacturaError::Regla(CoreError::StockInsuficiente { .. })
        ));

        // Nothing is visible after the rollback: no header, no details,
        // and the first line's stock decrement was undone
        let cuantas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM facturas")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(cuantas, 0);

        let detalles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM factura_detalles")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(detalles, 0);

        let productos = db.productos();
        assert_eq!(productos.obtener_por_id(1).await.unwrap().unwrap().stock_actual, 10);
        assert_eq!(productos.obtener_por_id(2).await.unwrap().unwrap().stock_actual, 5);
    }

    #[tokio::test]
    async fn test_producto_inexistente_revierte_todo() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let mut venta = venta_efectivo();
        venta.items[1].producto_id = 999;

        let err = repo
            .crear_desde_venta(&venta, "cajero1", ahora(), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FacturaError::Regla(CoreError::ProductoNoEncontrado(_))
        ));

        let cuantas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM facturas")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(cuantas, 0);
    }

    #[tokio::test]
    async fn test_creaciones_concurrentes_numeros_distintos() {
        let db = db_con_productos().await;
        let repo_a = db.facturas();
        let repo_b = db.facturas();

        let mut venta = venta_efectivo();
        venta.items.truncate(1);
        venta.items[0].cantidad = 1;
        venta.subtotal = 25_000;
        venta.total = 25_000;
        venta.monto_recibido = Some(25_000);
        let venta_b = venta.clone();

        let (a, b) = tokio::join!(
            repo_a.crear_desde_venta(&venta, "cajero1", ahora(), false),
            repo_b.crear_desde_venta(&venta_b, "cajero2", ahora(), false),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.numero, b.numero);

        let mut numeros = vec![a.numero, b.numero];
        numeros.sort();
        assert_eq!(numeros, vec!["FAC-20260307-0001", "FAC-20260307-0002"]);
    }

    #[tokio::test]
    async fn test_numeracion_degradada_sigue_facturando() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        // Force the allocator to fail
        sqlx::query("DROP TABLE consecutivos_factura")
            .execute(db.pool())
            .await
            .unwrap();

        let creada = repo
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), false)
            .await
            .unwrap();

        assert!(creada.degradado);
        assert_eq!(
            creada.numero,
            format!("FAC-{}", ahora().timestamp_millis())
        );
        assert_eq!(repo.obtener_detalles(creada.factura.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_modo_estricto_rechaza_degradados() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        sqlx::query("DROP TABLE consecutivos_factura")
            .execute(db.pool())
            .await
            .unwrap();

        let err = repo
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FacturaError::Regla(CoreError::NumeroDegradadoRechazado { .. })
        ));

        let cuantas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM facturas")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(cuantas, 0);
    }

    #[tokio::test]
    async fn test_empresa_por_defecto_cuando_falta() {
        let db = db_con_productos().await;
        let creada = db
            .facturas()
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), false)
            .await
            .unwrap();

        let defecto = Empresa::por_defecto();
        assert_eq!(creada.factura.empresa_nombre, defecto.nombre);
        assert_eq!(creada.factura.empresa_nit, defecto.nit);
    }

    #[tokio::test]
    async fn test_anular_una_sola_vez() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let creada = repo
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), false)
            .await
            .unwrap();

        let anulada = repo
            .anular(creada.factura.id, "venta duplicada", "admin", ahora())
            .await
            .unwrap();
        assert_eq!(anulada.estado, EstadoFactura::Anulada);
        assert!(anulada.observaciones.contains("venta duplicada"));

        // One audit row for the transition
        let auditoria = db
            .auditoria()
            .listar_por_entidad("factura", creada.factura.id)
            .await
            .unwrap();
        assert_eq!(auditoria.len(), 1);
        assert_eq!(auditoria[0].valor_anterior, "activa");
        assert_eq!(auditoria[0].valor_nuevo, "anulada");
        assert_eq!(auditoria[0].actor, "admin");

        // Second annulment: fails, no extra audit row, no change
        let err = repo
            .anular(creada.factura.id, "otra vez", "admin", ahora())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FacturaError::Regla(CoreError::FacturaNoAnulable(_))
        ));

        let auditoria = db
            .auditoria()
            .listar_por_entidad("factura", creada.factura.id)
            .await
            .unwrap();
        assert_eq!(auditoria.len(), 1);
    }

    #[tokio::test]
    async fn test_anular_inexistente() {
        let db = db_con_productos().await;
        let err = db
            .facturas()
            .anular(999, "no existe", "admin", ahora())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FacturaError::Regla(CoreError::FacturaNoAnulable(999))
        ));
    }

    #[tokio::test]
    async fn test_listar_con_filtros_y_paginacion() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let mut venta = venta_efectivo();
        venta.items.truncate(1);
        venta.items[0].cantidad = 1;
        venta.subtotal = 25_000;
        venta.total = 25_000;
        venta.monto_recibido = Some(25_000);

        for nombre in ["Carlos Rojas", "Carla Núñez", "Pedro Gómez"] {
            venta.cliente.nombre = nombre.to_string();
            repo.crear_desde_venta(&venta, "cajero1", ahora(), false).await.unwrap();
        }

        // Filter by client substring
        let (facturas, paginacion) = repo
            .listar(&FiltroFacturas {
                cliente: Some("carl".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(facturas.len(), 2);
        assert_eq!(paginacion.total, 2);

        // Filter by numero substring
        let (facturas, _) = repo
            .listar(&FiltroFacturas {
                numero_factura: Some("0003".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(facturas.len(), 1);

        // Newest first, paginated
        let (facturas, paginacion) = repo
            .listar(&FiltroFacturas {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(facturas.len(), 1);
        assert_eq!(paginacion.total, 3);
        assert_eq!(paginacion.total_pages, 2);
        assert_eq!(facturas[0].numero, "FAC-20260307-0001");
    }

    #[tokio::test]
    async fn test_resumen_del_dia() {
        let db = db_con_productos().await;
        let repo = db.facturas();

        let creada = repo
            .crear_desde_venta(&venta_efectivo(), "cajero1", ahora(), false)
            .await
            .unwrap();

        let mut venta = venta_efectivo();
        venta.items.truncate(1);
        venta.items[0].cantidad = 1;
        venta.subtotal = 25_000;
        venta.total = 25_000;
        venta.monto_recibido = Some(25_000);
        let segunda = repo.crear_desde_venta(&venta, "cajero1", ahora(), false).await.unwrap();

        repo.anular(segunda.factura.id, "error de digitación", "admin", ahora())
            .await
            .unwrap();

        let resumen = repo.resumen_del_dia(ahora().date_naive()).await.unwrap();
        assert_eq!(resumen.fecha, "2026-03-07");
        assert_eq!(resumen.facturas_activas, 1);
        assert_eq!(resumen.total_vendido, creada.factura.total);
        assert_eq!(resumen.facturas_anuladas, 1);
    }
}
