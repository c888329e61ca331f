//! # Repository Layer
//!
//! One repository per aggregate. Repositories hold a pool clone and are
//! cheap to construct; the [`crate::Database`] handle hands them out.

pub mod auditoria;
pub mod cliente;
pub mod empresa;
pub mod factura;
pub mod producto;
pub mod usuario;
