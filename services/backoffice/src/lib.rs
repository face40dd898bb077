//! Point-of-sale back office: employee, supplier, category, product and
//! sale management plus the cashier checkout flow.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod router;
pub mod state;
pub mod usecase;
