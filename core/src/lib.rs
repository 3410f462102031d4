//! bankportal-core: records, enrichment, aggregates and data services
//! behind the banking portal.

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod enrich;
pub mod error;
pub mod model;
pub mod portal;
pub mod query;
pub mod seed;
pub mod service;
pub mod session;
pub mod store;
pub mod types;
