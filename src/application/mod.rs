//! Application services: content queries, request scoping and page metadata.

pub mod error;
pub mod excerpt;
pub mod facade;
pub mod queries;
pub mod scope;
pub mod seo;
pub mod transport;
