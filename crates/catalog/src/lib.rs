//! CKAN catalog client for pocketwatch.
//!
//! Thin async wrapper over the portal's action API: fetches the full package
//! list with resources and maps the raw payload into core dataset records.

pub mod client;

pub use client::{CatalogClient, CatalogError};
