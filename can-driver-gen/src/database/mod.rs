//! Database model and format adapters
//!
//! This module contains the internal database model the generator
//! consumes and the DBC adapter that projects parsed files into it.

pub mod dbc;
pub mod model;

// Re-export key types for convenience
pub use model::{ByteOrder, Database, Message, PhysicalTypeTable, Signal};
