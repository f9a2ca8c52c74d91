//! CAN Driver Generator Library
//!
//! A deterministic library for turning CAN database files (DBC) into
//! fully resolved driver interface specifications, and rendering those
//! specifications as C++ driver class header/source pairs for embedded
//! targets.
//!
//! # Architecture
//!
//! Generation is a linear pipeline over plain data:
//! - The DBC adapter projects a parsed database into the internal model,
//!   resolving all vendor attributes up front
//! - The classifier assigns each message a transmit or receive role
//! - The layout resolver packs each signal into the narrowest integer
//!   storage slot and normalizes its bit position
//! - The transform resolver picks the minimal raw/physical conversion
//!   formula for each signal
//! - The assembler combines everything into a `DriverSpec`, fail-fast and
//!   preserving database declaration order throughout
//! - The emitters render the specification as C++ text
//!
//! The library does NOT:
//! - Talk to CAN hardware or schedule frames
//! - Validate physical value ranges or simulate bus traffic
//! - Parse proprietary database formats beyond DBC
//!
//! File handling, parallelism, and output layout live in the application
//! layer (can-driver-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use can_driver_gen::{Generator, GeneratorConfig};
//! use can_driver_gen::emit::{render_header, render_source};
//! use std::path::Path;
//!
//! // Load the database and resolve the driver specification
//! let generator = Generator::from_dbc_file(Path::new("ebtm.dbc")).unwrap();
//! let config = GeneratorConfig::membership_directions("FVT_ECU");
//! let spec = generator.generate(&config).unwrap();
//!
//! // Render the C++ driver pair
//! let header = render_header(&spec);
//! let source = render_source(&spec);
//! println!("{} messages for driver {}", spec.message_count(), spec.driver_name);
//! # let _ = (header, source);
//! ```

// Public modules
pub mod classify;
pub mod config;
pub mod database;
pub mod emit;
pub mod generator;
pub mod layout;
pub mod transform;
pub mod types;

// Re-export main types for convenience
pub use config::{DirectionPolicy, GeneratorConfig};
pub use database::{ByteOrder, Database, Message, PhysicalTypeTable, Signal};
pub use generator::Generator;
pub use layout::{ResolvedLayout, StorageWidth};
pub use transform::{ResolvedTransform, TransformForm};
pub use types::{
    AccessorKind, AccessorSpec, Direction, DriverSpec, FieldSpec, GeneratorError, MessageIdEntry,
    MessageSpec, Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
