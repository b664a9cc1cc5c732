//! basalt - Common Types and Utilities
//!
//! This crate contains the handle types and error definitions shared by
//! every component of the basalt IR library.

pub mod error;
pub mod handles;

pub use error::{IrError, IrResult};
pub use handles::{BlockId, FuncId, GlobalId, InstId, TypeId, ValueId};
