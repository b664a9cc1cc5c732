//! basalt - SSA Intermediate Representation
//!
//! This crate defines a typed, block-structured IR in the style of
//! classical LLVM IR. A `Module` owns every entity (types, constants,
//! globals, functions, blocks, instructions) in arena slabs; handles
//! from `basalt-common` are the inter-entity references. Clients intern
//! types on the module, create functions and blocks, then drive an
//! `IrBuilder` whose factory methods validate operand types and shapes
//! before inserting instructions at the cursor.

pub mod block;
pub mod builder;
pub mod constant;
pub mod function;
pub mod instruction;
pub mod module;
pub mod printer;
pub mod types;
pub mod value;
pub mod verify;

mod builder_tests;

pub use basalt_common::{BlockId, FuncId, GlobalId, InstId, IrError, IrResult, TypeId, ValueId};
pub use block::BlockData;
pub use builder::IrBuilder;
pub use constant::{ConstantKind, GlobalData};
pub use function::FuncData;
pub use instruction::{FloatPredicate, InstData, IntPredicate, Opcode};
pub use module::Module;
pub use printer::{print_function, print_module};
pub use types::{Qualifiers, StructMember, TypeKind, POINTER_SIZE, STRUCT_ALIGN};
pub use value::{ValueData, ValueKind};
pub use verify::{verify_function, verify_module};
