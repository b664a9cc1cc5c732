//! Module: the owning arena
//!
//! The module exclusively owns every type, value, constant, global,
//! function, block and instruction, held in creation-order slabs. The
//! interning registries make canonical handles cheap to look up; all
//! ordered traversal goes through the slabs so construction order
//! fully determines iteration order.

use std::collections::HashMap;
use std::fmt;

use basalt_common::{BlockId, FuncId, GlobalId, InstId, IrError, IrResult, TypeId, ValueId};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::block::BlockData;
use crate::constant::GlobalData;
use crate::function::FuncData;
use crate::instruction::{InstData, Opcode};
use crate::types::{TypeKey, TypeKind};
use crate::value::{ValueData, ValueKind};

/// A compilation unit: the arena for one IR program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,

    pub(crate) types: Vec<TypeKind>,
    pub(crate) type_cache: HashMap<TypeKey, TypeId>,
    pub(crate) named_structs: HashMap<String, TypeId>,

    pub(crate) values: Vec<ValueData>,
    pub(crate) insts: Vec<InstData>,
    pub(crate) blocks: Vec<BlockData>,
    pub(crate) funcs: Vec<FuncData>,
    pub(crate) globals: Vec<GlobalData>,

    pub(crate) func_names: HashMap<String, FuncId>,
    pub(crate) global_names: HashMap<String, GlobalId>,

    pub(crate) int_cache: HashMap<(TypeId, u64), ValueId>,
    pub(crate) fp_cache: HashMap<(TypeId, u64), ValueId>,
    pub(crate) null_cache: HashMap<TypeId, ValueId>,
    pub(crate) zero_cache: HashMap<TypeId, ValueId>,
    pub(crate) string_cache: HashMap<Vec<u8>, ValueId>,
}

impl Module {
    pub fn new(name: String) -> Self {
        Self {
            name,
            types: Vec::new(),
            type_cache: HashMap::new(),
            named_structs: HashMap::new(),
            values: Vec::new(),
            insts: Vec::new(),
            blocks: Vec::new(),
            funcs: Vec::new(),
            globals: Vec::new(),
            func_names: HashMap::new(),
            global_names: HashMap::new(),
            int_cache: HashMap::new(),
            fp_cache: HashMap::new(),
            null_cache: HashMap::new(),
            zero_cache: HashMap::new(),
            string_cache: HashMap::new(),
        }
    }

    /// Allocate an instruction and its result value, wiring the use
    /// edge for every operand. The instruction is not yet linked into
    /// a block; `insert_inst` does that.
    pub(crate) fn new_inst(
        &mut self,
        block: BlockId,
        opcode: Opcode,
        result_ty: TypeId,
        operands: Vec<ValueId>,
        name: &str,
    ) -> (InstId, ValueId) {
        let inst = InstId(self.insts.len() as u32);
        let value = self.new_value(result_ty, name.to_string(), ValueKind::Inst(inst));
        for &operand in &operands {
            self.add_user(operand, value);
        }
        self.insts.push(InstData {
            opcode,
            value,
            block,
            prev: None,
            next: None,
            operands,
        });
        (inst, value)
    }

    /// Append one incoming (value, block) pair to a phi. Each distinct
    /// predecessor gets exactly one pair, and the incoming value type
    /// must match the phi type.
    pub fn phi_add_incoming(
        &mut self,
        phi: ValueId,
        value: ValueId,
        block: BlockId,
    ) -> IrResult<()> {
        let inst = match self.value_as_inst(phi) {
            Some(inst) if self.inst_opcode(inst) == Opcode::Phi => inst,
            _ => return Err(IrError::shape_violation("phi_add_incoming target is not a phi")),
        };
        if !self.types_equal_unqualified(self.value_type(value), self.value_type(phi)) {
            return Err(IrError::type_mismatch(
                "phi incoming value type differs from the phi type",
            ));
        }
        let phi_block = self.inst_block(inst);
        if self.block_func(block) != self.block_func(phi_block) {
            return Err(IrError::shape_violation(
                "phi incoming block belongs to a different function",
            ));
        }
        for k in 0..self.phi_num_incoming(inst) {
            if let Some((_, existing)) = self.phi_incoming(inst, k) {
                if existing == block {
                    return Err(IrError::shape_violation(format!(
                        "phi already has an incoming value for block '{}'",
                        self.block_name(block)
                    )));
                }
            }
        }
        let block_value = self.block_value(block);
        self.insts[inst.index()].operands.push(value);
        self.add_user(value, phi);
        self.insts[inst.index()].operands.push(block_value);
        self.add_user(block_value, phi);
        debug!(
            "phi in '{}' now has {} incoming edges",
            self.block_name(phi_block),
            self.phi_num_incoming(inst)
        );
        Ok(())
    }

    /// Derive the type a GEP produces: the first index strips the
    /// pointer level, each further index descends into the aggregate,
    /// and the result is a pointer to the reached type. Struct indices
    /// must be integer constants.
    pub fn gep_result_type(&mut self, base: ValueId, indices: &[ValueId]) -> IrResult<TypeId> {
        let base_ty = self.value_type(base);
        let mut cur = match self.element_type(base_ty) {
            Some(elem) if self.type_is_pointer(base_ty) => elem,
            _ => {
                return Err(IrError::type_mismatch(
                    "getelementptr base must be a pointer",
                ))
            }
        };
        if indices.is_empty() {
            return Err(IrError::shape_violation(
                "getelementptr requires at least one index",
            ));
        }
        for &index in indices {
            if !self.type_is_integer(self.value_type(index)) {
                return Err(IrError::shape_violation(
                    "getelementptr indices must be integers",
                ));
            }
        }
        for &index in &indices[1..] {
            let stripped = self.unqualified(cur);
            cur = match self.type_kind(stripped) {
                TypeKind::Array { element, .. } | TypeKind::Vector { element, .. } => *element,
                TypeKind::Struct(data) => {
                    if data.opaque {
                        return Err(IrError::state_violation(
                            "getelementptr into an opaque struct",
                        ));
                    }
                    let idx = self.const_int_value(index).ok_or_else(|| {
                        IrError::shape_violation(
                            "struct getelementptr index must be a constant integer",
                        )
                    })? as usize;
                    match data.members.get(idx) {
                        Some(member) => member.ty,
                        None => {
                            return Err(IrError::shape_violation(format!(
                                "struct index {} out of bounds for {} members",
                                idx,
                                data.members.len()
                            )))
                        }
                    }
                }
                _ => {
                    return Err(IrError::type_mismatch(
                        "getelementptr cannot descend into a scalar type",
                    ))
                }
            };
        }
        Ok(self.get_pointer_type(cur))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::print_module(self))
    }
}
