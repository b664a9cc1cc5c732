//! Functions
//!
//! A function owns its argument values and its ordered block list; the
//! first block created is the entry. Functions with no blocks are
//! declarations. A function may carry a hidden return-value pointer
//! slot for sret-style lowering conventions.

use basalt_common::{BlockId, FuncId, IrError, IrResult, TypeId, ValueId};
use serde::{Deserialize, Serialize};

use crate::module::Module;
use crate::value::ValueKind;

/// A function record inside the module arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncData {
    pub name: String,
    pub(crate) value: ValueId,
    /// The interned function type.
    pub(crate) ty: TypeId,
    pub(crate) args: Vec<ValueId>,
    pub(crate) blocks: Vec<BlockId>,
    pub(crate) return_slot: Option<ValueId>,
}

impl Module {
    /// Create a function from a return type and named parameters. The
    /// signature is interned as a function type.
    pub fn create_function(
        &mut self,
        name: &str,
        return_type: TypeId,
        params: &[(String, TypeId)],
    ) -> IrResult<FuncId> {
        let ty = self.get_function_type(return_type, params);
        self.create_function_from_type(name, ty)
    }

    /// Create a function from an interned function type. Argument
    /// values take their names from the type's parameter list.
    pub fn create_function_from_type(&mut self, name: &str, ty: TypeId) -> IrResult<FuncId> {
        if self.function_param_types(ty).is_none() {
            return Err(IrError::type_mismatch(
                "function declaration needs a function type",
            ));
        }
        if self.func_names.contains_key(name) {
            return Err(IrError::state_violation(format!(
                "function '{}' already defined",
                name
            )));
        }
        let ty = self.unqualified(ty);
        let id = FuncId(self.funcs.len() as u32);
        let value = self.new_value(ty, name.to_string(), ValueKind::Function(id));
        let params: Vec<(String, TypeId)> = match self.type_kind(ty) {
            crate::types::TypeKind::Function { params, .. } => params.clone(),
            _ => unreachable!(),
        };
        let mut args = Vec::with_capacity(params.len());
        for (index, (param_name, param_ty)) in params.into_iter().enumerate() {
            args.push(self.new_value(
                param_ty,
                param_name,
                ValueKind::Argument {
                    func: id,
                    index: index as u32,
                },
            ));
        }
        self.funcs.push(FuncData {
            name: name.to_string(),
            value,
            ty,
            args,
            blocks: Vec::new(),
            return_slot: None,
        });
        self.func_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn func(&self, f: FuncId) -> &FuncData {
        &self.funcs[f.index()]
    }

    pub fn func_name(&self, f: FuncId) -> &str {
        &self.funcs[f.index()].name
    }

    /// The value other instructions use to call this function.
    pub fn func_value(&self, f: FuncId) -> ValueId {
        self.funcs[f.index()].value
    }

    pub fn func_type(&self, f: FuncId) -> TypeId {
        self.funcs[f.index()].ty
    }

    pub fn func_return_type(&self, f: FuncId) -> TypeId {
        self.function_return_type(self.funcs[f.index()].ty)
            .expect("function type invariant")
    }

    pub fn func_args(&self, f: FuncId) -> &[ValueId] {
        &self.funcs[f.index()].args
    }

    pub fn func_arg(&self, f: FuncId, index: usize) -> Option<ValueId> {
        self.funcs[f.index()].args.get(index).copied()
    }

    pub fn func_num_args(&self, f: FuncId) -> usize {
        self.funcs[f.index()].args.len()
    }

    pub fn func_blocks(&self, f: FuncId) -> &[BlockId] {
        &self.funcs[f.index()].blocks
    }

    /// The entry block is the first block created.
    pub fn func_entry_block(&self, f: FuncId) -> Option<BlockId> {
        self.funcs[f.index()].blocks.first().copied()
    }

    /// A function without blocks is a declaration.
    pub fn func_is_declaration(&self, f: FuncId) -> bool {
        self.funcs[f.index()].blocks.is_empty()
    }

    /// Install the hidden return-value pointer slot used by sret-style
    /// lowering. The slot must be pointer-typed.
    pub fn set_return_slot(&mut self, f: FuncId, slot: ValueId) -> IrResult<()> {
        if !self.type_is_pointer(self.value_type(slot)) {
            return Err(IrError::type_mismatch(
                "return slot must be a pointer value",
            ));
        }
        self.funcs[f.index()].return_slot = Some(slot);
        Ok(())
    }

    pub fn return_slot(&self, f: FuncId) -> Option<ValueId> {
        self.funcs[f.index()].return_slot
    }

    /// Look up a function by name. Absence is not an error.
    pub fn lookup_function(&self, name: &str) -> Option<FuncId> {
        self.func_names.get(name).copied()
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FuncId> {
        (0..self.funcs.len() as u32).map(FuncId)
    }
}
