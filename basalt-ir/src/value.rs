//! Value and use-def graph
//!
//! Every IR entity that can appear as an operand is a `ValueData`:
//! arguments, constants, globals, functions, block labels and
//! instruction results. Instructions are the users of the graph; each
//! operand edge `inst -> value` is mirrored by an entry in the value's
//! use-list. All edge mutation funnels through `set_operand` so the two
//! directions never drift apart.

use basalt_common::{BlockId, FuncId, GlobalId, InstId, IrError, IrResult, TypeId, ValueId};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::constant::ConstantKind;
use crate::module::Module;

/// What a value is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Formal parameter of a function.
    Argument { func: FuncId, index: u32 },

    /// Result of an instruction.
    Inst(InstId),

    /// Module-owned immutable constant.
    Constant(ConstantKind),

    /// Address of a global variable.
    Global(GlobalId),

    /// A function, usable as a call target.
    Function(FuncId),

    /// A basic block label, usable as a branch target or phi operand.
    Block(BlockId),
}

/// A value: a type, an optional textual name, and the list of users
/// referring to it. The type is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueData {
    pub ty: TypeId,
    /// Empty string means anonymous; the printer numbers those.
    pub name: String,
    pub kind: ValueKind,
    pub(crate) users: Vec<ValueId>,
}

impl Module {
    pub(crate) fn new_value(&mut self, ty: TypeId, name: String, kind: ValueKind) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData {
            ty,
            name,
            kind,
            users: Vec::new(),
        });
        id
    }

    pub fn value(&self, v: ValueId) -> &ValueData {
        &self.values[v.index()]
    }

    pub fn value_type(&self, v: ValueId) -> TypeId {
        self.values[v.index()].ty
    }

    pub fn value_name(&self, v: ValueId) -> &str {
        &self.values[v.index()].name
    }

    pub fn set_value_name(&mut self, v: ValueId, name: &str) {
        self.values[v.index()].name = name.to_string();
    }

    pub fn value_kind(&self, v: ValueId) -> &ValueKind {
        &self.values[v.index()].kind
    }

    /// The users currently referring to this value, one entry per
    /// operand edge. Order is unspecified.
    pub fn users(&self, v: ValueId) -> &[ValueId] {
        &self.values[v.index()].users
    }

    pub fn value_as_inst(&self, v: ValueId) -> Option<InstId> {
        match self.value_kind(v) {
            ValueKind::Inst(inst) => Some(*inst),
            _ => None,
        }
    }

    pub fn value_as_block(&self, v: ValueId) -> Option<BlockId> {
        match self.value_kind(v) {
            ValueKind::Block(block) => Some(*block),
            _ => None,
        }
    }

    pub fn value_as_function(&self, v: ValueId) -> Option<FuncId> {
        match self.value_kind(v) {
            ValueKind::Function(func) => Some(*func),
            _ => None,
        }
    }

    pub fn value_as_global(&self, v: ValueId) -> Option<GlobalId> {
        match self.value_kind(v) {
            ValueKind::Global(global) => Some(*global),
            _ => None,
        }
    }

    pub fn value_is_constant(&self, v: ValueId) -> bool {
        matches!(self.value_kind(v), ValueKind::Constant(_))
    }

    /// Operand list of a user. Non-instruction values have no operands.
    pub fn operands(&self, user: ValueId) -> &[ValueId] {
        match self.value_kind(user) {
            ValueKind::Inst(inst) => &self.insts[inst.index()].operands,
            _ => &[],
        }
    }

    /// Bounds-checked operand access. Out of range is reported with a
    /// warning and `None` rather than a panic.
    pub fn operand(&self, user: ValueId, index: usize) -> Option<ValueId> {
        let operands = self.operands(user);
        match operands.get(index) {
            Some(&v) => Some(v),
            None => {
                warn!(
                    "operand index {} out of bounds for user with {} operands",
                    index,
                    operands.len()
                );
                None
            }
        }
    }

    pub(crate) fn add_user(&mut self, value: ValueId, user: ValueId) {
        self.values[value.index()].users.push(user);
    }

    /// Remove exactly one occurrence of `user` from the use-list.
    pub(crate) fn remove_user(&mut self, value: ValueId, user: ValueId) {
        let users = &mut self.values[value.index()].users;
        match users.iter().position(|&u| u == user) {
            Some(pos) => {
                users.remove(pos);
            }
            None => {
                debug_assert!(false, "use-list desynchronized");
                warn!("removing a user that is not on the use-list");
            }
        }
    }

    /// Replace the operand in slot `index`, maintaining both edge
    /// directions atomically.
    pub fn set_operand(&mut self, user: ValueId, index: usize, new: ValueId) -> IrResult<()> {
        let inst = self.value_as_inst(user).ok_or_else(|| {
            IrError::state_violation("only instruction operands can be mutated")
        })?;
        let old = match self.insts[inst.index()].operands.get(index) {
            Some(&old) => old,
            None => {
                return Err(IrError::shape_violation(format!(
                    "operand index {} out of bounds",
                    index
                )))
            }
        };
        if old == new {
            return Ok(());
        }
        self.remove_user(old, user);
        self.insts[inst.index()].operands[index] = new;
        self.add_user(new, user);
        Ok(())
    }

    /// Redirect every use of `old` to `new`.
    pub fn replace_all_uses_with(&mut self, old: ValueId, new: ValueId) -> IrResult<()> {
        if old == new {
            return Ok(());
        }
        // Users may appear once per operand slot; deduplicate so each
        // user is rewritten in a single pass over its slots.
        let mut distinct: Vec<ValueId> = Vec::new();
        for &user in self.users(old) {
            if !distinct.contains(&user) {
                distinct.push(user);
            }
        }
        for user in distinct {
            let slots: Vec<usize> = self
                .operands(user)
                .iter()
                .enumerate()
                .filter(|(_, &v)| v == old)
                .map(|(i, _)| i)
                .collect();
            for slot in slots {
                self.set_operand(user, slot, new)?;
            }
        }
        if !self.users(old).is_empty() {
            return Err(IrError::internal(
                "use-list not empty after replace_all_uses_with",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;

    fn int_function(module: &mut Module) -> (FuncId, BlockId) {
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function(
                "f",
                i32t,
                &[("a".to_string(), i32t), ("b".to_string(), i32t)],
            )
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        (func, entry)
    }

    #[test]
    fn test_set_operand_moves_use_edges() {
        let mut module = Module::new("test".to_string());
        let (func, entry) = int_function(&mut module);
        let a = module.func_arg(func, 0).unwrap();
        let b = module.func_arg(func, 1).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let sum = builder.create_add(a, a, "sum").unwrap();

        assert_eq!(module.users(a), &[sum, sum]);
        assert!(module.users(b).is_empty());

        module.set_operand(sum, 1, b).unwrap();
        assert_eq!(module.users(a), &[sum]);
        assert_eq!(module.users(b), &[sum]);
        assert_eq!(module.operands(sum), &[a, b]);
    }

    #[test]
    fn test_replace_all_uses_with() {
        let mut module = Module::new("test".to_string());
        let (func, entry) = int_function(&mut module);
        let a = module.func_arg(func, 0).unwrap();
        let b = module.func_arg(func, 1).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let x = builder.create_add(a, a, "x").unwrap();
        let y = builder.create_mul(a, x, "y").unwrap();

        module.replace_all_uses_with(a, b).unwrap();
        assert!(module.users(a).is_empty());
        assert_eq!(module.operands(x), &[b, b]);
        assert_eq!(module.operands(y), &[b, x]);
        assert_eq!(module.users(b).len(), 3);
    }

    #[test]
    fn test_operand_out_of_bounds() {
        let mut module = Module::new("test".to_string());
        let (func, entry) = int_function(&mut module);
        let a = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let sum = builder.create_add(a, a, "sum").unwrap();

        assert_eq!(module.operand(sum, 0), Some(a));
        assert_eq!(module.operand(sum, 2), None);
        assert!(module.set_operand(sum, 5, a).is_err());
    }

    #[test]
    fn test_value_names() {
        let mut module = Module::new("test".to_string());
        let (func, _) = int_function(&mut module);
        let a = module.func_arg(func, 0).unwrap();
        assert_eq!(module.value_name(a), "a");
        module.set_value_name(a, "lhs");
        assert_eq!(module.value_name(a), "lhs");
    }
}
