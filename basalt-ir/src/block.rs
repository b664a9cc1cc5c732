//! Basic blocks
//!
//! A block owns an intrusive doubly-linked list of instructions and
//! mirrors the CFG implied by its terminator in explicit predecessor
//! and successor vectors (with multiplicity, so a conditional branch
//! with both edges to one block records it twice). Appending past a
//! terminator is rejected, and phi nodes must stay a prefix of the
//! instruction list.

use basalt_common::{BlockId, FuncId, InstId, IrError, IrResult, ValueId};
use serde::{Deserialize, Serialize};

use crate::instruction::Opcode;
use crate::module::Module;
use crate::value::ValueKind;

/// A basic block record inside the module arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    pub name: String,
    pub(crate) value: ValueId,
    pub(crate) func: FuncId,
    pub(crate) head: Option<InstId>,
    pub(crate) tail: Option<InstId>,
    pub(crate) preds: Vec<BlockId>,
    pub(crate) succs: Vec<BlockId>,
}

/// Forward iterator over a block's instructions.
pub struct InstIter<'m> {
    module: &'m Module,
    cur: Option<InstId>,
}

impl<'m> Iterator for InstIter<'m> {
    type Item = InstId;

    fn next(&mut self) -> Option<InstId> {
        let cur = self.cur?;
        self.cur = self.module.inst_next(cur);
        Some(cur)
    }
}

impl Module {
    /// Create a block at the end of `func`'s block list. The first
    /// block created becomes the entry. An empty name is replaced with
    /// a generated label.
    pub fn create_basic_block(&mut self, func: FuncId, name: &str) -> IrResult<BlockId> {
        let name = if name.is_empty() {
            format!("bb{}", self.blocks.len())
        } else {
            name.to_string()
        };
        let duplicate = self.funcs[func.index()]
            .blocks
            .iter()
            .any(|&b| self.blocks[b.index()].name == name);
        if duplicate {
            return Err(IrError::state_violation(format!(
                "block '{}' already exists in function '{}'",
                name,
                self.funcs[func.index()].name
            )));
        }
        let id = BlockId(self.blocks.len() as u32);
        let void = self.get_void_type();
        let value = self.new_value(void, name.clone(), ValueKind::Block(id));
        self.blocks.push(BlockData {
            name,
            value,
            func,
            head: None,
            tail: None,
            preds: Vec::new(),
            succs: Vec::new(),
        });
        self.funcs[func.index()].blocks.push(id);
        Ok(id)
    }

    pub fn block(&self, b: BlockId) -> &BlockData {
        &self.blocks[b.index()]
    }

    pub fn block_name(&self, b: BlockId) -> &str {
        &self.blocks[b.index()].name
    }

    /// The label value other instructions use to reference this block.
    pub fn block_value(&self, b: BlockId) -> ValueId {
        self.blocks[b.index()].value
    }

    pub fn block_func(&self, b: BlockId) -> FuncId {
        self.blocks[b.index()].func
    }

    pub fn first_inst(&self, b: BlockId) -> Option<InstId> {
        self.blocks[b.index()].head
    }

    pub fn last_inst(&self, b: BlockId) -> Option<InstId> {
        self.blocks[b.index()].tail
    }

    /// Iterate the block's instructions in order.
    pub fn block_insts(&self, b: BlockId) -> InstIter<'_> {
        InstIter {
            module: self,
            cur: self.blocks[b.index()].head,
        }
    }

    /// The terminator, if the block is sealed.
    pub fn terminator(&self, b: BlockId) -> Option<InstId> {
        let tail = self.blocks[b.index()].tail?;
        if self.inst_opcode(tail).is_terminator() {
            Some(tail)
        } else {
            None
        }
    }

    pub fn block_is_terminated(&self, b: BlockId) -> bool {
        self.terminator(b).is_some()
    }

    pub fn predecessors(&self, b: BlockId) -> &[BlockId] {
        &self.blocks[b.index()].preds
    }

    pub fn successors(&self, b: BlockId) -> &[BlockId] {
        &self.blocks[b.index()].succs
    }

    /// Number of distinct predecessors; the count a phi's arity has to
    /// match.
    pub fn num_distinct_predecessors(&self, b: BlockId) -> usize {
        let preds = self.predecessors(b);
        let mut distinct: Vec<BlockId> = Vec::new();
        for &p in preds {
            if !distinct.contains(&p) {
                distinct.push(p);
            }
        }
        distinct.len()
    }

    /// First non-phi instruction, the place where a new phi has to go.
    pub(crate) fn phi_insert_point(&self, b: BlockId) -> Option<InstId> {
        self.block_insts(b)
            .find(|&i| self.inst_opcode(i) != Opcode::Phi)
    }

    fn add_cfg_edge(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from.index()].succs.push(to);
        self.blocks[to.index()].preds.push(from);
    }

    fn remove_cfg_edge(&mut self, from: BlockId, to: BlockId) {
        let succs = &mut self.blocks[from.index()].succs;
        if let Some(pos) = succs.iter().position(|&b| b == to) {
            succs.remove(pos);
        }
        let preds = &mut self.blocks[to.index()].preds;
        if let Some(pos) = preds.iter().position(|&b| b == from) {
            preds.remove(pos);
        }
    }

    /// Check that an instruction with `opcode` may be placed in
    /// `block` at the given position, returning the predecessor link.
    /// Enforces the terminator and phi-ordering disciplines.
    pub(crate) fn validate_insert(
        &self,
        block: BlockId,
        opcode: Opcode,
        before: Option<InstId>,
    ) -> IrResult<Option<InstId>> {
        if let Some(pos) = before {
            if self.inst_block(pos) != block {
                return Err(IrError::shape_violation(
                    "insertion point belongs to a different block",
                ));
            }
        }
        if opcode.is_terminator() {
            if before.is_some() {
                return Err(IrError::state_violation(
                    "terminator may only be appended at the end of a block",
                ));
            }
            if self.block_is_terminated(block) {
                return Err(IrError::state_violation(format!(
                    "block '{}' is already terminated",
                    self.block_name(block)
                )));
            }
        } else if before.is_none() && self.block_is_terminated(block) {
            return Err(IrError::state_violation(format!(
                "cannot append to terminated block '{}'",
                self.block_name(block)
            )));
        }

        let prev = match before {
            Some(pos) => self.inst_prev(pos),
            None => self.blocks[block.index()].tail,
        };

        // Phi nodes precede all non-phi instructions
        if opcode == Opcode::Phi {
            if let Some(p) = prev {
                if self.inst_opcode(p) != Opcode::Phi {
                    return Err(IrError::shape_violation(
                        "phi inserted after a non-phi instruction",
                    ));
                }
            }
        } else if let Some(pos) = before {
            if self.inst_opcode(pos) == Opcode::Phi {
                return Err(IrError::shape_violation(
                    "non-phi inserted before a phi instruction",
                ));
            }
        }
        Ok(prev)
    }

    /// Link `inst` into `block`, appending when `before` is `None`,
    /// and mirror new CFG edges when a terminator lands.
    pub(crate) fn insert_inst(
        &mut self,
        block: BlockId,
        inst: InstId,
        before: Option<InstId>,
    ) -> IrResult<()> {
        let opcode = self.inst_opcode(inst);
        let prev = self.validate_insert(block, opcode, before)?;

        // Splice into the doubly-linked list
        self.insts[inst.index()].prev = prev;
        self.insts[inst.index()].next = before;
        match prev {
            Some(p) => self.insts[p.index()].next = Some(inst),
            None => self.blocks[block.index()].head = Some(inst),
        }
        match before {
            Some(n) => self.insts[n.index()].prev = Some(inst),
            None => self.blocks[block.index()].tail = Some(inst),
        }

        if opcode.is_terminator() {
            for succ in self.terminator_successors(inst) {
                self.add_cfg_edge(block, succ);
            }
        }
        Ok(())
    }

    /// Remove an instruction from its block and break its operand
    /// edges. The instruction must itself be unused; redirect users
    /// with `replace_all_uses_with` first.
    pub fn erase_inst(&mut self, inst: InstId) -> IrResult<()> {
        let value = self.inst_value(inst);
        if !self.users(value).is_empty() {
            return Err(IrError::state_violation(
                "cannot erase an instruction that still has users",
            ));
        }
        let block = self.inst_block(inst);
        if self.inst_opcode(inst).is_terminator() {
            for succ in self.terminator_successors(inst) {
                self.remove_cfg_edge(block, succ);
            }
        }
        for operand in std::mem::take(&mut self.insts[inst.index()].operands) {
            self.remove_user(operand, value);
        }
        let prev = self.inst_prev(inst);
        let next = self.inst_next(inst);
        match prev {
            Some(p) => self.insts[p.index()].next = next,
            None => self.blocks[block.index()].head = next,
        }
        match next {
            Some(n) => self.insts[n.index()].prev = prev,
            None => self.blocks[block.index()].tail = prev,
        }
        self.insts[inst.index()].prev = None;
        self.insts[inst.index()].next = None;
        Ok(())
    }
}
