//! Instructions
//!
//! An instruction is a user with an opcode, a parent block and
//! intrusive prev/next links forming the block's ordered list. Operand
//! layout is fixed per opcode: binaries are `[lhs, rhs]`, stores are
//! `[value, ptr]`, branches carry their targets as block-label
//! operands (1 operand unconditional, 3 conditional), phis flatten
//! their incoming pairs as `[v0, b0, v1, b1, ...]` and calls are
//! `[callee, args...]`.

use basalt_common::{BlockId, InstId, TypeId, ValueId};
use serde::{Deserialize, Serialize};

use crate::module::Module;

/// Integer comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl IntPredicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
        }
    }
}

/// Float comparison predicates. The plain spellings are shorthands
/// that print as their ordered counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatPredicate {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
}

impl FloatPredicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            FloatPredicate::Eq | FloatPredicate::Oeq => "oeq",
            FloatPredicate::Ne | FloatPredicate::One => "one",
            FloatPredicate::Lt | FloatPredicate::Olt => "olt",
            FloatPredicate::Le | FloatPredicate::Ole => "ole",
            FloatPredicate::Gt | FloatPredicate::Ogt => "ogt",
            FloatPredicate::Ge | FloatPredicate::Oge => "oge",
        }
    }
}

/// The opcode universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // Binary arithmetic
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,

    // Unary
    Neg,
    FNeg,
    Not,
    BitNot,

    // Bitwise and shifts
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    LShr,
    AShr,

    // Memory
    Alloca,
    Load,
    Store,
    GetElementPtr,

    // Comparison
    ICmp(IntPredicate),
    FCmp(FloatPredicate),

    // Control flow
    Br,
    CondBr,
    Ret,
    Unreachable,

    Phi,
    Call,

    // Casts
    ZExt,
    SExt,
    Trunc,
    SIToFP,
    UIToFP,
    FPToSI,
    FPToUI,
    FPExt,
    FPTrunc,
    PtrToInt,
    IntToPtr,
    BitCast,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::UDiv => "udiv",
            Opcode::SDiv => "sdiv",
            Opcode::URem => "urem",
            Opcode::SRem => "srem",
            Opcode::Neg => "neg",
            Opcode::FNeg => "fneg",
            Opcode::Not => "not",
            Opcode::BitNot => "bitnot",
            Opcode::BitAnd => "and",
            Opcode::BitOr => "or",
            Opcode::BitXor => "xor",
            Opcode::Shl => "shl",
            Opcode::LShr => "lshr",
            Opcode::AShr => "ashr",
            Opcode::Alloca => "alloca",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::GetElementPtr => "getelementptr",
            Opcode::ICmp(_) => "icmp",
            Opcode::FCmp(_) => "fcmp",
            Opcode::Br | Opcode::CondBr => "br",
            Opcode::Ret => "ret",
            Opcode::Unreachable => "unreachable",
            Opcode::Phi => "phi",
            Opcode::Call => "call",
            Opcode::ZExt => "zext",
            Opcode::SExt => "sext",
            Opcode::Trunc => "trunc",
            Opcode::SIToFP => "sitofp",
            Opcode::UIToFP => "uitofp",
            Opcode::FPToSI => "fptosi",
            Opcode::FPToUI => "fptoui",
            Opcode::FPExt => "fpext",
            Opcode::FPTrunc => "fptrunc",
            Opcode::PtrToInt => "ptrtoint",
            Opcode::IntToPtr => "inttoptr",
            Opcode::BitCast => "bitcast",
        }
    }

    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::Br | Opcode::CondBr | Opcode::Ret | Opcode::Unreachable
        )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::UDiv
                | Opcode::SDiv
                | Opcode::URem
                | Opcode::SRem
                | Opcode::BitAnd
                | Opcode::BitOr
                | Opcode::BitXor
                | Opcode::Shl
                | Opcode::LShr
                | Opcode::AShr
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Opcode::Neg | Opcode::FNeg | Opcode::Not | Opcode::BitNot
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, Opcode::ICmp(_) | Opcode::FCmp(_))
    }

    pub fn is_cast(self) -> bool {
        matches!(
            self,
            Opcode::ZExt
                | Opcode::SExt
                | Opcode::Trunc
                | Opcode::SIToFP
                | Opcode::UIToFP
                | Opcode::FPToSI
                | Opcode::FPToUI
                | Opcode::FPExt
                | Opcode::FPTrunc
                | Opcode::PtrToInt
                | Opcode::IntToPtr
                | Opcode::BitCast
        )
    }
}

/// An instruction record inside the module arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstData {
    pub opcode: Opcode,
    pub(crate) value: ValueId,
    pub(crate) block: BlockId,
    pub(crate) prev: Option<InstId>,
    pub(crate) next: Option<InstId>,
    pub(crate) operands: Vec<ValueId>,
}

impl Module {
    pub fn inst(&self, i: InstId) -> &InstData {
        &self.insts[i.index()]
    }

    pub fn inst_opcode(&self, i: InstId) -> Opcode {
        self.insts[i.index()].opcode
    }

    /// The result value of this instruction (void-typed for
    /// instructions that produce nothing).
    pub fn inst_value(&self, i: InstId) -> ValueId {
        self.insts[i.index()].value
    }

    pub fn inst_block(&self, i: InstId) -> BlockId {
        self.insts[i.index()].block
    }

    pub fn inst_operands(&self, i: InstId) -> &[ValueId] {
        &self.insts[i.index()].operands
    }

    pub fn inst_prev(&self, i: InstId) -> Option<InstId> {
        self.insts[i.index()].prev
    }

    pub fn inst_next(&self, i: InstId) -> Option<InstId> {
        self.insts[i.index()].next
    }

    /// Explicit-arity rule: one operand is an unconditional branch,
    /// three (cond, true, false) a conditional one.
    pub fn branch_is_conditional(&self, i: InstId) -> bool {
        self.inst_operands(i).len() == 3
    }

    /// Target of an unconditional branch.
    pub fn branch_target(&self, i: InstId) -> Option<BlockId> {
        match self.inst_opcode(i) {
            Opcode::Br => self.value_as_block(self.inst_operands(i)[0]),
            _ => None,
        }
    }

    pub fn branch_condition(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::CondBr => self.inst_operands(i).first().copied(),
            _ => None,
        }
    }

    pub fn branch_true_target(&self, i: InstId) -> Option<BlockId> {
        match self.inst_opcode(i) {
            Opcode::CondBr => self.value_as_block(self.inst_operands(i)[1]),
            _ => None,
        }
    }

    pub fn branch_false_target(&self, i: InstId) -> Option<BlockId> {
        match self.inst_opcode(i) {
            Opcode::CondBr => self.value_as_block(self.inst_operands(i)[2]),
            _ => None,
        }
    }

    /// Successor blocks implied by a terminator, in edge order with
    /// multiplicity.
    pub fn terminator_successors(&self, i: InstId) -> Vec<BlockId> {
        match self.inst_opcode(i) {
            Opcode::Br => self.branch_target(i).into_iter().collect(),
            Opcode::CondBr => self
                .branch_true_target(i)
                .into_iter()
                .chain(self.branch_false_target(i))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn ret_value(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::Ret => self.inst_operands(i).first().copied(),
            _ => None,
        }
    }

    pub fn phi_num_incoming(&self, i: InstId) -> usize {
        self.inst_operands(i).len() / 2
    }

    /// The k-th incoming (value, block) pair of a phi.
    pub fn phi_incoming(&self, i: InstId, k: usize) -> Option<(ValueId, BlockId)> {
        let operands = self.inst_operands(i);
        let value = *operands.get(2 * k)?;
        let block = self.value_as_block(*operands.get(2 * k + 1)?)?;
        Some((value, block))
    }

    pub fn call_callee(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::Call => self.inst_operands(i).first().copied(),
            _ => None,
        }
    }

    pub fn call_args(&self, i: InstId) -> &[ValueId] {
        match self.inst_opcode(i) {
            Opcode::Call => &self.inst_operands(i)[1..],
            _ => &[],
        }
    }

    pub fn load_pointer(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::Load => self.inst_operands(i).first().copied(),
            _ => None,
        }
    }

    pub fn store_value(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::Store => self.inst_operands(i).first().copied(),
            _ => None,
        }
    }

    pub fn store_pointer(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::Store => self.inst_operands(i).get(1).copied(),
            _ => None,
        }
    }

    pub fn gep_base(&self, i: InstId) -> Option<ValueId> {
        match self.inst_opcode(i) {
            Opcode::GetElementPtr => self.inst_operands(i).first().copied(),
            _ => None,
        }
    }

    pub fn gep_indices(&self, i: InstId) -> &[ValueId] {
        match self.inst_opcode(i) {
            Opcode::GetElementPtr => &self.inst_operands(i)[1..],
            _ => &[],
        }
    }

    /// The type an alloca reserves space for (the pointee of its
    /// result type).
    pub fn alloca_allocated_type(&self, i: InstId) -> Option<TypeId> {
        match self.inst_opcode(i) {
            Opcode::Alloca => self.element_type(self.value_type(self.inst_value(i))),
            _ => None,
        }
    }

    pub fn cast_source(&self, i: InstId) -> Option<ValueId> {
        if self.inst_opcode(i).is_cast() {
            self.inst_operands(i).first().copied()
        } else {
            None
        }
    }
}
