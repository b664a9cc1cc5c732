//! IR builder
//!
//! A stateful cursor over a module: a current block plus an optional
//! insert-before position. Every `create_*` method validates operand
//! types and shapes before allocating the instruction, so a failed
//! build leaves the module untouched.

use basalt_common::{BlockId, InstId, IrError, IrResult, TypeId, ValueId};

use crate::instruction::{FloatPredicate, IntPredicate, Opcode};
use crate::module::Module;
use crate::types::{StructMember, POINTER_BITS};

/// Cursor-style instruction factory borrowing the module.
pub struct IrBuilder<'m> {
    module: &'m mut Module,
    block: Option<BlockId>,
    before: Option<InstId>,
}

impl<'m> IrBuilder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self {
            module,
            block: None,
            before: None,
        }
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        self.module
    }

    /// Point the cursor at the end of `block`.
    pub fn set_insert_point(&mut self, block: BlockId) {
        self.block = Some(block);
        self.before = None;
    }

    /// Point the cursor just before `inst`.
    pub fn set_insert_point_before(&mut self, inst: InstId) {
        self.block = Some(self.module.inst_block(inst));
        self.before = Some(inst);
    }

    pub fn insert_block(&self) -> Option<BlockId> {
        self.block
    }

    fn cur_block(&self) -> IrResult<BlockId> {
        self.block
            .ok_or_else(|| IrError::state_violation("builder has no insertion point"))
    }

    /// Validate placement, allocate, and link at the cursor.
    fn push(
        &mut self,
        opcode: Opcode,
        result_ty: TypeId,
        operands: Vec<ValueId>,
        name: &str,
    ) -> IrResult<ValueId> {
        let block = self.cur_block()?;
        self.module.validate_insert(block, opcode, self.before)?;
        let (inst, value) = self.module.new_inst(block, opcode, result_ty, operands, name);
        self.module.insert_inst(block, inst, self.before)?;
        Ok(value)
    }

    fn check_same_type(&self, lhs: ValueId, rhs: ValueId, what: &str) -> IrResult<TypeId> {
        let lt = self.module.unqualified(self.module.value_type(lhs));
        let rt = self.module.unqualified(self.module.value_type(rhs));
        if lt != rt {
            return Err(IrError::type_mismatch(format!(
                "{} operands have different types ({} vs {})",
                what,
                self.module.type_name(lt),
                self.module.type_name(rt)
            )));
        }
        Ok(lt)
    }

    // ---- binary arithmetic, bitwise and shifts ----

    /// Shared constructor for all two-operand arithmetic opcodes.
    pub fn create_binary(
        &mut self,
        opcode: Opcode,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> IrResult<ValueId> {
        if !opcode.is_binary() {
            return Err(IrError::shape_violation(format!(
                "'{}' is not a binary opcode",
                opcode.mnemonic()
            )));
        }
        let ty = self.check_same_type(lhs, rhs, opcode.mnemonic())?;
        let ok = match opcode {
            Opcode::Add | Opcode::Sub | Opcode::Mul => {
                self.module.type_is_integer(ty) || self.module.type_is_float(ty)
            }
            _ => self.module.type_is_integer(ty),
        };
        if !ok {
            return Err(IrError::type_mismatch(format!(
                "'{}' is not defined on {}",
                opcode.mnemonic(),
                self.module.type_name(ty)
            )));
        }
        self.push(opcode, ty, vec![lhs, rhs], name)
    }

    pub fn create_add(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::Add, lhs, rhs, name)
    }

    pub fn create_sub(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::Sub, lhs, rhs, name)
    }

    pub fn create_mul(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::Mul, lhs, rhs, name)
    }

    pub fn create_udiv(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::UDiv, lhs, rhs, name)
    }

    pub fn create_sdiv(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::SDiv, lhs, rhs, name)
    }

    pub fn create_urem(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::URem, lhs, rhs, name)
    }

    pub fn create_srem(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::SRem, lhs, rhs, name)
    }

    pub fn create_and(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::BitAnd, lhs, rhs, name)
    }

    pub fn create_or(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::BitOr, lhs, rhs, name)
    }

    pub fn create_xor(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::BitXor, lhs, rhs, name)
    }

    pub fn create_shl(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::Shl, lhs, rhs, name)
    }

    pub fn create_lshr(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::LShr, lhs, rhs, name)
    }

    pub fn create_ashr(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> IrResult<ValueId> {
        self.create_binary(Opcode::AShr, lhs, rhs, name)
    }

    // ---- unary ----

    /// Arithmetic negation of an integer.
    pub fn create_neg(&mut self, value: ValueId, name: &str) -> IrResult<ValueId> {
        let ty = self.module.unqualified(self.module.value_type(value));
        if !self.module.type_is_integer(ty) {
            return Err(IrError::type_mismatch("neg requires an integer operand"));
        }
        self.push(Opcode::Neg, ty, vec![value], name)
    }

    /// Float negation.
    pub fn create_fneg(&mut self, value: ValueId, name: &str) -> IrResult<ValueId> {
        let ty = self.module.unqualified(self.module.value_type(value));
        if !self.module.type_is_float(ty) {
            return Err(IrError::type_mismatch("fneg requires a float operand"));
        }
        self.push(Opcode::FNeg, ty, vec![value], name)
    }

    /// Boolean negation of an i1.
    pub fn create_not(&mut self, value: ValueId, name: &str) -> IrResult<ValueId> {
        let ty = self.module.unqualified(self.module.value_type(value));
        if !self.module.type_is_bool(ty) {
            return Err(IrError::type_mismatch("not requires an i1 operand"));
        }
        self.push(Opcode::Not, ty, vec![value], name)
    }

    /// Bitwise complement of an integer.
    pub fn create_bitnot(&mut self, value: ValueId, name: &str) -> IrResult<ValueId> {
        let ty = self.module.unqualified(self.module.value_type(value));
        if !self.module.type_is_integer(ty) {
            return Err(IrError::type_mismatch("bitnot requires an integer operand"));
        }
        self.push(Opcode::BitNot, ty, vec![value], name)
    }

    // ---- memory ----

    pub fn create_alloca(&mut self, ty: TypeId, name: &str) -> IrResult<ValueId> {
        if self.module.type_size(ty) == 0 {
            return Err(IrError::state_violation(format!(
                "cannot allocate zero-sized type {}",
                self.module.type_name(ty)
            )));
        }
        let ptr = self.module.get_pointer_type(ty);
        self.push(Opcode::Alloca, ptr, Vec::new(), name)
    }

    pub fn create_load(&mut self, ptr: ValueId, name: &str) -> IrResult<ValueId> {
        let ptr_ty = self.module.value_type(ptr);
        if !self.module.type_is_pointer(ptr_ty) {
            return Err(IrError::type_mismatch("load operand must be a pointer"));
        }
        let loaded = self.module.unqualified(self.module.element_type(ptr_ty).unwrap());
        if self.module.type_size(loaded) == 0 {
            return Err(IrError::state_violation(format!(
                "cannot load zero-sized type {}",
                self.module.type_name(loaded)
            )));
        }
        self.push(Opcode::Load, loaded, vec![ptr], name)
    }

    pub fn create_store(&mut self, value: ValueId, ptr: ValueId) -> IrResult<ValueId> {
        let ptr_ty = self.module.value_type(ptr);
        if !self.module.type_is_pointer(ptr_ty) {
            return Err(IrError::type_mismatch("store operand must be a pointer"));
        }
        let elem = self.module.element_type(ptr_ty).unwrap();
        if !self
            .module
            .types_equal_unqualified(self.module.value_type(value), elem)
        {
            return Err(IrError::type_mismatch(format!(
                "stored value type {} does not match pointee {}",
                self.module.type_name(self.module.value_type(value)),
                self.module.type_name(elem)
            )));
        }
        let void = self.module.get_void_type();
        self.push(Opcode::Store, void, vec![value, ptr], "")
    }

    // ---- addressing ----

    pub fn create_gep(
        &mut self,
        ptr: ValueId,
        indices: &[ValueId],
        name: &str,
    ) -> IrResult<ValueId> {
        let result_ty = self.module.gep_result_type(ptr, indices)?;
        let mut operands = Vec::with_capacity(indices.len() + 1);
        operands.push(ptr);
        operands.extend_from_slice(indices);
        self.push(Opcode::GetElementPtr, result_ty, operands, name)
    }

    /// GEP to struct member `index`, with the leading zero index.
    pub fn create_struct_gep(
        &mut self,
        struct_ptr: ValueId,
        index: usize,
        name: &str,
    ) -> IrResult<ValueId> {
        let ptr_ty = self.module.value_type(struct_ptr);
        if !self.module.type_is_pointer(ptr_ty) {
            return Err(IrError::type_mismatch(
                "struct_gep requires a pointer operand",
            ));
        }
        let pointee = self.module.element_type(ptr_ty).unwrap();
        let members = match self.module.struct_members(pointee) {
            Some(members) => members.len(),
            None => {
                return Err(IrError::type_mismatch(
                    "struct_gep must operate on a struct pointer",
                ))
            }
        };
        if index >= members {
            return Err(IrError::shape_violation(format!(
                "struct index {} out of bounds for {} members",
                index, members
            )));
        }
        let i32t = self.module.get_integer_type(32, false);
        let zero = self.module.get_constant_int(i32t, 0)?;
        let idx = self.module.get_constant_int(i32t, index as u64)?;
        self.create_gep(struct_ptr, &[zero, idx], name)
    }

    // ---- comparisons ----

    pub fn create_icmp(
        &mut self,
        pred: IntPredicate,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> IrResult<ValueId> {
        let ty = self.check_same_type(lhs, rhs, "icmp")?;
        if !(self.module.type_is_integer(ty) || self.module.type_is_pointer(ty)) {
            return Err(IrError::type_mismatch(
                "icmp requires integer or pointer operands",
            ));
        }
        let i1 = self.module.get_bool_type();
        self.push(Opcode::ICmp(pred), i1, vec![lhs, rhs], name)
    }

    pub fn create_fcmp(
        &mut self,
        pred: FloatPredicate,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> IrResult<ValueId> {
        let ty = self.check_same_type(lhs, rhs, "fcmp")?;
        if !self.module.type_is_float(ty) {
            return Err(IrError::type_mismatch("fcmp requires float operands"));
        }
        let i1 = self.module.get_bool_type();
        self.push(Opcode::FCmp(pred), i1, vec![lhs, rhs], name)
    }

    // ---- control flow ----

    pub fn create_br(&mut self, target: BlockId) -> IrResult<ValueId> {
        let void = self.module.get_void_type();
        let label = self.module.block_value(target);
        self.push(Opcode::Br, void, vec![label], "")
    }

    pub fn create_cond_br(
        &mut self,
        cond: ValueId,
        true_block: BlockId,
        false_block: BlockId,
    ) -> IrResult<ValueId> {
        if !self.module.type_is_bool(self.module.value_type(cond)) {
            return Err(IrError::type_mismatch("branch condition must be i1"));
        }
        let void = self.module.get_void_type();
        let t = self.module.block_value(true_block);
        let f = self.module.block_value(false_block);
        self.push(Opcode::CondBr, void, vec![cond, t, f], "")
    }

    pub fn create_ret(&mut self, value: Option<ValueId>) -> IrResult<ValueId> {
        let block = self.cur_block()?;
        let func = self.module.block_func(block);
        let ret_ty = self.module.func_return_type(func);
        match value {
            Some(v) => {
                if !self
                    .module
                    .types_equal_unqualified(self.module.value_type(v), ret_ty)
                {
                    return Err(IrError::type_mismatch(format!(
                        "return value type {} does not match function return type {}",
                        self.module.type_name(self.module.value_type(v)),
                        self.module.type_name(ret_ty)
                    )));
                }
                let void = self.module.get_void_type();
                self.push(Opcode::Ret, void, vec![v], "")
            }
            None => {
                if !self.module.type_is_void(ret_ty) {
                    return Err(IrError::type_mismatch(
                        "non-void function cannot return void",
                    ));
                }
                let void = self.module.get_void_type();
                self.push(Opcode::Ret, void, Vec::new(), "")
            }
        }
    }

    pub fn create_ret_void(&mut self) -> IrResult<ValueId> {
        self.create_ret(None)
    }

    pub fn create_unreachable(&mut self) -> IrResult<ValueId> {
        let void = self.module.get_void_type();
        self.push(Opcode::Unreachable, void, Vec::new(), "")
    }

    /// Create an empty phi of `ty`. Incoming pairs are added with
    /// `add_phi_incoming`. Phis always land in the block's phi prefix,
    /// regardless of the cursor position.
    pub fn create_phi(&mut self, ty: TypeId, name: &str) -> IrResult<ValueId> {
        if self.module.type_is_void(ty) {
            return Err(IrError::type_mismatch("phi cannot have void type"));
        }
        let block = self.cur_block()?;
        let at = self.module.phi_insert_point(block);
        self.module.validate_insert(block, Opcode::Phi, at)?;
        let (inst, value) = self.module.new_inst(block, Opcode::Phi, ty, Vec::new(), name);
        self.module.insert_inst(block, inst, at)?;
        Ok(value)
    }

    pub fn add_phi_incoming(
        &mut self,
        phi: ValueId,
        value: ValueId,
        block: BlockId,
    ) -> IrResult<()> {
        self.module.phi_add_incoming(phi, value, block)
    }

    // ---- calls ----

    pub fn create_call(
        &mut self,
        callee: ValueId,
        args: &[ValueId],
        name: &str,
    ) -> IrResult<ValueId> {
        let callee_ty = self.module.value_type(callee);
        let fn_ty = if self.module.type_is_function(callee_ty) {
            self.module.unqualified(callee_ty)
        } else if self.module.type_is_pointer(callee_ty) {
            let pointee = self.module.element_type(callee_ty).unwrap();
            if !self.module.type_is_function(pointee) {
                return Err(IrError::type_mismatch(
                    "call target must be a function or function pointer",
                ));
            }
            self.module.unqualified(pointee)
        } else {
            return Err(IrError::type_mismatch(
                "call target must be a function or function pointer",
            ));
        };
        let param_types = self.module.function_param_types(fn_ty).unwrap();
        if param_types.len() != args.len() {
            return Err(IrError::shape_violation(format!(
                "call expects {} arguments, got {}",
                param_types.len(),
                args.len()
            )));
        }
        for (i, (&arg, &expected)) in args.iter().zip(param_types.iter()).enumerate() {
            if !self
                .module
                .types_equal_unqualified(self.module.value_type(arg), expected)
            {
                return Err(IrError::type_mismatch(format!(
                    "call argument {} has type {}, expected {}",
                    i,
                    self.module.type_name(self.module.value_type(arg)),
                    self.module.type_name(expected)
                )));
            }
        }
        let ret_ty = self.module.function_return_type(fn_ty).unwrap();
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(callee);
        operands.extend_from_slice(args);
        let name = if self.module.type_is_void(ret_ty) { "" } else { name };
        self.push(Opcode::Call, ret_ty, operands, name)
    }

    // ---- casts ----

    fn push_cast(
        &mut self,
        opcode: Opcode,
        value: ValueId,
        target: TypeId,
        name: &str,
    ) -> IrResult<ValueId> {
        self.push(opcode, target, vec![value], name)
    }

    fn int_widths(&self, value: ValueId, target: TypeId, what: &str) -> IrResult<(u32, u32)> {
        let src = self
            .module
            .int_width(self.module.value_type(value))
            .ok_or_else(|| IrError::type_mismatch(format!("{} source must be integer", what)))?;
        let dst = self
            .module
            .int_width(target)
            .ok_or_else(|| IrError::type_mismatch(format!("{} target must be integer", what)))?;
        Ok((src, dst))
    }

    fn float_widths(&self, value: ValueId, target: TypeId, what: &str) -> IrResult<(u32, u32)> {
        let src = self
            .module
            .float_width(self.module.value_type(value))
            .ok_or_else(|| IrError::type_mismatch(format!("{} source must be float", what)))?;
        let dst = self
            .module
            .float_width(target)
            .ok_or_else(|| IrError::type_mismatch(format!("{} target must be float", what)))?;
        Ok((src, dst))
    }

    pub fn create_zext(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let (src, dst) = self.int_widths(value, target, "zext")?;
        if dst <= src {
            return Err(IrError::type_mismatch(
                "zext must widen to a strictly larger type",
            ));
        }
        self.push_cast(Opcode::ZExt, value, target, name)
    }

    pub fn create_sext(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let (src, dst) = self.int_widths(value, target, "sext")?;
        if dst <= src {
            return Err(IrError::type_mismatch(
                "sext must widen to a strictly larger type",
            ));
        }
        self.push_cast(Opcode::SExt, value, target, name)
    }

    pub fn create_trunc(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let (src, dst) = self.int_widths(value, target, "trunc")?;
        if dst >= src {
            return Err(IrError::type_mismatch(
                "trunc must narrow to a strictly smaller type",
            ));
        }
        self.push_cast(Opcode::Trunc, value, target, name)
    }

    pub fn create_sitofp(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        if self.module.int_width(self.module.value_type(value)).is_none() {
            return Err(IrError::type_mismatch("sitofp source must be integer"));
        }
        if self.module.float_width(target).is_none() {
            return Err(IrError::type_mismatch("sitofp target must be float"));
        }
        self.push_cast(Opcode::SIToFP, value, target, name)
    }

    pub fn create_uitofp(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        if self.module.int_width(self.module.value_type(value)).is_none() {
            return Err(IrError::type_mismatch("uitofp source must be integer"));
        }
        if self.module.float_width(target).is_none() {
            return Err(IrError::type_mismatch("uitofp target must be float"));
        }
        self.push_cast(Opcode::UIToFP, value, target, name)
    }

    pub fn create_fptosi(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        if self.module.float_width(self.module.value_type(value)).is_none() {
            return Err(IrError::type_mismatch("fptosi source must be float"));
        }
        if self.module.int_width(target).is_none() {
            return Err(IrError::type_mismatch("fptosi target must be integer"));
        }
        self.push_cast(Opcode::FPToSI, value, target, name)
    }

    pub fn create_fptoui(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        if self.module.float_width(self.module.value_type(value)).is_none() {
            return Err(IrError::type_mismatch("fptoui source must be float"));
        }
        if self.module.int_width(target).is_none() {
            return Err(IrError::type_mismatch("fptoui target must be integer"));
        }
        self.push_cast(Opcode::FPToUI, value, target, name)
    }

    pub fn create_fpext(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let (src, dst) = self.float_widths(value, target, "fpext")?;
        if dst <= src {
            return Err(IrError::type_mismatch(
                "fpext must widen to a strictly larger type",
            ));
        }
        self.push_cast(Opcode::FPExt, value, target, name)
    }

    pub fn create_fptrunc(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let (src, dst) = self.float_widths(value, target, "fptrunc")?;
        if dst >= src {
            return Err(IrError::type_mismatch(
                "fptrunc must narrow to a strictly smaller type",
            ));
        }
        self.push_cast(Opcode::FPTrunc, value, target, name)
    }

    pub fn create_ptrtoint(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        if !self.module.type_is_pointer(self.module.value_type(value)) {
            return Err(IrError::type_mismatch("ptrtoint source must be a pointer"));
        }
        match self.module.int_width(target) {
            Some(bits) if bits == POINTER_BITS => {}
            Some(_) => {
                return Err(IrError::type_mismatch(
                    "ptrtoint target width must equal the pointer width",
                ))
            }
            None => return Err(IrError::type_mismatch("ptrtoint target must be integer")),
        }
        self.push_cast(Opcode::PtrToInt, value, target, name)
    }

    pub fn create_inttoptr(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        match self.module.int_width(self.module.value_type(value)) {
            Some(bits) if bits == POINTER_BITS => {}
            Some(_) => {
                return Err(IrError::type_mismatch(
                    "inttoptr source width must equal the pointer width",
                ))
            }
            None => return Err(IrError::type_mismatch("inttoptr source must be integer")),
        }
        if !self.module.type_is_pointer(target) {
            return Err(IrError::type_mismatch("inttoptr target must be a pointer"));
        }
        self.push_cast(Opcode::IntToPtr, value, target, name)
    }

    pub fn create_bitcast(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let src_ty = self.module.value_type(value);
        let scalar_or_pointer = |m: &Module, t: TypeId| {
            m.type_is_integer(t) || m.type_is_float(t) || m.type_is_pointer(t)
        };
        if !scalar_or_pointer(self.module, src_ty) || !scalar_or_pointer(self.module, target) {
            return Err(IrError::type_mismatch(
                "bitcast operands must be scalar or pointer types",
            ));
        }
        if self.module.type_size(src_ty) != self.module.type_size(target) {
            return Err(IrError::type_mismatch(
                "bitcast types must have the same size",
            ));
        }
        self.push_cast(Opcode::BitCast, value, target, name)
    }

    /// Polymorphic cast: picks the narrowest correct cast for the
    /// source and target domains. Casting a value to its own type
    /// returns the value unchanged.
    pub fn create_cast(&mut self, value: ValueId, target: TypeId, name: &str) -> IrResult<ValueId> {
        let src = self.module.unqualified(self.module.value_type(value));
        let dst = self.module.unqualified(target);
        if src == dst {
            return Ok(value);
        }
        if self.module.type_is_integer(src) && self.module.type_is_integer(dst) {
            let sb = self.module.int_width(src).unwrap();
            let db = self.module.int_width(dst).unwrap();
            return if db > sb {
                if self.module.int_is_unsigned(src) == Some(true) {
                    self.create_zext(value, dst, name)
                } else {
                    self.create_sext(value, dst, name)
                }
            } else if db < sb {
                self.create_trunc(value, dst, name)
            } else {
                self.create_bitcast(value, dst, name)
            };
        }
        if self.module.type_is_integer(src) && self.module.type_is_float(dst) {
            return if self.module.int_is_unsigned(src) == Some(true) {
                self.create_uitofp(value, dst, name)
            } else {
                self.create_sitofp(value, dst, name)
            };
        }
        if self.module.type_is_float(src) && self.module.type_is_integer(dst) {
            return if self.module.int_is_unsigned(dst) == Some(true) {
                self.create_fptoui(value, dst, name)
            } else {
                self.create_fptosi(value, dst, name)
            };
        }
        if self.module.type_is_float(src) && self.module.type_is_float(dst) {
            let sb = self.module.float_width(src).unwrap();
            let db = self.module.float_width(dst).unwrap();
            return if db > sb {
                self.create_fpext(value, dst, name)
            } else {
                self.create_fptrunc(value, dst, name)
            };
        }
        if self.module.type_is_pointer(src) && self.module.type_is_pointer(dst) {
            return self.create_bitcast(value, dst, name);
        }
        if self.module.type_is_pointer(src) && self.module.type_is_integer(dst) {
            return self.create_ptrtoint(value, dst, name);
        }
        if self.module.type_is_integer(src) && self.module.type_is_pointer(dst) {
            return self.create_inttoptr(value, dst, name);
        }
        Err(IrError::type_mismatch(format!(
            "no cast from {} to {}",
            self.module.type_name(src),
            self.module.type_name(dst)
        )))
    }

    // ---- constant and type conveniences ----

    pub fn get_int(&mut self, bits: u32, value: u64) -> IrResult<ValueId> {
        let ty = self.module.get_integer_type(bits, false);
        self.module.get_constant_int(ty, value)
    }

    pub fn get_int32(&mut self, value: i32) -> IrResult<ValueId> {
        self.get_int(32, value as i64 as u64)
    }

    pub fn get_int64(&mut self, value: i64) -> IrResult<ValueId> {
        self.get_int(64, value as u64)
    }

    pub fn get_bool(&mut self, value: bool) -> IrResult<ValueId> {
        self.get_int(1, value as u64)
    }

    /// Single-precision float constant.
    pub fn get_float(&mut self, value: f64) -> IrResult<ValueId> {
        let ty = self.module.get_float_type(32);
        self.module.get_constant_fp(ty, value)
    }

    /// Double-precision float constant.
    pub fn get_double(&mut self, value: f64) -> IrResult<ValueId> {
        let ty = self.module.get_float_type(64);
        self.module.get_constant_fp(ty, value)
    }

    pub fn get_array_type(&mut self, element: TypeId, len: u64) -> TypeId {
        self.module.get_array_type(element, len)
    }

    pub fn create_struct_type(&mut self, name: &str) -> IrResult<TypeId> {
        self.module.create_struct_type(name)
    }

    pub fn get_struct_type(&mut self, members: Vec<StructMember>) -> TypeId {
        self.module.get_struct_type(members)
    }
}
