//! IR verification
//!
//! Structural checks over a built module: terminator placement, phi
//! discipline, CFG edge mirroring and use-list symmetry. The builder
//! maintains these invariants; the verifier is the independent witness
//! that they held up through arbitrary mutation.

use basalt_common::{BlockId, FuncId, IrError, IrResult};

use crate::instruction::Opcode;
use crate::module::Module;

/// Verify every function in the module.
pub fn verify_module(module: &Module) -> IrResult<()> {
    for f in module.function_ids() {
        verify_function(module, f)?;
    }
    Ok(())
}

/// Verify one function.
pub fn verify_function(module: &Module, f: FuncId) -> IrResult<()> {
    for &block in module.func_blocks(f) {
        verify_block(module, block)?;
    }
    verify_cfg_mirror(module, f)?;
    verify_use_lists(module, f)?;
    Ok(())
}

fn verify_block(module: &Module, block: BlockId) -> IrResult<()> {
    let name = module.block_name(block);
    let insts: Vec<_> = module.block_insts(block).collect();
    if insts.is_empty() {
        return Ok(());
    }

    // Exactly one terminator, and it is the last instruction
    let tail = *insts.last().unwrap();
    if !module.inst_opcode(tail).is_terminator() {
        return Err(IrError::internal(format!(
            "block '{}' does not end with a terminator",
            name
        )));
    }
    for &inst in &insts[..insts.len() - 1] {
        if module.inst_opcode(inst).is_terminator() {
            return Err(IrError::internal(format!(
                "block '{}' has a terminator before its end",
                name
            )));
        }
    }

    // Phi nodes form a prefix
    let mut seen_non_phi = false;
    for &inst in &insts {
        if module.inst_opcode(inst) == Opcode::Phi {
            if seen_non_phi {
                return Err(IrError::internal(format!(
                    "block '{}' has a phi after a non-phi instruction",
                    name
                )));
            }
        } else {
            seen_non_phi = true;
        }
        if module.inst_block(inst) != block {
            return Err(IrError::internal(format!(
                "instruction in block '{}' records a different parent",
                name
            )));
        }
    }

    // Phi arity matches the distinct predecessors, types match the phi
    let distinct = module.num_distinct_predecessors(block);
    for &inst in &insts {
        if module.inst_opcode(inst) != Opcode::Phi {
            break;
        }
        let arity = module.phi_num_incoming(inst);
        if arity != distinct {
            return Err(IrError::internal(format!(
                "phi in block '{}' has {} incoming edges for {} predecessors",
                name, arity, distinct
            )));
        }
        let phi_ty = module.value_type(module.inst_value(inst));
        for k in 0..arity {
            let (value, incoming_block) = module.phi_incoming(inst, k).ok_or_else(|| {
                IrError::internal(format!("phi in block '{}' has a malformed pair", name))
            })?;
            if !module.types_equal_unqualified(module.value_type(value), phi_ty) {
                return Err(IrError::internal(format!(
                    "phi in block '{}' has an incoming value of the wrong type",
                    name
                )));
            }
            if !module.predecessors(block).contains(&incoming_block) {
                return Err(IrError::internal(format!(
                    "phi in block '{}' names '{}' which is not a predecessor",
                    name,
                    module.block_name(incoming_block)
                )));
            }
        }
    }
    Ok(())
}

fn sorted(mut edges: Vec<BlockId>) -> Vec<BlockId> {
    edges.sort();
    edges
}

/// The stored predecessor/successor vectors must equal the edges the
/// terminators imply, with multiplicity.
fn verify_cfg_mirror(module: &Module, f: FuncId) -> IrResult<()> {
    let blocks = module.func_blocks(f);
    for &block in blocks {
        let implied = match module.terminator(block) {
            Some(term) => module.terminator_successors(term),
            None => Vec::new(),
        };
        if sorted(implied.clone()) != sorted(module.successors(block).to_vec()) {
            return Err(IrError::internal(format!(
                "successor list of block '{}' does not match its terminator",
                module.block_name(block)
            )));
        }
    }
    for &block in blocks {
        let mut implied = Vec::new();
        for &pred in blocks {
            if let Some(term) = module.terminator(pred) {
                for succ in module.terminator_successors(term) {
                    if succ == block {
                        implied.push(pred);
                    }
                }
            }
        }
        if sorted(implied) != sorted(module.predecessors(block).to_vec()) {
            return Err(IrError::internal(format!(
                "predecessor list of block '{}' does not match the CFG",
                module.block_name(block)
            )));
        }
    }
    Ok(())
}

/// Every operand edge must be mirrored by exactly as many use-list
/// entries.
fn verify_use_lists(module: &Module, f: FuncId) -> IrResult<()> {
    for &block in module.func_blocks(f) {
        for inst in module.block_insts(block) {
            let user = module.inst_value(inst);
            let operands = module.inst_operands(inst);
            for &operand in operands {
                let op_count = operands.iter().filter(|&&v| v == operand).count();
                let use_count = module.users(operand).iter().filter(|&&u| u == user).count();
                if op_count != use_count {
                    return Err(IrError::internal(format!(
                        "use-list desynchronized in block '{}': {} operand slots, {} use entries",
                        module.block_name(block),
                        op_count,
                        use_count
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;

    #[test]
    fn test_verify_clean_function() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function(
                "add",
                i32t,
                &[("a".to_string(), i32t), ("b".to_string(), i32t)],
            )
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let a = module.func_arg(func, 0).unwrap();
        let b = module.func_arg(func, 1).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let sum = builder.create_add(a, b, "sum").unwrap();
        builder.create_ret(Some(sum)).unwrap();

        verify_module(&module).unwrap();
    }

    #[test]
    fn test_verify_unterminated_block() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function("f", i32t, &[("a".to_string(), i32t)])
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let a = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        builder.create_add(a, a, "x").unwrap();

        let err = verify_function(&module, func).unwrap_err();
        assert!(matches!(err, IrError::InternalInvariant { .. }));
    }

    #[test]
    fn test_verify_diamond_with_phi() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let i1 = module.get_bool_type();
        let func = module
            .create_function("f", i32t, &[("c".to_string(), i1)])
            .unwrap();
        let a = module.create_basic_block(func, "A").unwrap();
        let b = module.create_basic_block(func, "B").unwrap();
        let c = module.create_basic_block(func, "C").unwrap();
        let d = module.create_basic_block(func, "D").unwrap();
        let cond = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(a);
        builder.create_cond_br(cond, b, c).unwrap();
        builder.set_insert_point(b);
        builder.create_br(d).unwrap();
        builder.set_insert_point(c);
        builder.create_br(d).unwrap();
        builder.set_insert_point(d);
        let one = builder.get_int32(1).unwrap();
        let two = builder.get_int32(2).unwrap();
        let phi = builder.create_phi(i32t, "merge").unwrap();
        builder.add_phi_incoming(phi, one, b).unwrap();
        builder.add_phi_incoming(phi, two, c).unwrap();
        builder.create_ret(Some(phi)).unwrap();

        verify_module(&module).unwrap();
    }

    #[test]
    fn test_verify_phi_arity_mismatch() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let i1 = module.get_bool_type();
        let func = module
            .create_function("f", i32t, &[("c".to_string(), i1)])
            .unwrap();
        let a = module.create_basic_block(func, "A").unwrap();
        let b = module.create_basic_block(func, "B").unwrap();
        let c = module.create_basic_block(func, "C").unwrap();
        let d = module.create_basic_block(func, "D").unwrap();
        let cond = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(a);
        builder.create_cond_br(cond, b, c).unwrap();
        builder.set_insert_point(b);
        builder.create_br(d).unwrap();
        builder.set_insert_point(c);
        builder.create_br(d).unwrap();
        builder.set_insert_point(d);
        let one = builder.get_int32(1).unwrap();
        let phi = builder.create_phi(i32t, "merge").unwrap();
        builder.add_phi_incoming(phi, one, b).unwrap();
        builder.create_ret(Some(phi)).unwrap();

        // Missing the incoming value for C
        assert!(verify_function(&module, func).is_err());
    }
}
