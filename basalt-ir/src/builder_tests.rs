// End-to-end construction tests for the builder facade

#[cfg(test)]
mod tests {
    use crate::builder::IrBuilder;
    use crate::instruction::{IntPredicate, Opcode};
    use crate::module::Module;
    use crate::types::StructMember;
    use basalt_common::IrError;

    #[test]
    fn test_identity_add() {
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
        let r = builder.create_add(a, b, "r").unwrap();
        let ret = builder.create_ret(Some(r)).unwrap();

        let insts: Vec<_> = module.block_insts(entry).collect();
        assert_eq!(insts.len(), 2);
        assert_eq!(module.inst_opcode(insts[0]), Opcode::Add);
        assert_eq!(module.inst_opcode(insts[1]), Opcode::Ret);

        // Use-def edges: the ret consumes r, the add consumes a and b
        assert_eq!(module.users(r), &[ret]);
        assert_eq!(module.users(a), &[r]);
        assert_eq!(module.users(b), &[r]);
        assert_eq!(module.value_type(r), i32t);
    }

    #[test]
    fn test_branch_and_phi_diamond() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let i1 = module.get_bool_type();
        let func = module
            .create_function("select", i32t, &[("c".to_string(), i1)])
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
        let phi = builder.create_phi(i32t, "m").unwrap();
        builder.add_phi_incoming(phi, one, b).unwrap();
        builder.add_phi_incoming(phi, two, c).unwrap();
        builder.create_ret(Some(phi)).unwrap();

        // A second pair for an existing predecessor is rejected
        let err = builder.add_phi_incoming(phi, one, b).unwrap_err();
        assert!(matches!(err, IrError::ShapeViolation { .. }));

        assert_eq!(module.predecessors(d), &[b, c]);
        assert_eq!(module.successors(a), &[b, c]);
        let phi_inst = module.value_as_inst(phi).unwrap();
        assert_eq!(module.phi_num_incoming(phi_inst), 2);
        assert_eq!(module.phi_incoming(phi_inst, 0), Some((one, b)));
        assert_eq!(module.phi_incoming(phi_inst, 1), Some((two, c)));
    }

    #[test]
    fn test_struct_gep_and_store() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let i64t = module.get_integer_type(64, false);
        let st = module.create_struct_type("S").unwrap();
        module
            .set_struct_body(
                st,
                vec![StructMember::new("a", i32t), StructMember::new("b", i64t)],
            )
            .unwrap();
        let void = module.get_void_type();
        let func = module.create_function("f", void, &[]).unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let slot = builder.create_alloca(st, "s").unwrap();
        let field = builder.create_struct_gep(slot, 1, "b_ptr").unwrap();

        let i64_ptr = builder.module_mut().get_pointer_type(i64t);
        assert_eq!(builder.module().value_type(field), i64_ptr);

        let forty_two = builder.get_int64(42).unwrap();
        builder.create_store(forty_two, field).unwrap();

        // A mistyped store is rejected
        let narrow = builder.get_int32(42).unwrap();
        let err = builder.create_store(narrow, field).unwrap_err();
        assert!(matches!(err, IrError::TypeMismatch { .. }));

        // Member index past the body is rejected
        assert!(builder.create_struct_gep(slot, 2, "oob").is_err());

        builder.create_ret_void().unwrap();
        crate::verify::verify_module(&module).unwrap();
    }

    #[test]
    fn test_gep_walks_types() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let arr = module.get_array_type(i32t, 4);
        let void = module.get_void_type();
        let func = module.create_function("f", void, &[]).unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let slot = builder.create_alloca(arr, "arr").unwrap();
        let zero = builder.get_int32(0).unwrap();
        let two = builder.get_int32(2).unwrap();
        let elem = builder.create_gep(slot, &[zero, two], "elem").unwrap();

        let i32_ptr = builder.module_mut().get_pointer_type(i32t);
        assert_eq!(builder.module().value_type(elem), i32_ptr);

        // Non-integer index is rejected
        let half = builder.get_float(0.5).unwrap();
        let err = builder.create_gep(slot, &[half], "bad").unwrap_err();
        assert!(matches!(err, IrError::ShapeViolation { .. }));
    }

    #[test]
    fn test_opaque_struct_recursion() {
        let mut module = Module::new("test".to_string());
        let node = module.create_struct_type("Node").unwrap();
        let node_ptr = module.get_pointer_type(node);
        let i32t = module.get_integer_type(32, false);
        module
            .set_struct_body(
                node,
                vec![
                    StructMember::new("value", i32t),
                    StructMember::new("next", node_ptr),
                ],
            )
            .unwrap();

        // The pointer interned before completion is the pointer to the
        // completed struct
        assert_eq!(module.get_pointer_type(node), node_ptr);
        assert_eq!(module.struct_member_offset(node, 1), Some(8));
    }

    #[test]
    fn test_interning_scenarios() {
        let mut module = Module::new("test".to_string());
        let first = module.get_integer_type(32, false);
        for _ in 0..10 {
            assert_eq!(module.get_integer_type(32, false), first);
        }
        let fa = module.get_function_type(
            first,
            &[("x".to_string(), first), ("y".to_string(), first)],
        );
        let fb = module.get_function_type(
            first,
            &[("p".to_string(), first), ("q".to_string(), first)],
        );
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_cast_width_checks() {
        let mut module = Module::new("test".to_string());
        let i16t = module.get_integer_type(16, false);
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function("f", i32t, &[("v".to_string(), i32t)])
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let v = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);

        // Widening to a narrower type is a contract violation
        let err = builder.create_sext(v, i16t, "bad").unwrap_err();
        assert!(matches!(err, IrError::TypeMismatch { .. }));
        assert!(builder.create_zext(v, i32t, "same").is_err());

        let narrowed = builder.create_trunc(v, i16t, "n").unwrap();
        assert_eq!(builder.module().value_type(narrowed), i16t);
    }

    #[test]
    fn test_create_cast_dispatch() {
        let mut module = Module::new("test".to_string());
        let i16u = module.get_integer_type(16, true);
        let i16s = module.get_integer_type(16, false);
        let i64t = module.get_integer_type(64, false);
        let f32t = module.get_float_type(32);
        let f64t = module.get_float_type(64);
        let i64_ptr = module.get_pointer_type(i64t);
        let func = module
            .create_function(
                "f",
                i64t,
                &[
                    ("u".to_string(), i16u),
                    ("s".to_string(), i16s),
                    ("x".to_string(), f32t),
                    ("p".to_string(), i64_ptr),
                ],
            )
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let u = module.func_arg(func, 0).unwrap();
        let s = module.func_arg(func, 1).unwrap();
        let x = module.func_arg(func, 2).unwrap();
        let p = module.func_arg(func, 3).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);

        // Casting to the value's own type is the identity
        assert_eq!(builder.create_cast(u, i16u, "id").unwrap(), u);

        let widened_u = builder.create_cast(u, i64t, "wu").unwrap();
        let widened_s = builder.create_cast(s, i64t, "ws").unwrap();
        let to_f = builder.create_cast(s, f64t, "sf").unwrap();
        let from_f = builder.create_cast(x, i64t, "fi").unwrap();
        let f_wide = builder.create_cast(x, f64t, "fw").unwrap();
        let addr = builder.create_cast(p, i64t, "pi").unwrap();

        let m = builder.module();
        let op_of = |v| m.inst_opcode(m.value_as_inst(v).unwrap());
        assert_eq!(op_of(widened_u), Opcode::ZExt);
        assert_eq!(op_of(widened_s), Opcode::SExt);
        assert_eq!(op_of(to_f), Opcode::SIToFP);
        assert_eq!(op_of(from_f), Opcode::FPToSI);
        assert_eq!(op_of(f_wide), Opcode::FPExt);
        assert_eq!(op_of(addr), Opcode::PtrToInt);
    }

    #[test]
    fn test_call_validation() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let callee = module
            .create_function(
                "add",
                i32t,
                &[("a".to_string(), i32t), ("b".to_string(), i32t)],
            )
            .unwrap();
        let caller = module.create_function("main", i32t, &[]).unwrap();
        let entry = module.create_basic_block(caller, "entry").unwrap();
        let callee_value = module.func_value(callee);

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let one = builder.get_int32(1).unwrap();
        let two = builder.get_int32(2).unwrap();
        let half = builder.get_float(0.5).unwrap();

        let r = builder.create_call(callee_value, &[one, two], "r").unwrap();
        assert_eq!(builder.module().value_type(r), i32t);

        let err = builder.create_call(callee_value, &[one], "bad").unwrap_err();
        assert!(matches!(err, IrError::ShapeViolation { .. }));
        let err = builder
            .create_call(callee_value, &[one, half], "bad")
            .unwrap_err();
        assert!(matches!(err, IrError::TypeMismatch { .. }));

        builder.create_ret(Some(r)).unwrap();
        crate::verify::verify_module(&module).unwrap();
    }

    #[test]
    fn test_domain_rules() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let f64t = module.get_float_type(64);
        let func = module
            .create_function(
                "f",
                i32t,
                &[("n".to_string(), i32t), ("x".to_string(), f64t)],
            )
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let n = module.func_arg(func, 0).unwrap();
        let x = module.func_arg(func, 1).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);

        // Add accepts floats, division does not
        assert!(builder.create_add(x, x, "fx").is_ok());
        assert!(matches!(
            builder.create_sdiv(x, x, "bad").unwrap_err(),
            IrError::TypeMismatch { .. }
        ));

        // Mixed operand types are rejected
        assert!(builder.create_add(n, x, "mix").is_err());

        // Comparisons produce i1
        let cmp = builder
            .create_icmp(IntPredicate::Slt, n, n, "cmp")
            .unwrap();
        assert!(builder.module().type_is_bool(builder.module().value_type(cmp)));

        // i1 is required for conditional branches
        let exit = builder.module_mut().create_basic_block(func, "exit").unwrap();
        assert!(builder.create_cond_br(n, exit, exit).is_err());

        // Phi of void is rejected
        let void = builder.module_mut().get_void_type();
        assert!(builder.create_phi(void, "v").is_err());
    }

    #[test]
    fn test_insert_before_cursor() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function("f", i32t, &[("a".to_string(), i32t)])
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let a = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let sum = builder.create_add(a, a, "sum").unwrap();
        builder.create_ret(Some(sum)).unwrap();

        // Insert a multiply between the add and the ret
        let ret_inst = module.terminator(entry).unwrap();
        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point_before(ret_inst);
        builder.create_mul(a, a, "sq").unwrap();

        let mnemonics: Vec<_> = module
            .block_insts(entry)
            .map(|i| module.inst_opcode(i).mnemonic())
            .collect();
        assert_eq!(mnemonics, vec!["add", "mul", "ret"]);
        crate::verify::verify_module(&module).unwrap();
    }

    #[test]
    fn test_builder_without_insert_point() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function("f", i32t, &[("a".to_string(), i32t)])
            .unwrap();
        let a = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        let err = builder.create_add(a, a, "x").unwrap_err();
        assert!(matches!(err, IrError::StateViolation { .. }));
    }

    #[test]
    fn test_ret_type_checks() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let void = module.get_void_type();
        let func = module.create_function("f", void, &[]).unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let one = builder.get_int32(1).unwrap();
        assert!(builder.create_ret(Some(one)).is_err());
        builder.create_ret_void().unwrap();

        let g = module.create_function("g", i32t, &[]).unwrap();
        let g_entry = module.create_basic_block(g, "entry").unwrap();
        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(g_entry);
        assert!(builder.create_ret_void().is_err());
    }

    #[test]
    fn test_alloca_rejects_zero_sized() {
        let mut module = Module::new("test".to_string());
        let void = module.get_void_type();
        let opaque = module.create_struct_type("Fwd").unwrap();
        let func = module.create_function("f", void, &[]).unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        assert!(builder.create_alloca(void, "v").is_err());
        assert!(builder.create_alloca(opaque, "o").is_err());
    }

    #[test]
    fn test_failed_build_leaves_no_trace() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let func = module
            .create_function("f", i32t, &[("a".to_string(), i32t)])
            .unwrap();
        let entry = module.create_basic_block(func, "entry").unwrap();
        let a = module.func_arg(func, 0).unwrap();

        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        let sum = builder.create_add(a, a, "sum").unwrap();
        builder.create_ret(Some(sum)).unwrap();

        // Appending past the terminator fails without touching use-lists
        let users_before = module.users(a).len();
        let mut builder = IrBuilder::new(&mut module);
        builder.set_insert_point(entry);
        assert!(builder.create_add(a, a, "late").is_err());
        assert_eq!(module.users(a).len(), users_before);
        assert_eq!(module.block_insts(entry).count(), 2);
    }
}
