//! Textual IR emission
//!
//! Walks the read-only traversal API and renders LLVM-style text.
//! Anonymous values get `%`-numbered names per function, arguments
//! first and then instruction results, in creation order.

use std::collections::HashMap;

use basalt_common::{FuncId, GlobalId, InstId, ValueId};

use crate::constant::{escape_bytes, ConstantKind};
use crate::instruction::Opcode;
use crate::module::Module;
use crate::value::ValueKind;

/// Render the whole module: globals first, then functions.
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    for g in module.global_ids() {
        out.push_str(&print_global(module, g));
    }
    for f in module.function_ids() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&print_function(module, f));
    }
    out
}

/// `@name = (constant|global) <type> <init-or-zeroinitializer>`
pub fn print_global(module: &Module, g: GlobalId) -> String {
    let data = module.global(g);
    let keyword = if data.is_constant { "constant" } else { "global" };
    let init = match data.initializer {
        Some(init) => format_constant(module, init),
        None => "zeroinitializer".to_string(),
    };
    format!(
        "@{} = {} {} {}\n",
        data.name,
        keyword,
        module.type_name(data.value_type),
        init
    )
}

/// Render one function definition or declaration.
pub fn print_function(module: &Module, f: FuncId) -> String {
    let ret = module.type_name(module.func_return_type(f));
    if module.func_is_declaration(f) {
        let params: Vec<String> = module
            .func_args(f)
            .iter()
            .map(|&arg| module.type_name(module.value_type(arg)))
            .collect();
        return format!("declare {} @{}({})\n", ret, module.func_name(f), params.join(", "));
    }

    let names = assign_local_names(module, f);
    let params: Vec<String> = module
        .func_args(f)
        .iter()
        .map(|&arg| {
            format!(
                "{} {}",
                module.type_name(module.value_type(arg)),
                names[&arg]
            )
        })
        .collect();

    let mut out = format!(
        "define {} @{}({}) {{\n",
        ret,
        module.func_name(f),
        params.join(", ")
    );
    for &block in module.func_blocks(f) {
        out.push_str(module.block_name(block));
        out.push_str(":\n");
        for inst in module.block_insts(block) {
            out.push_str(&print_inst(module, &names, inst));
        }
    }
    out.push_str("}\n");
    out
}

/// Number the function's anonymous values: arguments first, then
/// instruction results in block order.
fn assign_local_names(module: &Module, f: FuncId) -> HashMap<ValueId, String> {
    let mut names = HashMap::new();
    let mut counter = 0usize;
    let mut assign = |v: ValueId, names: &mut HashMap<ValueId, String>| {
        let given = module.value_name(v);
        let name = if given.is_empty() {
            let name = format!("%{}", counter);
            counter += 1;
            name
        } else {
            format!("%{}", given)
        };
        names.insert(v, name);
    };
    for &arg in module.func_args(f) {
        assign(arg, &mut names);
    }
    for &block in module.func_blocks(f) {
        for inst in module.block_insts(block) {
            let value = module.inst_value(inst);
            if !module.type_is_void(module.value_type(value)) {
                assign(value, &mut names);
            }
        }
    }
    names
}

fn format_value(module: &Module, names: &HashMap<ValueId, String>, v: ValueId) -> String {
    match module.value_kind(v) {
        ValueKind::Constant(_) => format_constant(module, v),
        ValueKind::Global(g) => format!("@{}", module.global(*g).name),
        ValueKind::Function(f) => format!("@{}", module.func_name(*f)),
        ValueKind::Block(b) => format!("%{}", module.block_name(*b)),
        _ => names
            .get(&v)
            .cloned()
            .unwrap_or_else(|| format!("%{}", module.value_name(v))),
    }
}

fn format_constant(module: &Module, v: ValueId) -> String {
    match module.value_kind(v) {
        ValueKind::Constant(ConstantKind::Int { .. }) => {
            let ty = module.value_type(v);
            if module.int_is_unsigned(ty) == Some(true) {
                format!("{}", module.const_int_value(v).unwrap())
            } else {
                format!("{}", module.const_int_signed_value(v).unwrap())
            }
        }
        ValueKind::Constant(ConstantKind::Float { .. }) => {
            format!("{:?}", module.const_fp_value(v).unwrap())
        }
        ValueKind::Constant(ConstantKind::PointerNull) => "null".to_string(),
        ValueKind::Constant(ConstantKind::AggregateZero) => "zeroinitializer".to_string(),
        ValueKind::Constant(ConstantKind::String { bytes }) => {
            format!("c\"{}\"", escape_bytes(bytes))
        }
        ValueKind::Constant(ConstantKind::Array { elements }) => {
            let parts: Vec<String> = elements
                .iter()
                .map(|&e| {
                    format!(
                        "{} {}",
                        module.type_name(module.value_type(e)),
                        format_constant(module, e)
                    )
                })
                .collect();
            format!("[{}]", parts.join(", "))
        }
        ValueKind::Constant(ConstantKind::Struct { members }) => {
            let parts: Vec<String> = members
                .iter()
                .map(|&m| {
                    format!(
                        "{} {}",
                        module.type_name(module.value_type(m)),
                        format_constant(module, m)
                    )
                })
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        _ => format!("@{}", module.value_name(v)),
    }
}

fn type_of(module: &Module, v: ValueId) -> String {
    module.type_name(module.value_type(v))
}

fn print_inst(module: &Module, names: &HashMap<ValueId, String>, inst: InstId) -> String {
    let value = module.inst_value(inst);
    let operands = module.inst_operands(inst);
    let opcode = module.inst_opcode(inst);
    let result = || names.get(&value).cloned().unwrap_or_default();
    let fmt = |v: ValueId| format_value(module, names, v);

    match opcode {
        Opcode::Alloca => {
            let allocated = module.alloca_allocated_type(inst).unwrap();
            format!("  {} = alloca {}\n", result(), module.type_name(allocated))
        }
        Opcode::Load => {
            let ptr = operands[0];
            format!(
                "  {} = load {}, {} {}\n",
                result(),
                type_of(module, value),
                type_of(module, ptr),
                fmt(ptr)
            )
        }
        Opcode::Store => {
            let (v, ptr) = (operands[0], operands[1]);
            format!(
                "  store {} {}, {} {}\n",
                type_of(module, v),
                fmt(v),
                type_of(module, ptr),
                fmt(ptr)
            )
        }
        Opcode::ICmp(pred) => format!(
            "  {} = icmp {} {} {}, {}\n",
            result(),
            pred.mnemonic(),
            type_of(module, operands[0]),
            fmt(operands[0]),
            fmt(operands[1])
        ),
        Opcode::FCmp(pred) => format!(
            "  {} = fcmp {} {} {}, {}\n",
            result(),
            pred.mnemonic(),
            type_of(module, operands[0]),
            fmt(operands[0]),
            fmt(operands[1])
        ),
        Opcode::Br => format!("  br label {}\n", fmt(operands[0])),
        Opcode::CondBr => format!(
            "  br i1 {}, label {}, label {}\n",
            fmt(operands[0]),
            fmt(operands[1]),
            fmt(operands[2])
        ),
        Opcode::Ret => match operands.first() {
            Some(&v) => format!("  ret {} {}\n", type_of(module, v), fmt(v)),
            None => "  ret void\n".to_string(),
        },
        Opcode::Unreachable => "  unreachable\n".to_string(),
        Opcode::Phi => {
            let mut incoming = Vec::with_capacity(module.phi_num_incoming(inst));
            for k in 0..module.phi_num_incoming(inst) {
                let (v, b) = module.phi_incoming(inst, k).unwrap();
                incoming.push(format!("[ {}, %{} ]", fmt(v), module.block_name(b)));
            }
            format!(
                "  {} = phi {} {}\n",
                result(),
                type_of(module, value),
                incoming.join(", ")
            )
        }
        Opcode::GetElementPtr => {
            let base = operands[0];
            let pointee = module
                .element_type(module.value_type(base))
                .map(|t| module.type_name(t))
                .unwrap_or_default();
            let mut out = format!(
                "  {} = getelementptr {}, {} {}",
                result(),
                pointee,
                type_of(module, base),
                fmt(base)
            );
            for &index in &operands[1..] {
                out.push_str(&format!(", {} {}", type_of(module, index), fmt(index)));
            }
            out.push('\n');
            out
        }
        Opcode::Call => {
            let callee = operands[0];
            let args: Vec<String> = operands[1..]
                .iter()
                .map(|&a| format!("{} {}", type_of(module, a), fmt(a)))
                .collect();
            let ret_ty = module.value_type(value);
            if module.type_is_void(ret_ty) {
                format!("  call void {}({})\n", fmt(callee), args.join(", "))
            } else {
                format!(
                    "  {} = call {} {}({})\n",
                    result(),
                    module.type_name(ret_ty),
                    fmt(callee),
                    args.join(", ")
                )
            }
        }
        _ if opcode.is_cast() => {
            let source = operands[0];
            format!(
                "  {} = {} {} {} to {}\n",
                result(),
                opcode.mnemonic(),
                type_of(module, source),
                fmt(source),
                type_of(module, value)
            )
        }
        _ if opcode.is_unary() => format!(
            "  {} = {} {} {}\n",
            result(),
            opcode.mnemonic(),
            type_of(module, value),
            fmt(operands[0])
        ),
        _ => format!(
            "  {} = {} {} {}, {}\n",
            result(),
            opcode.mnemonic(),
            type_of(module, value),
            fmt(operands[0]),
            fmt(operands[1])
        ),
    }
}
