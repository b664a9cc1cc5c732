//! Type system
//!
//! Types are canonical, module-interned tag-plus-payload records. Every
//! accessor on `Module` returns the unique handle for a structural key,
//! so structural equality and handle equality coincide. Named structs
//! are the one exception to content interning: they are created opaque
//! (forward-declared) and completed later with `set_struct_body`.

use basalt_common::{IrError, IrResult, TypeId};
use serde::{Deserialize, Serialize};

use crate::module::Module;

/// Pointer size in bytes on the placeholder target.
pub const POINTER_SIZE: usize = 8;

/// Pointer width in bits on the placeholder target.
pub const POINTER_BITS: u32 = 64;

/// Default struct alignment in bytes.
// TODO: derive from a target data layout instead of hardcoding
pub const STRUCT_ALIGN: usize = 8;

/// Float widths accepted by `get_float_type`.
pub const FLOAT_WIDTHS: [u32; 4] = [16, 32, 64, 128];

/// C-style type qualifiers. Qualified types are transparent wrappers:
/// every predicate and size query forwards to the base type, but the
/// qualifier set participates in type identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restrict: bool,
}

impl Qualifiers {
    pub fn none() -> Self {
        Qualifiers::default()
    }

    pub fn const_only() -> Self {
        Qualifiers {
            is_const: true,
            ..Qualifiers::default()
        }
    }

    pub fn volatile_only() -> Self {
        Qualifiers {
            is_volatile: true,
            ..Qualifiers::default()
        }
    }

    /// True if any qualifier bit is set.
    pub fn any(&self) -> bool {
        self.is_const || self.is_volatile || self.is_restrict
    }
}

/// A named struct member. Tuple structs use empty member names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    pub ty: TypeId,
}

impl StructMember {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        StructMember {
            name: name.into(),
            ty,
        }
    }
}

/// Body and layout of a struct type. Offsets, size and alignment are
/// computed once when the body is set and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructData {
    pub name: Option<String>,
    pub members: Vec<StructMember>,
    pub offsets: Vec<usize>,
    pub size: usize,
    pub align: usize,
    pub opaque: bool,
    pub tuple: bool,
}

/// The type lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Zero-sized, no bit width.
    Void,

    /// Integer with bit width 1..=128. Width 1 models boolean.
    Integer { bits: u32, unsigned: bool },

    /// Float with width in {16, 32, 64, 128}.
    Float { bits: u32 },

    /// Pointer; layout is opaque with respect to the element type.
    Pointer { element: TypeId },

    /// Fixed-length array.
    Array { element: TypeId, len: u64 },

    /// Packed vector, no inter-element padding.
    Vector { element: TypeId, len: u64 },

    /// Named or anonymous struct.
    Struct(StructData),

    /// Function signature. Not a first-class value type.
    Function {
        ret: TypeId,
        params: Vec<(String, TypeId)>,
    },

    /// Transparent qualifier wrapper around a base type.
    Qualified { base: TypeId, quals: Qualifiers },
}

/// Structural interning key. Parameter and member names never
/// participate in identity; anonymous structs key on their member type
/// sequence alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum TypeKey {
    Void,
    Integer { bits: u32, unsigned: bool },
    Float { bits: u32 },
    Pointer(TypeId),
    Array(TypeId, u64),
    Vector(TypeId, u64),
    Function(TypeId, Vec<TypeId>),
    AnonStruct(Vec<TypeId>),
    Qualified(TypeId, Qualifiers),
}

fn round_up(value: usize, align: usize) -> usize {
    if align <= 1 {
        value
    } else {
        (value + align - 1) / align * align
    }
}

impl Module {
    fn add_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    fn intern_type(&mut self, key: TypeKey, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.type_cache.get(&key) {
            return id;
        }
        let id = self.add_type(kind);
        self.type_cache.insert(key, id);
        id
    }

    /// Read the canonical record behind a type handle.
    pub fn type_kind(&self, ty: TypeId) -> &TypeKind {
        &self.types[ty.index()]
    }

    pub fn get_void_type(&mut self) -> TypeId {
        self.intern_type(TypeKey::Void, TypeKind::Void)
    }

    pub fn get_integer_type(&mut self, bits: u32, unsigned: bool) -> TypeId {
        debug_assert!((1..=128).contains(&bits), "integer width out of range");
        self.intern_type(
            TypeKey::Integer { bits, unsigned },
            TypeKind::Integer { bits, unsigned },
        )
    }

    /// The i1 type used by comparisons and conditional branches.
    pub fn get_bool_type(&mut self) -> TypeId {
        self.get_integer_type(1, false)
    }

    pub fn get_float_type(&mut self, bits: u32) -> TypeId {
        debug_assert!(FLOAT_WIDTHS.contains(&bits), "unsupported float width");
        self.intern_type(TypeKey::Float { bits }, TypeKind::Float { bits })
    }

    pub fn get_pointer_type(&mut self, element: TypeId) -> TypeId {
        self.intern_type(TypeKey::Pointer(element), TypeKind::Pointer { element })
    }

    pub fn get_array_type(&mut self, element: TypeId, len: u64) -> TypeId {
        self.intern_type(
            TypeKey::Array(element, len),
            TypeKind::Array { element, len },
        )
    }

    pub fn get_vector_type(&mut self, element: TypeId, len: u64) -> TypeId {
        self.intern_type(
            TypeKey::Vector(element, len),
            TypeKind::Vector { element, len },
        )
    }

    /// Intern a function type. Parameter names are kept for display but
    /// do not participate in identity: two requests differing only in
    /// names return the same handle.
    pub fn get_function_type(&mut self, ret: TypeId, params: &[(String, TypeId)]) -> TypeId {
        let key = TypeKey::Function(ret, params.iter().map(|(_, t)| *t).collect());
        if let Some(&id) = self.type_cache.get(&key) {
            return id;
        }
        let id = self.add_type(TypeKind::Function {
            ret,
            params: params.to_vec(),
        });
        self.type_cache.insert(key, id);
        id
    }

    /// Wrap `base` in a qualifier set. An empty set is a no-op.
    pub fn get_qualified_type(&mut self, base: TypeId, quals: Qualifiers) -> TypeId {
        if !quals.any() {
            return base;
        }
        self.intern_type(
            TypeKey::Qualified(base, quals),
            TypeKind::Qualified { base, quals },
        )
    }

    /// Forward-declare a named struct. The result is opaque until
    /// `set_struct_body` completes it; pointers to it are valid types
    /// immediately, which is what makes recursive definitions work.
    pub fn create_struct_type(&mut self, name: &str) -> IrResult<TypeId> {
        if self.named_structs.contains_key(name) {
            return Err(IrError::state_violation(format!(
                "struct '{}' already declared",
                name
            )));
        }
        let id = self.add_type(TypeKind::Struct(StructData {
            name: Some(name.to_string()),
            members: Vec::new(),
            offsets: Vec::new(),
            size: 0,
            align: 0,
            opaque: true,
            tuple: false,
        }));
        self.named_structs.insert(name.to_string(), id);
        Ok(id)
    }

    /// Intern an anonymous struct by its member type sequence. The body
    /// is laid out immediately.
    pub fn get_struct_type(&mut self, members: Vec<StructMember>) -> TypeId {
        let key = TypeKey::AnonStruct(members.iter().map(|m| m.ty).collect());
        if let Some(&id) = self.type_cache.get(&key) {
            return id;
        }
        let (offsets, size, align) = self.layout_members(&members);
        let tuple = !members.is_empty() && members.iter().all(|m| m.name.is_empty());
        let id = self.add_type(TypeKind::Struct(StructData {
            name: None,
            members,
            offsets,
            size,
            align,
            opaque: false,
            tuple,
        }));
        self.type_cache.insert(key, id);
        id
    }

    /// Look up a named struct. Absence is not an error.
    pub fn lookup_struct_type(&self, name: &str) -> Option<TypeId> {
        self.named_structs.get(name).copied()
    }

    /// Complete an opaque struct. Calling again with an identical member
    /// list is a no-op; a differing list is a redefinition error.
    pub fn set_struct_body(&mut self, ty: TypeId, members: Vec<StructMember>) -> IrResult<()> {
        match self.type_kind(ty) {
            TypeKind::Struct(data) => {
                if !data.opaque {
                    if data.members == members {
                        return Ok(());
                    }
                    let name = data.name.clone().unwrap_or_default();
                    return Err(IrError::state_violation(format!(
                        "struct '{}' body redefined with different members",
                        name
                    )));
                }
            }
            _ => {
                return Err(IrError::shape_violation(
                    "set_struct_body target is not a struct type",
                ))
            }
        }
        let (offsets, size, align) = self.layout_members(&members);
        let tuple = !members.is_empty() && members.iter().all(|m| m.name.is_empty());
        if let TypeKind::Struct(data) = &mut self.types[ty.index()] {
            data.members = members;
            data.offsets = offsets;
            data.size = size;
            data.align = align;
            data.opaque = false;
            data.tuple = tuple;
        }
        Ok(())
    }

    /// Compute member offsets with natural alignment, the final size
    /// rounded up to the struct alignment.
    fn layout_members(&self, members: &[StructMember]) -> (Vec<usize>, usize, usize) {
        let align = STRUCT_ALIGN;
        let mut offsets = Vec::with_capacity(members.len());
        let mut current = 0usize;
        for member in members {
            let offset = round_up(current, self.type_align(member.ty));
            offsets.push(offset);
            current = offset + self.type_size(member.ty);
        }
        (offsets, round_up(current, align), align)
    }

    /// Strip every qualifier layer.
    pub fn unqualified(&self, ty: TypeId) -> TypeId {
        let mut cur = ty;
        while let TypeKind::Qualified { base, .. } = self.type_kind(cur) {
            cur = *base;
        }
        cur
    }

    /// Equality modulo qualifiers on the outermost level.
    pub fn types_equal_unqualified(&self, a: TypeId, b: TypeId) -> bool {
        self.unqualified(a) == self.unqualified(b)
    }

    /// Size in bytes. Void, function and opaque struct types report 0.
    pub fn type_size(&self, ty: TypeId) -> usize {
        match self.type_kind(ty) {
            TypeKind::Void => 0,
            TypeKind::Integer { bits, .. } => (*bits as usize + 7) / 8,
            TypeKind::Float { bits } => *bits as usize / 8,
            TypeKind::Pointer { .. } => POINTER_SIZE,
            TypeKind::Array { element, len } => self.type_size(*element) * *len as usize,
            TypeKind::Vector { element, len } => self.type_size(*element) * *len as usize,
            TypeKind::Struct(data) => data.size,
            TypeKind::Function { .. } => 0,
            TypeKind::Qualified { base, .. } => self.type_size(*base),
        }
    }

    /// Natural alignment in bytes, capped at the struct alignment so a
    /// struct's alignment is always the maximum member alignment under
    /// the placeholder target.
    pub fn type_align(&self, ty: TypeId) -> usize {
        match self.type_kind(ty) {
            TypeKind::Void | TypeKind::Function { .. } => 0,
            TypeKind::Integer { .. } | TypeKind::Float { .. } => {
                self.type_size(ty).min(STRUCT_ALIGN)
            }
            TypeKind::Pointer { .. } => POINTER_SIZE,
            TypeKind::Array { element, .. } | TypeKind::Vector { element, .. } => {
                self.type_align(*element)
            }
            TypeKind::Struct(data) => data.align,
            TypeKind::Qualified { base, .. } => self.type_align(*base),
        }
    }

    /// Width in bits.
    pub fn type_bits(&self, ty: TypeId) -> u32 {
        match self.type_kind(ty) {
            TypeKind::Void | TypeKind::Function { .. } => 0,
            TypeKind::Integer { bits, .. } | TypeKind::Float { bits } => *bits,
            TypeKind::Pointer { .. } => POINTER_BITS,
            TypeKind::Vector { element, len } => self.type_bits(*element) * *len as u32,
            TypeKind::Array { .. } | TypeKind::Struct(_) => self.type_size(ty) as u32 * 8,
            TypeKind::Qualified { base, .. } => self.type_bits(*base),
        }
    }

    /// Printable spelling of a type.
    pub fn type_name(&self, ty: TypeId) -> String {
        match self.type_kind(ty) {
            TypeKind::Void => "void".to_string(),
            TypeKind::Integer { bits, unsigned } => {
                format!("{}{}", if *unsigned { "u" } else { "i" }, bits)
            }
            TypeKind::Float { bits } => format!("f{}", bits),
            TypeKind::Pointer { element } => format!("{}*", self.type_name(*element)),
            TypeKind::Array { element, len } => {
                format!("[{} x {}]", len, self.type_name(*element))
            }
            TypeKind::Vector { element, len } => {
                format!("<{} x {}>", len, self.type_name(*element))
            }
            TypeKind::Struct(data) => match &data.name {
                Some(name) => format!("%{}", name),
                None => {
                    let mut result = "{ ".to_string();
                    for (i, member) in data.members.iter().enumerate() {
                        if i != 0 {
                            result.push_str(", ");
                        }
                        result.push_str(&self.type_name(member.ty));
                    }
                    result.push_str(" }");
                    result
                }
            },
            TypeKind::Function { ret, params } => {
                let mut result = format!("{} (", self.type_name(*ret));
                for (i, (_, param)) in params.iter().enumerate() {
                    if i != 0 {
                        result.push_str(", ");
                    }
                    result.push_str(&self.type_name(*param));
                }
                result.push(')');
                result
            }
            TypeKind::Qualified { base, quals } => {
                let mut result = String::new();
                if quals.is_const {
                    result.push_str("const ");
                }
                if quals.is_volatile {
                    result.push_str("volatile ");
                }
                if quals.is_restrict {
                    result.push_str("restrict ");
                }
                result.push_str(&self.type_name(*base));
                result
            }
        }
    }

    pub fn type_is_void(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Void)
    }

    pub fn type_is_integer(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Integer { .. })
    }

    pub fn type_is_float(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Float { .. })
    }

    pub fn type_is_pointer(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Pointer { .. })
    }

    pub fn type_is_array(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Array { .. })
    }

    pub fn type_is_vector(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Vector { .. })
    }

    pub fn type_is_struct(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Struct(_))
    }

    pub fn type_is_function(&self, ty: TypeId) -> bool {
        matches!(self.type_kind(self.unqualified(ty)), TypeKind::Function { .. })
    }

    /// True for i1.
    pub fn type_is_bool(&self, ty: TypeId) -> bool {
        matches!(
            self.type_kind(self.unqualified(ty)),
            TypeKind::Integer { bits: 1, .. }
        )
    }

    pub fn int_width(&self, ty: TypeId) -> Option<u32> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Integer { bits, .. } => Some(*bits),
            _ => None,
        }
    }

    pub fn int_is_unsigned(&self, ty: TypeId) -> Option<bool> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Integer { unsigned, .. } => Some(*unsigned),
            _ => None,
        }
    }

    pub fn float_width(&self, ty: TypeId) -> Option<u32> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Float { bits } => Some(*bits),
            _ => None,
        }
    }

    /// Element type of a pointer, array or vector.
    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Pointer { element }
            | TypeKind::Array { element, .. }
            | TypeKind::Vector { element, .. } => Some(*element),
            _ => None,
        }
    }

    pub fn array_len(&self, ty: TypeId) -> Option<u64> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn vector_len(&self, ty: TypeId) -> Option<u64> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Vector { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn function_return_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Function { ret, .. } => Some(*ret),
            _ => None,
        }
    }

    pub fn function_param_types(&self, ty: TypeId) -> Option<Vec<TypeId>> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Function { params, .. } => {
                Some(params.iter().map(|(_, t)| *t).collect())
            }
            _ => None,
        }
    }

    pub fn struct_members(&self, ty: TypeId) -> Option<&[StructMember]> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Struct(data) => Some(&data.members),
            _ => None,
        }
    }

    pub fn struct_member_offset(&self, ty: TypeId, index: usize) -> Option<usize> {
        match self.type_kind(self.unqualified(ty)) {
            TypeKind::Struct(data) => data.offsets.get(index).copied(),
            _ => None,
        }
    }

    pub fn struct_member_index(&self, ty: TypeId, name: &str) -> Option<usize> {
        self.struct_members(ty)?
            .iter()
            .position(|m| m.name == name)
    }

    pub fn struct_is_opaque(&self, ty: TypeId) -> bool {
        matches!(
            self.type_kind(self.unqualified(ty)),
            TypeKind::Struct(StructData { opaque: true, .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_interning() {
        let mut module = Module::new("test".to_string());
        let a = module.get_integer_type(32, false);
        for _ in 0..10 {
            assert_eq!(module.get_integer_type(32, false), a);
        }
        assert_ne!(module.get_integer_type(32, true), a);
        assert_ne!(module.get_integer_type(64, false), a);
        assert_eq!(module.get_float_type(64), module.get_float_type(64));
        assert_eq!(module.get_void_type(), module.get_void_type());
    }

    #[test]
    fn test_compound_interning() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let i64t = module.get_integer_type(64, false);
        assert_eq!(
            module.get_pointer_type(i32t),
            module.get_pointer_type(i32t)
        );
        assert_ne!(
            module.get_pointer_type(i32t),
            module.get_pointer_type(i64t)
        );
        assert_eq!(
            module.get_array_type(i32t, 4),
            module.get_array_type(i32t, 4)
        );
        assert_ne!(
            module.get_array_type(i32t, 4),
            module.get_array_type(i32t, 5)
        );
        assert_ne!(
            module.get_array_type(i32t, 4),
            module.get_vector_type(i32t, 4)
        );
    }

    #[test]
    fn test_function_type_ignores_param_names() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let a = module.get_function_type(
            i32t,
            &[("a".to_string(), i32t), ("b".to_string(), i32t)],
        );
        let b = module.get_function_type(
            i32t,
            &[("x".to_string(), i32t), ("y".to_string(), i32t)],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_sizes() {
        let mut module = Module::new("test".to_string());
        let i1 = module.get_integer_type(1, false);
        let i32t = module.get_integer_type(32, false);
        let f64t = module.get_float_type(64);
        let ptr = module.get_pointer_type(i32t);
        let arr = module.get_array_type(i32t, 10);
        let void = module.get_void_type();

        assert_eq!(module.type_size(i1), 1);
        assert_eq!(module.type_size(i32t), 4);
        assert_eq!(module.type_size(f64t), 8);
        assert_eq!(module.type_size(ptr), POINTER_SIZE);
        assert_eq!(module.type_size(arr), 40);
        assert_eq!(module.type_size(void), 0);
        assert_eq!(module.type_bits(i1), 1);
        assert_eq!(module.type_bits(ptr), POINTER_BITS);
    }

    #[test]
    fn test_struct_layout() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let i64t = module.get_integer_type(64, false);
        let st = module.get_struct_type(vec![
            StructMember::new("a", i32t),
            StructMember::new("b", i64t),
        ]);
        assert_eq!(module.struct_member_offset(st, 0), Some(0));
        assert_eq!(module.struct_member_offset(st, 1), Some(8));
        assert_eq!(module.type_size(st), 16);
        assert_eq!(module.type_align(st), STRUCT_ALIGN);
        assert_eq!(module.struct_member_index(st, "b"), Some(1));
        assert_eq!(module.struct_member_index(st, "c"), None);
    }

    #[test]
    fn test_struct_layout_padding() {
        let mut module = Module::new("test".to_string());
        let i8t = module.get_integer_type(8, false);
        let i16t = module.get_integer_type(16, false);
        let st = module.get_struct_type(vec![
            StructMember::new("a", i8t),
            StructMember::new("b", i16t),
            StructMember::new("c", i8t),
        ]);
        assert_eq!(module.struct_member_offset(st, 0), Some(0));
        assert_eq!(module.struct_member_offset(st, 1), Some(2));
        assert_eq!(module.struct_member_offset(st, 2), Some(4));
        assert_eq!(module.type_size(st), 8);
    }

    #[test]
    fn test_anonymous_struct_interning() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let a = module.get_struct_type(vec![StructMember::new("x", i32t)]);
        let b = module.get_struct_type(vec![StructMember::new("y", i32t)]);
        assert_eq!(a, b, "anonymous structs key on member types only");
    }

    #[test]
    fn test_opaque_struct_recursion() {
        let mut module = Module::new("test".to_string());
        let node = module.create_struct_type("Node").unwrap();
        assert!(module.struct_is_opaque(node));
        assert_eq!(module.type_size(node), 0);
        assert_eq!(module.lookup_struct_type("Node"), Some(node));
        assert_eq!(module.lookup_struct_type("Missing"), None);

        let i32t = module.get_integer_type(32, false);
        let node_ptr = module.get_pointer_type(node);
        module
            .set_struct_body(
                node,
                vec![
                    StructMember::new("value", i32t),
                    StructMember::new("next", node_ptr),
                ],
            )
            .unwrap();
        assert!(!module.struct_is_opaque(node));
        assert_eq!(module.struct_member_offset(node, 1), Some(8));
        assert_eq!(module.type_size(node), 16);
    }

    #[test]
    fn test_struct_body_redefinition() {
        let mut module = Module::new("test".to_string());
        let st = module.create_struct_type("S").unwrap();
        let i32t = module.get_integer_type(32, false);
        let i64t = module.get_integer_type(64, false);
        let body = vec![StructMember::new("a", i32t)];
        module.set_struct_body(st, body.clone()).unwrap();

        // Identical body is idempotent
        assert!(module.set_struct_body(st, body).is_ok());

        // Different body is a redefinition
        let err = module
            .set_struct_body(st, vec![StructMember::new("a", i64t)])
            .unwrap_err();
        assert!(matches!(err, IrError::StateViolation { .. }));

        // Duplicate declaration is rejected
        assert!(module.create_struct_type("S").is_err());
    }

    #[test]
    fn test_qualified_transparency() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let ci32 = module.get_qualified_type(i32t, Qualifiers::const_only());
        assert_ne!(ci32, i32t);
        assert_eq!(
            module.get_qualified_type(i32t, Qualifiers::const_only()),
            ci32
        );
        assert_eq!(module.get_qualified_type(i32t, Qualifiers::none()), i32t);
        assert!(module.type_is_integer(ci32));
        assert_eq!(module.type_size(ci32), 4);
        assert_eq!(module.type_bits(ci32), 32);
        assert!(module.types_equal_unqualified(ci32, i32t));
        assert_eq!(module.type_name(ci32), "const i32");
    }

    #[test]
    fn test_type_names() {
        let mut module = Module::new("test".to_string());
        let i32t = module.get_integer_type(32, false);
        let u8t = module.get_integer_type(8, true);
        let f32t = module.get_float_type(32);
        let ptr = module.get_pointer_type(i32t);
        let arr = module.get_array_type(u8t, 3);
        let vec4 = module.get_vector_type(f32t, 4);
        assert_eq!(module.type_name(i32t), "i32");
        assert_eq!(module.type_name(u8t), "u8");
        assert_eq!(module.type_name(ptr), "i32*");
        assert_eq!(module.type_name(arr), "[3 x u8]");
        assert_eq!(module.type_name(vec4), "<4 x f32>");

        let st = module.get_struct_type(vec![
            StructMember::new("a", i32t),
            StructMember::new("b", f32t),
        ]);
        assert_eq!(module.type_name(st), "{ i32, f32 }");

        let named = module.create_struct_type("Pair").unwrap();
        assert_eq!(module.type_name(named), "%Pair");
    }
}
