//! The `TypeInfo` lattice (spec §3.2–§3.4, §4.2).
//!
//! Grounded in `original_source/Ast/TypeInfo.h` / `TypeInfo.cpp` and
//! `Primitives.h`, reworked from a virtual-dispatch class hierarchy into a
//! single tagged sum type per the design note in spec.md §9: predicates
//! become `match` arms instead of overridden virtual methods, and
//! `ClassDeclarationType` identity becomes an arena index (`ClassId`)
//! rather than a `shared_ptr`.

pub mod operators;

use std::cell::Cell;
use std::fmt;

pub use operators::{OperatorId, OperatorSet};

use crate::symbols::SymbolTable;

/// Stable index into the class-declaration arena owned by the
/// [`SymbolTable`]. Two `ClassId`s are equal iff they name the same
/// declaration — this is the index-based replacement for the original's
/// pointer-equality check on `ClassDeclarationType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// The "logical name" of an integer primitive (spec §3.2 table). `byte`
/// and `charbyte` share a bit width but are distinct logical types with
/// distinct assignability rules (spec §3.3), so each logical name is its
/// own enum variant rather than a `(bits, signed)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Byte,
    CharByte,
    Char,
}

impl IntegerKind {
    pub fn bits(self) -> u8 {
        match self {
            IntegerKind::Int32 | IntegerKind::UInt32 => 32,
            IntegerKind::Int64 | IntegerKind::UInt64 => 64,
            IntegerKind::Byte | IntegerKind::CharByte => 8,
            IntegerKind::Char => 16,
        }
    }

    pub fn signed(self) -> bool {
        matches!(self, IntegerKind::Int32 | IntegerKind::Int64)
    }

    pub fn logical_name(self) -> &'static str {
        match self {
            IntegerKind::Int32 => "int32",
            IntegerKind::Int64 => "int64",
            IntegerKind::UInt32 => "uint32",
            IntegerKind::UInt64 => "uint64",
            IntegerKind::Byte => "byte",
            IntegerKind::CharByte => "charbyte",
            IntegerKind::Char => "char",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

impl FloatKind {
    pub fn bits(self) -> u8 {
        match self {
            FloatKind::F32 => 32,
            FloatKind::F64 => 64,
        }
    }

    pub fn logical_name(self) -> &'static str {
        match self {
            FloatKind::F32 => "float",
            FloatKind::F64 => "float64",
        }
    }
}

/// `int <repr>` — the three representations an integer literal can parse
/// into (spec §4.5): a negated signed 64-bit value, an unsigned 64-bit
/// value, or a hex literal (also unsigned, but tracked separately so hex
/// narrowing additionally rejects any set bit above the target width).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerConstantRepr {
    SignedI64(i64),
    UnsignedU64(u64),
    HexUnsigned(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingConstantValue {
    pub value: f64,
    pub fits_in_f32: bool,
}

/// A parsed function-modifier set (spec §3.5, §6.4: `static`, `unsafe`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_unsafe: bool,
}

/// `T` vs `T&` composite/function shapes (spec §3.2, §6.4 multi-value
/// functions).
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub name: String,
    pub input: Option<Box<TypeInfo>>,
    pub output: Option<Box<TypeInfo>>,
    pub modifiers: Modifiers,
}

/// An ordered tuple of types, used for function input/output shapes and
/// multi-value assignment (spec §3.2).
#[derive(Debug, Clone)]
pub struct CompositeType {
    pub head: Box<TypeInfo>,
    pub tail: Option<Box<CompositeType>>,
    pub head_name: Option<String>,
}

impl CompositeType {
    pub fn single(ty: TypeInfo) -> CompositeType {
        CompositeType {
            head: Box::new(ty),
            tail: None,
            head_name: None,
        }
    }

    pub fn len(&self) -> usize {
        1 + self.tail.as_ref().map_or(0, |t| t.len())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> CompositeIter<'_> {
        CompositeIter { next: Some(self) }
    }

    pub fn from_vec(mut items: Vec<TypeInfo>) -> Option<CompositeType> {
        if items.is_empty() {
            return None;
        }
        let head = items.remove(0);
        let tail = CompositeType::from_vec(items);
        Some(CompositeType {
            head: Box::new(head),
            tail: tail.map(Box::new),
            head_name: None,
        })
    }
}

pub struct CompositeIter<'a> {
    next: Option<&'a CompositeType>,
}

impl<'a> Iterator for CompositeIter<'a> {
    type Item = &'a TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.tail.as_deref();
        Some(&current.head)
    }
}

/// The IR-emission-facing result of an explicit or implicit cast (spec
/// §3.2 `create_cast_to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    NoOp,
    IntWiden { from_bits: u8, to_bits: u8, signed: bool },
    IntNarrow { from_bits: u8, to_bits: u8 },
    IntSignChange { bits: u8 },
    IntToFloat { int_bits: u8, signed: bool, float_bits: u8 },
    FloatToInt { float_bits: u8, int_bits: u8, signed: bool },
    FloatWiden { from_bits: u8, to_bits: u8 },
    FloatNarrow { from_bits: u8, to_bits: u8 },
}

/// The value domain of types (spec §3.2).
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Integer(IntegerKind),
    Floating(FloatKind),
    Bool,
    Str,

    IntegerConstant(IntegerConstantRepr),
    FloatingConstant(FloatingConstantValue),
    BoolConstant(bool),
    /// Up to 16 bits wide; whether it best-fits `charbyte` or `char` is
    /// decided at the use site (spec §4.5).
    CharConstant(u32),
    StringConstant(String),

    Auto,

    ClassDeclaration(ClassId),
    Class {
        decl: ClassId,
        is_value_type: bool,
    },
    UnresolvedClass {
        name: String,
        is_value_type: bool,
        cached_resolved: Cell<Option<ClassId>>,
    },

    Function(Box<FunctionType>),
    Composite(CompositeType),
    UnsafeArray {
        element: Box<TypeInfo>,
        rank: u32,
    },
}

impl TypeInfo {
    pub fn unresolved_class(name: impl Into<String>, is_value_type: bool) -> TypeInfo {
        TypeInfo::UnresolvedClass {
            name: name.into(),
            is_value_type,
            cached_resolved: Cell::new(None),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            TypeInfo::IntegerConstant(_)
                | TypeInfo::FloatingConstant(_)
                | TypeInfo::BoolConstant(_)
                | TypeInfo::CharConstant(_)
                | TypeInfo::StringConstant(_)
        )
    }

    pub fn is_auto_type(&self) -> bool {
        matches!(self, TypeInfo::Auto)
    }

    pub fn is_class_type(&self) -> bool {
        matches!(self, TypeInfo::Class { .. })
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, TypeInfo::Composite(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, TypeInfo::Integer(_))
            || matches!(self, TypeInfo::IntegerConstant(_))
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, TypeInfo::Floating(_)) || matches!(self, TypeInfo::FloatingConstant(_))
    }

    /// spec §3.2 invariant: constants are never a legal assignment
    /// target. Grounded in `original_source/Ast/Primitives.h`: every
    /// `*ConstantType::IsLegalTypeForAssignment` override returns `false`
    /// (not just the integer/float ones spec.md calls out by name).
    pub fn is_legal_for_assignment(&self) -> bool {
        !self.is_constant()
    }

    /// spec §3.2 `NeedsResolution` / §3.3: an `UnresolvedClassType` must
    /// be resolved via the symbol table before anything but name lookup.
    pub fn needs_resolution(&self) -> bool {
        matches!(self, TypeInfo::UnresolvedClass { .. })
    }

    /// Resolve an `UnresolvedClassType` to its `Class` form, caching the
    /// result on first resolution (spec §3.2).
    pub fn resolve(&self, symbol_table: &SymbolTable) -> Option<TypeInfo> {
        match self {
            TypeInfo::UnresolvedClass {
                name,
                is_value_type,
                cached_resolved,
            } => {
                if let Some(id) = cached_resolved.get() {
                    return Some(TypeInfo::Class {
                        decl: id,
                        is_value_type: *is_value_type,
                    });
                }
                let id = symbol_table.resolve_class_name(name)?;
                cached_resolved.set(Some(id));
                Some(TypeInfo::Class {
                    decl: id,
                    is_value_type: *is_value_type,
                })
            }
            other => Some(other.clone()),
        }
    }

    /// spec §3.2 `same_type`.
    pub fn same_type(&self, other: &TypeInfo) -> bool {
        use TypeInfo::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a == b,
            (Floating(a), Floating(b)) => a == b,
            (Bool, Bool) | (Str, Str) | (Auto, Auto) => true,
            (ClassDeclaration(a), ClassDeclaration(b)) => a == b,
            (
                Class { decl: d1, is_value_type: v1 },
                Class { decl: d2, is_value_type: v2 },
            ) => d1 == d2 && v1 == v2,
            (IntegerConstant(_), IntegerConstant(_)) => true,
            (FloatingConstant(_), FloatingConstant(_)) => true,
            (BoolConstant(_), BoolConstant(_)) => true,
            (CharConstant(_), CharConstant(_)) => true,
            (StringConstant(_), StringConstant(_)) => true,
            (Composite(a), Composite(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_type(y))
            }
            (UnsafeArray { element: e1, rank: r1 }, UnsafeArray { element: e2, rank: r2 }) => {
                r1 == r2 && e1.same_type(e2)
            }
            _ => false,
        }
    }

    /// spec §3.2 `serialized_name`, used both in diagnostics and in the
    /// §4.6 library export.
    pub fn serialized_name(&self, symbol_table: &SymbolTable) -> String {
        use TypeInfo::*;
        match self {
            Integer(k) => k.logical_name().to_string(),
            Floating(k) => k.logical_name().to_string(),
            Bool => "bool".to_string(),
            Str => "string".to_string(),
            IntegerConstant(_) => "<integer constant>".to_string(),
            FloatingConstant(_) => "<floating constant>".to_string(),
            BoolConstant(_) => "<bool constant>".to_string(),
            CharConstant(_) => "<char constant>".to_string(),
            StringConstant(_) => "<string constant>".to_string(),
            Auto => "auto".to_string(),
            ClassDeclaration(id) | Class { decl: id, .. } => symbol_table
                .class_fully_qualified_name(*id)
                .unwrap_or_else(|| "<unknown class>".to_string()),
            UnresolvedClass { name, .. } => name.clone(),
            Function(f) => {
                let input = f
                    .input
                    .as_ref()
                    .map(|t| t.serialized_name(symbol_table))
                    .unwrap_or_default();
                let output = f
                    .output
                    .as_ref()
                    .map(|t| t.serialized_name(symbol_table))
                    .unwrap_or_default();
                format!("fun({input}) {output}")
            }
            Composite(c) => c
                .iter()
                .map(|t| t.serialized_name(symbol_table))
                .collect::<Vec<_>>()
                .join(","),
            UnsafeArray { element, rank } => {
                format!("{}[{}]", element.serialized_name(symbol_table), rank)
            }
        }
    }

    /// spec §3.4: the bitset of operators this primitive supports.
    /// Constants inherit the set of the primitive their best-fit type
    /// would have, since an un-typed literal is only ever used where a
    /// primitive is also legal.
    pub fn operator_support(&self) -> OperatorSet {
        use TypeInfo::*;
        match self {
            Integer(_) | IntegerConstant(_) | CharConstant(_) => OperatorSet::all(),
            Floating(_) | FloatingConstant(_) => OperatorSet::all().without(&[
                OperatorId::BitAnd,
                OperatorId::BitOr,
                OperatorId::BitXor,
                OperatorId::Shl,
                OperatorId::Shr,
                OperatorId::BitNot,
            ]),
            Bool | BoolConstant(_) => OperatorSet::only(&[
                OperatorId::Eq,
                OperatorId::Ne,
                OperatorId::LogAnd,
                OperatorId::LogOr,
                OperatorId::LogNot,
            ]),
            Str | StringConstant(_) => OperatorSet::NONE,
            _ => OperatorSet::NONE,
        }
    }

    /// spec §3.2 `supports_operator`.
    pub fn supports_operator(&self, op: OperatorId) -> bool {
        self.operator_support().contains(op)
    }

    /// spec §3.2 `is_implicitly_castable_to_type_supporting`: e.g. an
    /// unsigned integer promotes to a wider signed type when the
    /// operator it needs is unavailable on it directly. In this type
    /// system every primitive that supports any operator at all supports
    /// all of them (spec §3.4), so this only ever fires when starting
    /// from a type with a *restricted* set (`bool`), which is never
    /// implicitly castable anywhere useful — kept as an explicit hook so
    /// the promotion step in `evaluate_operation` has one place to
    /// extend if the operator bitsets are ever widened.
    pub fn castable_to_type_supporting(&self, _op: OperatorId) -> Option<TypeInfo> {
        None
    }

    /// spec §3.2 `create_cast_to`.
    pub fn create_cast_to(&self, target: &TypeInfo) -> CastKind {
        use TypeInfo::*;
        match (self, target) {
            (Integer(a), Integer(b)) => {
                if a == b {
                    CastKind::NoOp
                } else if a.signed() != b.signed() && a.bits() == b.bits() {
                    CastKind::IntSignChange { bits: a.bits() }
                } else if a.bits() <= b.bits() {
                    CastKind::IntWiden {
                        from_bits: a.bits(),
                        to_bits: b.bits(),
                        signed: b.signed(),
                    }
                } else {
                    CastKind::IntNarrow {
                        from_bits: a.bits(),
                        to_bits: b.bits(),
                    }
                }
            }
            (Floating(a), Floating(b)) => {
                if a == b {
                    CastKind::NoOp
                } else if a.bits() < b.bits() {
                    CastKind::FloatWiden { from_bits: a.bits(), to_bits: b.bits() }
                } else {
                    CastKind::FloatNarrow { from_bits: a.bits(), to_bits: b.bits() }
                }
            }
            (Integer(a), Floating(b)) => CastKind::IntToFloat {
                int_bits: a.bits(),
                signed: a.signed(),
                float_bits: b.bits(),
            },
            (Floating(a), Integer(b)) => CastKind::FloatToInt {
                float_bits: a.bits(),
                int_bits: b.bits(),
                signed: b.signed(),
            },
            _ => CastKind::NoOp,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Integer(k) => write!(f, "{}", k.logical_name()),
            TypeInfo::Floating(k) => write!(f, "{}", k.logical_name()),
            TypeInfo::Bool => write!(f, "bool"),
            TypeInfo::Str => write!(f, "string"),
            TypeInfo::IntegerConstant(_) => write!(f, "<integer constant>"),
            TypeInfo::FloatingConstant(_) => write!(f, "<floating constant>"),
            TypeInfo::BoolConstant(_) => write!(f, "<bool constant>"),
            TypeInfo::CharConstant(_) => write!(f, "<char constant>"),
            TypeInfo::StringConstant(_) => write!(f, "<string constant>"),
            TypeInfo::Auto => write!(f, "auto"),
            TypeInfo::ClassDeclaration(_) => write!(f, "<class declaration>"),
            TypeInfo::Class { is_value_type, .. } => {
                write!(f, "<class{}>", if *is_value_type { "&" } else { "" })
            }
            TypeInfo::UnresolvedClass { name, is_value_type, .. } => {
                write!(f, "{}{}", name, if *is_value_type { "&" } else { "" })
            }
            TypeInfo::Function(_) => write!(f, "<function>"),
            TypeInfo::Composite(_) => write!(f, "<composite>"),
            TypeInfo::UnsafeArray { rank, .. } => write!(f, "<array[{rank}]>"),
        }
    }
}

impl TypeInfo {
    /// spec §3.2 `is_implicitly_assignable_from` / §3.3 the exhaustive
    /// assignability table.
    pub fn is_implicitly_assignable_from(&self, source: &TypeInfo, symbol_table: &SymbolTable) -> bool {
        use IntegerKind::*;
        use TypeInfo::*;

        if let UnresolvedClass { .. } = self {
            if let Some(resolved) = self.resolve(symbol_table) {
                return resolved.is_implicitly_assignable_from(source, symbol_table);
            }
            return false;
        }
        if let UnresolvedClass { .. } = source {
            if let Some(resolved) = source.resolve(symbol_table) {
                return self.is_implicitly_assignable_from(&resolved, symbol_table);
            }
            return false;
        }

        match (self, source) {
            (Integer(Int32), Integer(Int32 | Byte | CharByte | Char)) => true,
            (Integer(Int32), IntegerConstant(_)) => true,

            (Integer(Int64), Integer(Int64 | Int32 | UInt32 | Byte | CharByte | Char)) => true,
            (Integer(Int64), IntegerConstant(_)) => true,

            (Integer(UInt32), Integer(UInt32 | Byte | CharByte | Char)) => true,
            (Integer(UInt32), IntegerConstant(_)) => true,

            (Integer(UInt64), Integer(UInt64 | UInt32 | Byte | CharByte | Char)) => true,
            (Integer(UInt64), IntegerConstant(_)) => true,

            (Floating(FloatKind::F32), Floating(FloatKind::F32)) => true,
            (Floating(FloatKind::F32), Integer(Byte | Int32 | UInt32 | Int64 | UInt64 | CharByte | Char)) => true,
            (Floating(FloatKind::F32), FloatingConstant(_)) => true,
            (Floating(FloatKind::F32), IntegerConstant(_)) => true,

            (Floating(FloatKind::F64), Floating(FloatKind::F32 | FloatKind::F64)) => true,
            (Floating(FloatKind::F64), Integer(Byte | Int32 | UInt32 | Int64 | UInt64 | CharByte | Char)) => true,
            (Floating(FloatKind::F64), FloatingConstant(_)) => true,
            (Floating(FloatKind::F64), IntegerConstant(_)) => true,

            (Integer(Byte), Integer(Byte | CharByte)) => true,
            (Integer(Byte), IntegerConstant(_)) => true,

            (Integer(CharByte), Integer(CharByte)) => true,
            (Integer(CharByte), CharConstant(_)) => true,

            (Integer(Char), Integer(Char)) => true,
            (Integer(Char), CharConstant(_)) => true,

            (Bool, Bool) => true,
            (Bool, BoolConstant(_)) => true,

            (Str, Str) => true,
            (Str, StringConstant(_)) => true,

            // Constant -> constant: same family only; integer constants
            // implicitly widen into floating constants (spec §3.3).
            (IntegerConstant(_), IntegerConstant(_)) => true,
            (FloatingConstant(_), FloatingConstant(_) | IntegerConstant(_)) => true,
            (BoolConstant(_), BoolConstant(_)) => true,
            (CharConstant(_), CharConstant(_)) => true,
            (StringConstant(_), StringConstant(_)) => true,

            (
                Class { decl: d1, is_value_type: v1 },
                Class { decl: d2, is_value_type: v2 },
            ) => d1 == d2 && v1 == v2,

            (Composite(target), Composite(src)) => {
                target.len() == src.len()
                    && target
                        .iter()
                        .zip(src.iter())
                        .all(|(t, s)| t.is_implicitly_assignable_from(s, symbol_table))
            }
            // A single-element composite target is equivalent to its
            // head for assignment purposes (spec §3.2 invariant).
            (Composite(target), src) if target.tail.is_none() => {
                target.head.is_implicitly_assignable_from(src, symbol_table)
            }
            (target, Composite(src)) if src.tail.is_none() => {
                target.is_implicitly_assignable_from(&src.head, symbol_table)
            }

            (Auto, _) => true,

            _ => false,
        }
    }

    /// spec §4.2: pick the "wider" operand of a binary operation by the
    /// one-way assignability test.
    fn wider_operand<'a>(
        lhs: &'a TypeInfo,
        rhs: &'a TypeInfo,
        symbol_table: &SymbolTable,
    ) -> Option<&'a TypeInfo> {
        if rhs.is_implicitly_assignable_from(lhs, symbol_table) {
            Some(rhs)
        } else if lhs.is_implicitly_assignable_from(rhs, symbol_table) {
            Some(lhs)
        } else {
            None
        }
    }

    /// spec §4.2 `evaluate_operation`: resolves a binary or unary
    /// operator application to its result type plus the implicit operand
    /// cast (if any). Returns `None` when the operator is not defined
    /// for the given operand type(s) (`OperationNotDefined`).
    pub fn evaluate_operation(
        op: OperatorId,
        lhs: &TypeInfo,
        rhs: Option<&TypeInfo>,
        symbol_table: &SymbolTable,
    ) -> Option<(TypeInfo, Option<TypeInfo>)> {
        if op.is_unary() {
            return TypeInfo::evaluate_unary(op, lhs);
        }
        let rhs = rhs?;

        if op.is_boolean() {
            if lhs.is_implicitly_assignable_from(&TypeInfo::Bool, symbol_table)
                || matches!(lhs, TypeInfo::Bool)
            {
                if matches!(rhs, TypeInfo::Bool) || rhs.is_implicitly_assignable_from(&TypeInfo::Bool, symbol_table)
                {
                    return Some((TypeInfo::Bool, None));
                }
            }
            return None;
        }

        if op.is_shift() {
            if matches!(lhs, TypeInfo::Bool) || matches!(lhs, TypeInfo::Floating(_) | TypeInfo::FloatingConstant(_)) {
                return None;
            }
            let rhs_ok = TypeInfo::Integer(IntegerKind::Int32).is_implicitly_assignable_from(rhs, symbol_table);
            if !rhs_ok {
                return None;
            }
            return Some((lhs.clone(), None));
        }

        if op.is_bitwise() && (matches!(lhs, TypeInfo::Bool) || matches!(rhs, TypeInfo::Bool)) {
            return None;
        }

        let chosen = TypeInfo::wider_operand(lhs, rhs, symbol_table)?;

        let operand_ty = if chosen.supports_operator(op) {
            chosen.clone()
        } else if let Some(cast_ty) = chosen.castable_to_type_supporting(op) {
            cast_ty
        } else {
            return None;
        };

        if op.is_comparison() {
            Some((TypeInfo::Bool, Some(operand_ty)))
        } else {
            Some((operand_ty.clone(), Some(operand_ty)))
        }
    }

    fn evaluate_unary(op: OperatorId, operand: &TypeInfo) -> Option<(TypeInfo, Option<TypeInfo>)> {
        match op {
            OperatorId::LogNot => matches!(operand, TypeInfo::Bool | TypeInfo::BoolConstant(_))
                .then(|| (TypeInfo::Bool, None)),
            OperatorId::BitNot => operand.is_integer().then(|| (operand.clone(), None)),
            OperatorId::PreInc | OperatorId::PostInc | OperatorId::PreDec | OperatorId::PostDec => {
                (operand.is_integer() || operand.is_floating_point()).then(|| (operand.clone(), None))
            }
            _ => None,
        }
    }
}
