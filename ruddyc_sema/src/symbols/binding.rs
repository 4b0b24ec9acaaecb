//! The symbol-binding taxonomy (spec §3.5).
//!
//! Grounded in `original_source/Ast/SymbolTable.h`'s nested
//! `SymbolBinding` class hierarchy (`VariableBinding`, `NamespaceBinding`,
//! `FunctionBinding`, `MemberBinding`, `ClassBinding`, `ScopeMarker`),
//! reworked per spec.md §9 from a virtual-dispatch hierarchy into a single
//! tagged enum addressed by stable arena indices.

use std::collections::HashMap;

use crate::types::{Modifiers, TypeInfo};

/// Index into [`super::SymbolTable`]'s binding arena. Stable for the
/// lifetime of one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

/// Fields shared by every named binding (spec §3.5).
#[derive(Debug, Clone)]
pub struct BindingHeader {
    pub name: String,
    pub fully_qualified_name: String,
    pub visibility: Visibility,
    /// The namespace or class this binding is declared under, by binding
    /// identity — used for the private/protected visibility check (spec
    /// §4.1: "by binding identity, not name").
    pub parent_namespace: Option<BindingId>,
}

impl BindingHeader {
    pub fn global(name: impl Into<String>, visibility: Visibility) -> Self {
        let name = name.into();
        Self {
            fully_qualified_name: name.clone(),
            name,
            visibility,
            parent_namespace: None,
        }
    }

    pub fn nested(
        name: impl Into<String>,
        parent_fqn: &str,
        parent: BindingId,
        visibility: Visibility,
    ) -> Self {
        let name = name.into();
        let fqn = if parent_fqn.is_empty() {
            name.clone()
        } else {
            format!("{parent_fqn}.{name}")
        };
        Self {
            fully_qualified_name: fqn,
            name,
            visibility,
            parent_namespace: Some(parent),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamespaceBinding {
    pub header: BindingHeader,
}

/// Whether a class's function table entry is still a single candidate or
/// has already grown into an overload set (spec §3.5
/// `OverloadedFunction`).
#[derive(Debug, Clone, Copy)]
pub enum FunctionSlot {
    Single(BindingId),
    Overloaded(BindingId),
}

#[derive(Debug, Clone)]
pub struct ClassBinding {
    pub header: BindingHeader,
    /// Declaration-ordered member bindings.
    pub members: Vec<BindingId>,
    pub constructors: Vec<BindingId>,
    pub functions: HashMap<String, FunctionSlot>,
    pub destructor: Option<BindingId>,
}

impl ClassBinding {
    pub fn new(header: BindingHeader) -> Self {
        Self {
            header,
            members: Vec::new(),
            constructors: Vec::new(),
            functions: HashMap::new(),
            destructor: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionBinding {
    pub header: BindingHeader,
    pub owning_class: BindingId,
    pub input_type: Option<TypeInfo>,
    pub output_type: Option<TypeInfo>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone)]
pub struct OverloadedFunctionBinding {
    pub header: BindingHeader,
    pub owning_class: BindingId,
    /// Ordered list of [`FunctionBinding`] ids sharing this name.
    pub overloads: Vec<BindingId>,
}

/// A [`FunctionBinding`] bound to a concrete receiver; produced by member
/// lookup on a variable or member of class type (spec §3.5).
#[derive(Debug, Clone)]
pub struct FunctionInstanceBinding {
    pub function: BindingId,
    pub receiver: BindingId,
}

#[derive(Debug, Clone)]
pub struct ConstructorBinding {
    pub header: BindingHeader,
    pub owning_class: BindingId,
    pub input_type: Option<TypeInfo>,
    /// Members this constructor's initializer list has assigned, grown
    /// while checking the initializer list (spec §4.4).
    pub initialized_members: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DestructorBinding {
    pub header: BindingHeader,
    pub owning_class: BindingId,
    /// Calls to each value-type member's destructor, in reverse
    /// declaration order, appended after the dtor body is checked (spec
    /// §4.4).
    pub member_destructor_calls: Vec<BindingId>,
}

#[derive(Debug, Clone)]
pub struct VariableBinding {
    pub header: BindingHeader,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone)]
pub struct MemberBinding {
    pub header: BindingHeader,
    pub owning_class: BindingId,
    pub index_in_class: usize,
    pub modifiers: Modifiers,
    pub ty: TypeInfo,
}

/// A [`MemberBinding`] bound to a receiver binding (spec §3.5).
#[derive(Debug, Clone)]
pub struct MemberInstanceBinding {
    pub member: BindingId,
    pub receiver: BindingId,
}

#[derive(Debug)]
pub enum Binding {
    Namespace(NamespaceBinding),
    Class(ClassBinding),
    Function(FunctionBinding),
    OverloadedFunction(OverloadedFunctionBinding),
    FunctionInstance(FunctionInstanceBinding),
    Constructor(ConstructorBinding),
    Destructor(DestructorBinding),
    Variable(VariableBinding),
    Member(MemberBinding),
    MemberInstance(MemberInstanceBinding),
    Loop,
    ScopeMarker,
}

impl Binding {
    pub fn is_scope_marker(&self) -> bool {
        matches!(self, Binding::ScopeMarker)
    }

    pub fn is_variable_binding(&self) -> bool {
        matches!(self, Binding::Variable(_))
    }

    pub fn is_class_binding(&self) -> bool {
        matches!(self, Binding::Class(_))
    }

    pub fn is_namespace_binding(&self) -> bool {
        matches!(self, Binding::Namespace(_))
    }

    pub fn is_function_binding(&self) -> bool {
        matches!(
            self,
            Binding::Function(_) | Binding::OverloadedFunction(_) | Binding::FunctionInstance(_)
        )
    }

    pub fn is_class_member_binding(&self) -> bool {
        matches!(self, Binding::Member(_) | Binding::MemberInstance(_))
    }

    pub fn header(&self) -> Option<&BindingHeader> {
        match self {
            Binding::Namespace(b) => Some(&b.header),
            Binding::Class(b) => Some(&b.header),
            Binding::Function(b) => Some(&b.header),
            Binding::OverloadedFunction(b) => Some(&b.header),
            Binding::Constructor(b) => Some(&b.header),
            Binding::Destructor(b) => Some(&b.header),
            Binding::Variable(b) => Some(&b.header),
            Binding::Member(b) => Some(&b.header),
            Binding::FunctionInstance(_) | Binding::MemberInstance(_) | Binding::Loop | Binding::ScopeMarker => None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.header().map(|h| h.visibility).unwrap_or(Visibility::Public)
    }
}
