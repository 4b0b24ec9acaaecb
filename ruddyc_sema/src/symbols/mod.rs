//! The symbol table (spec §4.1).
//!
//! Grounded in `original_source/Ast/SymbolTable.h` / `SymbolTable.cpp`.
//! The original keeps one global `std::map<string, shared_ptr<SymbolBinding>>`
//! plus an auxiliary stack of everything ever pushed (variables, scope
//! markers, namespace/class/function/loop entries) so `Exit()` can unwind a
//! scope by popping until it finds the marker that opened it. That shape is
//! kept here verbatim — `by_name` is the map, `aux_stack` is the auxiliary
//! stack — with the binding graph itself flattened into one arena (`arena`)
//! addressed by [`BindingId`] instead of `shared_ptr`.
//!
//! One detail easy to miss reading only spec.md: local variables are
//! inserted into (and erased from) the *same* global map as namespaces,
//! classes and functions — `BindVariable` is not some separate scope-local
//! structure. A name is "in scope" exactly when it is a key of `by_name`,
//! which is also why declaring two variables of the same name in nested
//! blocks is legal (the inner one shadows by being inserted after the outer
//! one, and is removed again on its own `Exit()`) but declaring the same
//! name twice in the *same* block is not (the second `insert` collides).

pub mod binding;

use std::collections::HashMap;

use ruddyc_ast::FileLocation;

pub use binding::{
    Binding, BindingHeader, BindingId, ClassBinding, ConstructorBinding, DestructorBinding,
    FunctionBinding, FunctionInstanceBinding, FunctionSlot, MemberBinding, MemberInstanceBinding,
    NamespaceBinding, OverloadedFunctionBinding, VariableBinding, Visibility,
};

use crate::error::{SemaError, SemaResult};
use crate::types::TypeInfo;

/// Which of the four type-check passes (spec §4.3) is currently running.
/// Several `Bind*` operations are idempotent lookups on later passes
/// rather than fresh declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    ClassAndNamespaceDeclarations,
    ClassVariables,
    MethodDeclarations,
    MethodBodies,
}

fn is_value_class_type(ty: &TypeInfo) -> bool {
    matches!(
        ty,
        TypeInfo::Class { is_value_type: true, .. } | TypeInfo::UnresolvedClass { is_value_type: true, .. }
    )
}

#[derive(Debug)]
pub struct SymbolTable {
    arena: Vec<Binding>,
    by_name: HashMap<String, BindingId>,
    aux_stack: Vec<BindingId>,
    namespace_stack: Vec<BindingId>,
    class_stack: Vec<BindingId>,
    /// `(callable binding, aux_stack length recorded right before its body
    /// scope marker)` — the base index `return`'s destructor collection
    /// walks up from (spec §4.1 invariant 2).
    function_stack: Vec<(BindingId, usize)>,
    /// `aux_stack` length recorded right before each loop's own entry —
    /// the base index `break`'s destructor collection walks up from.
    loop_stack: Vec<usize>,
    addressable_namespaces: Vec<BindingId>,
    /// Nesting depth of `unsafe { ... }` blocks (spec §4.3
    /// `UnsafeStatements`). A counter rather than a stack of scope
    /// indices since the flag itself, not any enclosed binding, is all a
    /// nested unsafe block needs to restore on exit.
    unsafe_depth: u32,
    /// The constructor whose initializer-list values are currently being
    /// evaluated, if any (spec §4.4, spec.md:363) — consulted by
    /// `reference_type` so a forward reference to a not-yet-initialized
    /// sibling member raises `UninitializedVariableReferenced` instead of
    /// silently type-checking.
    initializer_ctor: Option<BindingId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = SymbolTable {
            arena: Vec::new(),
            by_name: HashMap::new(),
            aux_stack: Vec::new(),
            namespace_stack: Vec::new(),
            class_stack: Vec::new(),
            function_stack: Vec::new(),
            loop_stack: Vec::new(),
            addressable_namespaces: Vec::new(),
            unsafe_depth: 0,
            initializer_ctor: None,
        };
        table.enter();
        table
    }

    fn alloc(&mut self, binding: Binding) -> BindingId {
        let id = BindingId(self.arena.len() as u32);
        self.arena.push(binding);
        id
    }

    fn binding(&self, id: BindingId) -> &Binding {
        &self.arena[id.0 as usize]
    }

    fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.arena[id.0 as usize]
    }

    pub fn header(&self, id: BindingId) -> &BindingHeader {
        self.binding(id)
            .header()
            .expect("binding has no header (FunctionInstance/MemberInstance/Loop/ScopeMarker)")
    }

    // ---- scope stack -----------------------------------------------

    /// Opens a new lexical scope (spec §4.1 `Enter`).
    pub fn enter(&mut self) {
        let id = self.alloc(Binding::ScopeMarker);
        self.aux_stack.push(id);
    }

    /// Closes the innermost lexical scope, returning the value-class
    /// variables it owned in reverse declaration order — the destructor
    /// calls to emit at the end of the block (spec §4.1 `Exit`, §4.4).
    pub fn exit(&mut self) -> Vec<BindingId> {
        let marker_pos = self
            .aux_stack
            .iter()
            .rposition(|id| self.binding(*id).is_scope_marker())
            .expect("Exit() called without a matching Enter()");
        let destructors = self.destructors_from(marker_pos + 1);
        while self.aux_stack.len() > marker_pos {
            let id = self.aux_stack.pop().unwrap();
            if let Binding::Variable(v) = self.binding(id) {
                self.by_name.remove(&v.header.fully_qualified_name);
            }
        }
        destructors
    }

    /// Pops the namespace/class/function/loop binding that owns the scope
    /// just closed by [`Self::exit`], updating the matching context
    /// stack. Every `bind_*`/`enter_*` pair that opens a construct's body
    /// scope is matched by one `exit()` + one `pop_owning_binding()`.
    fn pop_owning_binding(&mut self) {
        let id = self.aux_stack.pop().expect("unbalanced scope stack");
        match self.binding(id) {
            Binding::Namespace(_) => {
                self.namespace_stack.pop();
                self.addressable_namespaces.pop();
            }
            Binding::Class(_) => {
                self.class_stack.pop();
                self.addressable_namespaces.pop();
            }
            Binding::Function(_) | Binding::Constructor(_) | Binding::Destructor(_) => {
                self.function_stack.pop();
            }
            Binding::Loop => {
                self.loop_stack.pop();
            }
            _ => {}
        }
    }

    fn destructors_from(&self, from_index: usize) -> Vec<BindingId> {
        let mut result = Vec::new();
        for idx in (from_index..self.aux_stack.len()).rev() {
            let id = self.aux_stack[idx];
            if let Binding::Variable(v) = self.binding(id) {
                if is_value_class_type(&v.ty) {
                    result.push(id);
                }
            }
        }
        result
    }

    // ---- variables ---------------------------------------------------

    pub fn bind_variable(&mut self, name: &str, ty: TypeInfo, location: FileLocation) -> SemaResult<BindingId> {
        if self.by_name.contains_key(name) {
            return Err(SemaError::SymbolAlreadyDefinedInThisScope {
                location,
                name: name.to_string(),
            });
        }
        let header = BindingHeader::global(name, Visibility::Public);
        let id = self.alloc(Binding::Variable(VariableBinding { header, ty }));
        self.by_name.insert(name.to_string(), id);
        self.aux_stack.push(id);
        Ok(id)
    }

    // ---- namespaces ----------------------------------------------------

    fn current_namespace_fqn(&self) -> String {
        self.namespace_stack
            .last()
            .map(|id| self.header(*id).fully_qualified_name.clone())
            .unwrap_or_default()
    }

    /// spec §4.1: idempotent across files — re-entering an already-bound
    /// namespace reuses its binding rather than erroring.
    pub fn bind_namespace(&mut self, name: &str, location: FileLocation) -> SemaResult<BindingId> {
        let parent_fqn = self.current_namespace_fqn();
        let fqn = if parent_fqn.is_empty() {
            name.to_string()
        } else {
            format!("{parent_fqn}.{name}")
        };
        if let Some(&existing) = self.by_name.get(&fqn) {
            if self.binding(existing).is_namespace_binding() {
                self.namespace_stack.push(existing);
                self.addressable_namespaces.push(existing);
                self.aux_stack.push(existing);
                self.enter();
                return Ok(existing);
            }
            return Err(SemaError::TypeAlreadyExists { location, name: fqn });
        }
        let header = match self.namespace_stack.last().copied() {
            Some(parent) => BindingHeader::nested(name, &parent_fqn, parent, Visibility::Public),
            None => BindingHeader::global(name, Visibility::Public),
        };
        let id = self.alloc(Binding::Namespace(NamespaceBinding { header }));
        self.by_name.insert(fqn, id);
        self.namespace_stack.push(id);
        self.addressable_namespaces.push(id);
        self.aux_stack.push(id);
        self.enter();
        Ok(id)
    }

    pub fn exit_namespace(&mut self) -> Vec<BindingId> {
        let destructors = self.exit();
        self.pop_owning_binding();
        destructors
    }

    // ---- classes ---------------------------------------------------

    fn class_parent(&self) -> (Option<BindingId>, String) {
        if let Some(&class_id) = self.class_stack.last() {
            (Some(class_id), self.header(class_id).fully_qualified_name.clone())
        } else {
            (self.namespace_stack.last().copied(), self.current_namespace_fqn())
        }
    }

    /// spec §4.1 `BindClass`: on the declarations pass this registers the
    /// class; on every later pass it re-enters the binding already
    /// created, so member/method checks can push class context without
    /// re-declaring it.
    pub fn bind_class(
        &mut self,
        name: &str,
        visibility: Visibility,
        pass: Pass,
        location: FileLocation,
    ) -> SemaResult<BindingId> {
        let (parent, parent_fqn) = self.class_parent();
        let fqn = if parent_fqn.is_empty() {
            name.to_string()
        } else {
            format!("{parent_fqn}.{name}")
        };

        let id = if pass == Pass::ClassAndNamespaceDeclarations {
            if self.by_name.contains_key(&fqn) {
                return Err(SemaError::TypeAlreadyExists { location, name: fqn });
            }
            let header = match parent {
                Some(p) => BindingHeader::nested(name, &parent_fqn, p, visibility),
                None => BindingHeader::global(name, visibility),
            };
            let id = self.alloc(Binding::Class(ClassBinding::new(header)));
            self.by_name.insert(fqn, id);
            id
        } else {
            *self
                .by_name
                .get(&fqn)
                .ok_or(SemaError::SymbolNotDefined { location, name: fqn })?
        };

        self.class_stack.push(id);
        self.addressable_namespaces.push(id);
        self.aux_stack.push(id);
        self.enter();
        Ok(id)
    }

    pub fn exit_class(&mut self) -> Vec<BindingId> {
        let destructors = self.exit();
        self.pop_owning_binding();
        destructors
    }

    /// Resolves a (possibly dotted) class name to its [`ClassId`](crate::types::ClassId)
    /// numeric space — which is just this table's `BindingId` space,
    /// restricted to `Class` bindings (spec §9 design note).
    pub fn resolve_class_name(&self, name: &str) -> Option<crate::types::ClassId> {
        let id = self.lookup_quiet(name)?;
        if self.binding(id).is_class_binding() {
            Some(crate::types::ClassId(id.0))
        } else {
            None
        }
    }

    pub fn class_fully_qualified_name(&self, id: crate::types::ClassId) -> Option<String> {
        let id = BindingId(id.0);
        match self.binding(id) {
            Binding::Class(c) => Some(c.header.fully_qualified_name.clone()),
            _ => None,
        }
    }

    pub fn class_members(&self, class_id: BindingId) -> &[BindingId] {
        match self.binding(class_id) {
            Binding::Class(c) => &c.members,
            _ => &[],
        }
    }

    pub fn member(&self, id: BindingId) -> Option<&MemberBinding> {
        match self.binding(id) {
            Binding::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn variable(&self, id: BindingId) -> Option<&VariableBinding> {
        match self.binding(id) {
            Binding::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn function(&self, id: BindingId) -> Option<&FunctionBinding> {
        match self.binding(id) {
            Binding::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn constructor(&self, id: BindingId) -> Option<&ConstructorBinding> {
        match self.binding(id) {
            Binding::Constructor(c) => Some(c),
            _ => None,
        }
    }

    pub fn class_destructor(&self, class_id: BindingId) -> Option<BindingId> {
        match self.binding(class_id) {
            Binding::Class(c) => c.destructor,
            _ => None,
        }
    }

    pub fn destructor(&self, id: BindingId) -> Option<&DestructorBinding> {
        match self.binding(id) {
            Binding::Destructor(d) => Some(d),
            _ => None,
        }
    }

    pub fn binding_kind(&self, id: BindingId) -> &Binding {
        self.binding(id)
    }

    /// Every `PUBLIC` class binding, for library export (spec §4.6) —
    /// `by_name` holds one entry per every binding ever declared, so this
    /// filters down to class bindings at PUBLIC visibility, order
    /// unspecified (callers that need a stable order sort by
    /// `fully_qualified_name`).
    pub fn public_classes(&self) -> Vec<BindingId> {
        self.by_name
            .values()
            .copied()
            .filter(|&id| matches!(self.binding(id), Binding::Class(c) if c.header.visibility == Visibility::Public))
            .collect()
    }

    /// Every namespace's fully-qualified path, for library export (spec
    /// §4.6's `Namespaces` array).
    pub fn namespace_paths(&self) -> Vec<String> {
        self.by_name
            .values()
            .filter_map(|&id| match self.binding(id) {
                Binding::Namespace(n) => Some(n.header.fully_qualified_name.clone()),
                _ => None,
            })
            .collect()
    }

    // ---- member variables -----------------------------------------------

    /// spec §4.1 `BindMemberVariable`. Grounded directly on the original's
    /// ordering of the two failure checks: a bare initializer-less
    /// declaration inside a function body is always "must be
    /// initialized" even when that function happens to be outside any
    /// class (checked first), before the weaker "not in a class at all"
    /// check.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_member_variable(
        &mut self,
        name: &str,
        ty: TypeInfo,
        visibility: Visibility,
        modifiers: crate::types::Modifiers,
        pass: Pass,
        location: FileLocation,
    ) -> SemaResult<BindingId> {
        if matches!(ty, TypeInfo::UnsafeArray { .. }) && !modifiers.is_unsafe {
            return Err(SemaError::CannotReferenceUnsafeMemberFromSafeContext {
                location,
                name: name.to_string(),
            });
        }
        if !self.function_stack.is_empty() {
            return Err(SemaError::VariablesMustBeInitialized {
                location,
                name: name.to_string(),
            });
        }
        let class_id = *self
            .class_stack
            .last()
            .ok_or(SemaError::VariablesCannotBeDeclaredOutsideScopesOrFunctions { location })?;
        let class_fqn = self.header(class_id).fully_qualified_name.clone();
        let fqn = format!("{class_fqn}.{name}");

        if pass != Pass::ClassVariables {
            return self
                .by_name
                .get(&fqn)
                .copied()
                .ok_or(SemaError::SymbolNotDefined { location, name: fqn });
        }

        if self.by_name.contains_key(&fqn) {
            return Err(SemaError::SymbolAlreadyDefinedInThisScope { location, name: fqn });
        }
        let header = BindingHeader::nested(name, &class_fqn, class_id, visibility);
        let index = self.class_members(class_id).len();
        let id = self.alloc(Binding::Member(MemberBinding {
            header,
            owning_class: class_id,
            index_in_class: index,
            modifiers,
            ty,
        }));
        self.by_name.insert(fqn, id);
        if let Binding::Class(c) = self.binding_mut(class_id) {
            c.members.push(id);
        }
        Ok(id)
    }

    // ---- functions -------------------------------------------------

    fn mutually_assignable(&self, a: Option<&TypeInfo>, b: Option<&TypeInfo>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.is_implicitly_assignable_from(b, self) && b.is_implicitly_assignable_from(a, self)
            }
            _ => false,
        }
    }

    fn same_input(&self, a: Option<&TypeInfo>, b: Option<&TypeInfo>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_type(b),
            _ => false,
        }
    }

    /// spec §4.1 `BindFunction` / §4.3 overload-ambiguity check: two
    /// candidates under the same name collide iff their input composites
    /// are *mutually* implicitly-assignable (each can stand in for the
    /// other), not merely equal.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_function(
        &mut self,
        name: &str,
        input: Option<TypeInfo>,
        output: Option<TypeInfo>,
        modifiers: crate::types::Modifiers,
        visibility: Visibility,
        pass: Pass,
        location: FileLocation,
    ) -> SemaResult<BindingId> {
        let class_id = *self
            .class_stack
            .last()
            .ok_or(SemaError::FunctionMustBeDeclaredInClassScope { location })?;
        if !self.function_stack.is_empty() {
            return Err(SemaError::FunctionMustBeDeclaredInClassScope { location });
        }
        let class_fqn = self.header(class_id).fully_qualified_name.clone();
        let fqn = format!("{class_fqn}.{name}");

        let existing_slot = match self.binding(class_id) {
            Binding::Class(c) => c.functions.get(name).copied(),
            _ => None,
        };

        if pass != Pass::MethodDeclarations {
            let id = match existing_slot {
                Some(FunctionSlot::Single(id)) => id,
                Some(FunctionSlot::Overloaded(oid)) => {
                    let overloads = match self.binding(oid) {
                        Binding::OverloadedFunction(o) => o.overloads.clone(),
                        _ => Vec::new(),
                    };
                    overloads
                        .into_iter()
                        .find(|&fid| match self.binding(fid) {
                            Binding::Function(f) => self.same_input(f.input_type.as_ref(), input.as_ref()),
                            _ => false,
                        })
                        .ok_or_else(|| SemaError::NoMatchingFunctionSignature {
                            location,
                            name: fqn.clone(),
                        })?
                }
                None => return Err(SemaError::SymbolNotDefined { location, name: fqn }),
            };
            self.function_stack.push((id, self.aux_stack.len()));
            self.aux_stack.push(id);
            self.enter();
            return Ok(id);
        }

        let existing_inputs: Vec<Option<TypeInfo>> = match existing_slot {
            Some(FunctionSlot::Single(id)) => match self.binding(id) {
                Binding::Function(f) => vec![f.input_type.clone()],
                _ => Vec::new(),
            },
            Some(FunctionSlot::Overloaded(oid)) => match self.binding(oid) {
                Binding::OverloadedFunction(o) => o
                    .overloads
                    .iter()
                    .filter_map(|&fid| match self.binding(fid) {
                        Binding::Function(f) => Some(f.input_type.clone()),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        for existing_input in &existing_inputs {
            if self.mutually_assignable(existing_input.as_ref(), input.as_ref()) {
                return Err(SemaError::SymbolAlreadyDefinedInThisScope { location, name: fqn });
            }
        }

        let header = BindingHeader::nested(name, &class_fqn, class_id, visibility);
        let new_id = self.alloc(Binding::Function(FunctionBinding {
            header,
            owning_class: class_id,
            input_type: input,
            output_type: output,
            modifiers,
        }));
        match existing_slot {
            None => {
                if let Binding::Class(c) = self.binding_mut(class_id) {
                    c.functions.insert(name.to_string(), FunctionSlot::Single(new_id));
                }
                self.by_name.insert(fqn, new_id);
            }
            Some(FunctionSlot::Single(existing_id)) => {
                let overload_header = BindingHeader::nested(name, &class_fqn, class_id, visibility);
                let overload_id = self.alloc(Binding::OverloadedFunction(OverloadedFunctionBinding {
                    header: overload_header,
                    owning_class: class_id,
                    overloads: vec![existing_id, new_id],
                }));
                if let Binding::Class(c) = self.binding_mut(class_id) {
                    c.functions
                        .insert(name.to_string(), FunctionSlot::Overloaded(overload_id));
                }
                self.by_name.insert(fqn, overload_id);
            }
            Some(FunctionSlot::Overloaded(oid)) => {
                if let Binding::OverloadedFunction(o) = self.binding_mut(oid) {
                    o.overloads.push(new_id);
                }
            }
        }

        self.function_stack.push((new_id, self.aux_stack.len()));
        self.aux_stack.push(new_id);
        self.enter();
        Ok(new_id)
    }

    pub fn exit_function(&mut self) -> Vec<BindingId> {
        let destructors = self.exit();
        self.pop_owning_binding();
        destructors
    }

    // ---- constructors / destructors ---------------------------------

    /// spec §4.1 `BindConstructor` / §4.4: ambiguity uses the same
    /// mutual-assignability rule as overloaded functions.
    pub fn bind_constructor(
        &mut self,
        input: Option<TypeInfo>,
        visibility: Visibility,
        pass: Pass,
        location: FileLocation,
    ) -> SemaResult<BindingId> {
        let class_id = *self
            .class_stack
            .last()
            .ok_or(SemaError::FunctionMustBeDeclaredInClassScope { location })?;
        let class_fqn = self.header(class_id).fully_qualified_name.clone();

        if pass != Pass::MethodDeclarations {
            let candidates: Vec<BindingId> = match self.binding(class_id) {
                Binding::Class(c) => c.constructors.clone(),
                _ => Vec::new(),
            };
            let id = candidates
                .into_iter()
                .find(|&cid| match self.binding(cid) {
                    Binding::Constructor(c) => self.same_input(c.input_type.as_ref(), input.as_ref()),
                    _ => false,
                })
                .ok_or(SemaError::SymbolNotDefined {
                    location,
                    name: format!("{class_fqn}.constructor"),
                })?;
            self.function_stack.push((id, self.aux_stack.len()));
            self.aux_stack.push(id);
            self.enter();
            return Ok(id);
        }

        let existing: Vec<Option<TypeInfo>> = match self.binding(class_id) {
            Binding::Class(c) => c
                .constructors
                .iter()
                .filter_map(|&cid| match self.binding(cid) {
                    Binding::Constructor(ctor) => Some(ctor.input_type.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        for existing_input in &existing {
            if self.mutually_assignable(existing_input.as_ref(), input.as_ref()) {
                return Err(SemaError::SymbolAlreadyDefinedInThisScope {
                    location,
                    name: format!("{class_fqn}.constructor"),
                });
            }
        }

        let header = BindingHeader::nested("constructor", &class_fqn, class_id, visibility);
        let id = self.alloc(Binding::Constructor(ConstructorBinding {
            header,
            owning_class: class_id,
            input_type: input,
            initialized_members: Vec::new(),
        }));
        if let Binding::Class(c) = self.binding_mut(class_id) {
            c.constructors.push(id);
        }
        self.function_stack.push((id, self.aux_stack.len()));
        self.aux_stack.push(id);
        self.enter();
        Ok(id)
    }

    pub fn exit_constructor(&mut self) -> Vec<BindingId> {
        let destructors = self.exit();
        self.pop_owning_binding();
        destructors
    }

    /// Returns the class's destructor, synthesizing a parameterless one
    /// on first request if none was declared (spec §4.3 pass 3: "classes
    /// without an explicit destructor get a synthesized empty one").
    pub fn ensure_destructor(&mut self, class_id: BindingId) -> BindingId {
        if let Some(id) = self.class_destructor(class_id) {
            return id;
        }
        let class_fqn = self.header(class_id).fully_qualified_name.clone();
        let header = BindingHeader::nested("destructor", &class_fqn, class_id, Visibility::Public);
        let id = self.alloc(Binding::Destructor(DestructorBinding {
            header,
            owning_class: class_id,
            member_destructor_calls: Vec::new(),
        }));
        if let Binding::Class(c) = self.binding_mut(class_id) {
            c.destructor = Some(id);
        }
        id
    }

    pub fn bind_destructor(&mut self, class_id: BindingId) -> BindingId {
        let id = self.ensure_destructor(class_id);
        self.function_stack.push((id, self.aux_stack.len()));
        self.aux_stack.push(id);
        self.enter();
        id
    }

    pub fn exit_destructor(&mut self) -> Vec<BindingId> {
        let destructors = self.exit();
        self.pop_owning_binding();
        destructors
    }

    pub fn set_destructor_member_calls(&mut self, destructor_id: BindingId, calls: Vec<BindingId>) {
        if let Binding::Destructor(d) = self.binding_mut(destructor_id) {
            d.member_destructor_calls = calls;
        }
    }

    // ---- constructor initializer lists ------------------------------

    /// Marks `ctor_id` as the constructor whose initializer-list values
    /// are being evaluated, for the duration of `check_initializers`.
    pub fn enter_initializer_list(&mut self, ctor_id: BindingId) {
        self.initializer_ctor = Some(ctor_id);
    }

    pub fn exit_initializer_list(&mut self) {
        self.initializer_ctor = None;
    }

    /// spec §4.4 / spec.md:363: whether `member_id` names a member of the
    /// constructor currently being initializer-list-checked that its
    /// initializer list has not yet assigned. Only meaningful while
    /// evaluating that constructor's initializer-list values — outside
    /// that window (body statements, other constructors) this is always
    /// `false`.
    pub fn is_uninitialized_in_current_initializer_list(&self, member_id: BindingId) -> bool {
        let ctor_id = match self.initializer_ctor {
            Some(id) => id,
            None => return false,
        };
        let ctor = match self.binding(ctor_id) {
            Binding::Constructor(c) => c,
            _ => return false,
        };
        let member = match self.binding(member_id) {
            Binding::Member(m) => m,
            _ => return false,
        };
        member.owning_class == ctor.owning_class && !ctor.initialized_members.iter().any(|n| n == &member.header.name)
    }

    pub fn record_initializer(
        &mut self,
        ctor_id: BindingId,
        member_name: &str,
        location: FileLocation,
    ) -> SemaResult<()> {
        if let Binding::Constructor(c) = self.binding_mut(ctor_id) {
            if c.initialized_members.iter().any(|m| m == member_name) {
                return Err(SemaError::CannotReinitializeMember {
                    location,
                    name: member_name.to_string(),
                });
            }
            c.initialized_members.push(member_name.to_string());
        }
        Ok(())
    }

    /// spec §4.4: every value-class member not touched by the
    /// initializer list is a `ValueTypeMustBeInitialized` error.
    pub fn uninitialized_value_members(&self, ctor_id: BindingId) -> Vec<BindingId> {
        let (class_id, initialized) = match self.binding(ctor_id) {
            Binding::Constructor(c) => (c.owning_class, c.initialized_members.clone()),
            _ => return Vec::new(),
        };
        self.class_members(class_id)
            .iter()
            .copied()
            .filter(|&mid| match self.binding(mid) {
                Binding::Member(m) => is_value_class_type(&m.ty) && !initialized.contains(&m.header.name),
                _ => false,
            })
            .collect()
    }

    // ---- loops -------------------------------------------------------

    pub fn enter_loop(&mut self) {
        self.loop_stack.push(self.aux_stack.len());
        let id = self.alloc(Binding::Loop);
        self.aux_stack.push(id);
        self.enter();
    }

    pub fn exit_loop(&mut self) -> Vec<BindingId> {
        let destructors = self.exit();
        self.pop_owning_binding();
        destructors
    }

    pub fn in_loop(&self) -> bool {
        !self.loop_stack.is_empty()
    }

    // ---- unsafe context ------------------------------------------------

    pub fn enter_unsafe(&mut self) {
        self.unsafe_depth += 1;
    }

    pub fn exit_unsafe(&mut self) {
        self.unsafe_depth -= 1;
    }

    pub fn in_unsafe_context(&self) -> bool {
        self.unsafe_depth > 0
    }

    /// spec §4.3 `NonStaticMemberFromStaticContext`: whether the
    /// innermost enclosing method is declared `static`. Constructors and
    /// destructors carry no `static` modifier and are never static.
    pub fn in_static_function(&self) -> bool {
        match self.current_function() {
            Some(id) => matches!(self.binding(id), Binding::Function(f) if f.modifiers.is_static),
            None => false,
        }
    }

    /// spec §4.1 `break`: destructors for every value-class local
    /// declared since the innermost loop was entered.
    pub fn break_destructors(&self, location: FileLocation) -> SemaResult<Vec<BindingId>> {
        let &from = self
            .loop_stack
            .last()
            .ok_or(SemaError::BreakInWrongPlace { location })?;
        Ok(self.destructors_from(from))
    }

    pub fn current_function(&self) -> Option<BindingId> {
        self.function_stack.last().map(|(id, _)| *id)
    }

    pub fn current_class(&self) -> Option<BindingId> {
        self.class_stack.last().copied()
    }

    /// spec §4.1 `return`: destructors for every value-class local
    /// declared since the current function body was entered.
    pub fn return_destructors(&self, location: FileLocation) -> SemaResult<Vec<BindingId>> {
        let &(_, from) = self
            .function_stack
            .last()
            .ok_or(SemaError::ReturnStatementMustBeDeclaredInFunctionScope { location })?;
        Ok(self.destructors_from(from))
    }

    // ---- lookup --------------------------------------------------------

    fn is_visible(&self, id: BindingId) -> bool {
        let header = match self.binding(id).header() {
            Some(h) => h,
            None => return true,
        };
        match header.visibility {
            Visibility::Public => true,
            Visibility::Private | Visibility::Protected => header
                .parent_namespace
                .map(|p| self.addressable_namespaces.contains(&p))
                .unwrap_or(true),
        }
    }

    fn lookup_in_implicit_namespaces(&self, name: &str) -> Option<BindingId> {
        for ns in self.addressable_namespaces.iter().rev() {
            let candidate = format!("{}.{}", self.header(*ns).fully_qualified_name, name);
            if let Some(&id) = self.by_name.get(&candidate) {
                if self.is_visible(id) {
                    return Some(id);
                }
            }
        }
        if let Some(&id) = self.by_name.get(name) {
            if self.is_visible(id) {
                return Some(id);
            }
        }
        None
    }

    /// The type named by a variable or member binding, resolved to a
    /// class, so lookup can descend into its members (spec §4.1
    /// `Lookup`: "re-resolving through a variable/member's type name to
    /// reach its class").
    fn class_fqn_of_type(&self, ty: &TypeInfo, name: &str, location: FileLocation) -> SemaResult<String> {
        let resolved = ty.resolve(self).unwrap_or_else(|| ty.clone());
        match resolved {
            TypeInfo::Class { decl, .. } => self
                .class_fully_qualified_name(decl)
                .ok_or_else(|| SemaError::SymbolNotDefined {
                    location,
                    name: name.to_string(),
                }),
            _ => Err(SemaError::SymbolWrongType {
                location,
                name: name.to_string(),
                expected: "class-typed value".to_string(),
            }),
        }
    }

    fn lookup_member_of(&self, parent: BindingId, name: &str, location: FileLocation) -> SemaResult<BindingId> {
        let (parent_fqn, receiver) = match self.binding(parent) {
            Binding::Namespace(n) => (n.header.fully_qualified_name.clone(), None),
            Binding::Class(c) => (c.header.fully_qualified_name.clone(), None),
            Binding::Variable(v) => (self.class_fqn_of_type(&v.ty, name, location)?, Some(parent)),
            Binding::Member(m) => (self.class_fqn_of_type(&m.ty, name, location)?, Some(parent)),
            Binding::Function(_) | Binding::OverloadedFunction(_) | Binding::FunctionInstance(_) => {
                return Err(SemaError::SymbolWrongType {
                    location,
                    name: name.to_string(),
                    expected: "namespace or class (functions have no members)".to_string(),
                })
            }
            _ => {
                return Err(SemaError::SymbolWrongType {
                    location,
                    name: name.to_string(),
                    expected: "namespace or class".to_string(),
                })
            }
        };

        let candidate = format!("{parent_fqn}.{name}");
        let target = *self.by_name.get(&candidate).ok_or_else(|| SemaError::SymbolNotDefined {
            location,
            name: candidate.clone(),
        })?;
        if !self.is_visible(target) {
            return Err(SemaError::SymbolNotAccessable { location, name: candidate });
        }

        match (receiver, self.binding(target)) {
            (Some(_), Binding::Function(_) | Binding::OverloadedFunction(_)) | (Some(_), Binding::Member(_)) => {
                Ok(target)
            }
            _ => Ok(target),
        }
    }

    /// spec §4.1 `Lookup`: resolves a dotted path, left to right, against
    /// the current addressable-namespace chain. Returns the resolved
    /// binding id directly; a caller wanting a receiver-bound
    /// `FunctionInstance`/`MemberInstance` view should pair the returned
    /// id with whatever binding produced it.
    pub fn lookup(&self, dotted_name: &str, location: FileLocation) -> SemaResult<BindingId> {
        let mut parts = dotted_name.split('.');
        let first = parts.next().unwrap_or(dotted_name);
        let mut current = self
            .lookup_in_implicit_namespaces(first)
            .ok_or_else(|| SemaError::SymbolNotDefined {
                location,
                name: first.to_string(),
            })?;
        for part in parts {
            current = self.lookup_member_of(current, part, location)?;
        }
        Ok(current)
    }

    /// [`Self::lookup`] without diagnostics, for callers (like
    /// `TypeInfo::resolve`) that treat "not found" as `None` rather than a
    /// hard error.
    fn lookup_quiet(&self, dotted_name: &str) -> Option<BindingId> {
        self.lookup(dotted_name, FileLocation::SYNTHESIZED).ok()
    }
}
