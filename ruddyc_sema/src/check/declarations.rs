//! Passes 1–3: namespace/class declarations, member variables, and
//! method signatures (spec §4.3). Pass 4 (method bodies) is dispatched
//! here but implemented in [`super::bodies`].
//!
//! Every `walk_*` entry point pushes its node's location onto the
//! diagnostic stack and pops it unconditionally afterwards via plain
//! `push`/`pop` rather than a bound `LocationGuard` — a guard tied to a
//! local would keep `checker.diagnostics` borrowed across the very
//! recursive `checker`-wide calls (`walk_top_level`, `bodies::check_*`)
//! these functions make.

use crate::ast::{ClassMember, Program, TopLevel};
use crate::error::SemaResult;
use crate::symbols::{BindingId, Pass, Visibility};
use crate::types::{CompositeType, TypeInfo};

use super::bodies;
use super::Checker;

pub(crate) fn composite_of(types: Vec<TypeInfo>) -> Option<TypeInfo> {
    let mut types = types;
    if types.is_empty() {
        None
    } else if types.len() == 1 {
        types.pop()
    } else {
        CompositeType::from_vec(types).map(TypeInfo::Composite)
    }
}

pub fn run_pass(checker: &mut Checker, program: &Program, pass: Pass) -> SemaResult<()> {
    for item in &program.items {
        walk_top_level(checker, item, pass)?;
    }
    Ok(())
}

fn walk_top_level(checker: &mut Checker, item: &TopLevel, pass: Pass) -> SemaResult<()> {
    let location = match item {
        TopLevel::Namespace(ns) => ns.location,
        TopLevel::Class(c) => c.location,
    };
    checker.diagnostics.push(location);
    let result = walk_top_level_body(checker, item, pass);
    checker.diagnostics.pop();
    result
}

fn walk_top_level_body(checker: &mut Checker, item: &TopLevel, pass: Pass) -> SemaResult<()> {
    match item {
        TopLevel::Namespace(ns) => {
            checker.table.bind_namespace(&ns.name, ns.location)?;
            for inner in &ns.body {
                walk_top_level(checker, inner, pass)?;
            }
            checker.table.exit_namespace();
            Ok(())
        }
        TopLevel::Class(class) => {
            let _span = tracing::trace_span!("class", name = %class.name, ?pass).entered();
            let class_id = checker.table.bind_class(&class.name, class.visibility, pass, class.location)?;
            match pass {
                Pass::ClassAndNamespaceDeclarations => {}
                Pass::ClassVariables => walk_class_variables(checker, class)?,
                Pass::MethodDeclarations => walk_method_declarations(checker, class_id, class)?,
                Pass::MethodBodies => walk_method_bodies(checker, class_id, class)?,
            }
            checker.table.exit_class();
            Ok(())
        }
    }
}

fn walk_class_variables(checker: &mut Checker, class: &crate::ast::stmt::ClassDecl) -> SemaResult<()> {
    for member in &class.members {
        if let ClassMember::Variable { name, visibility, declared_type, modifiers, location, .. } = member {
            checker.diagnostics.push(*location);
            let result = checker
                .table
                .bind_member_variable(name, declared_type.clone(), *visibility, *modifiers, Pass::ClassVariables, *location)
                .map(|_| ());
            checker.diagnostics.pop();
            result?;
        }
    }
    Ok(())
}

fn walk_method_declarations(checker: &mut Checker, class_id: BindingId, class: &crate::ast::stmt::ClassDecl) -> SemaResult<()> {
    for member in &class.members {
        match member {
            ClassMember::Variable { .. } => {}
            ClassMember::Function(f) => {
                checker.diagnostics.push(f.location);
                let result = (|| -> SemaResult<()> {
                    let input = composite_of(f.inputs.iter().map(|a| a.ty.clone()).collect());
                    let output = composite_of(f.outputs.iter().map(|a| a.ty.clone()).collect());
                    let id = checker.table.bind_function(
                        &f.name,
                        input,
                        output,
                        f.modifiers,
                        f.visibility,
                        Pass::MethodDeclarations,
                        f.location,
                    )?;
                    f.binding.set(Some(id));
                    checker.table.exit_function();
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
            }
            ClassMember::Constructor(c) => {
                checker.diagnostics.push(c.location);
                let result = (|| -> SemaResult<()> {
                    let input = composite_of(c.inputs.iter().map(|a| a.ty.clone()).collect());
                    let id = checker
                        .table
                        .bind_constructor(input, c.visibility, Pass::MethodDeclarations, c.location)?;
                    c.binding.set(Some(id));
                    checker.table.exit_constructor();
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
            }
            ClassMember::Destructor(d) => {
                checker.diagnostics.push(d.location);
                let result = (|| -> SemaResult<()> {
                    if checker.table.class_destructor(class_id).is_some() {
                        return Err(crate::error::SemaError::SymbolAlreadyDefinedInThisScope {
                            location: d.location,
                            name: format!("{}.destructor", checker.table.header(class_id).fully_qualified_name),
                        });
                    }
                    let id = checker.table.bind_destructor(class_id);
                    d.binding.set(Some(id));
                    checker.table.exit_destructor();
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
            }
        }
    }
    // spec §4.3/§4.4: a class that declares no constructors at all gets
    // one synthesized public `C() {}`, mirroring the destructor below.
    if !class.members.iter().any(|m| matches!(m, ClassMember::Constructor(_))) {
        checker.table.bind_constructor(None, Visibility::Public, pass, class.location)?;
        checker.table.exit_constructor();
    }
    // spec §4.3 pass 3: classes without an explicit destructor get a
    // synthesized empty one.
    checker.table.ensure_destructor(class_id);
    Ok(())
}

fn walk_method_bodies(checker: &mut Checker, class_id: BindingId, class: &crate::ast::stmt::ClassDecl) -> SemaResult<()> {
    let mut has_explicit_destructor = false;
    let mut has_explicit_constructor = false;
    for member in &class.members {
        match member {
            ClassMember::Variable { default_value: Some(expr), declared_type, location, .. } => {
                checker.diagnostics.push(*location);
                let result = (|| -> SemaResult<()> {
                    let value_ty = bodies::check_expr(checker, expr)?;
                    if !declared_type.is_implicitly_assignable_from(&value_ty, &checker.table) {
                        return Err(crate::error::SemaError::TypeMismatch {
                            location: *location,
                            target: declared_type.serialized_name(&checker.table),
                            source: value_ty.serialized_name(&checker.table),
                        });
                    }
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
            }
            ClassMember::Variable { .. } => {}
            ClassMember::Function(f) => {
                let _span = tracing::trace_span!("function", name = %f.name).entered();
                checker.diagnostics.push(f.location);
                let result = (|| -> SemaResult<()> {
                    let input = composite_of(f.inputs.iter().map(|a| a.ty.clone()).collect());
                    checker
                        .table
                        .bind_function(&f.name, input, None, f.modifiers, f.visibility, Pass::MethodBodies, f.location)?;
                    for arg in &f.inputs {
                        checker.table.bind_variable(&arg.name, arg.ty.clone(), f.location)?;
                    }
                    // spec §4.3 surface grammar: `unsafe` on a function marks its
                    // whole body, the same as wrapping it in `unsafe { }`.
                    if f.modifiers.is_unsafe {
                        checker.table.enter_unsafe();
                    }
                    let body_result = bodies::check_block(checker, &f.body);
                    if f.modifiers.is_unsafe {
                        checker.table.exit_unsafe();
                    }
                    body_result?;
                    checker.table.exit_function();
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
            }
            ClassMember::Constructor(c) => {
                has_explicit_constructor = true;
                checker.diagnostics.push(c.location);
                let result = (|| -> SemaResult<()> {
                    let input = composite_of(c.inputs.iter().map(|a| a.ty.clone()).collect());
                    let ctor_id = checker
                        .table
                        .bind_constructor(input, c.visibility, Pass::MethodBodies, c.location)?;
                    for arg in &c.inputs {
                        checker.table.bind_variable(&arg.name, arg.ty.clone(), c.location)?;
                    }
                    bodies::check_initializers(checker, ctor_id, &c.initializers)?;
                    let missing = checker.table.uninitialized_value_members(ctor_id);
                    if let Some(&member_id) = missing.first() {
                        let name = checker.table.member(member_id).map(|m| m.header.name.clone()).unwrap_or_default();
                        checker.table.exit_constructor();
                        return Err(crate::error::SemaError::ValueTypeMustBeInitialized { location: c.location, name });
                    }
                    bodies::check_block(checker, &c.body)?;
                    checker.table.exit_constructor();
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
            }
            ClassMember::Destructor(d) => {
                has_explicit_destructor = true;
                checker.diagnostics.push(d.location);
                let result = (|| -> SemaResult<()> {
                    checker.table.bind_destructor(class_id);
                    bodies::check_block(checker, &d.body)?;
                    checker.table.exit_destructor();
                    Ok(())
                })();
                checker.diagnostics.pop();
                result?;
                finalize_destructor(checker, class_id);
            }
        }
    }
    if !has_explicit_constructor {
        let ctor_id = checker.table.bind_constructor(None, Visibility::Public, Pass::MethodBodies, class.location)?;
        let missing = checker.table.uninitialized_value_members(ctor_id);
        if let Some(&member_id) = missing.first() {
            let name = checker.table.member(member_id).map(|m| m.header.name.clone()).unwrap_or_default();
            checker.table.exit_constructor();
            return Err(crate::error::SemaError::ValueTypeMustBeInitialized { location: class.location, name });
        }
        checker.table.exit_constructor();
    }
    if !has_explicit_destructor {
        checker.table.bind_destructor(class_id);
        checker.table.exit_destructor();
        finalize_destructor(checker, class_id);
    }
    Ok(())
}

/// spec §4.4: a destructor's body implicitly destroys every value-class
/// member after its own statements run, in reverse declaration order.
fn finalize_destructor(checker: &mut Checker, class_id: BindingId) {
    let destructor_id = match checker.table.class_destructor(class_id) {
        Some(id) => id,
        None => return,
    };
    let calls: Vec<BindingId> = checker
        .table
        .class_members(class_id)
        .iter()
        .rev()
        .copied()
        .filter(|&id| {
            checker
                .table
                .member(id)
                .map(|m| matches!(m.ty, TypeInfo::Class { is_value_type: true, .. } | TypeInfo::UnresolvedClass { is_value_type: true, .. }))
                .unwrap_or(false)
        })
        .collect();
    checker.table.set_destructor_member_calls(destructor_id, calls);
}
