//! Pass 4: method bodies — expression type evaluation, statement
//! checking, destructor scheduling and initializer-list validation (spec
//! §4.2, §4.4).
//!
//! Grounded in `original_source/Ast/Operations.h` (`BinaryOperation`
//! evaluating both operands then delegating to
//! `TypeInfo::EvaluateOperation`) and `Ast/Classes.h`'s
//! `Initializer`/`InitializerStatement` pair.
//!
//! Every entry point pushes its node's location onto the diagnostic stack
//! before recursing and pops it unconditionally afterwards — plain
//! push/pop rather than the `LocationGuard` RAII helper, since a guard
//! bound to a local would keep `checker.diagnostics` borrowed across the
//! very recursive calls that need `checker` back for `checker.table`.

use ruddyc_ast::FileLocation;

use crate::ast::expr::{Expr, ExprKind, Literal};
use crate::ast::stmt::{Initializer, Stmt};
use crate::constants;
use crate::error::{SemaError, SemaResult};
use crate::symbols::{Binding, BindingId};
use crate::types::{ClassId, CompositeType, TypeInfo};

use super::declarations::composite_of as join_types;
use super::Checker;

fn is_value_class(ty: &TypeInfo) -> bool {
    matches!(
        ty,
        TypeInfo::Class { is_value_type: true, .. } | TypeInfo::UnresolvedClass { is_value_type: true, .. }
    )
}

fn is_boolish(ty: &TypeInfo, checker: &Checker) -> bool {
    matches!(ty, TypeInfo::Bool | TypeInfo::BoolConstant(_)) || TypeInfo::Bool.is_implicitly_assignable_from(ty, &checker.table)
}

fn matches_input(input: &Option<TypeInfo>, args: &Option<TypeInfo>, checker: &Checker) -> bool {
    match (input, args) {
        (None, None) => true,
        (Some(i), Some(a)) => i.is_implicitly_assignable_from(a, &checker.table),
        _ => false,
    }
}

pub fn check_block(checker: &mut Checker, stmts: &[Stmt]) -> SemaResult<()> {
    checker.table.enter();
    let result = (|| {
        for stmt in stmts {
            check_stmt(checker, stmt)?;
        }
        Ok(())
    })();
    checker.table.exit();
    result
}

fn check_stmt(checker: &mut Checker, stmt: &Stmt) -> SemaResult<()> {
    checker.diagnostics.push(stmt.location());
    let result = check_stmt_body(checker, stmt);
    checker.diagnostics.pop();
    result
}

fn check_stmt_body(checker: &mut Checker, stmt: &Stmt) -> SemaResult<()> {
    match stmt {
        Stmt::Block(stmts, _) => check_block(checker, stmts),
        Stmt::VarDecl { name, declared_type, initializer, location, binding } => {
            if matches!(declared_type, TypeInfo::UnsafeArray { .. }) && !checker.table.in_unsafe_context() {
                return Err(SemaError::CannotReferenceUnsafeMemberFromSafeContext {
                    location: *location,
                    name: name.clone(),
                });
            }
            let mut resolved = declared_type.clone();
            if let Some(init) = initializer {
                let init_ty = check_expr(checker, init)?;
                if resolved.is_auto_type() {
                    resolved = constants::best_fit_type_info(&init_ty);
                } else if !resolved.is_implicitly_assignable_from(&init_ty, &checker.table) {
                    return Err(SemaError::TypeMismatch {
                        location: *location,
                        target: resolved.serialized_name(&checker.table),
                        source: init_ty.serialized_name(&checker.table),
                    });
                }
            } else if is_value_class(&resolved) {
                return Err(SemaError::ValueTypeMustBeInitialized { location: *location, name: name.clone() });
            }
            let id = checker.table.bind_variable(name, resolved, *location)?;
            binding.set(Some(id));
            Ok(())
        }
        Stmt::MultiVarDecl { targets, initializer, location, bindings } => {
            let init_ty = check_expr(checker, initializer)?;
            let items: Vec<TypeInfo> = match &init_ty {
                TypeInfo::Composite(c) => c.iter().cloned().collect(),
                other => vec![other.clone()],
            };
            if items.len() != targets.len() {
                return Err(SemaError::TypeMismatch {
                    location: *location,
                    target: format!("{}-way multi-declare", targets.len()),
                    source: init_ty.serialized_name(&checker.table),
                });
            }
            let mut ids = Vec::with_capacity(targets.len());
            for ((name, declared_type), item_ty) in targets.iter().zip(items) {
                let mut resolved = declared_type.clone();
                if resolved.is_auto_type() {
                    resolved = constants::best_fit_type_info(&item_ty);
                } else if !resolved.is_implicitly_assignable_from(&item_ty, &checker.table) {
                    return Err(SemaError::TypeMismatch {
                        location: *location,
                        target: resolved.serialized_name(&checker.table),
                        source: item_ty.serialized_name(&checker.table),
                    });
                }
                ids.push(checker.table.bind_variable(name, resolved, *location)?);
            }
            *bindings.borrow_mut() = ids;
            Ok(())
        }
        Stmt::ExprStmt(e) => check_expr(checker, e).map(|_| ()),
        Stmt::If { condition, then_branch, else_branch, location } => {
            let cond_ty = check_expr(checker, condition)?;
            if !is_boolish(&cond_ty, checker) {
                return Err(SemaError::TypeMismatch {
                    location: *location,
                    target: "bool".to_string(),
                    source: cond_ty.serialized_name(&checker.table),
                });
            }
            check_stmt(checker, then_branch)?;
            if let Some(else_branch) = else_branch {
                check_stmt(checker, else_branch)?;
            }
            Ok(())
        }
        Stmt::While { condition, body, location } => {
            let cond_ty = check_expr(checker, condition)?;
            if !is_boolish(&cond_ty, checker) {
                return Err(SemaError::TypeMismatch {
                    location: *location,
                    target: "bool".to_string(),
                    source: cond_ty.serialized_name(&checker.table),
                });
            }
            checker.table.enter_loop();
            let result = check_stmt(checker, body);
            checker.table.exit_loop();
            result
        }
        Stmt::Break { location, destructor_calls } => {
            let calls = checker.table.break_destructors(*location)?;
            *destructor_calls.borrow_mut() = calls;
            Ok(())
        }
        Stmt::Return { value, location, destructor_calls } => {
            if let Some(value) = value {
                check_expr(checker, value)?;
            }
            let calls = checker.table.return_destructors(*location)?;
            *destructor_calls.borrow_mut() = calls;
            Ok(())
        }
        Stmt::Unsafe(stmts, _) => {
            checker.table.enter_unsafe();
            let result = check_block(checker, stmts);
            checker.table.exit_unsafe();
            result
        }
    }
}

/// spec §4.4: an initializer list entry is only legal for a value-class
/// member, and the same member may not appear twice.
pub fn check_initializers(checker: &mut Checker, ctor_id: BindingId, initializers: &[Initializer]) -> SemaResult<()> {
    checker.table.enter_initializer_list(ctor_id);
    let result = (|| {
        for Initializer { member_name, value, location } in initializers {
            checker.diagnostics.push(*location);
            let result = check_one_initializer(checker, ctor_id, member_name, value, *location);
            checker.diagnostics.pop();
            result?;
        }
        Ok(())
    })();
    checker.table.exit_initializer_list();
    result
}

fn check_one_initializer(
    checker: &mut Checker,
    ctor_id: BindingId,
    member_name: &str,
    value: &Expr,
    location: FileLocation,
) -> SemaResult<()> {
    let value_ty = check_expr(checker, value)?;
    let member_id = checker.table.lookup(member_name, location)?;
    let member = checker.table.member(member_id).ok_or_else(|| SemaError::SymbolWrongType {
        location,
        name: member_name.to_string(),
        expected: "member variable".to_string(),
    })?;
    if !is_value_class(&member.ty) {
        return Err(SemaError::ExpectedValueType { location, name: member_name.to_string() });
    }
    if !member.ty.is_implicitly_assignable_from(&value_ty, &checker.table) {
        return Err(SemaError::TypeMismatch {
            location,
            target: member.ty.serialized_name(&checker.table),
            source: value_ty.serialized_name(&checker.table),
        });
    }
    checker.table.record_initializer(ctor_id, member_name, location)
}

fn check_call(checker: &mut Checker, callee: &str, args: &[Expr], location: FileLocation) -> SemaResult<TypeInfo> {
    let arg_types: Vec<TypeInfo> = args.iter().map(|a| check_expr(checker, a)).collect::<SemaResult<Vec<_>>>()?;
    let arg_composite = join_types(arg_types);
    let binding_id = checker.table.lookup(callee, location)?;
    match checker.table.binding_kind(binding_id) {
        Binding::Function(f) => {
            if !matches_input(&f.input_type, &arg_composite, checker) {
                return Err(SemaError::NoMatchingFunctionSignature { location, name: callee.to_string() });
            }
            Ok(f.output_type.clone().unwrap_or(TypeInfo::Auto))
        }
        Binding::OverloadedFunction(o) => {
            for &fid in &o.overloads {
                if let Some(f) = checker.table.function(fid) {
                    if matches_input(&f.input_type, &arg_composite, checker) {
                        return Ok(f.output_type.clone().unwrap_or(TypeInfo::Auto));
                    }
                }
            }
            Err(SemaError::NoMatchingFunctionSignature { location, name: callee.to_string() })
        }
        _ => Err(SemaError::SymbolWrongType {
            location,
            name: callee.to_string(),
            expected: "function".to_string(),
        }),
    }
}

fn check_new(checker: &mut Checker, class_name: &str, args: &[Expr], location: FileLocation) -> SemaResult<TypeInfo> {
    let arg_types: Vec<TypeInfo> = args.iter().map(|a| check_expr(checker, a)).collect::<SemaResult<Vec<_>>>()?;
    let arg_composite = join_types(arg_types);
    let class_binding_id = checker.table.lookup(class_name, location)?;
    let constructors = match checker.table.binding_kind(class_binding_id) {
        Binding::Class(c) => c.constructors.clone(),
        _ => {
            return Err(SemaError::SymbolWrongType {
                location,
                name: class_name.to_string(),
                expected: "class".to_string(),
            })
        }
    };
    for cid in constructors {
        if let Some(ctor) = checker.table.constructor(cid) {
            if matches_input(&ctor.input_type, &arg_composite, checker) {
                return Ok(TypeInfo::Class { decl: ClassId(class_binding_id.0), is_value_type: false });
            }
        }
    }
    Err(SemaError::NoMatchingFunctionSignature { location, name: class_name.to_string() })
}

/// Resolves the constructor overload for `class_name(args)` exactly as
/// [`check_new`] does, but reports the class at value type — shared by
/// `StackConstruction`'s expression handling.
fn check_stack_construction(checker: &mut Checker, class_name: &str, args: &[Expr], location: FileLocation) -> SemaResult<TypeInfo> {
    let arg_types: Vec<TypeInfo> = args.iter().map(|a| check_expr(checker, a)).collect::<SemaResult<Vec<_>>>()?;
    let arg_composite = join_types(arg_types);
    let class_binding_id = checker.table.lookup(class_name, location)?;
    let constructors = match checker.table.binding_kind(class_binding_id) {
        Binding::Class(c) => c.constructors.clone(),
        _ => {
            return Err(SemaError::SymbolWrongType {
                location,
                name: class_name.to_string(),
                expected: "class".to_string(),
            })
        }
    };
    for cid in constructors {
        if let Some(ctor) = checker.table.constructor(cid) {
            if matches_input(&ctor.input_type, &arg_composite, checker) {
                return Ok(TypeInfo::Class { decl: ClassId(class_binding_id.0), is_value_type: true });
            }
        }
    }
    Err(SemaError::NoMatchingFunctionSignature { location, name: class_name.to_string() })
}

fn reference_type(checker: &mut Checker, name: &str, location: FileLocation) -> SemaResult<TypeInfo> {
    let id = checker.table.lookup(name, location)?;
    match checker.table.binding_kind(id) {
        Binding::Variable(v) => Ok(v.ty.clone()),
        Binding::Member(m) => {
            // spec §4.3: a bare (non-dotted) reference to an instance
            // member has an implicit `this` receiver, which a `static`
            // method body has none of.
            if !name.contains('.') && checker.table.in_static_function() {
                return Err(SemaError::NonStaticMemberFromStaticContext {
                    location,
                    name: name.to_string(),
                });
            }
            // spec §4.4 / spec.md:363: inside a constructor's own
            // initializer list, a sibling member that list hasn't
            // initialized yet is referenced before it exists.
            if checker.table.is_uninitialized_in_current_initializer_list(id) {
                return Err(SemaError::UninitializedVariableReferenced {
                    location,
                    name: name.to_string(),
                });
            }
            if m.modifiers.is_unsafe && !checker.table.in_unsafe_context() {
                return Err(SemaError::CannotReferenceUnsafeMemberFromSafeContext {
                    location,
                    name: name.to_string(),
                });
            }
            Ok(m.ty.clone())
        }
        Binding::Class(_) => Ok(TypeInfo::ClassDeclaration(ClassId(id.0))),
        _ => Err(SemaError::SymbolWrongType {
            location,
            name: name.to_string(),
            expected: "variable or member".to_string(),
        }),
    }
}

pub fn check_expr(checker: &mut Checker, expr: &Expr) -> SemaResult<TypeInfo> {
    checker.diagnostics.push(expr.location);
    let result = check_expr_body(checker, expr);
    checker.diagnostics.pop();
    if let Ok(ty) = &result {
        expr.set_cached_type(ty.clone());
    }
    result
}

fn check_expr_body(checker: &mut Checker, expr: &Expr) -> SemaResult<TypeInfo> {
    match &expr.kind {
        ExprKind::Reference(name) => reference_type(checker, name, expr.location),
        ExprKind::Literal(lit) => match lit {
            Literal::Integer(repr) => Ok(TypeInfo::IntegerConstant(*repr)),
            Literal::Float { text } => constants::parse_float_literal(text, expr.location),
            Literal::Bool(b) => Ok(TypeInfo::BoolConstant(*b)),
            Literal::Char(raw) => constants::parse_char_literal(raw, expr.location),
            Literal::String(raw) => constants::parse_string_literal(raw, expr.location),
        },
        ExprKind::Binary { op, lhs, rhs } => {
            let lhs_ty = check_expr(checker, lhs)?;
            let rhs_ty = check_expr(checker, rhs)?;
            let (result, _cast) = TypeInfo::evaluate_operation(*op, &lhs_ty, Some(&rhs_ty), &checker.table).ok_or_else(|| {
                SemaError::OperationNotDefined {
                    location: expr.location,
                    op: op.to_string(),
                    operands: format!(
                        "{}, {}",
                        lhs_ty.serialized_name(&checker.table),
                        rhs_ty.serialized_name(&checker.table)
                    ),
                }
            })?;
            Ok(result)
        }
        ExprKind::Unary { op, operand } => {
            let operand_ty = check_expr(checker, operand)?;
            let (result, _cast) = TypeInfo::evaluate_operation(*op, &operand_ty, None, &checker.table).ok_or_else(|| {
                SemaError::OperationNotDefined {
                    location: expr.location,
                    op: op.to_string(),
                    operands: operand_ty.serialized_name(&checker.table),
                }
            })?;
            Ok(result)
        }
        ExprKind::Assign { target, value } => {
            let target_ty = check_expr(checker, target)?;
            let value_ty = check_expr(checker, value)?;
            if !target_ty.is_legal_for_assignment() {
                return Err(SemaError::TypeMismatch {
                    location: expr.location,
                    target: target_ty.serialized_name(&checker.table),
                    source: value_ty.serialized_name(&checker.table),
                });
            }
            if !target_ty.is_implicitly_assignable_from(&value_ty, &checker.table) {
                return Err(SemaError::TypeMismatch {
                    location: expr.location,
                    target: target_ty.serialized_name(&checker.table),
                    source: value_ty.serialized_name(&checker.table),
                });
            }
            Ok(target_ty)
        }
        ExprKind::ExprList(items) => {
            let types: Vec<TypeInfo> = items.iter().map(|e| check_expr(checker, e)).collect::<SemaResult<Vec<_>>>()?;
            Ok(join_types(types).unwrap_or_else(|| TypeInfo::Composite(CompositeType::single(TypeInfo::Auto))))
        }
        ExprKind::Call { callee, args } => match &callee.kind {
            ExprKind::Reference(name) => check_call(checker, name, args, expr.location),
            _ => Err(SemaError::SymbolWrongType {
                location: expr.location,
                name: "<expression>".to_string(),
                expected: "callable reference".to_string(),
            }),
        },
        ExprKind::New { class_name, args } => check_new(checker, class_name, args, expr.location),
        ExprKind::StackConstruction { class_name, var_name, args, binding } => {
            let ty = check_stack_construction(checker, class_name, args, expr.location)?;
            let id = checker.table.bind_variable(var_name, ty.clone(), expr.location)?;
            binding.set(Some(id));
            Ok(ty)
        }
        ExprKind::Index { base, index } => {
            if !checker.table.in_unsafe_context() {
                return Err(SemaError::CannotReferenceUnsafeMemberFromSafeContext {
                    location: expr.location,
                    name: "<index operation>".to_string(),
                });
            }
            let base_ty = check_expr(checker, base)?;
            let index_ty = check_expr(checker, index)?;
            if !TypeInfo::Integer(crate::types::IntegerKind::Int32).is_implicitly_assignable_from(&index_ty, &checker.table) {
                return Err(SemaError::TypeMismatch {
                    location: expr.location,
                    target: "int32".to_string(),
                    source: index_ty.serialized_name(&checker.table),
                });
            }
            match base_ty {
                TypeInfo::UnsafeArray { element, .. } => Ok(*element),
                other => Err(SemaError::SymbolWrongType {
                    location: expr.location,
                    name: other.serialized_name(&checker.table),
                    expected: "array type".to_string(),
                }),
            }
        }
        ExprKind::DebugPrint(inner) => {
            check_expr(checker, inner)?;
            Ok(TypeInfo::Auto)
        }
    }
}
