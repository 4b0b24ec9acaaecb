//! Symbol-table export/import (spec §4.6, §6.3).
//!
//! Grounded in `original_source/Ast/Serialization.cpp`: the original walks
//! `SymbolTable::_map` once, picking out public `ClassBinding`s and
//! `NamespaceBinding`s and handing each off to a small `Serializer`
//! hierarchy (`FunctionSerializer`, `MemberSerializer`, `ClassSerializer`,
//! `OverloadedFunctionSerializer`) that each know how to fill in one
//! `boost::property_tree::ptree` fragment. Here that hierarchy collapses
//! into a handful of `#[derive(Serialize, Deserialize)]` structs — the
//! `serde_json::Value` tree the original builds by hand is exactly what
//! `serde_json` derives for us.
//!
//! Import mirrors `LoadFrom`/`LoadClass`/`LoadFunction`: namespaces are
//! registered first, then each class, its constructors, its synthesized
//! destructor, its members and its methods — member/argument type names
//! that don't match a primitive become `TypeInfo::unresolved_class`,
//! resolved lazily the first time something needs their shape.
//!
//! One asymmetry inherited from the original's own `TypeInfo::SerializedName`
//! (spec §3.2, frozen in [`crate::types`]): a class type's serialized form
//! is just its fully-qualified name, with no marker for the value/reference
//! distinction. An imported library therefore always reconstructs class-typed
//! members and arguments as reference types — consistent with this crate's
//! other simplifying call that `new` always produces a reference-type
//! instance (see `check::bodies`). Recorded as a design decision, not a bug.

use serde::{Deserialize, Serialize};

use ruddyc_ast::FileLocation;

use crate::error::{SemaError, SemaResult};
use crate::symbols::{BindingId, FunctionSlot, Pass, SymbolTable, Visibility};
use crate::types::{CompositeType, FloatKind, IntegerKind, Modifiers, TypeInfo};

/// spec §6.3 `Meta`: `{ Name, Version: "MAJOR.MINOR" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMeta {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
}

impl LibraryMeta {
    pub fn new(name: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            name: name.into(),
            version: format!("{major}.{minor}"),
        }
    }
}

/// spec §4.6: the whole `Symbols` JSON tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SerializedSymbols {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Namespaces", default)]
    pub namespaces: Vec<String>,
    #[serde(rename = "Symbols", default)]
    pub classes: Vec<SerializedClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SerializedClass {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Ctors", default)]
    pub ctors: Vec<SerializedSignature>,
    #[serde(rename = "Mems", default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<SerializedMember>,
    #[serde(rename = "Funs", default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<SerializedFunction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SerializedMember {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Mod", default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<i32>,
    #[serde(rename = "Visibility")]
    pub visibility: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SerializedFunction {
    #[serde(rename = "Name")]
    pub name: String,
    /// Present only for an overloaded name; mutually exclusive with the
    /// flattened single-signature fields below (spec §4.6: "overloaded
    /// names emit an `Overload` array").
    #[serde(rename = "Overload", default, skip_serializing_if = "Option::is_none")]
    pub overload: Option<Vec<SerializedSignature>>,
    #[serde(flatten)]
    pub signature: SerializedSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SerializedSignature {
    #[serde(rename = "Input", default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(rename = "Output", default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(rename = "Mod", default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<i32>,
    #[serde(rename = "Visibility", default)]
    pub visibility: i32,
}

const MOD_STATIC: i32 = 1;
const MOD_UNSAFE: i32 = 2;

fn encode_modifiers(m: Modifiers) -> Option<i32> {
    let mut bits = 0;
    if m.is_static {
        bits |= MOD_STATIC;
    }
    if m.is_unsafe {
        bits |= MOD_UNSAFE;
    }
    (bits != 0).then_some(bits)
}

fn decode_modifiers(bits: Option<i32>) -> Modifiers {
    let bits = bits.unwrap_or(0);
    Modifiers {
        is_static: bits & MOD_STATIC != 0,
        is_unsafe: bits & MOD_UNSAFE != 0,
    }
}

fn encode_visibility(v: Visibility) -> i32 {
    match v {
        Visibility::Public => 0,
        Visibility::Private => 1,
        Visibility::Protected => 2,
    }
}

fn decode_visibility(code: i32) -> Visibility {
    match code {
        1 => Visibility::Private,
        2 => Visibility::Protected,
        _ => Visibility::Public,
    }
}

fn encode_type(ty: &TypeInfo, table: &SymbolTable) -> String {
    ty.serialized_name(table)
}

/// The inverse of [`TypeInfo::serialized_name`] for declared (non-constant)
/// types: primitives parse back to their exact kind, anything else becomes
/// an unresolved reference-type class (see the module doc's note on the
/// lost value/reference distinction).
fn decode_one_type(name: &str) -> TypeInfo {
    match name {
        "int32" => TypeInfo::Integer(IntegerKind::Int32),
        "int64" => TypeInfo::Integer(IntegerKind::Int64),
        "uint32" => TypeInfo::Integer(IntegerKind::UInt32),
        "uint64" => TypeInfo::Integer(IntegerKind::UInt64),
        "byte" => TypeInfo::Integer(IntegerKind::Byte),
        "charbyte" => TypeInfo::Integer(IntegerKind::CharByte),
        "char" => TypeInfo::Integer(IntegerKind::Char),
        "float" => TypeInfo::Floating(FloatKind::F32),
        "float64" => TypeInfo::Floating(FloatKind::F64),
        "bool" => TypeInfo::Bool,
        "string" => TypeInfo::Str,
        "auto" => TypeInfo::Auto,
        other => TypeInfo::unresolved_class(other, false),
    }
}

fn decode_type(name: &str) -> Option<TypeInfo> {
    if name.is_empty() {
        return None;
    }
    if !name.contains(',') {
        return Some(decode_one_type(name));
    }
    let items: Vec<TypeInfo> = name.split(',').map(decode_one_type).collect();
    CompositeType::from_vec(items).map(TypeInfo::Composite)
}

fn serialize_signature(
    table: &SymbolTable,
    input: &Option<TypeInfo>,
    output: &Option<TypeInfo>,
    modifiers: Modifiers,
    visibility: Visibility,
) -> SerializedSignature {
    SerializedSignature {
        input: input.as_ref().map(|t| encode_type(t, table)),
        output: output.as_ref().map(|t| encode_type(t, table)),
        modifiers: encode_modifiers(modifiers),
        visibility: encode_visibility(visibility),
    }
}

fn serialize_class(table: &SymbolTable, class_id: BindingId) -> SerializedClass {
    use crate::symbols::Binding;

    let name = table.header(class_id).fully_qualified_name.clone();
    let Binding::Class(class) = table.binding_kind(class_id) else {
        unreachable!("public_classes() only returns class bindings")
    };

    let ctors = class
        .constructors
        .iter()
        .filter_map(|&id| table.constructor(id))
        .filter(|c| c.header.visibility != Visibility::Private)
        .map(|c| serialize_signature(table, &c.input_type, &None, Modifiers::default(), c.header.visibility))
        .collect();

    let members = class
        .members
        .iter()
        .filter_map(|&id| table.member(id))
        .filter(|m| m.header.visibility != Visibility::Private)
        .map(|m| SerializedMember {
            name: m.header.name.clone(),
            ty: encode_type(&m.ty, table),
            modifiers: encode_modifiers(m.modifiers),
            visibility: encode_visibility(m.header.visibility),
        })
        .collect();

    let functions = class
        .functions
        .iter()
        .filter_map(|(name, slot)| match *slot {
            FunctionSlot::Single(id) => {
                let f = table.function(id)?;
                if f.header.visibility == Visibility::Private {
                    return None;
                }
                Some(SerializedFunction {
                    name: name.clone(),
                    overload: None,
                    signature: serialize_signature(table, &f.input_type, &f.output_type, f.modifiers, f.header.visibility),
                })
            }
            FunctionSlot::Overloaded(oid) => {
                let Binding::OverloadedFunction(overload) = table.binding_kind(oid) else {
                    return None;
                };
                let signatures: Vec<SerializedSignature> = overload
                    .overloads
                    .iter()
                    .filter_map(|&fid| table.function(fid))
                    .filter(|f| f.header.visibility != Visibility::Private)
                    .map(|f| serialize_signature(table, &f.input_type, &f.output_type, f.modifiers, f.header.visibility))
                    .collect();
                if signatures.is_empty() {
                    return None;
                }
                Some(SerializedFunction {
                    name: name.clone(),
                    overload: Some(signatures),
                    signature: SerializedSignature::default(),
                })
            }
        })
        .collect();

    SerializedClass { name, ctors, members, functions }
}

/// spec §4.6: export every `PUBLIC` class plus the declared namespace
/// list as one JSON-serializable tree.
pub fn export(table: &SymbolTable, library_name: impl Into<String>) -> SerializedSymbols {
    let mut namespaces = table.namespace_paths();
    namespaces.sort();

    let mut classes: Vec<SerializedClass> = table
        .public_classes()
        .into_iter()
        .map(|id| serialize_class(table, id))
        .collect();
    classes.sort_by(|a, b| a.name.cmp(&b.name));

    SerializedSymbols { name: library_name.into(), namespaces, classes }
}

/// Enters (idempotently) each dotted segment of `path`, returning how many
/// `exit_namespace()` calls the caller owes to unwind back out.
fn enter_namespace_path(table: &mut SymbolTable, path: &str) -> SemaResult<usize> {
    if path.is_empty() {
        return Ok(0);
    }
    let mut depth = 0;
    for segment in path.split('.') {
        table.bind_namespace(segment, FileLocation::SYNTHESIZED)?;
        depth += 1;
    }
    Ok(depth)
}

fn exit_namespace_path(table: &mut SymbolTable, depth: usize) {
    for _ in 0..depth {
        table.exit_namespace();
    }
}

/// Splits a class's fully-qualified name into `(namespace_path, simple_name)`.
fn split_fqn(fqn: &str) -> (&str, &str) {
    match fqn.rfind('.') {
        Some(idx) => (&fqn[..idx], &fqn[idx + 1..]),
        None => ("", fqn),
    }
}

fn import_class(table: &mut SymbolTable, class: &SerializedClass) -> SemaResult<()> {
    let (namespace_path, simple_name) = split_fqn(&class.name);
    let depth = enter_namespace_path(table, namespace_path)?;

    let result = (|| -> SemaResult<()> {
        let class_id = table.bind_class(
            simple_name,
            Visibility::Public,
            Pass::ClassAndNamespaceDeclarations,
            FileLocation::SYNTHESIZED,
        )?;

        for ctor in &class.ctors {
            table.bind_constructor(
                decode_type(ctor.input.as_deref().unwrap_or("")),
                decode_visibility(ctor.visibility),
                Pass::MethodDeclarations,
                FileLocation::SYNTHESIZED,
            )?;
            table.exit_constructor();
        }
        table.ensure_destructor(class_id);

        for member in &class.members {
            table.bind_member_variable(
                &member.name,
                decode_type(&member.ty).unwrap_or(TypeInfo::Auto),
                decode_visibility(member.visibility),
                decode_modifiers(member.modifiers),
                Pass::ClassVariables,
                FileLocation::SYNTHESIZED,
            )?;
        }

        for function in &class.functions {
            let signatures: Vec<&SerializedSignature> = match &function.overload {
                Some(overloads) => overloads.iter().collect(),
                None => vec![&function.signature],
            };
            for sig in signatures {
                table.bind_function(
                    &function.name,
                    decode_type(sig.input.as_deref().unwrap_or("")),
                    decode_type(sig.output.as_deref().unwrap_or("")),
                    decode_modifiers(sig.modifiers),
                    decode_visibility(sig.visibility),
                    Pass::MethodDeclarations,
                    FileLocation::SYNTHESIZED,
                )?;
                table.exit_function();
            }
        }

        table.exit_class();
        Ok(())
    })();

    exit_namespace_path(table, depth);
    result
}

/// spec §4.6 import algorithm: namespaces first, then each class with its
/// constructors (dtor synthesized), members and methods.
pub fn import(serialized: &SerializedSymbols) -> SemaResult<SymbolTable> {
    let mut table = SymbolTable::new();

    for namespace in &serialized.namespaces {
        let depth = enter_namespace_path(&mut table, namespace)?;
        exit_namespace_path(&mut table, depth);
    }

    for class in &serialized.classes {
        import_class(&mut table, class)?;
    }

    Ok(table)
}

/// Parses a `SerializedSymbols` tree from its JSON text form.
pub fn from_json(text: &str) -> SemaResult<SerializedSymbols> {
    serde_json::from_str(text).map_err(|e| SemaError::MalformedLibrary {
        location: FileLocation::SYNTHESIZED,
        detail: e.to_string(),
    })
}

/// Renders a `SerializedSymbols` tree to pretty-printed JSON text.
pub fn to_json(symbols: &SerializedSymbols) -> SemaResult<String> {
    serde_json::to_string_pretty(symbols).map_err(|e| SemaError::MalformedLibrary {
        location: FileLocation::SYNTHESIZED,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Visibility as Vis;

    fn loc() -> FileLocation {
        FileLocation::new(1, 1)
    }

    #[test]
    fn exports_only_public_classes() {
        let mut table = SymbolTable::new();
        table.bind_class("Visible", Vis::Public, Pass::ClassAndNamespaceDeclarations, loc()).unwrap();
        table.exit_class();
        table.bind_class("Hidden", Vis::Private, Pass::ClassAndNamespaceDeclarations, loc()).unwrap();
        table.exit_class();

        let symbols = export(&table, "demo");
        assert_eq!(symbols.classes.len(), 1);
        assert_eq!(symbols.classes[0].name, "Visible");
    }

    #[test]
    fn round_trips_a_class_with_a_member_and_a_constructor() {
        let mut table = SymbolTable::new();
        table.bind_namespace("ns", loc()).unwrap();
        let class_id = table.bind_class("Widget", Vis::Public, Pass::ClassAndNamespaceDeclarations, loc()).unwrap();
        table
            .bind_constructor(
                Some(TypeInfo::Integer(IntegerKind::Int32)),
                Vis::Public,
                Pass::MethodDeclarations,
                loc(),
            )
            .unwrap();
        table.exit_constructor();
        table
            .bind_member_variable(
                "count",
                TypeInfo::Integer(IntegerKind::Int64),
                Vis::Public,
                Modifiers::default(),
                Pass::ClassVariables,
                loc(),
            )
            .unwrap();
        table.ensure_destructor(class_id);
        table.exit_class();
        table.exit_namespace();

        let symbols = export(&table, "demo");
        assert_eq!(symbols.namespaces, vec!["ns".to_string()]);
        assert_eq!(symbols.classes.len(), 1);
        let class = &symbols.classes[0];
        assert_eq!(class.name, "ns.Widget");
        assert_eq!(class.ctors.len(), 1);
        assert_eq!(class.ctors[0].input.as_deref(), Some("int32"));
        assert_eq!(class.members.len(), 1);
        assert_eq!(class.members[0].ty, "int64");

        let reloaded = import(&symbols).unwrap();
        let id = reloaded.resolve_class_name("ns.Widget").expect("Widget should round-trip");
        assert_eq!(reloaded.class_fully_qualified_name(id), Some("ns.Widget".to_string()));
    }

    #[test]
    fn round_trips_overloaded_functions() {
        let mut table = SymbolTable::new();
        table.bind_class("Calc", Vis::Public, Pass::ClassAndNamespaceDeclarations, loc()).unwrap();
        table
            .bind_function(
                "add",
                Some(TypeInfo::Integer(IntegerKind::Int32)),
                Some(TypeInfo::Integer(IntegerKind::Int32)),
                Modifiers::default(),
                Vis::Public,
                Pass::MethodDeclarations,
                loc(),
            )
            .unwrap();
        table.exit_function();
        table
            .bind_function(
                "add",
                Some(TypeInfo::Floating(FloatKind::F64)),
                Some(TypeInfo::Floating(FloatKind::F64)),
                Modifiers::default(),
                Vis::Public,
                Pass::MethodDeclarations,
                loc(),
            )
            .unwrap();
        table.exit_function();
        table.ensure_destructor(table.resolve_class_name("Calc").map(|c| BindingId(c.0)).unwrap());
        table.exit_class();

        let symbols = export(&table, "demo");
        let fns = &symbols.classes[0].functions;
        assert_eq!(fns.len(), 1);
        assert!(fns[0].overload.as_ref().unwrap().len() == 2);

        let reloaded = import(&symbols).unwrap();
        let class_id = reloaded.resolve_class_name("Calc").unwrap();
        assert_eq!(reloaded.class_fully_qualified_name(class_id), Some("Calc".to_string()));
    }

    #[test]
    fn json_round_trip_preserves_shape() {
        let mut table = SymbolTable::new();
        let class_id = table.bind_class("Widget", Vis::Public, Pass::ClassAndNamespaceDeclarations, loc()).unwrap();
        table.ensure_destructor(class_id);
        table.exit_class();
        let symbols = export(&table, "demo");

        let text = to_json(&symbols).unwrap();
        let parsed = from_json(&text).unwrap();
        assert_eq!(parsed.name, "demo");
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].name, "Widget");
    }
}
