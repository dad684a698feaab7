use ahash::AHashSet;
use tracing::trace;

use super::context::{GenericTypeArgs, ResolveContext};
use super::resolver::resolve_field_type;
use super::types::{PrimitiveTag, ResolvedType, SchemaField, TypeRef, VariableType};
use crate::catalog::{FieldDefinition, StructureCatalog};

/// Projects a resolved shape onto the (tag, type ref, item ref) triple a
/// schema row carries.
fn schema_parts(resolved: &ResolvedType) -> (VariableType, Option<TypeRef>, Option<TypeRef>) {
    match resolved {
        ResolvedType::Primitive(tag) => (VariableType::from(*tag), None, None),
        ResolvedType::Record { origin, .. } => (
            VariableType::Object,
            origin.clone().map(TypeRef::Struct),
            None,
        ),
        ResolvedType::GenericRef(param) => (
            VariableType::Object,
            Some(TypeRef::Generic(param.clone())),
            None,
        ),
        ResolvedType::List { item } => {
            let item_ref = match item.as_ref() {
                ResolvedType::Record {
                    origin: Some(id), ..
                } => Some(TypeRef::Struct(id.clone())),
                ResolvedType::GenericRef(param) => Some(TypeRef::Generic(param.clone())),
                ResolvedType::Primitive(tag) if *tag != PrimitiveTag::Dynamic => {
                    Some(TypeRef::Name(tag.to_string()))
                }
                _ => None,
            };
            (VariableType::Array, None, item_ref)
        }
    }
}

/// Recursively expands record fields into dotted-path rows.
///
/// Output is a deterministic pre-order, depth-first sequence following
/// declaration order. Fields with blank names are skipped entirely,
/// including their subtrees. Recursion into a record extends a copy of the
/// visited set with that record's id; sibling fields resolve against the
/// caller's set untouched.
pub fn flatten_fields(
    fields: &[FieldDefinition],
    context: &ResolveContext<'_>,
    parent_path: &str,
) -> Vec<SchemaField> {
    let mut rows = Vec::new();

    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            continue;
        }

        let path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", parent_path, name)
        };

        let resolved = resolve_field_type(field, context);
        let (value_type, type_ref, item_type_ref) = schema_parts(&resolved);
        rows.push(SchemaField {
            path: path.clone(),
            value_type,
            type_ref,
            item_type_ref,
            description: field.description.clone(),
        });

        match &resolved {
            ResolvedType::Record { fields, origin } if !fields.is_empty() => {
                let next = context.entered(origin.as_deref());
                rows.extend(flatten_fields(fields, &next, &path));
            }
            ResolvedType::List { item } => {
                if let ResolvedType::Record { fields, origin } = item.as_ref() {
                    if !fields.is_empty() {
                        let next = context.entered(origin.as_deref());
                        rows.extend(flatten_fields(fields, &next, &path));
                    }
                }
            }
            _ => {}
        }
    }

    rows
}

/// Resolves a record reference and flattens its fields, with the record's
/// own type parameters in scope and its id pre-visited.
///
/// Unresolvable references and bare generic references yield an empty list.
pub fn record_fields_by_ref(
    reference: &TypeRef,
    catalog: &StructureCatalog,
    generic_args: Option<&GenericTypeArgs>,
) -> Vec<SchemaField> {
    if reference.is_generic() {
        return Vec::new();
    }

    let Some(record) = catalog.get_by_type_ref(reference) else {
        trace!(reference = %reference, "structure reference not found in catalog");
        return Vec::new();
    };

    let generic_params: AHashSet<String> = record
        .type_parameters
        .iter()
        .map(|param| param.name.clone())
        .filter(|name| !name.is_empty())
        .collect();

    let mut context = ResolveContext::new(catalog, generic_args, &generic_params);
    context.visited.insert(record.id.clone());

    flatten_fields(&record.fields, &context, "")
}
