use super::context::ResolveContext;
use super::types::{PrimitiveTag, ResolvedType};
use crate::catalog::FieldDefinition;

fn non_blank(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|name| !name.is_empty())
}

fn is_list_tag(tag: &str) -> bool {
    tag == "array" || tag == "list"
}

/// Resolves a bare type name to a structural shape.
///
/// Rules, in priority order: blank input is dynamic; a literal
/// `generic:<p>` stays an unresolved generic reference; an in-scope generic
/// parameter resolves through its binding; built-in tags resolve to their
/// shapes (inline fields and element types are the caller's concern); any
/// other name is a catalog lookup, where an already-visited record id stops
/// with an empty record shape so self-references cannot expand forever.
pub fn resolve_type_name(name: Option<&str>, context: &ResolveContext<'_>) -> ResolvedType {
    let Some(name) = non_blank(name) else {
        return ResolvedType::dynamic();
    };

    if let Some(param) = name.strip_prefix("generic:") {
        return ResolvedType::GenericRef(param.to_string());
    }

    if context.generic_params.contains(name) {
        return resolve_generic_param(name, context);
    }

    match name {
        "string" => return ResolvedType::Primitive(PrimitiveTag::String),
        "number" => return ResolvedType::Primitive(PrimitiveTag::Number),
        "boolean" => return ResolvedType::Primitive(PrimitiveTag::Boolean),
        "object" => return ResolvedType::empty_record(),
        "array" | "list" => {
            return ResolvedType::List {
                item: Box::new(ResolvedType::dynamic()),
            };
        }
        _ => {}
    }

    match context.catalog.get_by_ref(name) {
        Some(record) if context.is_visited(&record.id) => ResolvedType::Record {
            fields: Vec::new(),
            origin: Some(record.id.clone()),
        },
        Some(record) => ResolvedType::Record {
            fields: record.fields.clone(),
            origin: Some(record.id.clone()),
        },
        None => ResolvedType::dynamic(),
    }
}

/// Resolves an in-scope generic parameter through the authored argument
/// bound to it. A parameter with no binding is dynamic, never an error.
pub fn resolve_generic_param(param: &str, context: &ResolveContext<'_>) -> ResolvedType {
    let Some(arg) = context.generic_args.and_then(|args| args.get(param)) else {
        return ResolvedType::dynamic();
    };

    if arg.collection_type.is_some_and(|kind| !kind.is_list_like()) {
        // Map-shaped bindings expose no keyed structure to flatten.
        return ResolvedType::empty_record();
    }

    if arg.collection_type.is_some_and(|kind| kind.is_list_like()) || arg.is_array {
        let item = resolve_type_name(arg.element_type.as_deref(), context);
        return ResolvedType::List {
            item: Box::new(item),
        };
    }

    if arg.value_type.is_some() {
        return resolve_type_name(arg.value_type.as_deref(), context);
    }

    resolve_type_name(arg.element_type.as_deref(), context)
}

/// Field-aware variant of [`resolve_type_name`] that additionally
/// understands explicit record references, inline nested children, and
/// inline list-element descriptors.
pub fn resolve_field_type(field: &FieldDefinition, context: &ResolveContext<'_>) -> ResolvedType {
    if let Some(reference) = non_blank(field.ref_structure.as_deref()) {
        if let Some(record) = context.catalog.get_by_ref(reference) {
            if context.is_visited(&record.id) {
                return ResolvedType::Record {
                    fields: Vec::new(),
                    origin: Some(record.id.clone()),
                };
            }
            return ResolvedType::Record {
                fields: record.fields.clone(),
                origin: Some(record.id.clone()),
            };
        }
    }

    let tag = field.type_name.trim();

    if context.generic_params.contains(tag) {
        return resolve_generic_param(tag, context);
    }

    if tag == "object" {
        return ResolvedType::Record {
            fields: field.children.clone(),
            origin: None,
        };
    }

    if is_list_tag(tag) {
        let item = match non_blank(field.item_type.as_deref()) {
            Some(item_tag) if context.generic_params.contains(item_tag) => {
                resolve_generic_param(item_tag, context)
            }
            Some("object") => ResolvedType::Record {
                fields: field.children.clone(),
                origin: None,
            },
            Some(item_tag) => resolve_type_name(Some(item_tag), context),
            None => ResolvedType::dynamic(),
        };
        return ResolvedType::List {
            item: Box::new(item),
        };
    }

    resolve_type_name(Some(tag), context)
}
