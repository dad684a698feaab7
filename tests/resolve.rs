//! Unit tests for catalog lookup, type resolution, and field flattening.
mod common;
use ahash::AHashSet;
use common::*;
use flowscope::prelude::*;
use flowscope::resolve::{
    flatten_fields, record_fields_by_ref, resolve_type_name, GenericTypeArg, GenericTypeArgs,
    ResolveContext,
};

#[test]
fn catalog_lookup_precedence_and_prefix() {
    let catalog = sample_catalog();

    assert_eq!(catalog.get_by_ref("struct-order").unwrap().name, "Order");
    assert_eq!(catalog.get_by_ref("global.Order").unwrap().name, "Order");
    assert_eq!(catalog.get_by_ref("Order").unwrap().name, "Order");
    assert_eq!(
        catalog.get_by_ref("struct:struct-order").unwrap().name,
        "Order"
    );

    // The struct: prefix is an id lookup only.
    assert!(catalog.get_by_ref("struct:Order").is_none());
    assert!(catalog.get_by_ref("no-such-record").is_none());
    assert!(catalog.get_by_ref("").is_none());
}

#[test]
fn catalog_duplicate_ids_last_registered_wins() {
    let mut first = order_record();
    first.description = Some("first".to_string());
    let mut second = order_record();
    second.description = Some("second".to_string());

    let catalog = StructureCatalog::new(vec![first, second]);
    assert_eq!(
        catalog.get_by_id("struct-order").unwrap().description.as_deref(),
        Some("second")
    );
}

#[test]
fn resolve_builtin_and_unknown_names() {
    let catalog = sample_catalog();
    let params = AHashSet::new();
    let context = ResolveContext::new(&catalog, None, &params);

    assert_eq!(resolve_type_name(None, &context), ResolvedType::dynamic());
    assert_eq!(
        resolve_type_name(Some("  "), &context),
        ResolvedType::dynamic()
    );
    assert_eq!(
        resolve_type_name(Some("string"), &context),
        ResolvedType::Primitive(PrimitiveTag::String)
    );
    assert_eq!(
        resolve_type_name(Some("no-such-record"), &context),
        ResolvedType::dynamic()
    );
    assert_eq!(
        resolve_type_name(Some("object"), &context),
        ResolvedType::empty_record()
    );
    match resolve_type_name(Some("list"), &context) {
        ResolvedType::List { item } => assert_eq!(*item, ResolvedType::dynamic()),
        other => panic!("expected list shape, got {:?}", other),
    }
    assert_eq!(
        resolve_type_name(Some("generic:T"), &context),
        ResolvedType::GenericRef("T".to_string())
    );
}

#[test]
fn resolve_catalog_record_carries_origin() {
    let catalog = sample_catalog();
    let params = AHashSet::new();
    let context = ResolveContext::new(&catalog, None, &params);

    match resolve_type_name(Some("Order"), &context) {
        ResolvedType::Record { fields, origin } => {
            assert_eq!(origin.as_deref(), Some("struct-order"));
            assert_eq!(fields.len(), 3);
        }
        other => panic!("expected record shape, got {:?}", other),
    }

    // A visited id stops expansion but keeps the origin.
    let visited = context.entered(Some("struct-order"));
    match resolve_type_name(Some("Order"), &visited) {
        ResolvedType::Record { fields, origin } => {
            assert_eq!(origin.as_deref(), Some("struct-order"));
            assert!(fields.is_empty());
        }
        other => panic!("expected record shape, got {:?}", other),
    }
}

#[test]
fn flatten_order_record_rows() {
    let catalog = sample_catalog();
    let rows = record_fields_by_ref(&TypeRef::Struct("struct-order".to_string()), &catalog, None);

    let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    assert_eq!(paths, vec!["id", "total", "tags"]);

    assert_eq!(rows[0].value_type, VariableType::String);
    assert_eq!(rows[1].value_type, VariableType::Number);
    assert_eq!(rows[2].value_type, VariableType::Array);
    assert_eq!(
        rows[2].item_type_ref,
        Some(TypeRef::Name("string".to_string()))
    );
}

#[test]
fn flatten_self_reference_emits_single_row() {
    let catalog = sample_catalog();
    let rows = record_fields_by_ref(
        &TypeRef::Struct("struct-category".to_string()),
        &catalog,
        None,
    );

    let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    assert_eq!(paths, vec!["name", "parent"]);

    let parent = &rows[1];
    assert_eq!(parent.value_type, VariableType::Object);
    assert_eq!(
        parent.type_ref,
        Some(TypeRef::Struct("struct-category".to_string()))
    );
}

#[test]
fn flatten_sibling_branches_do_not_share_visited_sets() {
    let shipping = RecordDefinition {
        id: "struct-address".to_string(),
        name: "Address".to_string(),
        qualified_name: "global.Address".to_string(),
        fields: vec![FieldDefinition::new("city", "string")],
        ..RecordDefinition::default()
    };
    let envelope = RecordDefinition {
        id: "struct-envelope".to_string(),
        name: "Envelope".to_string(),
        qualified_name: "global.Envelope".to_string(),
        fields: vec![
            FieldDefinition {
                ref_structure: Some("struct-address".to_string()),
                ..FieldDefinition::new("from", "object")
            },
            FieldDefinition {
                ref_structure: Some("struct-address".to_string()),
                ..FieldDefinition::new("to", "object")
            },
        ],
        ..RecordDefinition::default()
    };
    let catalog = StructureCatalog::new(vec![shipping, envelope]);

    let rows = record_fields_by_ref(
        &TypeRef::Struct("struct-envelope".to_string()),
        &catalog,
        None,
    );
    let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    // The second sibling expands even though the first visited the same
    // record.
    assert_eq!(paths, vec!["from", "from.city", "to", "to.city"]);
}

#[test]
fn flatten_skips_blank_names_entirely() {
    let catalog = StructureCatalog::default();
    let params = AHashSet::new();
    let context = ResolveContext::new(&catalog, None, &params);

    let fields = vec![
        FieldDefinition::new("  ", "string"),
        FieldDefinition {
            children: vec![FieldDefinition::new("inner", "string")],
            ..FieldDefinition::new("", "object")
        },
        FieldDefinition::new("kept", "boolean"),
    ];

    let rows = flatten_fields(&fields, &context, "");
    let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    assert_eq!(paths, vec!["kept"]);
}

#[test]
fn flatten_inline_list_of_records() {
    let catalog = StructureCatalog::default();
    let params = AHashSet::new();
    let context = ResolveContext::new(&catalog, None, &params);

    let fields = vec![FieldDefinition {
        item_type: Some("object".to_string()),
        children: vec![
            FieldDefinition::new("sku", "string"),
            FieldDefinition::new("qty", "number"),
        ],
        ..FieldDefinition::new("lines", "array")
    }];

    let rows = flatten_fields(&fields, &context, "order");
    let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    assert_eq!(paths, vec!["order.lines", "order.lines.sku", "order.lines.qty"]);
    assert_eq!(rows[0].value_type, VariableType::Array);
}

#[test]
fn generic_record_resolves_through_bound_argument() {
    let catalog = sample_catalog();
    let mut args = GenericTypeArgs::default();
    args.insert(
        "T".to_string(),
        GenericTypeArg {
            element_type: Some("Order".to_string()),
            ..GenericTypeArg::default()
        },
    );

    let rows = record_fields_by_ref(
        &TypeRef::Struct("struct-result".to_string()),
        &catalog,
        Some(&args),
    );
    let paths: Vec<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["code", "data", "data.id", "data.total", "data.tags"]
    );
    assert_eq!(
        rows[1].type_ref,
        Some(TypeRef::Struct("struct-order".to_string()))
    );
}

#[test]
fn generic_record_without_binding_is_dynamic() {
    let catalog = sample_catalog();
    let rows = record_fields_by_ref(&TypeRef::Struct("struct-result".to_string()), &catalog, None);

    let data = rows.iter().find(|row| row.path == "data").unwrap();
    assert_eq!(data.value_type, VariableType::Dynamic);
}

#[test]
fn generic_list_argument_wraps_element() {
    let catalog = sample_catalog();
    let mut args = GenericTypeArgs::default();
    args.insert(
        "T".to_string(),
        GenericTypeArg {
            is_array: true,
            element_type: Some("Order".to_string()),
            ..GenericTypeArg::default()
        },
    );

    let rows = record_fields_by_ref(
        &TypeRef::Struct("struct-result".to_string()),
        &catalog,
        Some(&args),
    );
    let data = rows.iter().find(|row| row.path == "data").unwrap();
    assert_eq!(data.value_type, VariableType::Array);
    assert_eq!(
        data.item_type_ref,
        Some(TypeRef::Struct("struct-order".to_string()))
    );
    // A list-of-record binding also expands the element's leaves.
    assert!(rows.iter().any(|row| row.path == "data.id"));
}

#[test]
fn type_ref_wire_round_trip() {
    for (raw, parsed) in [
        ("struct:abc", TypeRef::Struct("abc".to_string())),
        ("generic:T", TypeRef::Generic("T".to_string())),
        ("global.Order", TypeRef::Name("global.Order".to_string())),
    ] {
        let reference = TypeRef::parse(raw).unwrap();
        assert_eq!(reference, parsed);
        assert_eq!(reference.to_string(), raw);
    }
    assert!(TypeRef::parse("   ").is_none());
}

#[test]
fn variable_type_wire_round_trip() {
    assert_eq!(VariableType::from_name("string"), VariableType::String);
    assert_eq!(VariableType::from_name("list"), VariableType::Array);
    assert_eq!(VariableType::from_name(""), VariableType::Unknown);
    assert_eq!(
        VariableType::from_name("List<Order>"),
        VariableType::Named("List<Order>".to_string())
    );
    assert_eq!(VariableType::Named("List<Order>".to_string()).to_string(), "List<Order>");

    let serialized = serde_json::to_string(&VariableType::Array).unwrap();
    assert_eq!(serialized, "\"array\"");
    let parsed: VariableType = serde_json::from_str("\"List<Order>\"").unwrap();
    assert_eq!(parsed, VariableType::Named("List<Order>".to_string()));
}
