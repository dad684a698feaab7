use ahash::{AHashMap, AHashSet};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::catalog::StructureCatalog;

/// Collection shapes a generic argument or an output schema may be wrapped
/// in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    List,
    Set,
    Map,
}

impl CollectionKind {
    pub fn is_list_like(self) -> bool {
        matches!(self, CollectionKind::List | CollectionKind::Set)
    }
}

/// Deserializes an optional collection kind, treating the empty string the
/// editor emits for "no collection" as absent.
pub(crate) fn opt_collection_kind<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CollectionKind>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("list") => Some(CollectionKind::List),
        Some("set") => Some(CollectionKind::Set),
        Some("map") => Some(CollectionKind::Map),
        _ => None,
    })
}

/// An authored argument for one generic parameter of an output schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericTypeArg {
    pub is_array: bool,
    pub element_type: Option<String>,
    #[serde(deserialize_with = "opt_collection_kind")]
    pub collection_type: Option<CollectionKind>,
    pub key_type: Option<String>,
    pub value_type: Option<String>,
}

/// Authored generic arguments, keyed by parameter name.
pub type GenericTypeArgs = AHashMap<String, GenericTypeArg>;

/// Everything the resolver needs to turn a symbolic type reference into a
/// structural shape.
///
/// The visited set is owned so that each recursion branch of the flattener
/// can extend a private copy; sibling branches must never observe each
/// other's visits.
#[derive(Debug, Clone)]
pub struct ResolveContext<'a> {
    pub catalog: &'a StructureCatalog,
    pub generic_args: Option<&'a GenericTypeArgs>,
    /// Generic parameter names declared in the current scope.
    pub generic_params: &'a AHashSet<String>,
    pub visited: AHashSet<String>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        catalog: &'a StructureCatalog,
        generic_args: Option<&'a GenericTypeArgs>,
        generic_params: &'a AHashSet<String>,
    ) -> Self {
        Self {
            catalog,
            generic_args,
            generic_params,
            visited: AHashSet::new(),
        }
    }

    pub fn is_visited(&self, record_id: &str) -> bool {
        self.visited.contains(record_id)
    }

    /// A copy of this context whose visited set is extended by `record_id`.
    pub fn entered(&self, record_id: Option<&str>) -> Self {
        let mut next = self.clone();
        if let Some(id) = record_id {
            next.visited.insert(id.to_string());
        }
        next
    }
}
