use ahash::AHashMap;

use super::RecordDefinition;
use crate::resolve::TypeRef;

/// Index over a snapshot of record definitions, supporting lookup by id,
/// simple name, and qualified name.
///
/// Built once per snapshot. Duplicate keys resolve last-registered-wins by
/// construction of the maps; absence is reported as `None`, never an error,
/// and callers degrade to an opaque/dynamic type.
#[derive(Debug, Clone, Default)]
pub struct StructureCatalog {
    records: Vec<RecordDefinition>,
    by_id: AHashMap<String, usize>,
    by_name: AHashMap<String, usize>,
    by_qualified_name: AHashMap<String, usize>,
}

impl StructureCatalog {
    pub fn new(records: impl Into<Vec<RecordDefinition>>) -> Self {
        let records = records.into();
        let mut by_id = AHashMap::new();
        let mut by_name = AHashMap::new();
        let mut by_qualified_name = AHashMap::new();

        for (index, record) in records.iter().enumerate() {
            if !record.id.is_empty() {
                by_id.insert(record.id.clone(), index);
            }
            if !record.name.is_empty() {
                by_name.insert(record.name.clone(), index);
            }
            if !record.qualified_name.is_empty() {
                by_qualified_name.insert(record.qualified_name.clone(), index);
            }
        }

        Self {
            records,
            by_id,
            by_name,
            by_qualified_name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RecordDefinition] {
        &self.records
    }

    /// Looks up a record by its id alone.
    pub fn get_by_id(&self, id: &str) -> Option<&RecordDefinition> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    /// Resolves a reference string to a record definition.
    ///
    /// A `struct:<id>` reference is an id lookup only; any other string is
    /// tried as an id, then a qualified name, then a simple name.
    pub fn get_by_ref(&self, reference: &str) -> Option<&RecordDefinition> {
        if reference.is_empty() {
            return None;
        }
        if let Some(id) = reference.strip_prefix("struct:") {
            return self.get_by_id(id);
        }
        self.by_id
            .get(reference)
            .or_else(|| self.by_qualified_name.get(reference))
            .or_else(|| self.by_name.get(reference))
            .map(|&index| &self.records[index])
    }

    /// [`Self::get_by_ref`] over the parsed reference form. Generic
    /// parameter references never name a record.
    pub fn get_by_type_ref(&self, reference: &TypeRef) -> Option<&RecordDefinition> {
        match reference {
            TypeRef::Struct(id) => self.get_by_id(id),
            TypeRef::Generic(_) => None,
            TypeRef::Name(name) => self.get_by_ref(name),
        }
    }
}
