//! In-memory `FieldStore`.

use std::collections::BTreeMap;

use hf_core::Handle;

use crate::error::{StoreError, StoreResult};
use crate::store::FieldStore;
use crate::value::FieldValue;

/// Upper bound on record width; guards against runaway port indices.
pub const MAX_FIELDS: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq)]
struct Record {
    kind: String,
    fields: Vec<FieldValue>,
}

/// Ordered in-memory record store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<Handle, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, handle: Handle) -> StoreResult<&Record> {
        self.records
            .get(&handle)
            .ok_or(StoreError::MissingRecord { handle })
    }
}

impl FieldStore for MemoryStore {
    fn create_record(
        &mut self,
        handle: Handle,
        kind: &str,
        field_count: usize,
    ) -> StoreResult<()> {
        if self.records.contains_key(&handle) {
            return Err(StoreError::DuplicateRecord { handle });
        }
        if field_count > MAX_FIELDS {
            return Err(StoreError::FieldOutOfRange {
                handle,
                index: field_count,
                len: MAX_FIELDS,
            });
        }
        self.records.insert(
            handle,
            Record {
                kind: kind.to_string(),
                fields: vec![FieldValue::Empty; field_count],
            },
        );
        Ok(())
    }

    fn remove_record(&mut self, handle: Handle) -> StoreResult<()> {
        self.records
            .remove(&handle)
            .map(|_| ())
            .ok_or(StoreError::MissingRecord { handle })
    }

    fn contains(&self, handle: Handle) -> bool {
        self.records.contains_key(&handle)
    }

    fn kind(&self, handle: Handle) -> Option<&str> {
        self.records.get(&handle).map(|r| r.kind.as_str())
    }

    fn num_fields(&self, handle: Handle) -> StoreResult<usize> {
        Ok(self.record(handle)?.fields.len())
    }

    fn get_field(&self, handle: Handle, index: usize) -> StoreResult<FieldValue> {
        Ok(self
            .record(handle)?
            .fields
            .get(index)
            .cloned()
            .unwrap_or_default())
    }

    fn set_field(&mut self, handle: Handle, index: usize, value: FieldValue) -> StoreResult<()> {
        if index >= MAX_FIELDS {
            return Err(StoreError::FieldOutOfRange {
                handle,
                index,
                len: MAX_FIELDS,
            });
        }
        let record = self
            .records
            .get_mut(&handle)
            .ok_or(StoreError::MissingRecord { handle })?;
        if index >= record.fields.len() {
            record.fields.resize(index + 1, FieldValue::Empty);
        }
        record.fields[index] = value;
        Ok(())
    }

    fn handles(&self) -> Vec<Handle> {
        self.records.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(kind: &str, fields: usize) -> (MemoryStore, Handle) {
        let mut store = MemoryStore::new();
        let handle = Handle::fresh();
        store.create_record(handle, kind, fields).unwrap();
        (store, handle)
    }

    #[test]
    fn create_and_remove() {
        let (mut store, h) = store_with("Node", 3);
        assert!(store.contains(h));
        assert_eq!(store.kind(h), Some("Node"));
        assert_eq!(store.num_fields(h).unwrap(), 3);
        assert_eq!(
            store.create_record(h, "Node", 3),
            Err(StoreError::DuplicateRecord { handle: h })
        );

        store.remove_record(h).unwrap();
        assert!(!store.contains(h));
        assert!(store.remove_record(h).is_err());
    }

    #[test]
    fn set_field_extends_record() {
        let (mut store, h) = store_with("Splitter", 2);
        store.set_field(h, 5, FieldValue::Integer(7)).unwrap();
        assert_eq!(store.num_fields(h).unwrap(), 6);
        assert_eq!(store.get_field(h, 4).unwrap(), FieldValue::Empty);
        assert_eq!(store.get_field(h, 5).unwrap(), FieldValue::Integer(7));
        // Reads past the end are empty, not errors
        assert_eq!(store.get_field(h, 99).unwrap(), FieldValue::Empty);
    }

    #[test]
    fn pointer_fields_resolve() {
        let (mut store, a) = store_with("Node", 3);
        let b = Handle::fresh();
        store.create_record(b, "Fan", 3).unwrap();

        store.set_pointer(a, 2, Some(b)).unwrap();
        assert_eq!(store.get_pointer(a, 2).unwrap(), Some(b));
        assert_eq!(store.get_pointer(a, 1).unwrap(), None);

        store.set_field(a, 0, "Node 1".into()).unwrap();
        assert_eq!(
            store.get_pointer(a, 0),
            Err(StoreError::NotAPointer { handle: a, index: 0 })
        );

        store.set_pointer(a, 2, None).unwrap();
        assert_eq!(store.get_pointer(a, 2).unwrap(), None);
    }

    #[test]
    fn first_empty_pointer_skips_occupied_slots() {
        let (mut store, h) = store_with("PortList", 2);
        let other = Handle::fresh();
        assert_eq!(store.first_empty_pointer(h, 2).unwrap(), 2);

        store.set_pointer(h, 2, Some(other)).unwrap();
        store.set_pointer(h, 3, Some(other)).unwrap();
        assert_eq!(store.first_empty_pointer(h, 2).unwrap(), 4);

        store.set_pointer(h, 2, None).unwrap();
        assert_eq!(store.first_empty_pointer(h, 2).unwrap(), 2);
    }

    #[test]
    fn extensible_groups_append_and_enumerate() {
        let (mut store, h) = store_with("Branch", 1);
        let a = Handle::fresh();
        let b = Handle::fresh();

        let first = store
            .push_extensible_group(h, 1, vec![FieldValue::Pointer(a), FieldValue::Integer(1)])
            .unwrap();
        assert_eq!(first, 1);
        let second = store
            .push_extensible_group(h, 1, vec![FieldValue::Pointer(b), FieldValue::Integer(2)])
            .unwrap();
        assert_eq!(second, 3);

        let groups = store.extensible_groups(h, 1, 2).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].as_pointer(), Some(a));
        assert_eq!(groups[1][0].as_pointer(), Some(b));
        assert_eq!(groups[1][1], FieldValue::Integer(2));

        assert_eq!(
            store.push_extensible_group(h, 1, vec![]),
            Err(StoreError::EmptyGroup)
        );
    }

    #[test]
    fn missing_record_is_an_error() {
        let store = MemoryStore::new();
        let h = Handle::fresh();
        assert_eq!(
            store.get_field(h, 0),
            Err(StoreError::MissingRecord { handle: h })
        );
        assert!(store.handles().is_empty());
    }
}
