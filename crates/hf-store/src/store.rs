//! The `FieldStore` trait.

use hf_core::Handle;

use crate::error::{StoreError, StoreResult};
use crate::value::FieldValue;

/// Schema-agnostic record store backing every model object.
///
/// A record is an ordered list of fields addressed by index. The store knows
/// nothing about what a field means beyond "this is a pointer" and "these
/// trailing fields repeat in groups".
///
/// Writing past the end of a record extends it with empty fields, which is
/// how extensible groups (splitter outlets, port lists) grow.
pub trait FieldStore: Send {
    /// Create an empty record of `field_count` fields for `handle`.
    fn create_record(&mut self, handle: Handle, kind: &str, field_count: usize)
    -> StoreResult<()>;

    /// Drop the record for `handle`.
    fn remove_record(&mut self, handle: Handle) -> StoreResult<()>;

    fn contains(&self, handle: Handle) -> bool;

    /// Schema kind the record was created with.
    fn kind(&self, handle: Handle) -> Option<&str>;

    fn num_fields(&self, handle: Handle) -> StoreResult<usize>;

    /// Read a field. Fields past the end of the record read as `Empty`.
    fn get_field(&self, handle: Handle, index: usize) -> StoreResult<FieldValue>;

    fn set_field(&mut self, handle: Handle, index: usize, value: FieldValue) -> StoreResult<()>;

    /// Handles of every record, in ascending order.
    fn handles(&self) -> Vec<Handle>;

    /// Resolve a pointer field to the object it references.
    fn get_pointer(&self, handle: Handle, index: usize) -> StoreResult<Option<Handle>> {
        match self.get_field(handle, index)? {
            FieldValue::Pointer(target) => Ok(Some(target)),
            FieldValue::Empty => Ok(None),
            _ => Err(StoreError::NotAPointer { handle, index }),
        }
    }

    fn set_pointer(
        &mut self,
        handle: Handle,
        index: usize,
        target: Option<Handle>,
    ) -> StoreResult<()> {
        self.set_field(handle, index, target.into())
    }

    /// First field at or after `start` that holds no pointer.
    fn first_empty_pointer(&self, handle: Handle, start: usize) -> StoreResult<usize> {
        let len = self.num_fields(handle)?;
        for index in start..len {
            if self.get_field(handle, index)?.as_pointer().is_none() {
                return Ok(index);
            }
        }
        Ok(len.max(start))
    }

    /// Split the fields from `start` onward into groups of `width`.
    fn extensible_groups(
        &self,
        handle: Handle,
        start: usize,
        width: usize,
    ) -> StoreResult<Vec<Vec<FieldValue>>> {
        if width == 0 {
            return Err(StoreError::EmptyGroup);
        }
        let len = self.num_fields(handle)?;
        let mut groups = Vec::new();
        let mut index = start;
        while index < len {
            let mut group = Vec::with_capacity(width);
            for offset in 0..width {
                group.push(self.get_field(handle, index + offset)?);
            }
            groups.push(group);
            index += width;
        }
        Ok(groups)
    }

    /// Append one group after the last field, returning the index of its first field.
    fn push_extensible_group(
        &mut self,
        handle: Handle,
        start: usize,
        group: Vec<FieldValue>,
    ) -> StoreResult<usize> {
        if group.is_empty() {
            return Err(StoreError::EmptyGroup);
        }
        let width = group.len();
        let len = self.num_fields(handle)?.max(start);
        // Pad to a whole number of groups before appending
        let first = start + (len - start).div_ceil(width) * width;
        for (offset, value) in group.into_iter().enumerate() {
            self.set_field(handle, first + offset, value)?;
        }
        Ok(first)
    }
}
