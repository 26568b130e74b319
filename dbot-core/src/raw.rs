//! Validated access to fields of raw platform objects.
//!
//! Platform payloads are partial unions: a message update has no callback query, a
//! query may have no attached message. [`RawObject::get_validated_field`] turns such an
//! absent field into a [`FieldAccessError`] naming the object and the field, instead of
//! letting a silent `None` travel further into handler code.

use crate::error::FieldAccessError;

/// A wrapper over one raw platform object (update, message, chat, user, query).
pub trait RawObject {
    /// Short description used in error messages, e.g. `Message(id=5, chat=42)`.
    fn describe(&self) -> String;

    /// Returns `value` unchanged if present, otherwise a [`FieldAccessError`] for `name`.
    fn get_validated_field<V>(
        &self,
        name: &'static str,
        value: Option<V>,
    ) -> Result<V, FieldAccessError> {
        value.ok_or_else(|| FieldAccessError {
            object: self.describe(),
            field: name,
        })
    }
}
