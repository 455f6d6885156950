//! Sparse field patches.
//!
//! A [`FieldPatch`] maps a known field of an aggregate to a replacement value.
//! Field names are resolved when the patch is decoded, so unknown keys and
//! non-string values never reach the code applying it. Applying a patch only
//! ever overwrites: an empty string means "no change", not "clear the field".

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A free-text field of an aggregate that can be targeted by name.
pub trait PatchField: Copy + Ord + fmt::Debug + 'static {
    type Target;

    /// Every field, in declaration order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn set(&self, target: &mut Self::Target, value: String);

    fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == s)
    }
}

/// Overwrites `target` with `value` when the value is present and non-empty.
/// Returns whether anything was written.
pub fn overwrite_text(target: &mut String, value: Option<String>) -> bool {
    match value {
        Some(v) if !v.is_empty() => {
            *target = v;
            true
        }
        _ => false,
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct FieldPatch<F: PatchField> {
    values: BTreeMap<F, String>,
}

impl<F: PatchField> Default for FieldPatch<F> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<F: PatchField> fmt::Debug for FieldPatch<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}

impl<F: PatchField> FieldPatch<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: F, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: F, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// True when no field carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.values.values().all(String::is_empty)
    }

    /// Applies every non-empty value to `target` and returns the fields written.
    pub fn apply(&self, target: &mut F::Target) -> Vec<F> {
        let mut written = Vec::new();
        for (field, value) in &self.values {
            if value.is_empty() {
                continue;
            }
            field.set(target, value.clone());
            written.push(*field);
        }
        written
    }
}

impl<F: PatchField> Serialize for FieldPatch<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de, F: PatchField> Deserialize<'de> for FieldPatch<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PatchVisitor<F>(PhantomData<F>);

        impl<'de, F: PatchField> Visitor<'de> for PatchVisitor<F> {
            type Value = FieldPatch<F>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to string values")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(FieldPatch::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut patch = FieldPatch::default();
                while let Some((key, value)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    let (Some(field), serde_json::Value::String(text)) =
                        (F::from_str(&key), value)
                    else {
                        tracing::debug!(field = %key, "ignoring unusable patch entry");
                        continue;
                    };
                    patch.values.insert(field, text);
                }
                Ok(patch)
            }
        }

        deserializer.deserialize_any(PatchVisitor(PhantomData))
    }
}
