//! Field classification
//!
//! Maps a registered field descriptor to the traversal variant the engine acts on.
//! Classification is deterministic and side-effect free; opacity comes from the
//! registration site (`opaque` fields), an author-supplied deny list, or a capability
//! probe on the target schema - never from name-pattern matching.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::schema::{FieldDescriptor, FieldType, RecordSchema};

/// Traversal variant of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum Variant {
    /// Plain value field; the engine takes no action
    Scalar,
    /// Nilable reference to a record type; materialized and recursed into
    OptionalReference,
    /// Ordered, appendable container; grown by one element and recursed into
    Collection,
    /// Record stored in place; recursed into without allocation
    NestedRecord,
    /// Non-traversable leaf; never materialized or recursed into
    OpaqueLeaf,
}

/// Pure classifier with an author-supplied opaque deny list
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    opaque_types: HashSet<&'static str>,
}

impl Classifier {
    /// Classifier treating the named record types as opaque leaves in addition to the
    /// capability probe
    #[must_use]
    pub fn with_opaque_types(types: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            opaque_types: types.into_iter().collect(),
        }
    }

    /// Map a field descriptor to its traversal variant.
    ///
    /// Priority order: opaque leaf (declared opaque, deny-listed, or exposing no
    /// mutable sub-field), then optional reference, collection, nested record, and
    /// scalar as the fallback. The mutability flag is not consulted here; the engine
    /// skips immutable fields before classifying.
    #[must_use]
    pub fn classify(&self, field: &FieldDescriptor) -> Variant {
        match &field.ty {
            FieldType::Opaque(_) => Variant::OpaqueLeaf,
            FieldType::Optional(schema) | FieldType::Record(schema)
                if self.is_opaque(schema()) =>
            {
                Variant::OpaqueLeaf
            }
            FieldType::Optional(_) => Variant::OptionalReference,
            FieldType::Collection(_) => Variant::Collection,
            FieldType::Record(_) => Variant::NestedRecord,
            FieldType::Scalar(_) => Variant::Scalar,
        }
    }

    /// Whether a record schema is an opaque leaf: deny-listed by name, or exposing no
    /// field the engine may mutate
    pub(crate) fn is_opaque(&self, schema: &RecordSchema) -> bool {
        self.opaque_types.contains(schema.type_name) || !schema.has_mutable_fields()
    }
}
