//! Shared record fixtures for module tests
//!
//! All fixtures register through `record_schema!`, so the macro itself is exercised by
//! every test that probes one of them.

use crate::record_schema;

/// Leaf record holding a growable scalar collection
#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) items: Vec<i64>,
}

record_schema!(Inner {
    collection items: [scalar i64],
});

/// Root record with one scalar and one optional reference
#[derive(Debug, Default)]
pub(crate) struct Outer {
    pub(crate) label: String,
    pub(crate) inner: Option<Inner>,
}

record_schema!(Outer {
    scalar label: String,
    optional inner: Inner,
});

/// Record holding another record in place
#[derive(Debug, Default)]
pub(crate) struct Wrapper {
    pub(crate) body: Inner,
}

record_schema!(Wrapper {
    record body: Inner,
});

/// Foreign leaf type; deliberately not registered as a record
#[derive(Debug, Default)]
pub(crate) struct Timestamp {
    pub(crate) seconds: u64,
}

/// Record with an author-declared opaque field
#[derive(Debug, Default)]
pub(crate) struct Stamped {
    pub(crate) created_at: Timestamp,
    pub(crate) id:         u64,
}

record_schema!(Stamped {
    opaque created_at: Timestamp,
    scalar id: u64,
});

/// Record whose optional field is registered as inaccessible
#[derive(Debug, Default)]
pub(crate) struct Locked {
    pub(crate) secret: Option<Inner>,
    pub(crate) id:     u64,
}

record_schema!(Locked {
    readonly optional secret: Inner,
    scalar id: u64,
});

/// Collection element record
#[derive(Debug, Default)]
pub(crate) struct LineItem {
    pub(crate) qty: i64,
}

record_schema!(LineItem {
    scalar qty: i64,
});

/// Record with a growable record collection
#[derive(Debug, Default)]
pub(crate) struct Order {
    pub(crate) lines: Vec<LineItem>,
}

record_schema!(Order {
    collection lines: [record LineItem],
});

/// Record with two materializable siblings at the same nesting level
#[derive(Debug, Default)]
pub(crate) struct TwoOptions {
    pub(crate) left:  Option<Inner>,
    pub(crate) right: Option<Inner>,
}

record_schema!(TwoOptions {
    optional left: Inner,
    optional right: Inner,
});

/// Record with no fields at all; classifies opaque through the capability probe
#[derive(Debug, Default)]
pub(crate) struct Husk {}

record_schema!(Husk {});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, Record};

    #[test]
    fn test_descriptors_follow_declaration_order() {
        let schema = Outer::schema_of();
        assert_eq!(schema.type_name, "Outer");
        let names: Vec<&str> = schema.fields.iter().map(|field| field.name).collect();
        assert_eq!(names, vec!["label", "inner"]);
    }

    #[test]
    fn test_readonly_field_registers_immutable() {
        let schema = Locked::schema_of();
        assert!(!schema.fields[0].mutable);
        assert!(schema.fields[1].mutable);
    }

    #[test]
    fn test_opaque_field_registers_type_label() {
        let schema = Stamped::schema_of();
        assert!(matches!(schema.fields[0].ty, FieldType::Opaque("Timestamp")));
    }

    #[test]
    fn test_empty_record_has_no_mutable_fields() {
        let schema = Husk::schema_of();
        assert!(schema.fields.is_empty());
        assert!(!schema.has_mutable_fields());
    }

    #[test]
    fn test_collection_accessors_append_and_navigate() {
        let mut order = Order::default();
        let schema = Order::schema_of();
        let access = &schema.fields[0].access;

        assert!((access.get)(order.as_any_mut()).is_none());
        assert!((access.materialize)(order.as_any_mut()).is_some());
        assert_eq!(order.lines.len(), 1);
        assert!((access.get)(order.as_any_mut()).is_some());
    }

    #[test]
    fn test_optional_accessor_binds_default_target() {
        let mut outer = Outer::default();
        let schema = Outer::schema_of();
        let access = &schema.fields[1].access;

        assert!((access.get)(outer.as_any_mut()).is_none());
        assert!((access.materialize)(outer.as_any_mut()).is_some());
        assert!(outer.inner.as_ref().is_some_and(|inner| inner.items.is_empty()));
    }
}
