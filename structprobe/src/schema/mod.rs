//! Schema registry model
//!
//! Every record type the engine can traverse registers a static [`RecordSchema`]: its
//! name plus an ordered list of [`FieldDescriptor`]s. Descriptors carry the declared
//! field type consumed by the classifier and a pair of type-erased accessors consumed
//! by the engine. Registration is manual (implement [`Record`] by hand) or via the
//! [`record_schema!`](crate::record_schema) macro.

use std::any::Any;

mod registration;

/// Function returning the registered schema of a record type, usable in const context
pub type SchemaFn = fn() -> &'static RecordSchema;

/// Type-erased field accessor over a parent record
///
/// The parent arrives as `&mut dyn Any` and is downcast to the concrete type the
/// accessor was registered for. The returned record, when present, is the child the
/// engine recurses into.
pub type AccessFn = fn(&mut dyn Any) -> Option<&mut dyn Record>;

/// A live record instance visited by the traversal engine
///
/// Object safe so the engine can walk heterogeneous trees through `&mut dyn Record`.
/// Implementors must be `'static` concrete types; the accessors registered in their
/// schema downcast through [`Record::as_any_mut`].
pub trait Record: Any {
    /// Registered schema of this record's concrete type
    fn schema(&self) -> &'static RecordSchema;

    /// Registered schema, available without an instance
    fn schema_of() -> &'static RecordSchema
    where
        Self: Sized;

    /// Upcast used to downcast shared references to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast consumed by field accessors
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Registered metadata for one record type
#[derive(Debug)]
pub struct RecordSchema {
    /// Type name as registered, used by the opaque deny list and diagnostics
    pub type_name: &'static str,
    /// Field descriptors in declaration order
    pub fields:    &'static [FieldDescriptor],
}

impl RecordSchema {
    /// Capability probe: whether this type exposes any field the engine may mutate
    ///
    /// A schema with no mutable fields classifies as an opaque leaf regardless of any
    /// deny list.
    #[must_use]
    pub fn has_mutable_fields(&self) -> bool {
        self.fields.iter().any(|field| field.mutable)
    }
}

/// Per-field registration metadata consumed by the classifier and the engine
#[derive(Debug)]
pub struct FieldDescriptor {
    /// Field name as declared on the record type
    pub name:    &'static str,
    /// Declared type of the field
    pub ty:      FieldType,
    /// Whether the engine may materialize into this field; immutable fields are
    /// skipped silently
    pub mutable: bool,
    /// Accessors binding this descriptor to concrete field storage
    pub access:  FieldAccess,
}

/// Declared type of a field, as registered by the schema author
#[derive(Debug)]
pub enum FieldType {
    /// Plain value type, identified by its label; never traversed
    Scalar(&'static str),
    /// Nilable reference to a record type (`Option<T>`)
    Optional(SchemaFn),
    /// Ordered, appendable container (`Vec<T>`)
    Collection(ElementType),
    /// Record stored in place within the parent
    Record(SchemaFn),
    /// Author-declared non-traversable leaf type (e.g. a timestamp)
    Opaque(&'static str),
}

/// Element type of a collection field
///
/// One level of element reference is already unwrapped at registration: a container of
/// references to records and a container of in-place records both register as
/// [`ElementType::Record`].
#[derive(Debug)]
pub enum ElementType {
    /// Plain value elements; appended but never recursed into
    Scalar(&'static str),
    /// Record elements; appended and recursed into
    Record(SchemaFn),
}

/// Type-erased accessors binding a descriptor to concrete field storage
///
/// `materialize` performs exactly one increment: bind a fresh default target (optional
/// field), append one default element (collection field), or nothing (nested record,
/// whose storage already exists). It returns the record the engine should recurse
/// into, or `None` when the increment has no record-typed probe target.
///
/// `get` navigates to the field's current probe target without mutating: `as_mut` for
/// optionals, `last_mut` for collections, the field itself for nested records.
#[derive(Debug)]
pub struct FieldAccess {
    /// Materialize one increment and return the new probe target, if record-typed
    pub materialize: AccessFn,
    /// Navigate to the current probe target without mutating
    pub get:         AccessFn,
}

impl FieldAccess {
    /// Accessors for both operations
    #[must_use]
    pub const fn new(materialize: AccessFn, get: AccessFn) -> Self {
        Self { materialize, get }
    }

    /// Accessors for leaf fields the engine never enters
    #[must_use]
    pub const fn leaf() -> Self {
        Self {
            materialize: no_target,
            get:         no_target,
        }
    }

    /// Accessors for collections of scalar elements: appendable, but with no
    /// record-typed target to navigate into
    #[must_use]
    pub const fn append_leaf(materialize: AccessFn) -> Self {
        Self {
            materialize,
            get: no_target,
        }
    }
}

fn no_target(_: &mut dyn Any) -> Option<&mut dyn Record> {
    None
}
