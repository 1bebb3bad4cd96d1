//! Depth-first materialize-and-test traversal
//!
//! The engine walks a record tree in declaration order, invoking the validate callback
//! at every node entry and after every materialization. Navigation is path based: the
//! current node is re-reached from the root through non-mutating accessors before each
//! step, so the callback always observes the root with no outstanding engine borrows.
//!
//! Termination is guaranteed only for acyclic, finite-depth schemas; a record type
//! that transitively holds an optional reference to its own type recurses without
//! bound.

use error_stack::Report;
use tracing::{debug, trace};

use crate::classifier::{Classifier, Variant};
use crate::error::{Error, Result};
use crate::schema::{ElementType, FieldType, Record};

/// Callback shape consumed by the engine: invoked with the root record after each
/// structural step
pub type ValidateFn<'a> = dyn FnMut(&dyn Record) -> Result<()> + 'a;

/// Recursive depth-first walk that materializes fields and validates at each node
#[derive(Debug, Default)]
pub struct TraversalEngine {
    classifier: Classifier,
}

impl TraversalEngine {
    /// Engine using the given classifier (for deny-listed opaque types)
    #[must_use]
    pub const fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Probe the record tree, failing fast.
    ///
    /// Invokes `validate` against the current state of the tree, then materializes
    /// each eligible field exactly once in declaration order, recursing into every
    /// newly materialized record. The first error returned by `validate` aborts the
    /// remainder of the walk and propagates. Every instance created along the way
    /// stays attached to the tree.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `validate`, or a schema-registration error
    /// if an accessor does not deliver the record its descriptor promises.
    pub fn probe(&self, root: &mut dyn Record, validate: &mut ValidateFn<'_>) -> Result<()> {
        let mut path = Vec::new();
        self.probe_node(root, &mut path, validate)
    }

    /// Visit the node addressed by `path`: validate, then materialize each field
    fn probe_node(
        &self,
        root: &mut dyn Record,
        path: &mut Vec<usize>,
        validate: &mut ValidateFn<'_>,
    ) -> Result<()> {
        validate(&*root)?;

        let schema = Self::node_at(root, path)?.schema();
        for (index, field) in schema.fields.iter().enumerate() {
            if !field.mutable {
                trace!(
                    record = schema.type_name,
                    field = field.name,
                    "field is not mutable, skipping"
                );
                continue;
            }

            let variant = self.classifier.classify(field);
            trace!(
                record = schema.type_name,
                field = field.name,
                variant = %variant,
                "classified field"
            );

            match variant {
                Variant::Scalar | Variant::OpaqueLeaf => {}
                Variant::NestedRecord => {
                    // Storage already exists; recurse in place.
                    path.push(index);
                    self.probe_node(root, path, validate)?;
                    path.pop();
                }
                Variant::OptionalReference => {
                    let node = Self::node_at(root, path)?;
                    if (field.access.materialize)(node.as_any_mut()).is_none() {
                        return Err(Report::new(Error::schema(
                            schema.type_name,
                            format!(
                                "optional field `{}` yielded no target after materialization",
                                field.name
                            ),
                        )));
                    }
                    debug!(
                        record = schema.type_name,
                        field = field.name,
                        "materialized optional reference"
                    );
                    path.push(index);
                    self.probe_node(root, path, validate)?;
                    path.pop();
                }
                Variant::Collection => {
                    self.probe_collection(root, path, index, validate)?;
                }
            }
        }
        Ok(())
    }

    /// Append one default element to the collection at `path`/`field_index` and probe
    /// it: record elements are recursed into, scalar elements get a single validate
    /// invocation, and opaque element types are skipped outright
    fn probe_collection(
        &self,
        root: &mut dyn Record,
        path: &mut Vec<usize>,
        field_index: usize,
        validate: &mut ValidateFn<'_>,
    ) -> Result<()> {
        let schema = Self::node_at(root, path)?.schema();
        let field = &schema.fields[field_index];
        let FieldType::Collection(element) = &field.ty else {
            return Err(Report::new(Error::schema(
                schema.type_name,
                format!(
                    "field `{}` classified as a collection but registered as something else",
                    field.name
                ),
            )));
        };

        match element {
            ElementType::Scalar(_) => {
                let node = Self::node_at(root, path)?;
                let _ = (field.access.materialize)(node.as_any_mut());
                debug!(
                    record = schema.type_name,
                    field = field.name,
                    "appended one default scalar element"
                );
                validate(&*root)
            }
            ElementType::Record(element_schema) => {
                if self.classifier.is_opaque(element_schema()) {
                    trace!(
                        record = schema.type_name,
                        field = field.name,
                        "collection element type is opaque, skipping"
                    );
                    return Ok(());
                }
                let node = Self::node_at(root, path)?;
                if (field.access.materialize)(node.as_any_mut()).is_none() {
                    return Err(Report::new(Error::schema(
                        schema.type_name,
                        format!(
                            "collection field `{}` yielded no element after materialization",
                            field.name
                        ),
                    )));
                }
                debug!(
                    record = schema.type_name,
                    field = field.name,
                    "appended one default record element"
                );
                path.push(field_index);
                let outcome = self.probe_node(root, path, validate);
                path.pop();
                outcome
            }
        }
    }

    /// Re-navigate from the root to the node addressed by `path` through the
    /// non-mutating accessors
    fn node_at<'a>(root: &'a mut dyn Record, path: &[usize]) -> Result<&'a mut dyn Record> {
        let mut current = root;
        for &index in path {
            let schema = current.schema();
            let Some(field) = schema.fields.get(index) else {
                return Err(Report::new(Error::schema(
                    schema.type_name,
                    format!("field index {index} out of bounds during navigation"),
                )));
            };
            let node = current;
            let Some(next) = (field.access.get)(node.as_any_mut()) else {
                return Err(Report::new(Error::schema(
                    schema.type_name,
                    format!("field `{}` has no probe target to navigate into", field.name),
                )));
            };
            current = next;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{Inner, Locked, Order, Outer, Stamped, Wrapper};

    fn snapshot_engine() -> TraversalEngine {
        TraversalEngine::default()
    }

    #[test]
    fn test_probe_visits_in_materialization_order() {
        let engine = snapshot_engine();
        let mut root = Outer::default();
        let mut snapshots: Vec<(bool, Option<usize>)> = Vec::new();

        let mut validate = |record: &dyn Record| {
            let outer = record
                .as_any()
                .downcast_ref::<Outer>()
                .ok_or_else(|| Report::new(Error::validation("unexpected root type")))?;
            snapshots.push((
                outer.inner.is_some(),
                outer.inner.as_ref().map(|inner| inner.items.len()),
            ));
            Ok(())
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());
        assert_eq!(
            snapshots,
            vec![(false, None), (true, Some(0)), (true, Some(1))]
        );
        assert_eq!(root.inner.as_ref().map(|inner| inner.items.len()), Some(1));
    }

    #[test]
    fn test_probe_fails_fast_with_zero_materializations() {
        let engine = snapshot_engine();
        let mut root = Outer::default();
        let mut invocations = 0_usize;

        let mut validate = |_record: &dyn Record| {
            invocations += 1;
            Err(Report::new(Error::validation("always rejects")))
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_err());
        assert_eq!(invocations, 1);
        assert!(root.inner.is_none());
    }

    #[test]
    fn test_probe_aborts_mid_walk_on_failure() {
        let engine = snapshot_engine();
        let mut root = Outer::default();
        let mut invocations = 0_usize;

        // Reject the second configuration: inner materialized, items still empty.
        let mut validate = |_record: &dyn Record| {
            invocations += 1;
            if invocations == 2 {
                return Err(Report::new(Error::validation("second configuration rejected")));
            }
            Ok(())
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_err());
        assert_eq!(invocations, 2);
        let items = root.inner.as_ref().map(|inner| inner.items.len());
        assert_eq!(items, Some(0));
    }

    #[test]
    fn test_nested_record_recursed_in_place() {
        let engine = snapshot_engine();
        let mut root = Wrapper::default();
        let mut invocations = 0_usize;

        let mut validate = |_record: &dyn Record| {
            invocations += 1;
            Ok(())
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());
        // Root entry, nested entry, one appended element.
        assert_eq!(invocations, 3);
        assert_eq!(root.body.items.len(), 1);
    }

    #[test]
    fn test_opaque_field_never_entered() {
        let engine = snapshot_engine();
        let mut root = Stamped::default();
        let mut invocations = 0_usize;

        let mut validate = |_record: &dyn Record| {
            invocations += 1;
            Ok(())
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());
        assert_eq!(invocations, 1);
        assert_eq!(root.created_at.seconds, 0);
        assert_eq!(root.id, 0);
    }

    #[test]
    fn test_immutable_field_skipped_silently() {
        let engine = snapshot_engine();
        let mut root = Locked::default();
        let mut invocations = 0_usize;

        let mut validate = |_record: &dyn Record| {
            invocations += 1;
            Ok(())
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());
        assert_eq!(invocations, 1);
        assert!(root.secret.is_none());
        assert_eq!(root.id, 0);
    }

    #[test]
    fn test_collections_only_grow() {
        let engine = snapshot_engine();
        let mut root = Order::default();
        root.lines.push(crate::test_fixtures::LineItem { qty: 5 });

        let mut validate = |_record: &dyn Record| Ok(());
        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());

        // Prior element preserved in position, one default element appended.
        assert_eq!(root.lines.len(), 2);
        assert_eq!(root.lines[0].qty, 5);
        assert_eq!(root.lines[1].qty, 0);
    }

    #[test]
    fn test_optional_rebinds_fresh_target() {
        let engine = snapshot_engine();
        let mut root = Outer {
            label: String::new(),
            inner: Some(Inner { items: vec![7] }),
        };

        let mut validate = |_record: &dyn Record| Ok(());
        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());

        // Materialization always binds a new zero-valued target; the appended element
        // then grows the fresh collection.
        assert_eq!(
            root.inner.as_ref().map(|inner| inner.items.as_slice()),
            Some([0_i64].as_slice())
        );
    }

    #[test]
    fn test_deny_listed_type_not_materialized() {
        let engine = TraversalEngine::new(Classifier::with_opaque_types(["Inner"]));
        let mut root = Outer::default();
        let mut invocations = 0_usize;

        let mut validate = |_record: &dyn Record| {
            invocations += 1;
            Ok(())
        };

        let outcome = engine.probe(&mut root, &mut validate);
        assert!(outcome.is_ok());
        assert_eq!(invocations, 1);
        assert!(root.inner.is_none());
    }
}
