//! Exhaustive structural probing for registered record types
//!
//! Given a possibly deeply nested record and a validation callback, this crate
//! materializes every absent optional field and every empty collection field, one
//! increment at a time, re-running the callback after each step. Validation and
//! serialization logic is thereby exercised against a deterministic progression of
//! increasingly populated structural configurations instead of only the one the
//! caller happened to construct, and the invocation index pinpoints exactly which
//! structural addition first breaks it.
//!
//! Record types register an ordered field schema through the
//! [`record_schema!`] macro (or a hand-written [`schema::Record`] impl); no runtime
//! reflection is involved. Materialized fields are left at type-default values, the
//! walk only ever turns fields on, and everything it creates stays attached to the
//! tree for inspection after the run.
//!
//! # Example
//!
//! ```
//! use structprobe::{record_schema, run_exhaustive_probe};
//!
//! #[derive(Default)]
//! struct Address {
//!     street: String,
//! }
//!
//! #[derive(Default)]
//! struct Customer {
//!     name:    String,
//!     address: Option<Address>,
//! }
//!
//! record_schema!(Address {
//!     scalar street: String,
//! });
//!
//! record_schema!(Customer {
//!     scalar name: String,
//!     optional address: Address,
//! });
//!
//! let mut root = Customer::default();
//! let report = run_exhaustive_probe(&mut root, |_customer: &Customer| Ok(()), true)?;
//!
//! // One invocation on the bare root, one after `address` was materialized.
//! assert_eq!(report.total, 2);
//! assert_eq!(report.failed, 0);
//! assert!(root.address.is_some());
//! # Ok::<(), error_stack::Report<structprobe::Error>>(())
//! ```
//!
//! # Limitations
//!
//! Schemas must be acyclic and of finite depth; a record type that transitively holds
//! an optional reference to its own type recurses without bound. Fault containment
//! relies on `std::panic::catch_unwind` and therefore requires `panic = "unwind"`.

mod aggregator;
mod classifier;
mod engine;
mod error;
pub mod schema;
#[cfg(test)]
mod test_fixtures;

pub use aggregator::ProbeReport;
pub use classifier::{Classifier, Variant};
pub use engine::{TraversalEngine, ValidateFn};
pub use error::{Error, Result};

#[doc(hidden)]
pub use paste::paste as __paste;

use aggregator::ProbeAggregator;
use error_stack::Report;
use schema::Record;

/// Adapt a typed validate callback to the erased shape the engine consumes
fn erase<'a, R, F>(validate: &'a mut F) -> impl FnMut(&dyn Record) -> Result<()> + 'a
where
    R: Record,
    F: FnMut(&R) -> Result<()>,
{
    move |record: &dyn Record| match record.as_any().downcast_ref::<R>() {
        Some(typed) => validate(typed),
        None => Err(Report::new(Error::schema(
            record.schema().type_name,
            "probed record does not match the root's registered type",
        ))),
    }
}

/// Probe the record tree, failing fast.
///
/// Invokes `validate` against the current state of the root, then materializes each
/// eligible field exactly once in declaration order, recursing into every newly
/// materialized record and re-invoking `validate` at each step. The first error
/// returned by `validate` aborts the remainder of the walk and propagates; a panic in
/// `validate` likewise terminates the run. Everything materialized before the abort
/// stays attached to the tree.
///
/// # Errors
///
/// Returns the first error produced by `validate`, or a schema-registration error if
/// an accessor does not deliver the record its descriptor promises.
pub fn probe<R, F>(root: &mut R, mut validate: F) -> Result<()>
where
    R: Record,
    F: FnMut(&R) -> Result<()>,
{
    let engine = TraversalEngine::default();
    let mut erased = erase(&mut validate);
    engine.probe(root, &mut erased)
}

/// Probe the record tree exhaustively, aggregating failures instead of aborting.
///
/// Wraps `validate` so that every returned error is captured as a validation failure
/// and, when `contain_faults` is set, every panic at the invocation boundary is
/// recovered into a contained fault. The walk always runs to completion of the schema;
/// the returned [`ProbeReport`] holds the invocation total, the failure count, and the
/// captured errors in invocation order. With `contain_faults` unset, a panic in
/// `validate` unwinds past the wrapper and terminates the entire run.
///
/// # Errors
///
/// Returns an error only for schema-registration bugs; validation failures and
/// contained faults are reported through the [`ProbeReport`].
pub fn run_exhaustive_probe<R, F>(
    root: &mut R,
    mut validate: F,
    contain_faults: bool,
) -> Result<ProbeReport>
where
    R: Record,
    F: FnMut(&R) -> Result<()>,
{
    let mut aggregator = ProbeAggregator::new(erase(&mut validate), contain_faults);
    let engine = TraversalEngine::default();
    engine.probe(root, &mut |record: &dyn Record| aggregator.check(record))?;
    Ok(aggregator.into_report())
}
