//! Fault-containing result aggregation
//!
//! Wraps the caller's validate callback so the exhaustive walk never aborts: returned
//! errors are captured as validation failures, and with containment enabled a panic at
//! the invocation boundary is recovered into a contained fault. Either way the wrapper
//! reports success to the engine and the walk continues.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use error_stack::Report;
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::Record;

/// Aggregate outcome of one exhaustive probe run
#[derive(Debug, Default)]
pub struct ProbeReport {
    /// Number of validate invocations performed
    pub total:  usize,
    /// Invocations that produced a captured error
    pub failed: usize,
    /// Captured errors in invocation order: validation failures and contained faults
    pub errors: Vec<Report<Error>>,
}

impl ProbeReport {
    /// Invocations with no associated error; `total == failed + succeeded()` always
    /// holds
    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    /// Captured errors whose kind is a validation failure
    #[must_use]
    pub fn validation_failures(&self) -> usize {
        self.errors
            .iter()
            .filter(|error| matches!(error.current_context(), Error::Validation(_)))
            .count()
    }

    /// Captured errors whose kind is a contained fault
    #[must_use]
    pub fn contained_faults(&self) -> usize {
        self.errors
            .iter()
            .filter(|error| matches!(error.current_context(), Error::ContainedFault(_)))
            .count()
    }
}

/// Wrapper around the caller's validate callback consumed by the traversal engine
pub(crate) struct ProbeAggregator<F> {
    validate:       F,
    contain_faults: bool,
    total:          usize,
    errors:         Vec<Report<Error>>,
}

impl<F> ProbeAggregator<F>
where
    F: FnMut(&dyn Record) -> Result<()>,
{
    pub(crate) const fn new(validate: F, contain_faults: bool) -> Self {
        Self {
            validate,
            contain_faults,
            total: 0,
            errors: Vec::new(),
        }
    }

    /// Invoke the wrapped callback once, absorbing failures and contained faults.
    ///
    /// Always reports success to the engine; with containment disabled a panic in the
    /// callback unwinds past this boundary and terminates the entire run.
    pub(crate) fn check(&mut self, record: &dyn Record) -> Result<()> {
        self.total += 1;

        let outcome = if self.contain_faults {
            match catch_unwind(AssertUnwindSafe(|| (self.validate)(record))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    debug!(invocation = self.total, message, "contained a fault");
                    Err(Report::new(Error::ContainedFault(message)))
                }
            }
        } else {
            (self.validate)(record)
        };

        if let Err(error) = outcome {
            self.errors.push(error);
        }
        Ok(())
    }

    pub(crate) fn into_report(self) -> ProbeReport {
        ProbeReport {
            total:  self.total,
            failed: self.errors.len(),
            errors: self.errors,
        }
    }
}

/// Best-effort extraction of a human-readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "non-string panic payload".to_owned())
        },
        |message| (*message).to_owned(),
    )
}

#[cfg(test)]
#[allow(clippy::panic, reason = "tests raise deliberate validator faults")]
mod tests {
    use super::*;
    use crate::test_fixtures::Inner;

    #[test]
    fn test_validation_failure_absorbed_and_counted() {
        let record = Inner::default();
        let mut aggregator = ProbeAggregator::new(
            |_record: &dyn Record| Err(Report::new(Error::validation("rejected"))),
            false,
        );

        assert!(aggregator.check(&record).is_ok());
        assert!(aggregator.check(&record).is_ok());

        let probe_report = aggregator.into_report();
        assert_eq!(probe_report.total, 2);
        assert_eq!(probe_report.failed, 2);
        assert_eq!(probe_report.errors.len(), 2);
        assert_eq!(probe_report.succeeded(), 0);
        assert_eq!(probe_report.validation_failures(), 2);
        assert_eq!(probe_report.contained_faults(), 0);
    }

    #[test]
    fn test_contained_fault_recovers_str_payload() {
        let record = Inner::default();
        let mut aggregator = ProbeAggregator::new(
            |_record: &dyn Record| panic!("validator exploded"),
            true,
        );

        assert!(aggregator.check(&record).is_ok());

        let probe_report = aggregator.into_report();
        assert_eq!(probe_report.total, 1);
        assert_eq!(probe_report.failed, 1);
        assert_eq!(probe_report.contained_faults(), 1);
        let rendered = format!("{}", probe_report.errors[0]);
        assert!(rendered.contains("validator exploded"));
    }

    #[test]
    fn test_contained_fault_recovers_string_payload() {
        let record = Inner::default();
        let mut aggregator = ProbeAggregator::new(
            |_record: &dyn Record| {
                let detail = 42;
                panic!("failure code {detail}")
            },
            true,
        );

        assert!(aggregator.check(&record).is_ok());

        let probe_report = aggregator.into_report();
        let rendered = format!("{}", probe_report.errors[0]);
        assert!(rendered.contains("failure code 42"));
    }

    #[test]
    fn test_successes_do_not_accumulate_errors() {
        let record = Inner::default();
        let mut aggregator = ProbeAggregator::new(|_record: &dyn Record| Ok(()), true);

        assert!(aggregator.check(&record).is_ok());
        assert!(aggregator.check(&record).is_ok());
        assert!(aggregator.check(&record).is_ok());

        let probe_report = aggregator.into_report();
        assert_eq!(probe_report.total, 3);
        assert_eq!(probe_report.failed, 0);
        assert!(probe_report.errors.is_empty());
        assert_eq!(probe_report.succeeded(), 3);
    }

    #[test]
    #[should_panic(expected = "uncontained")]
    fn test_fault_propagates_without_containment() {
        let record = Inner::default();
        let mut aggregator = ProbeAggregator::new(
            |_record: &dyn Record| panic!("uncontained"),
            false,
        );
        let _ = aggregator.check(&record);
    }
}
