//! Explore mode: report what every assertion would remove or repair.

use tracing::{info, instrument};

use crate::artifacts::{CHAIN_MANIFEST, EXPLORATION_RESULT, failed_rows, manifest_table, persist};
use crate::core::engine::{compute_violations, resolve_masked};
use crate::core::registry::AssertionChain;
use crate::core::report::FailureReport;
use crate::core::table::Table;
use crate::error::ChainError;
use crate::io::sink::StorageSink;

/// Walk the chain, reporting and persisting each assertion's violations
/// before resolving them, so every assertion sees the table as left by the
/// previous one.
///
/// `on_report` is called as soon as each report is computed, before its rows
/// are persisted. After the walk the chain manifest and the resolved table
/// are written. Returns the resolved table.
#[instrument(skip_all, fields(assertions = chain.len(), rows = table.len()))]
pub fn explore<S, F>(
    chain: &AssertionChain,
    table: Table,
    sink: &mut S,
    mut on_report: F,
) -> Result<Table, ChainError>
where
    S: StorageSink + ?Sized,
    F: FnMut(&FailureReport),
{
    let mut current = table;
    for (position, assertion) in chain.iter().enumerate() {
        let violations = compute_violations(&current, assertion)?;
        let report = FailureReport::new(position, assertion, &violations);
        info!(
            position,
            assertion = assertion.name(),
            count = report.count,
            percent = report.percent(),
            "assertion explored"
        );
        on_report(&report);
        persist(sink, &failed_rows(position), &report.rows)?;
        current = resolve_masked(current, assertion, &violations.valid)?;
    }

    persist(sink, CHAIN_MANIFEST, &manifest_table(chain))?;
    persist(sink, EXPLORATION_RESULT, &current)?;
    info!(rows = current.len(), "exploration complete");
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{Mask, Value};
    use crate::io::sink::MemorySink;
    use crate::test_support::{
        FailingSink, license_chain, license_not_null, license_positive, license_table,
    };

    #[test]
    fn explore_reports_against_the_progressively_cleaned_table() {
        let chain = license_chain();
        let mut sink = MemorySink::new();
        let mut reports = Vec::new();

        let result = explore(
            &chain,
            license_table(&[Some(5), Some(-1), None, Some(7)]),
            &mut sink,
            |report| reports.push((report.count, report.total)),
        )
        .expect("explore");

        // The null row is gone before "license > 0" runs, so it sees 3 rows.
        assert_eq!(reports, vec![(1, 4), (1, 3)]);
        let licenses: Vec<_> = result.column("license").cloned().collect();
        assert_eq!(licenses, vec![Value::Int(5), Value::Int(7)]);
    }

    #[test]
    fn explore_writes_artifacts_in_order() {
        let chain = license_chain();
        let mut sink = MemorySink::new();

        explore(
            &chain,
            license_table(&[Some(5), Some(-1), None, Some(7)]),
            &mut sink,
            |_| {},
        )
        .expect("explore");

        assert_eq!(
            sink.names(),
            vec![
                "assertion0_failed_rows",
                "assertion1_failed_rows",
                CHAIN_MANIFEST,
                EXPLORATION_RESULT,
            ]
        );
        let failed = sink.get("assertion1_failed_rows").expect("failed rows");
        assert_eq!(failed.index(), &[1]);
        assert_eq!(sink.get(CHAIN_MANIFEST).map(Table::len), Some(2));
    }

    #[test]
    fn explore_surfaces_storage_errors_after_reporting_progress() {
        let chain = license_chain();
        let mut sink = FailingSink::new("assertion1_failed_rows");
        let mut seen = Vec::new();

        let err = explore(
            &chain,
            license_table(&[Some(5), Some(-1), None]),
            &mut sink,
            |report| seen.push(report.assertion.clone()),
        )
        .expect_err("storage failure");

        assert_eq!(
            err,
            ChainError::Storage {
                artifact: "assertion1_failed_rows".to_string(),
                reason: "disk full".to_string(),
            }
        );
        assert_eq!(seen, vec!["license not null", "license > 0"]);
        assert_eq!(sink.inner.names(), vec!["assertion0_failed_rows"]);
    }

    #[test]
    fn explore_stops_at_failing_predicate_after_earlier_reports() {
        let mut chain = AssertionChain::new();
        chain
            .drop_rows("license not null", license_not_null())
            .expect("register first")
            .drop_rows("broken", |_: &Table| -> anyhow::Result<Mask> {
                anyhow::bail!("column 'zip' missing")
            })
            .expect("register second")
            .drop_rows("license > 0", license_positive())
            .expect("register third");
        let mut sink = MemorySink::new();
        let mut seen = Vec::new();

        let err = explore(
            &chain,
            license_table(&[Some(5), None]),
            &mut sink,
            |report| seen.push(report.assertion.clone()),
        )
        .expect_err("predicate failure");

        assert_eq!(
            err,
            ChainError::Predicate {
                assertion: "broken".to_string(),
                reason: "column 'zip' missing".to_string(),
            }
        );
        assert_eq!(seen, vec!["license not null"]);
        assert_eq!(sink.names(), vec!["assertion0_failed_rows"]);
    }

    #[test]
    fn explore_on_empty_chain_persists_input_unchanged() {
        let chain = AssertionChain::new();
        let mut sink = MemorySink::new();
        let table = license_table(&[Some(1)]);

        let result = explore(&chain, table.clone(), &mut sink, |_| {}).expect("explore");

        assert_eq!(result, table);
        assert_eq!(sink.names(), vec![CHAIN_MANIFEST, EXPLORATION_RESULT]);
    }
}
