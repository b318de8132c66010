//! Evaluation engine shared by every execution mode.
//!
//! Neither operation mutates its input: `compute_violations` borrows the
//! table and `resolve` consumes it and hands back a new one.

use crate::core::assertion::{Assertion, Resolver};
use crate::core::table::{Mask, Row, Table};
use crate::error::ChainError;

/// Outcome of evaluating one assertion against a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Violations {
    /// One entry per input row; `false` marks a violation.
    pub valid: Mask,
    /// The violating rows, in input order with their source index.
    pub rows: Table,
}

impl Violations {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Evaluate `assertion` and collect the rows that violate it.
pub fn compute_violations(table: &Table, assertion: &Assertion) -> Result<Violations, ChainError> {
    let valid = evaluate_mask(table, assertion)?;
    let rows = table.filter(&valid, false);
    Ok(Violations { valid, rows })
}

/// Produce the table left after applying `assertion`'s resolution policy.
///
/// `Drop` keeps the valid rows in order. `Apply` keeps valid rows as they are
/// and replaces invalid rows, position for position, with the resolver output.
/// The resolver must return the columns it was given.
pub fn resolve(table: Table, assertion: &Assertion) -> Result<Table, ChainError> {
    let valid = evaluate_mask(&table, assertion)?;
    resolve_masked(table, assertion, &valid)
}

/// Run the predicate and check the mask covers every row.
pub(crate) fn evaluate_mask(table: &Table, assertion: &Assertion) -> Result<Mask, ChainError> {
    let mask = assertion
        .predicate()
        .evaluate(table)
        .map_err(|err| ChainError::predicate(assertion.name(), format!("{err:#}")))?;
    if mask.len() != table.len() {
        return Err(ChainError::predicate(
            assertion.name(),
            format!(
                "mask has {} entries for {} rows",
                mask.len(),
                table.len()
            ),
        ));
    }
    Ok(mask)
}

/// Resolve using a mask already computed for `table`.
pub(crate) fn resolve_masked(
    table: Table,
    assertion: &Assertion,
    valid: &[bool],
) -> Result<Table, ChainError> {
    match assertion.resolver() {
        None => Ok(drop_invalid(table, valid)),
        Some(resolver) => repair_invalid(table, assertion.name(), resolver, valid),
    }
}

fn drop_invalid(table: Table, valid: &[bool]) -> Table {
    let (columns, index, rows) = table.into_parts();
    let mut kept_index = Vec::with_capacity(rows.len());
    let mut kept_rows = Vec::with_capacity(rows.len());
    for ((position, row), keep) in index.into_iter().zip(rows).zip(valid) {
        if *keep {
            kept_index.push(position);
            kept_rows.push(row);
        }
    }
    Table::from_parts(columns, kept_index, kept_rows)
}

fn repair_invalid(
    table: Table,
    name: &str,
    resolver: &dyn Resolver,
    valid: &[bool],
) -> Result<Table, ChainError> {
    let invalid_positions: Vec<usize> = valid
        .iter()
        .enumerate()
        .filter_map(|(position, keep)| (!keep).then_some(position))
        .collect();
    if invalid_positions.is_empty() {
        return Ok(table);
    }

    let (columns, index, mut rows) = table.into_parts();
    let invalid_rows: Vec<Row> = invalid_positions
        .iter()
        .map(|&position| std::mem::take(&mut rows[position]))
        .collect();
    let invalid_index = invalid_positions.iter().map(|&position| index[position]).collect();
    let invalid = Table::from_parts(columns.clone(), invalid_index, invalid_rows);

    let repaired = resolver
        .resolve(invalid)
        .map_err(|err| ChainError::resolution(name, format!("{err:#}")))?;
    if repaired.len() != invalid_positions.len() {
        return Err(ChainError::resolution(
            name,
            format!(
                "resolver returned {} rows for {} invalid rows",
                repaired.len(),
                invalid_positions.len()
            ),
        ));
    }

    if repaired.columns() != columns.as_slice() {
        return Err(ChainError::resolution(
            name,
            format!(
                "resolver changed columns from [{}] to [{}]",
                columns.join(", "),
                repaired.columns().join(", ")
            ),
        ));
    }

    let (_, _, repaired_rows) = repaired.into_parts();
    for (position, row) in invalid_positions.into_iter().zip(repaired_rows) {
        rows[position] = row;
    }
    Ok(Table::from_parts(columns, index, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assertion::{Operation, Predicate, each_row, rows};
    use crate::core::registry::AssertionChain;
    use crate::core::table::{Value, field};
    use crate::test_support::license_table;

    fn positive() -> impl Predicate {
        rows(|row| field(row, "license").as_i64().is_some_and(|v| v > 0))
    }

    fn single(chain: &AssertionChain) -> &Assertion {
        chain.iter().next().expect("one assertion")
    }

    #[test]
    fn violations_are_the_false_mask_entries() {
        let mut chain = AssertionChain::new();
        chain.drop_rows("license > 0", positive()).expect("register");
        let table = license_table(&[Some(5), Some(-1), None, Some(7)]);

        let violations = compute_violations(&table, single(&chain)).expect("violations");
        assert_eq!(violations.valid, vec![true, false, false, true]);
        assert_eq!(violations.count(), 2);
        assert_eq!(violations.rows.index(), &[1, 2]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn drop_keeps_valid_rows_as_subsequence() {
        let mut chain = AssertionChain::new();
        chain.drop_rows("license > 0", positive()).expect("register");
        let table = license_table(&[Some(5), Some(-1), Some(9), None, Some(7)]);

        let resolved = resolve(table.clone(), single(&chain)).expect("resolve");
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.index(), &[0, 2, 4]);
        let expected: Vec<_> = [0, 2, 4].iter().map(|&i| table.rows()[i].clone()).collect();
        assert_eq!(resolved.rows(), expected.as_slice());
    }

    #[test]
    fn apply_preserves_size_and_only_touches_invalid_rows() {
        let mut chain = AssertionChain::new();
        chain
            .apply_with(
                "license > 0",
                positive(),
                each_row(|mut row| {
                    let fixed = field(&row, "license").as_i64().map_or(1, i64::abs);
                    row.insert("license".to_string(), Value::Int(fixed));
                    row
                }),
            )
            .expect("register");
        let table = license_table(&[Some(5), Some(-3), None, Some(7)]);

        let resolved = resolve(table.clone(), single(&chain)).expect("resolve");
        assert_eq!(resolved.len(), table.len());
        assert_eq!(resolved.index(), table.index());
        let licenses: Vec<_> = resolved.column("license").cloned().collect();
        assert_eq!(
            licenses,
            vec![Value::Int(5), Value::Int(3), Value::Int(1), Value::Int(7)]
        );
    }

    #[test]
    fn mask_length_mismatch_is_predicate_error() {
        let mut chain = AssertionChain::new();
        chain
            .drop_rows("short mask", |_: &Table| -> anyhow::Result<Mask> {
                Ok(vec![true])
            })
            .expect("register");
        let table = license_table(&[Some(1), Some(2)]);

        let err = compute_violations(&table, single(&chain)).expect_err("mismatch");
        assert_eq!(
            err,
            ChainError::Predicate {
                assertion: "short mask".to_string(),
                reason: "mask has 1 entries for 2 rows".to_string(),
            }
        );
    }

    #[test]
    fn predicate_failure_is_propagated() {
        let mut chain = AssertionChain::new();
        chain
            .drop_rows("explodes", |_: &Table| -> anyhow::Result<Mask> {
                anyhow::bail!("column 'license' missing")
            })
            .expect("register");

        let err = resolve(license_table(&[Some(1)]), single(&chain)).expect_err("fails");
        assert!(matches!(err, ChainError::Predicate { .. }));
        assert!(err.to_string().contains("column 'license' missing"));
    }

    #[test]
    fn resolver_dropping_rows_is_resolution_error() {
        let mut chain = AssertionChain::new();
        chain
            .register(
                "bad resolver",
                positive(),
                Operation::Apply,
                Some(Box::new(|invalid: Table| -> anyhow::Result<Table> {
                    Ok(invalid.filter(&vec![false; invalid.len()], true))
                })),
            )
            .expect("register");

        let err = resolve(license_table(&[Some(-1), Some(2)]), single(&chain)).expect_err("fails");
        assert!(matches!(err, ChainError::Resolution { .. }));
        assert!(err.to_string().contains("resolver returned 0 rows for 1 invalid rows"));
    }

    #[test]
    fn resolver_changing_columns_is_resolution_error() {
        let mut chain = AssertionChain::new();
        chain
            .apply_with(
                "adds column",
                positive(),
                |invalid: Table| -> anyhow::Result<Table> {
                    let rows = invalid
                        .rows()
                        .iter()
                        .cloned()
                        .map(|mut row| {
                            row.insert("note".to_string(), Value::from("fixed"));
                            row
                        })
                        .collect();
                    Ok(Table::new(vec!["license".to_string(), "note".to_string()], rows))
                },
            )
            .expect("register");

        let err = resolve(license_table(&[Some(-1), Some(2)]), single(&chain)).expect_err("fails");
        assert_eq!(
            err,
            ChainError::Resolution {
                assertion: "adds column".to_string(),
                reason: "resolver changed columns from [license] to [license, note]".to_string(),
            }
        );
    }

    #[test]
    fn apply_with_all_rows_valid_skips_resolver() {
        let mut chain = AssertionChain::new();
        chain
            .apply_with("never called", positive(), |_: Table| -> anyhow::Result<Table> {
                anyhow::bail!("resolver should not run")
            })
            .expect("register");
        let table = license_table(&[Some(1), Some(2)]);

        let resolved = resolve(table.clone(), single(&chain)).expect("resolve");
        assert_eq!(resolved, table);
    }
}
