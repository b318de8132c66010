//! End-to-end behavior of the three execution modes over one chain.
//!
//! These tests build chains the way callers do (public API only) and check
//! the cross-mode properties: ordering, drop/apply shape, read-only
//! validation, explore/apply equivalence and fail-fast validation.

use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use chain::artifacts::{CHAIN_MANIFEST, CLEANED_DATA, EXPLORATION_RESULT, failed_rows};
use chain::io::dir_sink::{ArtifactFormat, DirSink};
use chain::test_support::{
    counted, license_chain, license_not_null, license_positive, license_table, scratch_dir,
};
use chain::{
    AssertionChain, ChainError, MemorySink, Row, StorageSink, Table, Value, apply, each_row,
    explore, field, validate,
};

fn licenses(table: &Table) -> Vec<Value> {
    table.column("license").cloned().collect()
}

/// Replace a null or non-positive license with its absolute value (or 1).
fn repair_license(mut row: Row) -> Row {
    let fixed = field(&row, "license").as_i64().map_or(1, |v| v.abs().max(1));
    row.insert("license".to_string(), Value::Int(fixed));
    row
}

fn drop_then_repair() -> AssertionChain {
    let mut chain = AssertionChain::new();
    chain
        .drop_rows("license not null", license_not_null())
        .expect("register A")
        .apply_with("license > 0", license_positive(), each_row(repair_license))
        .expect("register B");
    chain
}

fn repair_then_drop() -> AssertionChain {
    let mut chain = AssertionChain::new();
    chain
        .apply_with("license > 0", license_positive(), each_row(repair_license))
        .expect("register B")
        .drop_rows("license not null", license_not_null())
        .expect("register A");
    chain
}

/// Concrete scenario: `[5, -1, null, 7]` against
/// `[license not null (drop), license > 0 (drop)]`.
///
/// Apply keeps only the rows with 5 and 7 (here 5 is also positive), and
/// validate of the raw table stops at "license not null" with 1 violation.
#[test]
fn license_scenario_apply_and_validate() {
    let chain = license_chain();
    let raw = license_table(&[Some(5), Some(-1), None, Some(7)]);
    let mut sink = MemorySink::new();

    let cleaned = apply(&chain, raw.clone(), &mut sink).expect("apply");
    assert_eq!(licenses(&cleaned), vec![Value::Int(5), Value::Int(7)]);

    let single = license_table(&[Some(-1), None, Some(7)]);
    let cleaned_single = apply(&chain, single, &mut sink).expect("apply");
    assert_eq!(licenses(&cleaned_single), vec![Value::Int(7)]);

    let err = validate(&chain, &raw).expect_err("raw table is dirty");
    assert_eq!(
        err,
        ChainError::AssertionViolation {
            assertion: "license not null".to_string(),
            count: 1,
            total: 4,
        }
    );
}

#[test]
fn chain_order_changes_the_result() {
    let raw = license_table(&[Some(5), Some(-1), None, Some(7)]);
    let mut sink = MemorySink::new();

    let ab = apply(&drop_then_repair(), raw.clone(), &mut sink).expect("apply [A, B]");
    let ba = apply(&repair_then_drop(), raw, &mut sink).expect("apply [B, A]");

    assert_eq!(licenses(&ab), vec![Value::Int(5), Value::Int(1), Value::Int(7)]);
    assert_eq!(
        licenses(&ba),
        vec![Value::Int(5), Value::Int(1), Value::Int(1), Value::Int(7)]
    );
    assert_ne!(ab, ba);
}

#[test]
fn explore_and_apply_return_the_same_table() {
    let raw = license_table(&[Some(5), Some(-1), None, Some(7), Some(0)]);
    for chain in [drop_then_repair(), repair_then_drop(), license_chain()] {
        let explored = explore(&chain, raw.clone(), &mut MemorySink::new(), |_| {})
            .expect("explore");
        let applied = apply(&chain, raw.clone(), &mut MemorySink::new()).expect("apply");
        assert_eq!(explored, applied);
    }
}

#[test]
fn validate_never_mutates_its_input() {
    let chain = drop_then_repair();
    let raw = license_table(&[Some(5), Some(-1), None]);
    let before = raw.clone();

    let _ = validate(&chain, &raw);

    assert_eq!(raw, before);
}

#[test]
fn validate_stops_at_first_failing_assertion() {
    let first_calls = Rc::new(Cell::new(0));
    let second_calls = Rc::new(Cell::new(0));
    let mut chain = AssertionChain::new();
    chain
        .drop_rows(
            "license not null",
            counted(first_calls.clone(), license_not_null()),
        )
        .expect("register A")
        .drop_rows("license > 0", counted(second_calls.clone(), license_positive()))
        .expect("register B");

    let err = validate(&chain, &license_table(&[None, Some(-1)])).expect_err("dirty");

    assert!(matches!(err, ChainError::AssertionViolation { ref assertion, .. } if assertion == "license not null"));
    assert_eq!(first_calls.get(), 1);
    assert_eq!(second_calls.get(), 0);
}

#[test]
fn validate_accepts_apply_output() {
    let chain = drop_then_repair();
    let cleaned = apply(
        &chain,
        license_table(&[Some(5), Some(-1), None, Some(7)]),
        &mut MemorySink::new(),
    )
    .expect("apply");

    validate(&chain, &cleaned).expect("apply output satisfies the chain");
}

#[test]
fn explore_into_directory_writes_every_artifact() {
    let temp = scratch_dir().expect("tempdir");
    let out = temp.path().join("explore");
    let mut sink = DirSink::new(&out, ArtifactFormat::Csv);
    sink.reset().expect("reset");

    let chain = license_chain();
    explore(
        &chain,
        license_table(&[Some(5), Some(-1), None, Some(7)]),
        &mut sink,
        |_| {},
    )
    .expect("explore");

    for artifact in [
        failed_rows(0),
        failed_rows(1),
        CHAIN_MANIFEST.to_string(),
        EXPLORATION_RESULT.to_string(),
    ] {
        assert!(sink.path_for(&artifact).is_file(), "missing {artifact}");
    }
    assert!(!sink.path_for(CLEANED_DATA).exists());

    let manifest = fs::read_to_string(sink.path_for(CHAIN_MANIFEST)).expect("read manifest");
    assert_eq!(
        manifest,
        "index,position,assertion,operation\n0,0,license not null,drop\n1,1,license > 0,drop\n"
    );
    let failed = fs::read_to_string(sink.path_for(&failed_rows(0))).expect("read failed rows");
    assert_eq!(failed, "index,license\n2,\n");
}
