//! Food Inspections assertion chain.
//!
//! Rule order matters: the license checks drop unusable rows first, and the
//! uppercase check on `DBA Name` assumes stray whitespace is already gone.

use anyhow::{Result, bail};
use chain::{
    AssertionChain, Operation, Predicate, Resolver, Row, Value, each_row, field, rows,
};
use regex::Regex;

use crate::config::InspectionsConfig;

pub const LICENSE: &str = "License #";
pub const DBA_NAME: &str = "DBA Name";
pub const CITY: &str = "City";
pub const ZIP: &str = "Zip";
pub const INSPECTION_DATE: &str = "Inspection Date";

/// One rule before registration.
pub struct Rule {
    pub name: &'static str,
    pub operation: Operation,
    pub predicate: Box<dyn Predicate>,
    /// Present for rules that can repair rows.
    pub resolver: Option<Box<dyn Resolver>>,
}

impl Rule {
    fn drop(name: &'static str, predicate: impl Predicate + 'static) -> Self {
        Self {
            name,
            operation: Operation::Drop,
            predicate: Box::new(predicate),
            resolver: None,
        }
    }

    fn apply(
        name: &'static str,
        predicate: impl Predicate + 'static,
        resolver: impl Resolver + 'static,
    ) -> Self {
        Self {
            name,
            operation: Operation::Apply,
            predicate: Box::new(predicate),
            resolver: Some(Box::new(resolver)),
        }
    }
}

/// The full rule set in chain order.
pub fn rules() -> Result<Vec<Rule>> {
    let zip = Regex::new(r"^\d{5}$")?;
    let date = Regex::new(r"^\d{2}/\d{2}/\d{4}$")?;

    Ok(vec![
        Rule::drop(
            "license not null",
            rows(|row| !field(row, LICENSE).is_null()),
        ),
        Rule::drop(
            "license > 0",
            rows(|row| field(row, LICENSE).as_f64().is_some_and(|v| v > 0.0)),
        ),
        Rule::apply(
            "dba name has no stray whitespace",
            rows(|row| text_holds(row, DBA_NAME, |s| collapse_whitespace(s) == s)),
            rewrite_text(DBA_NAME, collapse_whitespace),
        ),
        Rule::apply(
            "dba name is uppercase",
            rows(|row| text_holds(row, DBA_NAME, |s| s.to_uppercase() == s)),
            rewrite_text(DBA_NAME, |s| s.to_uppercase()),
        ),
        Rule::apply(
            "city is uppercase",
            rows(|row| text_holds(row, CITY, |s| s.trim().to_uppercase() == s)),
            rewrite_text(CITY, |s| s.trim().to_uppercase()),
        ),
        Rule::drop(
            "zip is five digits",
            rows(move |row| zip.is_match(&field(row, ZIP).to_string())),
        ),
        Rule::drop(
            "inspection date is mm/dd/yyyy",
            rows(move |row| {
                field(row, INSPECTION_DATE)
                    .as_str()
                    .is_some_and(|s| date.is_match(s))
            }),
        ),
    ])
}

/// Build the chain, honoring disabled rules and operation overrides.
///
/// Names in the config that match no rule are rejected.
pub fn build_chain(config: &InspectionsConfig) -> Result<AssertionChain> {
    let rules = rules()?;
    for name in config.disabled.iter().chain(config.operations.keys()) {
        if !rules.iter().any(|rule| rule.name == name) {
            bail!("unknown assertion '{name}' in config");
        }
    }

    let mut chain = AssertionChain::new();
    for rule in rules {
        if config.disabled.iter().any(|name| name == rule.name) {
            continue;
        }
        let operation = match config.operations.get(rule.name) {
            Some(text) => Operation::parse(rule.name, text)?,
            None => rule.operation,
        };
        chain.register_boxed(rule.name, rule.predicate, operation, rule.resolver)?;
    }
    Ok(chain)
}

/// True when the cell is not text or its text satisfies `test`.
fn text_holds(row: &Row, column: &str, test: impl Fn(&str) -> bool) -> bool {
    field(row, column).as_str().is_none_or(test)
}

fn rewrite_text(column: &'static str, rewrite: fn(&str) -> String) -> impl Resolver {
    each_row(move |mut row: Row| {
        if let Some(Value::Text(text)) = row.get_mut(column) {
            *text = rewrite(text);
        }
        row
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
