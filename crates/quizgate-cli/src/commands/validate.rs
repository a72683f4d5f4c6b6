//! The `quizgate validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgate_core::schema::Schema;
use quizgate_core::{validate, ValidationError, Violations};

pub fn execute(schema_name: String, input: PathBuf) -> Result<()> {
    if Schema::by_name(&schema_name).is_none() {
        let known: Vec<&str> = Schema::all().iter().map(|s| s.name).collect();
        anyhow::bail!(
            "unknown schema: {schema_name} (available: {})",
            known.join(", ")
        );
    }

    let records = super::read_records(&input)?;
    let label = |i: usize| {
        if records.len() == 1 {
            String::new()
        } else {
            format!("[{i}] ")
        }
    };

    let mut invalid = 0;
    for (i, record) in records.iter().enumerate() {
        match validate(&schema_name, record) {
            Ok(_) => println!("{}OK", label(i)),
            Err(ValidationError::Invalid(violations)) => {
                invalid += 1;
                println!("{}{} violation(s)", label(i), violations.len());
                println!("{}", violation_table(&violations));
            }
            Err(e) => return Err(e.into()),
        }
    }

    if invalid > 0 {
        anyhow::bail!(
            "{invalid} of {} record(s) failed {schema_name} validation",
            records.len()
        );
    }

    Ok(())
}

fn violation_table(violations: &Violations) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Rule", "Expected", "Actual"]);

    for v in violations {
        let field = if v.field.is_empty() { "(input)" } else { &v.field };
        table.add_row(vec![
            Cell::new(field),
            Cell::new(v.rule),
            Cell::new(&v.expected),
            Cell::new(&v.actual),
        ]);
    }

    table
}
