//! The `quizgate schemas` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgate_core::schema::{FieldKind, Presence, Schema};

pub fn execute(name: Option<String>) -> Result<()> {
    let Some(name) = name else {
        for schema in Schema::all() {
            println!("{} ({} fields)", schema.name, schema.fields.len());
        }
        return Ok(());
    };

    let schema = Schema::by_name(&name).ok_or_else(|| anyhow::anyhow!("unknown schema: {name}"))?;
    print_schema(schema);
    Ok(())
}

fn print_schema(schema: &Schema) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Presence", "Constraint"]);

    let mut nested = Vec::new();
    for field in schema.fields {
        let presence = match field.presence {
            Presence::Required => "required".to_string(),
            Presence::Optional => "optional".to_string(),
            Presence::DefaultInteger(n) => format!("default {n}"),
        };
        let constraint = match field.kind {
            FieldKind::Scalar(c) => c.to_string(),
            FieldKind::List(c) => format!("list of {c}"),
            FieldKind::Object(inner) => {
                nested.push(inner);
                inner.name.to_string()
            }
        };
        let name = if field.sensitive {
            format!("{} (sensitive)", field.name)
        } else {
            field.name.to_string()
        };
        table.add_row(vec![Cell::new(name), Cell::new(presence), Cell::new(constraint)]);
    }

    println!("{}", schema.name);
    println!("{table}");

    for inner in nested {
        println!();
        print_schema(inner);
    }
}
