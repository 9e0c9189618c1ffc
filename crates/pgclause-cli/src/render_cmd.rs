use crate::check_cmd::print_issues;
use crate::cli::RenderArgs;
use crate::config::ProjectConfig;
use crate::workflow::check_project;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use pgclause::StatementKind;
use pgclause::check::CompiledQuery;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RenderedQuery<'a> {
    name: &'a str,
    kind: StatementKind,
    sql: String,
    params: &'a [String],
}

impl<'a> RenderedQuery<'a> {
    fn new(query: &'a CompiledQuery, numbered: bool) -> Self {
        let result = &query.result;
        Self {
            name: &query.name,
            kind: result.kind(),
            sql: if numbered {
                result.to_pg_sql()
            } else {
                result.sql().to_string()
            },
            params: result.params(),
        }
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config.clone())?;
    let report = check_project(&project)?;
    print_issues(&report);

    for name in &args.names {
        if !report.compiled.iter().any(|q| &q.name == name) {
            anyhow::bail!("no compiled query named {name}");
        }
    }

    let rendered: Vec<RenderedQuery<'_>> = report
        .compiled
        .iter()
        .filter(|q| args.names.is_empty() || args.names.contains(&q.name))
        .map(|q| RenderedQuery::new(q, args.numbered))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("{}", render_table(&rendered));
    }

    if report.has_errors() {
        anyhow::bail!("render finished with errors");
    }
    Ok(())
}

fn render_table(rendered: &[RenderedQuery<'_>]) -> Table {
    let header = |title: &str| {
        Cell::new(title)
            .add_attribute(Attribute::Bold)
            .fg(Color::Cyan)
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header("Name"),
            header("Kind"),
            header("SQL"),
            header("Params"),
        ]);

    for query in rendered {
        table.add_row(vec![
            Cell::new(query.name).add_attribute(Attribute::Bold),
            Cell::new(query.kind.as_str()).fg(Color::Green),
            Cell::new(&query.sql),
            Cell::new(query.params.join(", ")),
        ]);
    }
    table
}
