//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use datagrid_lib::model::Value;
use datagrid_lib::query::Action;
use datagrid_lib::query::Direction;
use datagrid_lib::query::FilterSpec;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "datagrid-cli",
    about = "Page, sort, filter and search a JSON dataset through the grid core",
    version
)]
pub struct Cli {
    /// JSON file holding an array of records.
    pub data: PathBuf,

    /// JSON grid configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sort column, optionally suffixed with `:asc` or `:desc`.
    #[arg(long)]
    pub sort: Option<String>,

    /// Column filter such as `status=open`, `age>30` or `name~ann`. Repeatable.
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Case-insensitive search text.
    #[arg(long)]
    pub search: Option<String>,

    /// Page to show (1-based).
    #[arg(long)]
    pub page: Option<usize>,

    /// Rows per page, overriding the config.
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Identity field, overriding the config.
    #[arg(long = "id-field")]
    pub id_field: Option<String>,

    /// Serve the data through an in-process remote source.
    #[arg(long)]
    pub remote: bool,

    /// Height of the simulated viewport, in logical units.
    #[arg(long, default_value_t = 250.0)]
    pub viewport: f64,

    /// Scroll offset of the simulated viewport.
    #[arg(long, default_value_t = 0.0)]
    pub scroll: f64,

    /// Write debug logs to this file.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Log to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The actions requested on the command line, in application order.
    pub fn actions(&self) -> Result<Vec<Action>, CliError> {
        let mut actions = Vec::new();
        for raw in &self.filters {
            let (column, spec) = parse_filter(raw)?;
            actions.push(Action::SetFilter { column, spec });
        }
        if let Some(search) = &self.search {
            actions.push(Action::search(search.clone()));
        }
        if let Some(sort) = &self.sort {
            let (column, direction) = parse_sort(sort)?;
            actions.push(Action::sort(column, direction));
        }
        if let Some(size) = self.page_size {
            actions.push(Action::SetPageSize(size));
        }
        if let Some(page) = self.page {
            actions.push(Action::SetPage(page));
        }
        Ok(actions)
    }
}

/// Parses `column[:asc|:desc]`.
pub fn parse_sort(raw: &str) -> Result<(String, Direction), CliError> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((column, "asc")) => (column, Direction::Asc),
        Some((column, "desc")) => (column, Direction::Desc),
        Some((_, other)) => {
            return Err(CliError::Argument(format!(
                "sort direction must be asc or desc, got {:?}",
                other
            )));
        }
        None => (raw, Direction::Asc),
    };
    if column.is_empty() {
        return Err(CliError::Argument("sort column is empty".to_string()));
    }
    Ok((column.to_string(), direction))
}

/// Parses `column<op>value` with op one of `=`, `!=`, `>`, `>=`, `<`, `<=`, `~`.
pub fn parse_filter(raw: &str) -> Result<(String, FilterSpec), CliError> {
    const OPERATORS: [&str; 7] = ["!=", ">=", "<=", "=", ">", "<", "~"];

    let (at, op) = OPERATORS
        .iter()
        .filter_map(|op| raw.find(op).map(|at| (at, *op)))
        .min_by_key(|(at, op)| (*at, std::cmp::Reverse(op.len())))
        .ok_or_else(|| CliError::Argument(format!("filter {:?} has no operator", raw)))?;

    let column = raw[..at].trim();
    let operand = raw[at + op.len()..].trim();
    if column.is_empty() {
        return Err(CliError::Argument(format!("filter {:?} has no column", raw)));
    }

    let spec = match op {
        "=" => FilterSpec::Eq(parse_value(operand)),
        "!=" => FilterSpec::Ne(parse_value(operand)),
        ">" => FilterSpec::Gt(parse_value(operand)),
        ">=" => FilterSpec::Ge(parse_value(operand)),
        "<" => FilterSpec::Lt(parse_value(operand)),
        "<=" => FilterSpec::Le(parse_value(operand)),
        _ => FilterSpec::contains(operand),
    };
    Ok((column.to_string(), spec))
}

/// Reads an operand as JSON when it parses (`30`, `true`, `null`), else as text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("name").unwrap(), ("name".to_string(), Direction::Asc));
        assert_eq!(parse_sort("age:desc").unwrap(), ("age".to_string(), Direction::Desc));
        assert!(parse_sort("age:sideways").is_err());
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn test_parse_filter_operators() {
        assert_eq!(
            parse_filter("status=open").unwrap(),
            ("status".to_string(), FilterSpec::eq("open"))
        );
        assert_eq!(parse_filter("age>=30").unwrap(), ("age".to_string(), FilterSpec::ge(30)));
        assert_eq!(parse_filter("age!=null").unwrap(), ("age".to_string(), FilterSpec::Ne(Value::Null)));
        assert_eq!(
            parse_filter("name~ann").unwrap(),
            ("name".to_string(), FilterSpec::contains("ann"))
        );
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=open").is_err());
    }

    #[test]
    fn test_actions_order() {
        let cli = Cli::parse_from([
            "datagrid-cli",
            "data.json",
            "--filter",
            "age>30",
            "--sort",
            "name:desc",
            "--page",
            "2",
        ]);
        let actions = cli.actions().unwrap();
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[0], Action::SetFilter { .. }));
        assert_eq!(actions[2], Action::SetPage(2));
    }
}
