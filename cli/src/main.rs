use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use query_schema_config::{load_field_set, load_raw_query};
use query_schema_core::display::{Palette, render_errors, render_fields};
use query_schema_core::{FieldSet, ParseResult, RawQuery, RawValue, parse, raw_query_from_pairs};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Output format for the parsed record.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "query-schema")]
#[command(about = "Inspect field schemas and parse query input against them")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the parameter listing of a schema file.
    Fields(FieldsArgs),
    /// Load and validate a schema file.
    Check(CheckArgs),
    /// Parse query input against a schema file.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct FieldsArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Disable ANSI colors.
    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Query parameter as key=value. Repeat a key to pass several values.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    set: Vec<(String, String)>,
    /// JSON or YAML file holding query parameters, applied before --set.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output format for the parsed values.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Disable ANSI colors in the error listing.
    #[arg(long)]
    no_color: bool,
    /// Exit with an error when any field fails, not only required ones.
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Fields(args) => run_fields(args),
        Command::Check(args) => run_check(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_fields(args: FieldsArgs) -> Result<(), String> {
    let fields = load_schema(&args.schema)?;
    println!("{}", render_fields(&fields, palette(args.no_color)));
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let fields = load_schema(&args.schema)?;
    let required = fields.iter().filter(|(_, field)| field.required).count();
    println!(
        "Schema '{}' is valid: {} field(s), {} required.",
        args.schema.display(),
        fields.len(),
        required
    );
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let fields = load_schema(&args.schema)?;

    let mut raw = match &args.input {
        Some(path) => load_raw_query(path)
            .map_err(|err| format!("Failed to load input '{}': {err}", path.display()))?,
        None => RawQuery::new(),
    };
    merge_pairs(&mut raw, args.set);
    debug!(params = raw.len(), "built raw query");

    let result = parse(&raw, &fields);
    println!("{}", render_values(&result, args.format)?);

    let listing = render_errors(&result.errors, palette(args.no_color));
    if !listing.is_empty() {
        eprintln!("{listing}");
    }

    if result.has_required_errors() {
        return Err("required parameters are missing or invalid".to_string());
    }
    if args.strict && !result.is_ok() {
        return Err(format!("{} parameter(s) failed", result.errors.len()));
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<FieldSet, String> {
    let fields = load_field_set(path)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))?;
    info!(path = %path.display(), fields = fields.len(), "loaded schema");
    Ok(fields)
}

/// Appends `--set` pairs after the input file, so repeated keys accumulate.
fn merge_pairs(raw: &mut RawQuery, pairs: Vec<(String, String)>) {
    for (key, value) in raw_query_from_pairs(pairs) {
        match raw.get_mut(&key) {
            Some(existing) => match value {
                RawValue::Single(v) => existing.push(v),
                RawValue::Multiple(vs) => {
                    vs.into_iter().for_each(|v| existing.push(v));
                }
            },
            None => {
                raw.insert(key, value);
            }
        }
    }
}

fn render_values(result: &ParseResult, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&result.values)
            .map_err(|err| format!("Failed to serialize values: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(&result.values)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize values: {err}")),
        CliOutputFormat::Table => {
            let width = result
                .values
                .keys()
                .map(|name| name.chars().count())
                .max()
                .unwrap_or(0);
            let rows: Vec<String> = result
                .values
                .iter()
                .map(|(name, value)| format!("{name:<width$}  {value}"))
                .collect();
            Ok(rows.join("\n"))
        }
    }
}

fn palette(no_color: bool) -> Palette {
    if no_color { Palette::PLAIN } else { Palette::ANSI }
}

fn parse_key_value(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("empty key in '{pair}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{pair}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("tags=a,b").unwrap(),
            ("tags".to_string(), "a,b".to_string())
        );
        assert_eq!(
            parse_key_value("q=").unwrap(),
            ("q".to_string(), String::new())
        );
        assert_eq!(
            parse_key_value("x=1=2").unwrap(),
            ("x".to_string(), "1=2".to_string())
        );
        assert!(parse_key_value("=1").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_merge_pairs_accumulates_after_input() {
        let mut raw = raw_query_from_pairs([("tags", "a")]);
        merge_pairs(
            &mut raw,
            vec![
                ("tags".to_string(), "b".to_string()),
                ("tags".to_string(), "c".to_string()),
                ("q".to_string(), "x".to_string()),
            ],
        );
        assert_eq!(raw["tags"], RawValue::from(vec!["a", "b", "c"]));
        assert_eq!(raw["q"], RawValue::from("x"));
    }
}
