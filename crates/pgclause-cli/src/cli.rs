use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Init,
    Check,
    Render,
    Gen,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Init(InitArgs),
    Check(CheckArgs),
    Render(RenderArgs),
    Gen(GenArgs),
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub config: PathBuf,
    pub deny_warnings: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub config: PathBuf,
    pub json: bool,
    /// Print `$n` placeholders instead of `?`.
    pub numbered: bool,
    /// Only render queries with these names.
    pub names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GenArgs {
    pub config: PathBuf,
    pub out: Option<PathBuf>,
    pub dry_run: bool,
    pub check: bool,
}

const DEFAULT_CONFIG: &str = "pgclause.toml";

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    let rest = it.map(|s| s.as_str());
    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "init" => parse_init(rest),
        "check" => parse_check(rest),
        "render" => parse_render(rest),
        "gen" => parse_gen(rest),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// `--name value` or `--name=value`. Returns `None` when `token` is not `--name`.
fn option_value<'a>(
    name: &str,
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == name {
        let Some(v) = it.next() else {
            anyhow::bail!("{name} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_init<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    while let Some(token) = it.next() {
        if let Some(v) = option_value("--config", token, &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Init)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Init(InitArgs { config }))
}

fn parse_check<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut deny_warnings = false;
    let mut json = false;

    while let Some(token) = it.next() {
        if let Some(v) = option_value("--config", token, &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Check)),
            "--deny-warnings" => deny_warnings = true,
            "--json" => json = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Check(CheckArgs {
        config,
        deny_warnings,
        json,
    }))
}

fn parse_render<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut json = false;
    let mut numbered = false;
    let mut names = Vec::new();

    while let Some(token) = it.next() {
        if let Some(v) = option_value("--config", token, &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Render)),
            "--json" => json = true,
            "--numbered" => numbered = true,
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => names.push(other.to_string()),
        }
    }

    Ok(Command::Render(RenderArgs {
        config,
        json,
        numbered,
        names,
    }))
}

fn parse_gen<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut out: Option<PathBuf> = None;
    let mut dry_run = false;
    let mut check = false;

    while let Some(token) = it.next() {
        if let Some(v) = option_value("--config", token, &mut it)? {
            config = PathBuf::from(v);
            continue;
        }
        if let Some(v) = option_value("--out", token, &mut it)? {
            out = Some(PathBuf::from(v));
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Gen)),
            "--dry-run" => dry_run = true,
            "--check" => check = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    if dry_run && check {
        anyhow::bail!("`gen` accepts either --dry-run or --check, not both");
    }

    Ok(Command::Gen(GenArgs {
        config,
        out,
        dry_run,
        check,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
pgclause - static query check and codegen for pgclause

USAGE:
  pgclause <COMMAND> [OPTIONS]

COMMANDS:
  init          Write a config template
  check         Compile every manifest query against the schema
  render        Print the compiled SQL and parameters
  gen           Generate Rust constants for checked queries

Run `pgclause <command> --help` for more."
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  pgclause init [OPTIONS]

OPTIONS:
  --config <FILE>       Output config path (default: pgclause.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Check => {
            println!(
                "\
USAGE:
  pgclause check [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: pgclause.toml)
  --deny-warnings       Treat advisories as errors
  --json                Print the report as JSON
  -h, --help            Print help"
            );
        }
        HelpTopic::Render => {
            println!(
                "\
USAGE:
  pgclause render [OPTIONS] [NAMES...]

OPTIONS:
  --config <FILE>       Config file path (default: pgclause.toml)
  --json                Print compiled queries as JSON
  --numbered            Use $1..$n placeholders
  -h, --help            Print help"
            );
        }
        HelpTopic::Gen => {
            println!(
                "\
USAGE:
  pgclause gen [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: pgclause.toml)
  --out <FILE>          Override gen.out from config
  --dry-run             Print files that would change
  --check               Exit non-zero if output would change
  -h, --help            Print help"
            );
        }
    }
}
