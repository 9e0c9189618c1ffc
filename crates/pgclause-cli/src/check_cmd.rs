use crate::cli::CheckArgs;
use crate::config::ProjectConfig;
use crate::workflow::check_project;
use colored::Colorize;
use pgclause::check::{CheckLevel, CheckReport};

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config.clone())?;
    let report = check_project(&project)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_issues(&report);
        eprintln!(
            "compiled {} queries: {} error(s), {} warning(s)",
            report.compiled.len(),
            report.errors().count(),
            report.warnings().count()
        );
    }

    let deny_warnings = args.deny_warnings || project.file.deny_warnings;
    if !report.passed(deny_warnings) {
        anyhow::bail!("check failed");
    }
    Ok(())
}

pub fn print_issues(report: &CheckReport) {
    for issue in &report.issues {
        let tag = match issue.level {
            CheckLevel::Error => "[ERROR]".red().bold(),
            CheckLevel::Warning => "[WARNING]".yellow().bold(),
        };
        eprintln!("{tag} {}: {}", issue.location(), issue.message);
    }
}
