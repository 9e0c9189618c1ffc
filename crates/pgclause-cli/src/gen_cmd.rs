use crate::check_cmd::print_issues;
use crate::cli::GenArgs;
use crate::config::ProjectConfig;
use crate::workflow::check_project;
use crate::write::{WriteOptions, apply_generated_file};
use pgclause::codegen::render_constants;

pub fn run(args: GenArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config.clone())?;

    let out = match (&args.out, &project.file.generate) {
        (Some(out), _) => out.clone(),
        (None, Some(generate)) => project.resolve_path(&generate.out),
        (None, None) => anyhow::bail!(
            "no output file: pass --out or add a [gen] section to {}",
            args.config.display()
        ),
    };

    let report = check_project(&project)?;
    print_issues(&report);

    if !report.passed(project.file.deny_warnings) {
        anyhow::bail!("gen failed due to previous errors");
    }
    if report.has_warnings() {
        eprintln!("[WARN] gen completed with warnings");
    }

    apply_generated_file(
        &out,
        &render_constants(&report),
        WriteOptions {
            dry_run: args.dry_run,
            check: args.check,
        },
    )?;
    Ok(())
}
