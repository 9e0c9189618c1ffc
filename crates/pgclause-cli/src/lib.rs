mod check_cmd;
mod cli;
mod config;
mod gen_cmd;
mod init;
mod render_cmd;
mod workflow;
mod write;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Init(args) => init::run(args),
        cli::Command::Check(args) => check_cmd::run(args),
        cli::Command::Render(args) => render_cmd::run(args),
        cli::Command::Gen(args) => gen_cmd::run(args),
    }
}
