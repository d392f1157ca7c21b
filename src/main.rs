use fwsim::cli::run_cli;
use fwsim::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    run_cli()
}
