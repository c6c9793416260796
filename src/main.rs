use clap::Parser;
use release_catalog::cli::Cli;
use release_catalog::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref(), cli.log_json)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(release_catalog::cli::run(cli))
}
