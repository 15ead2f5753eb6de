use anyhow::Result;
use clap::Parser;
use eduslide::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_json = matches!(&args.command, cli::Command::Generate(g) if g.json);
    logging::init_logging(args.verbose)?;

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if is_json {
                // The JSON report already carries the error; keep stderr to one line.
                eprintln!("{e:#}");
                std::process::exit(1);
            } else {
                Err(e)
            }
        }
    }
}
