use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat};
use cli::info::cmd_info;
use cli::record::cmd_record;

mod cli;
mod input;
pub(crate) mod timestamp;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let multi = MultiProgress::new();

    let progress = init_logger(&cli, &multi)?.then_some(&multi);

    match cli.command {
        Commands::Info(ref args) => cmd_info(args, &cli, progress)?,
        Commands::Record(ref args) => cmd_record(args)?,
    }

    Ok(())
}

/// Returns true when log output is routed through the progress bars.
fn init_logger(cli: &Cli, multi: &MultiProgress) -> Result<bool> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(cli.loglevel.to_level_filter());

    if let LogFormat::Json = cli.log_format {
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{{\"ts\":{},\"lvl\":\"{}\",\"target\":\"{}\",\"msg\":{:?}}}",
                buf.timestamp(),
                record.level(),
                record.target(),
                record.args().to_string()
            )
        });
    } else {
        builder.format_timestamp_secs();
    }

    if !cli.progress {
        builder.try_init()?;
        return Ok(false);
    }

    LogWrapper::new(multi.clone(), builder.build()).try_init()?;

    Ok(true)
}
