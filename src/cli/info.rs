use std::path::Path;

use anyhow::{Context, Result, bail};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::Level;

use a52::process::assemble::Assembler;
use a52::process::{Codec, probe};
use a52::structs::ac3::Ac3SpecificParameters;

use super::command::{Cli, InfoArgs};
use super::report::{Ac3Report, Eac3Report, Report, StreamSummary, hex};
use crate::input::InputReader;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Analyzing stream: {}", args.input.display());

    let data = InputReader::new(&args.input)?.read_all()?;
    let codec = probe(&data)?;
    log::debug!("Detected {codec}");

    let pb = multi.map(|multi| spinner(multi, "Analyzing syncframes...")).transpose()?;

    let (report, record) = match codec {
        Codec::Ac3 => analyze_ac3(&data, cli, pb.as_ref())?,
        Codec::Eac3 => analyze_eac3(&data, cli, pb.as_ref())?,
    };

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    if let Some(output) = &args.output {
        write_record(output, &record)?;
    }

    if args.yaml {
        print!("{}", serde_yaml_ng::to_string(&report)?);
        return Ok(());
    }

    println!();
    println!("{codec} Stream Information");
    println!("{}", "=".repeat(codec.to_string().len() + 19));
    println!();

    if let Some(ac3) = &report.ac3 {
        ac3.display();
    }
    if let Some(eac3) = &report.eac3 {
        eac3.display();
    }

    println!("Record");
    println!("  {}", report.record);
    println!();

    if let Some(summary) = &report.summary {
        let unit = match codec {
            Codec::Ac3 => "Syncframes processed",
            Codec::Eac3 => "Access units processed",
        };
        summary.display(unit);
    }

    Ok(())
}

fn spinner(multi: &MultiProgress, message: &'static str) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(message);

    Ok(pb)
}

fn tick(pb: Option<&ProgressBar>, count: usize) {
    if count % 100 == 0 {
        if let Some(pb) = pb {
            pb.set_message(format!("Analyzing syncframes...   {count}"));
            pb.tick();
        }
    }
}

fn fail_level(cli: &Cli) -> Level {
    if cli.strict { Level::Warn } else { Level::Error }
}

fn analyze_ac3(data: &[u8], cli: &Cli, pb: Option<&ProgressBar>) -> Result<(Report, Vec<u8>)> {
    let param = Ac3SpecificParameters::from_syncframe(data)?;
    let record = param.to_dac3()?;

    let mut offset = 0;
    let mut frames = 0;

    while offset < data.len() {
        let frame = &data[offset..];

        let frame_size = match Ac3SpecificParameters::from_syncframe(frame) {
            Ok(param) => param.frame_size().context("frame_size")?,
            Err(e) => {
                if cli.strict {
                    return Err(e);
                }
                log::warn!("Stopped at byte {offset}: {e}");
                break;
            }
        };

        if frame_size > frame.len() {
            if cli.strict {
                bail!("Truncated syncframe at byte {offset}: {frame_size} bytes, {} available", frame.len());
            }
            log::warn!("Truncated syncframe at byte {offset}");
            break;
        }

        offset += frame_size;
        frames += 1;
        tick(pb, frames);
    }

    let report = Report {
        codec: Codec::Ac3.to_string(),
        ac3: Some(Ac3Report::from(&param)),
        eac3: None,
        summary: Some(StreamSummary::new(frames, offset, param.sample_rate())),
        record: hex(&record),
    };

    Ok((report, record))
}

fn analyze_eac3(data: &[u8], cli: &Cli, pb: Option<&ProgressBar>) -> Result<(Report, Vec<u8>)> {
    let mut assembler = Assembler::default();
    assembler.set_fail_level(fail_level(cli));

    let mut access_units = assembler.access_units(data);

    let Some(first) = access_units.next() else {
        bail!("No E-AC-3 access unit found");
    };
    let first = first?;

    let mut count = 1;
    while let Some(access_unit) = access_units.next() {
        match access_unit {
            Ok(_) => {
                count += 1;
                tick(pb, count);
            }
            Err(e) => {
                if cli.strict {
                    return Err(e);
                }
                log::warn!("Stopped at byte {}: {e}", access_units.offset());
                break;
            }
        }
    }

    let record = first.params.to_dec3()?;
    let sample_rate = first
        .params
        .independent_substreams
        .first()
        .and_then(|ind_sub| ind_sub.sample_rate());

    let report = Report {
        codec: Codec::Eac3.to_string(),
        ac3: None,
        eac3: Some(Eac3Report::from_syncframes(&first.params)),
        summary: Some(StreamSummary::new(count, access_units.offset(), sample_rate)),
        record: hex(&record),
    };

    Ok((report, record))
}

fn write_record(path: &Path, record: &[u8]) -> Result<()> {
    std::fs::write(path, record)?;
    log::info!("Wrote {} byte record to {}", record.len(), path.display());

    Ok(())
}
