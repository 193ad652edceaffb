use anyhow::{Result, bail};
use serde::Serialize;

use a52::structs::ac3::Ac3SpecificParameters;
use a52::structs::eac3::Eac3SpecificParameters;
use a52::structs::record::{DAC3, DEC3, box_type};

use super::command::RecordArgs;
use super::report::{Ac3Report, Eac3Report, hex};
use crate::input::InputReader;

#[derive(Debug, Serialize)]
struct RecordReport {
    #[serde(rename = "type")]
    box_type: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    ac3: Option<Ac3Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eac3: Option<Eac3Report>,
    record: String,
}

pub fn cmd_record(args: &RecordArgs) -> Result<()> {
    log::info!("Reading record: {}", args.input.display());

    let data = InputReader::new(&args.input)?.read_all()?;

    let report = match box_type(&data) {
        Some(DAC3) => RecordReport {
            box_type: "dac3".to_string(),
            size: data.len(),
            ac3: Some(Ac3Report::from(&Ac3SpecificParameters::from_dac3(&data)?)),
            eac3: None,
            record: hex(&data),
        },
        Some(DEC3) => RecordReport {
            box_type: "dec3".to_string(),
            size: data.len(),
            ac3: None,
            eac3: Some(Eac3Report::from_record(
                &Eac3SpecificParameters::from_dec3(&data)?,
            )),
            record: hex(&data),
        },
        Some(other) => bail!(
            "Unsupported record type: {}",
            String::from_utf8_lossy(&other)
        ),
        None => bail!("Input too short for a record header: {} bytes", data.len()),
    };

    if args.yaml {
        print!("{}", serde_yaml_ng::to_string(&report)?);
        return Ok(());
    }

    println!();
    println!("{} record ({} bytes)", report.box_type, report.size);
    println!("  {}", report.record);
    println!();

    if let Some(ac3) = &report.ac3 {
        ac3.display();
    }
    if let Some(eac3) = &report.eac3 {
        eac3.display();
    }

    Ok(())
}
