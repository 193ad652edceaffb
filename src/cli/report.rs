use serde::Serialize;

use a52::structs::ac3::Ac3SpecificParameters;
use a52::structs::eac3::{Eac3SpecificParameters, Eac3SubstreamInfo};

use crate::timestamp::{frames_to_secs, time_str};

const SERVICES: [&str; 7] = [
    "Main audio service: complete main (CM)",
    "Main audio service: music and effects (ME)",
    "Associated service: visually impaired (VI)",
    "Associated service: hearing impaired (HI)",
    "Associated service: dialogue (D)",
    "Associated service: commentary (C)",
    "Associated service: emergency (E)",
];

const CODING_MODES: [&str; 8] = [
    "1 + 1: Dual mono",
    "1/0: C",
    "2/0: L, R",
    "3/0: L, C, R",
    "2/1: L, R, S",
    "3/1: L, C, R, S",
    "2/2: L, R, SL, SR",
    "3/2: L, C, R, SL, SR",
];

// C->M, S->V1, SL->V1 and SR->V2
const KARAOKE_CODING_MODES: [&str; 8] = [
    "Undefined audio coding mode",
    "Undefined audio coding mode",
    "2/0: L, R",
    "3/0: L, M, R",
    "2/1: L, R, V1",
    "3/1: L, M, R, V1",
    "2/2: L, R, V1, V2",
    "3/2: L, M, R, V1, V2",
];

/// chan_loc bits, LSB first.
const CHANNEL_LOCATIONS: [&str; 9] = [
    "LFE2",
    "Cvh",
    "Lvh/Rvh pair",
    "Lw/Rw pair",
    "Lsd/Rsd pair",
    "Ts",
    "Cs",
    "Lrs/Rrs pair",
    "Lc/Rc pair",
];

pub fn service(bsmod: u8, acmod: u8) -> &'static str {
    match (bsmod, acmod) {
        (0..=6, _) => SERVICES[bsmod as usize],
        (7, 1) => "Associated service: voice over (VO)",
        (7, 2..) => "Main audio service: karaoke",
        _ => "Undefined service",
    }
}

pub fn coding_mode(acmod: u8, bsmod: u8) -> &'static str {
    let modes = if bsmod == 7 {
        &KARAOKE_CODING_MODES
    } else {
        &CODING_MODES
    };

    modes[(acmod & 0x7) as usize]
}

pub fn channel_locations(chan_loc: u16) -> Vec<String> {
    CHANNEL_LOCATIONS
        .iter()
        .enumerate()
        .filter(|&(i, _)| chan_loc >> i & 0x1 != 0)
        .map(|(_, name)| name.to_string())
        .collect()
}

pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Serialize)]
pub struct Ac3Report {
    pub fscod: u8,
    pub sample_rate: Option<u32>,
    pub bsid: u8,
    pub bsmod: u8,
    pub service: &'static str,
    pub acmod: u8,
    pub coding_mode: &'static str,
    pub lfeon: bool,
    pub channels: u8,
    pub frmsizecod: u8,
    /// kbit/s
    pub bit_rate: Option<u32>,
    pub frame_size: Option<usize>,
}

impl From<&Ac3SpecificParameters> for Ac3Report {
    fn from(param: &Ac3SpecificParameters) -> Self {
        Self {
            fscod: param.fscod,
            sample_rate: param.sample_rate(),
            bsid: param.bsid,
            bsmod: param.bsmod,
            service: service(param.bsmod, param.acmod),
            acmod: param.acmod,
            coding_mode: coding_mode(param.acmod, param.bsmod),
            lfeon: param.lfeon,
            channels: param.channel_count(),
            frmsizecod: param.frmsizecod,
            bit_rate: param.bit_rate(),
            frame_size: param.frame_size(),
        }
    }
}

impl Ac3Report {
    pub fn display(&self) {
        println!("AC-3 Parameters");
        match self.sample_rate {
            Some(rate) => println!("  fscod                     {} ({rate} Hz)", self.fscod),
            None => println!("  fscod                     {} (reserved)", self.fscod),
        }
        println!("  bsid                      {}", self.bsid);
        println!("  bsmod                     {} ({})", self.bsmod, self.service);
        println!("  acmod                     {} ({})", self.acmod, self.coding_mode);
        println!("  lfeon                     {}", self.lfeon as u8);
        println!("  Channels                  {}", self.channels);
        if let Some(bit_rate) = self.bit_rate {
            println!("  Bit rate                  {bit_rate} kbps");
        }
        if let Some(frame_size) = self.frame_size {
            println!("  Frame size                {frame_size} bytes");
        }
        println!();
    }
}

#[derive(Debug, Serialize)]
pub struct SubstreamReport {
    pub fscod: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fscod2: Option<u8>,
    pub sample_rate: Option<u32>,
    pub bsid: u8,
    pub bsmod: u8,
    pub service: &'static str,
    pub acmod: u8,
    pub coding_mode: &'static str,
    pub lfeon: bool,
    pub channels: u8,
    pub num_dep_sub: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chan_loc: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_locations: Vec<String>,
}

impl SubstreamReport {
    /// `with_fscod2` is false for records, which do not carry it.
    fn new(ind_sub: &Eac3SubstreamInfo, with_fscod2: bool) -> Self {
        let reduced = ind_sub.fscod == 0x3;
        // record bsmod is 5 bits wide
        let service_name = if ind_sub.bsmod < 0x8 {
            service(ind_sub.bsmod, ind_sub.acmod)
        } else {
            "Undefined service"
        };

        Self {
            fscod: ind_sub.fscod,
            fscod2: (reduced && with_fscod2).then_some(ind_sub.fscod2),
            sample_rate: (!reduced || with_fscod2)
                .then(|| ind_sub.sample_rate())
                .flatten(),
            bsid: ind_sub.bsid,
            bsmod: ind_sub.bsmod,
            service: service_name,
            acmod: ind_sub.acmod,
            coding_mode: coding_mode(ind_sub.acmod, ind_sub.bsmod),
            lfeon: ind_sub.lfeon,
            channels: ind_sub.channel_count(),
            num_dep_sub: ind_sub.num_dep_sub,
            chan_loc: (ind_sub.num_dep_sub > 0).then_some(ind_sub.chan_loc),
            channel_locations: channel_locations(ind_sub.chan_loc),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Eac3Report {
    /// kbit/s
    pub data_rate: u16,
    pub num_ind_sub: u8,
    pub independent_substreams: Vec<SubstreamReport>,
}

impl Eac3Report {
    pub fn from_syncframes(param: &Eac3SpecificParameters) -> Self {
        Self::new(param, true)
    }

    pub fn from_record(param: &Eac3SpecificParameters) -> Self {
        Self::new(param, false)
    }

    fn new(param: &Eac3SpecificParameters, with_fscod2: bool) -> Self {
        Self {
            data_rate: param.data_rate,
            num_ind_sub: param.num_ind_sub(),
            independent_substreams: param
                .independent_substreams
                .iter()
                .map(|ind_sub| SubstreamReport::new(ind_sub, with_fscod2))
                .collect(),
        }
    }

    pub fn display(&self) {
        println!("E-AC-3 Parameters");
        println!("  Data rate                 {} kbps", self.data_rate);
        println!("  num_ind_sub               {}", self.num_ind_sub);

        for (i, sub) in self.independent_substreams.iter().enumerate() {
            println!("  Independent substream {i}");
            match (sub.fscod2, sub.sample_rate) {
                (Some(fscod2), Some(rate)) => {
                    println!("    fscod                   3, fscod2 {fscod2} ({rate} Hz)")
                }
                (None, Some(rate)) => println!("    fscod                   {} ({rate} Hz)", sub.fscod),
                _ => println!("    fscod                   {} (reduced sample rate)", sub.fscod),
            }
            println!("    bsid                    {}", sub.bsid);
            println!("    bsmod                   {} ({})", sub.bsmod, sub.service);
            println!("    acmod                   {} ({})", sub.acmod, sub.coding_mode);
            println!("    lfeon                   {}", sub.lfeon as u8);
            println!("    Channels                {}", sub.channels);
            println!("    num_dep_sub             {}", sub.num_dep_sub);
            if let Some(chan_loc) = sub.chan_loc {
                println!("    chan_loc                {chan_loc:#05X}");
                for location in &sub.channel_locations {
                    println!("      {location}");
                }
            }
        }
        println!();
    }
}

#[derive(Debug, Serialize)]
pub struct StreamSummary {
    /// Syncframes for AC-3, access units for E-AC-3.
    pub frames: usize,
    pub bytes: usize,
    pub duration: String,
    /// kbit/s
    pub average_data_rate: Option<f64>,
}

impl StreamSummary {
    pub fn new(frames: usize, bytes: usize, sample_rate: Option<u32>) -> Self {
        let duration_secs = frames_to_secs(frames, sample_rate);

        Self {
            frames,
            bytes,
            duration: time_str(duration_secs),
            average_data_rate: (duration_secs > 0.0)
                .then(|| (bytes as f64 * 8.0) / (duration_secs * 1000.0)),
        }
    }

    pub fn display(&self, unit: &str) {
        println!("Analysis Summary");
        println!("  {unit:26}{}", self.frames);

        let size_mb = self.bytes as f64 / 1_000_000.0;
        println!(
            "  Size                      {size_mb:.2} MB ({} bytes)",
            self.bytes
        );
        println!("  Duration                  {}", self.duration);
        if let Some(rate) = self.average_data_rate {
            println!("  Average data rate         {rate:.1} kbps");
        }
        println!();
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub codec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ac3: Option<Ac3Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eac3: Option<Eac3Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<StreamSummary>,
    /// Hex dump of the record.
    pub record: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptive_strings() {
        assert_eq!(service(0, 2), "Main audio service: complete main (CM)");
        assert_eq!(service(7, 1), "Associated service: voice over (VO)");
        assert_eq!(service(7, 7), "Main audio service: karaoke");
        assert_eq!(service(7, 0), "Undefined service");
        assert_eq!(coding_mode(3, 7), "3/0: L, M, R");
        assert_eq!(coding_mode(3, 0), "3/0: L, C, R");
        assert_eq!(
            channel_locations(0x105),
            ["LFE2", "Lvh/Rvh pair", "Lc/Rc pair"]
        );
        assert_eq!(hex(&[0x0B, 0x77, 0x00]), "0B 77 00");
    }
}
