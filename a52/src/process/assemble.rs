use anyhow::{Result, anyhow, bail};
use log::Level::Warn;
use log::{debug, trace};

use crate::log_or_err;
use crate::structs::ac3::A52_SYNCWORD;
use crate::structs::eac3::{
    EAC3_MAX_DEPENDENT_SUBSTREAMS, EAC3_MAX_INDEPENDENT_SUBSTREAMS, EAC3_MAX_SYNCFRAME_LENGTH,
    Eac3SpecificParameters, Eac3SubstreamInfo, Eac3Syncframe,
};
use crate::utils::errors::{AssembleError, SyncframeError};

/// Audio blocks in one E-AC-3 access unit.
pub const BLOCKS_PER_ACCESS_UNIT: u8 = 6;

/// Samples in one access unit, 6 blocks of 256.
pub const SAMPLES_PER_ACCESS_UNIT: u64 = 1536;

/// Bytes needed before a syncframe header is attempted.
pub const MIN_SYNCFRAME_PROBE: usize = 5;

/// Largest value of the 13-bit data_rate field.
pub const MAX_DATA_RATE: u64 = 0x1FFF;

/// Collects E-AC-3 syncframes into access units.
///
/// An access unit starts at an independent syncframe with substream id 0 and
/// ends once its syncframes add up to six audio blocks. All independent and
/// dependent substreams in between are folded into one
/// [`Eac3SpecificParameters`].
///
/// # Example
///
/// ```rust,no_run
/// use a52::process::EXAMPLE_DATA;
/// use a52::process::assemble::Assembler;
///
/// let assembler = Assembler::default();
///
/// for access_unit in assembler.access_units(EXAMPLE_DATA) {
///     let access_unit = access_unit.unwrap();
///     println!(
///         "{} syncframes, {} bytes, {} kbit/s",
///         access_unit.syncframes, access_unit.consumed, access_unit.params.data_rate
///     );
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Assembler {
    fail_level: log::Level,
}

impl Default for Assembler {
    fn default() -> Self {
        Self {
            fail_level: log::Level::Error,
        }
    }
}

impl Assembler {
    /// Sets the failure level for irregular trailing syncframes.
    ///
    /// - `log::Level::Error`: end the access unit early and warn (default)
    /// - `log::Level::Warn`: fail instead (strict mode)
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }

    /// Assembles the access unit at the start of `data`.
    ///
    /// The input is read through a window of [`EAC3_MAX_SYNCFRAME_LENGTH`]
    /// bytes. Callers advance their own offset by
    /// [`AssembledAccessUnit::consumed`] to reach the next access unit.
    pub fn assemble(&self, data: &[u8]) -> Result<AssembledAccessUnit> {
        AssemblyState::new(self.fail_level).run(data)
    }

    /// Iterates over consecutive access units, stopping after the first error.
    pub fn access_units<'a>(&'a self, data: &'a [u8]) -> AccessUnits<'a> {
        AccessUnits {
            assembler: self,
            data,
            offset: 0,
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledAccessUnit {
    pub params: Eac3SpecificParameters,
    /// Bytes of the syncframes belonging to this access unit.
    pub consumed: usize,
    pub syncframes: usize,
}

pub struct AccessUnits<'a> {
    assembler: &'a Assembler,
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl AccessUnits<'_> {
    /// Input offset of the next access unit.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for AccessUnits<'_> {
    type Item = Result<AssembledAccessUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }

        match self.assembler.assemble(&self.data[self.offset..]) {
            Ok(access_unit) => {
                self.offset += access_unit.consumed;
                Some(Ok(access_unit))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

struct AssemblyState {
    window: [u8; EAC3_MAX_SYNCFRAME_LENGTH],
    /// Read cursor within the window.
    pos: usize,
    /// Filled extent of the window.
    end: usize,
    /// Input bytes copied into the window so far.
    read: usize,
    no_more_read: bool,

    blocks: u8,
    current: usize,
    syncframes: usize,
    substreams: [Eac3SubstreamInfo; EAC3_MAX_INDEPENDENT_SUBSTREAMS],
    /// Bit per independent substream id seen since the last id 0.
    observed: u8,
    consumed: usize,

    fail_level: log::Level,
}

impl AssemblyState {
    fn new(fail_level: log::Level) -> Self {
        Self {
            window: [0; EAC3_MAX_SYNCFRAME_LENGTH],
            pos: 0,
            end: 0,
            read: 0,
            no_more_read: false,
            blocks: 0,
            current: 0,
            syncframes: 0,
            substreams: [Eac3SubstreamInfo::default(); EAC3_MAX_INDEPENDENT_SUBSTREAMS],
            observed: 0,
            consumed: 0,
            fail_level,
        }
    }

    fn refill(&mut self, data: &[u8]) {
        if self.no_more_read || self.end - self.pos == self.window.len() {
            return;
        }

        self.window.copy_within(self.pos..self.end, 0);
        self.end -= self.pos;
        self.pos = 0;

        let n = (self.window.len() - self.end).min(data.len() - self.read);
        self.window[self.end..self.end + n].copy_from_slice(&data[self.read..self.read + n]);
        self.end += n;
        self.read += n;

        if self.read == data.len() {
            self.no_more_read = true;
        }
    }

    fn run(mut self, data: &[u8]) -> Result<AssembledAccessUnit> {
        loop {
            self.refill(data);

            let remainder = self.end - self.pos;
            if remainder < MIN_SYNCFRAME_PROBE {
                if self.syncframes == 0 {
                    bail!(AssembleError::InsufficientData {
                        available: remainder,
                        required: MIN_SYNCFRAME_PROBE,
                    });
                }
                break;
            }

            let frame = &self.window[self.pos..self.end];

            let syncword = u16::from_be_bytes([frame[0], frame[1]]);
            if syncword != A52_SYNCWORD {
                if self.syncframes == 0 {
                    bail!(SyncframeError::SyncwordMismatch(syncword));
                }
                log_or_err!(self, Warn, anyhow!(SyncframeError::SyncwordMismatch(syncword)));
                break;
            }

            let syncframe = match Eac3Syncframe::read(frame) {
                Ok(syncframe) => syncframe,
                Err(e) if self.syncframes == 0 => return Err(e),
                Err(e) => {
                    log_or_err!(self, Warn, e);
                    break;
                }
            };

            // the next access unit is not part of this one, whole or not
            let starts_access_unit = syncframe.is_independent() && syncframe.substreamid == 0;
            if starts_access_unit {
                if self.blocks == BLOCKS_PER_ACCESS_UNIT {
                    debug!("Next access unit begins after {} bytes", self.consumed);
                    break;
                }
                if self.blocks > BLOCKS_PER_ACCESS_UNIT {
                    log_or_err!(self, Warn, anyhow!(AssembleError::BlockCountOverflow(self.blocks)));
                    break;
                }
            }

            let frame_size = syncframe.frame_size;
            if frame_size > remainder {
                if self.syncframes == 0 {
                    bail!(AssembleError::InsufficientData {
                        available: remainder,
                        required: frame_size,
                    });
                }
                log_or_err!(
                    self,
                    Warn,
                    anyhow!(AssembleError::TruncatedSyncframe {
                        frame_size,
                        available: remainder,
                    })
                );
                break;
            }

            if starts_access_unit {
                self.blocks += syncframe.audio_blocks();
                self.observed = 0;
            } else if self.syncframes == 0 {
                bail!(AssembleError::FirstSyncframeNotIndependent {
                    strmtyp: syncframe.stream_type as u8,
                    substreamid: syncframe.substreamid,
                });
            }

            if syncframe.is_independent() {
                let id = syncframe.substreamid as usize;

                self.substreams[id] = Eac3SubstreamInfo {
                    num_dep_sub: 0,
                    chan_loc: 0,
                    ..syncframe.substream
                };
                self.observed |= 1 << id;
                self.current = id;
            } else {
                if self.substreams[self.current].num_dep_sub >= EAC3_MAX_DEPENDENT_SUBSTREAMS {
                    log_or_err!(
                        self,
                        Warn,
                        anyhow!(AssembleError::DependentSubstreamOverflow(self.current))
                    );
                    break;
                }

                let ind_sub = &mut self.substreams[self.current];
                ind_sub.num_dep_sub += 1;
                ind_sub.chan_loc |= syncframe.chan_loc();
            }

            trace!(
                "Accepted syncframe {} ({frame_size} bytes), {} blocks",
                self.syncframes, self.blocks
            );

            self.pos += frame_size;
            self.consumed += frame_size;
            self.syncframes += 1;
        }

        self.finalize()
    }

    fn finalize(self) -> Result<AssembledAccessUnit> {
        let independent_substreams = (0..EAC3_MAX_INDEPENDENT_SUBSTREAMS)
            .filter(|&id| self.observed & (1 << id) != 0)
            .map(|id| self.substreams[id])
            .collect::<Vec<_>>();

        if self.blocks != BLOCKS_PER_ACCESS_UNIT || independent_substreams.is_empty() {
            bail!(AssembleError::IncompleteAccessUnit {
                blocks: self.blocks,
                substreams: independent_substreams.len(),
            });
        }

        let sample_rate = independent_substreams[0].sample_rate().unwrap_or_default() as u64;
        let data_rate =
            (self.consumed as u64 * 8 * sample_rate / SAMPLES_PER_ACCESS_UNIT / 1000).min(MAX_DATA_RATE);

        debug!(
            "Access unit: {} syncframes, {} bytes, {} independent substreams",
            self.syncframes,
            self.consumed,
            independent_substreams.len()
        );

        Ok(AssembledAccessUnit {
            params: Eac3SpecificParameters {
                data_rate: data_rate as u16,
                independent_substreams,
            },
            consumed: self.consumed,
            syncframes: self.syncframes,
        })
    }
}
