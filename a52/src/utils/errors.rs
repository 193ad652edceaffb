#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SyncframeError {
    #[error("Insufficient data for syncframe: {available} bytes available, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Invalid syncword. Read {0:#06X}, expected 0x0B77")]
    SyncwordMismatch(u16),

    #[error("Malformed syncframe: {field} = {value:#X} is reserved or out of range")]
    MalformedSyncframe { field: &'static str, value: u16 },

    #[error("strmtyp must not be 3 (reserved)")]
    InvalidStreamType,

    #[error("Unsupported bitstream: bsid = {0}")]
    UnsupportedBitstream(u8),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("Record too short: {len} bytes, at least {min} required")]
    TooShort { len: usize, min: usize },

    #[error("Declared box size {declared} does not match {actual} supplied bytes")]
    SizeMismatch { declared: u64, actual: usize },

    #[error("At most 8 independent substreams can be described. Got {0}")]
    SubstreamCountExceeded(usize),

    #[error("At least one independent substream is required")]
    NoSubstream,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AssembleError {
    #[error("Insufficient data for an access unit: {available} bytes available, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error(
        "The first syncframe of an access unit must be independent substream 0. Read strmtyp = {strmtyp}, substreamid = {substreamid}"
    )]
    FirstSyncframeNotIndependent { strmtyp: u8, substreamid: u8 },

    #[error("Incomplete access unit: {blocks} audio blocks, {substreams} independent substreams")]
    IncompleteAccessUnit { blocks: u8, substreams: usize },

    #[error("Syncframe of {frame_size} bytes is truncated, only {available} bytes remain")]
    TruncatedSyncframe { frame_size: usize, available: usize },

    #[error("Independent substream {0} already has 15 dependent substreams")]
    DependentSubstreamOverflow(usize),

    #[error("Access unit already holds {0} audio blocks")]
    BlockCountOverflow(u8),
}
