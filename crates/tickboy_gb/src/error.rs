use thiserror::Error;

/// Failures surfaced by the running core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid opcode 0x{opcode:02X} at 0x{address:04X}")]
    InvalidOpcode { opcode: u8, address: u16 },

    #[error("invalid snapshot range 0x{start:04X}..0x{end:04X} (must be non-empty and at most 64 bytes)")]
    InvalidSnapshotRange { start: u16, end: u16 },

    #[error("no cartridge loaded")]
    NoCartridge,
}

/// Reasons a ROM image is refused at cartridge construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM image too small: {len} bytes, need at least {min}")]
    TooSmall { len: usize, min: usize },

    #[error("header checksum mismatch: header says 0x{expected:02X}, computed 0x{computed:02X}")]
    HeaderChecksum { expected: u8, computed: u8 },

    #[error("boot logo does not match")]
    InvalidLogo,

    #[error("unknown cartridge type 0x{0:02X}")]
    UnknownType(u8),

    #[error("unknown ROM size code 0x{0:02X}")]
    UnknownRomSize(u8),

    #[error("unknown RAM size code 0x{0:02X}")]
    UnknownRamSize(u8),

    #[error("unsupported cartridge controller: {0}")]
    Unsupported(&'static str),

    #[error("save data is {actual} bytes, cartridge RAM is {expected}")]
    SaveSizeMismatch { expected: usize, actual: usize },
}
