/// Leading bytes of every saved environment file.
pub const ARCHIVE_MAGIC: [u8; 4] = *b"AWMP";

/// Current archive layout version, stored little-endian after the magic.
pub const ARCHIVE_VERSION: u16 = 1;

/// Magic plus version.
pub const ARCHIVE_HEADER_LEN: usize = 6;
