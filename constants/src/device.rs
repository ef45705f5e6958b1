/// Hardware families that can run vertical plane detection.
pub const SUPPORTED_FAMILIES: &[&str] = &["iphone", "ipad"];

/// Lowest major hardware generation with the required chip class.
pub const MIN_DEVICE_GENERATION: u32 = 11;
