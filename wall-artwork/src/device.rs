//! Hardware capability gate for plane detection and scene reconstruction.

use constants::device::{MIN_DEVICE_GENERATION, SUPPORTED_FAMILIES};

use crate::error::DeviceError;

/// Model family and major generation parsed from a hardware identifier
/// such as `iPhone12,1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceClass {
    pub family: &'static str,
    pub generation: u32,
}

impl DeviceClass {
    pub fn parse(identifier: &str) -> Option<Self> {
        let lower = identifier.trim().to_lowercase();
        let family = SUPPORTED_FAMILIES.iter().copied().find(|f| lower.starts_with(f))?;
        let major = lower[family.len()..].split(',').next()?;
        let generation = major.parse().ok()?;
        Some(Self { family, generation })
    }

    pub fn is_supported(&self) -> bool {
        self.generation >= MIN_DEVICE_GENERATION
    }
}

/// Whether the identified hardware can run the wall tracking session.
/// Independent of any bound session.
pub fn is_supported(identifier: &str) -> bool {
    DeviceClass::parse(identifier).is_some_and(|class| class.is_supported())
}

pub fn check(identifier: &str) -> Result<(), DeviceError> {
    if is_supported(identifier) {
        Ok(())
    } else {
        Err(DeviceError::UnsupportedHardware {
            identifier: identifier.to_string(),
        })
    }
}
