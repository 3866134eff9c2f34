//! VCP feature codes understood by the controller.

use std::fmt;

/// A Virtual Control Panel feature the controller drives.
///
/// Capability strings list many more codes, but only these two are ever
/// read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcpFeature {
    /// Luminance, VCP code `0x10`.
    Brightness,
    /// Contrast, VCP code `0x12`.
    Contrast,
}

impl VcpFeature {
    /// The one-byte VCP code for this feature.
    pub const fn code(self) -> u8 {
        match self {
            VcpFeature::Brightness => 0x10,
            VcpFeature::Contrast => 0x12,
        }
    }
}

impl fmt::Display for VcpFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcpFeature::Brightness => f.write_str("brightness"),
            VcpFeature::Contrast => f.write_str("contrast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(VcpFeature::Brightness.code(), 0x10);
        assert_eq!(VcpFeature::Contrast.code(), 0x12);
        assert_eq!(VcpFeature::Contrast.to_string(), "contrast");
    }
}
