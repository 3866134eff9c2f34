//! Capability string parsing.
//!
//! Monitors describe themselves with a parenthesised micro-format such as
//!
//! ```text
//! (prot(monitor)type(LCD)model(Blah)cmds(01 02 03 07 0C E3 F3)
//! vcp(02 04 05 08 0C 10 12 14(01 05 06 08 0B))
//! mswhql(1)asset_eep(40)mccs_ver(2.2))
//! ```
//!
//! Only the `vcp(...)` and `mccs_ver(...)` groups are of interest.

use std::collections::BTreeSet;

use log::{trace, warn};

use crate::error::CapabilityError;
use crate::vcp::VcpFeature;

/// The parts of a capability string the controller cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Argument of `mccs_ver(...)`, empty if the keyword is absent.
    pub protocol_version: String,
    /// Top-level codes of the `vcp(...)` group.
    pub vcp_codes: BTreeSet<u32>,
}

impl Capabilities {
    /// Parse a capability string.
    ///
    /// Codes nested inside a feature's value list (`14(01 05 06)`) are
    /// skipped. A missing `vcp(` group yields an empty code set. An
    /// unterminated `mccs_ver(` group yields an empty version.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::UnexpectedChar`] for anything but hex digits,
    ///   whitespace and parentheses inside the `vcp(...)` group
    /// - [`CapabilityError::Unterminated`] if the `vcp(...)` group never closes
    /// - [`CapabilityError::InvalidCode`] if a top-level code overflows
    pub fn parse(text: &str) -> Result<Self, CapabilityError> {
        trace!("parsing capabilities: {}", text);

        let protocol_version = match find_keyword(text, "mccs_ver") {
            Some(start) => match text[start..].find(')') {
                Some(len) => text[start..start + len].trim().to_string(),
                None => {
                    warn!("unterminated mccs_ver group, ignoring version");
                    String::new()
                }
            },
            None => String::new(),
        };

        let vcp_codes = match find_keyword(text, "vcp") {
            Some(start) => scan_vcp_codes(text, start)?,
            None => BTreeSet::new(),
        };

        Ok(Self {
            protocol_version,
            vcp_codes,
        })
    }

    /// Whether the monitor advertises the given feature.
    pub fn supports(&self, feature: VcpFeature) -> bool {
        self.vcp_codes.contains(&u32::from(feature.code()))
    }
}

/// Byte offset just past `keyword(`, ignoring matches that are the tail of a
/// longer identifier.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    let pattern = format!("{keyword}(");
    text.match_indices(&pattern)
        .find(|(index, _)| {
            text[..*index]
                .chars()
                .next_back()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        })
        .map(|(index, _)| index + pattern.len())
}

/// Scan the body of a `vcp(` group starting at `start` (depth 1).
fn scan_vcp_codes(text: &str, start: usize) -> Result<BTreeSet<u32>, CapabilityError> {
    let bytes = text.as_bytes();
    let mut codes = BTreeSet::new();
    let mut depth = 1usize;
    let mut pos = start;

    while depth > 0 {
        let Some(&byte) = bytes.get(pos) else {
            return Err(CapabilityError::Unterminated { keyword: "vcp" });
        };

        match byte {
            b'(' => {
                depth += 1;
                pos += 1;
            }
            b')' => {
                depth -= 1;
                pos += 1;
            }
            b if b.is_ascii_whitespace() => pos += 1,
            b if b.is_ascii_hexdigit() => {
                let end = bytes[pos..]
                    .iter()
                    .position(|b| !b.is_ascii_hexdigit())
                    .map_or(bytes.len(), |len| pos + len);
                if depth == 1 {
                    codes.insert(u32::from_str_radix(&text[pos..end], 16)?);
                }
                pos = end;
            }
            _ => {
                // Only ASCII has been consumed so far, so `pos` is a char boundary.
                let found = text[pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(CapabilityError::UnexpectedChar { found, offset: pos });
            }
        }
    }

    Ok(codes)
}
