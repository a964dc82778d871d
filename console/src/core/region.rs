//! Region derivation from an availability-zone subnet name.
//!
//! This is a heuristic tied to the AWS naming format (`eu-west-2a` lives in
//! `eu-west-2`). Other providers, local zones (`us-west-2-lax-1a`) and
//! wavelength zones do not follow it. Callers must treat
//! [`RegionGuess::Suspicious`] as needing manual correction.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionGuess {
    /// Suffix stripped and the result has the usual region shape.
    Plausible(String),
    /// Stripping produced something that does not look like a region.
    Suspicious(String),
}

static REGION_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-[0-9]+$").unwrap());

/// Strip the trailing zone letter from `subnet`.
pub fn region_from_subnet(subnet: &str) -> RegionGuess {
    let subnet = subnet.trim();
    let stripped = match subnet.chars().last() {
        Some(last) if last.is_ascii_alphabetic() => &subnet[..subnet.len() - 1],
        _ => subnet,
    };
    if REGION_SHAPE.is_match(stripped) {
        RegionGuess::Plausible(stripped.to_string())
    } else {
        RegionGuess::Suspicious(stripped.to_string())
    }
}
