//! UPC-A payload assembly and GS1 mod-10 check digit.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

/// Number of payload digits before the check digit.
pub const PAYLOAD_LEN: usize = 11;

/// Full UPC-A length including the check digit.
pub const UPC_LEN: usize = 12;

/// How a 12-digit input is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckDigitPolicy {
    /// A 12-digit input is already a complete code and is used verbatim.
    #[default]
    TrustTwelve,
    /// A 12-digit input keeps its first 11 digits and gets a fresh check digit.
    AlwaysRecompute,
}

impl FromStr for CheckDigitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trust" => Ok(Self::TrustTwelve),
            "recompute" => Ok(Self::AlwaysRecompute),
            other => Err(format!("unknown check digit policy: {other}")),
        }
    }
}

/// A 12-character numeric UPC-A value. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Upc12(String);

impl Upc12 {
    /// Wrap a string that is exactly 12 ASCII digits.
    pub fn parse(code: &str) -> Option<Self> {
        if code.len() == UPC_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(code.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digit values, left to right.
    pub fn digits(&self) -> [u8; UPC_LEN] {
        let mut out = [0u8; UPC_LEN];
        for (slot, b) in out.iter_mut().zip(self.0.bytes()) {
            *slot = b - b'0';
        }
        out
    }

    /// Whether the 12th digit matches the check digit of the first 11.
    pub fn has_valid_check_digit(&self) -> bool {
        let digits = self.digits();
        check_digit(&self.0[..PAYLOAD_LEN]) == Some(digits[PAYLOAD_LEN])
    }
}

impl fmt::Display for Upc12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Upc12 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// GS1 check digit over an 11-digit payload.
///
/// Odd positions (1st, 3rd, ...) weigh 3, even positions weigh 1.
/// Returns `None` unless `payload` is exactly 11 ASCII digits.
pub fn check_digit(payload: &str) -> Option<u8> {
    if payload.len() != PAYLOAD_LEN || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (mut odd, mut even) = (0u32, 0u32);
    for (i, b) in payload.bytes().enumerate() {
        let d = u32::from(b - b'0');
        if i % 2 == 0 {
            odd += d;
        } else {
            even += d;
        }
    }
    Some(((10 - (odd * 3 + even) % 10) % 10) as u8)
}

/// Encode normalized digits with the default [`CheckDigitPolicy`].
pub fn encode(digits: &str) -> Option<Upc12> {
    encode_with(digits, CheckDigitPolicy::default())
}

/// Build a UPC-A value from a digits-only string.
///
/// - empty input has no barcode (`None`);
/// - 12 digits pass through untouched under [`CheckDigitPolicy::TrustTwelve`];
/// - anything else is left-padded with zeros to 11, cut to its rightmost 11,
///   and completed with a computed check digit.
///
/// Non-digit characters are not expected here; run [`crate::normalize`] first.
pub fn encode_with(digits: &str, policy: CheckDigitPolicy) -> Option<Upc12> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if digits.len() == UPC_LEN {
        match policy {
            CheckDigitPolicy::TrustTwelve => {
                let code = Upc12(digits.to_string());
                if !code.has_valid_check_digit() {
                    warn!(code = %code, "Trusting 12-digit input with mismatched check digit");
                }
                return Some(code);
            }
            CheckDigitPolicy::AlwaysRecompute => {
                return Some(complete(&digits[..PAYLOAD_LEN]));
            }
        }
    }

    let padded = format!("{:0>width$}", digits, width = PAYLOAD_LEN);
    let base = &padded[padded.len() - PAYLOAD_LEN..];
    if digits.len() > PAYLOAD_LEN {
        debug!(len = digits.len(), base, "Truncated identifier to rightmost 11 digits");
    }
    Some(complete(base))
}

fn complete(base: &str) -> Upc12 {
    let check = check_digit(base).unwrap_or_default();
    Upc12(format!("{base}{check}"))
}
