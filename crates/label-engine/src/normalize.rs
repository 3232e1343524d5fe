//! Identifier normalization: keep only the ASCII digits a user typed.

/// Strip every character that is not `0`-`9`, keeping digit order.
///
/// Never fails; input without digits yields an empty string.
pub fn normalize(input: &str) -> String {
    let mut digits = input.to_string();
    digits.retain(|c| c.is_ascii_digit());
    digits
}
