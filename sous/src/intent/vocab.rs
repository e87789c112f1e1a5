//! Shared pattern fragments for the phrase heuristics.

/// Unit tokens recognized in conversion phrases.
pub const UNIT: &str = r"cups?|tablespoons?|teaspoons?|ml|milliliters?|liters?|gallons?|fl\s*oz|ounces?";

/// Spelled-out numbers one to ten.
pub const NUMBER_WORD: &str = "one|two|three|four|five|six|seven|eight|nine|ten";

/// Decimal number.
pub const NUMBER: &str = r"[0-9]+(?:\.[0-9]+)?";

const WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Value of a spelled-out number one to ten.
pub fn word_to_number(word: &str) -> Option<u32> {
    WORDS
        .iter()
        .position(|w| w.eq_ignore_ascii_case(word))
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Parse a digit string or a spelled-out number; unknown words count as 1.
pub fn parse_amount(token: &str) -> Option<f64> {
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        token.parse().ok()
    } else {
        Some(f64::from(word_to_number(token).unwrap_or(1)))
    }
}
