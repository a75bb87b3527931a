//! Phone number normalization for Daraja `PartyA`/`PhoneNumber`/`Msisdn` fields.

/// Country code prepended to national numbers written with a leading `0`.
pub const DEFAULT_COUNTRY_CODE: &str = "254";

/// Normalizes `raw` to the digits-only international form Daraja expects.
///
/// - `+254 712 345 678` → `254712345678`
/// - `0712345678` → `254712345678`
/// - anything else → its digits, e.g. `254-712-345678` → `254712345678`
///
/// Empty input stays empty; no length or carrier validation is performed.
pub fn normalize(raw: &str) -> String {
	normalize_with(raw, DEFAULT_COUNTRY_CODE)
}

/// Same as [`normalize`] with an explicit country code for leading-zero numbers.
pub fn normalize_with(raw: &str, country_code: &str) -> String {
	let raw = raw.trim();

	if let Some(rest) = raw.strip_prefix('+') {
		return digits(rest);
	}
	if let Some(rest) = raw.strip_prefix('0') {
		return format!("{country_code}{}", digits(rest));
	}

	digits(raw)
}

fn digits(value: &str) -> String {
	value.chars().filter(char::is_ascii_digit).collect()
}
