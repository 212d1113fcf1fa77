// Display helpers shared by the dataset builder and the view model.
use num_format::{Locale,ToFormattedString};
use unidecode::unidecode;


/// Shown wherever a value is unknown or could not be computed.
pub const PLACEHOLDER: &str = "—";


pub fn count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Fixed-decimal number with thousands separators in the integer part.
pub fn decimal(n: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, n.abs());
    let (digits,frac) = text.split_at(text.find('.').unwrap_or(text.len()));
    let mut result = String::with_capacity(text.len() + digits.len() / 3);
    for (i,digit) in digits.chars().enumerate() {
	if i > 0 && (digits.len() - i) % 3 == 0 {
	    result.push_str(Locale::en.separator());
	}
	result.push(digit);
    }
    result.push_str(frac);
    match n < 0.0 && text.chars().any(|c| c != '0' && c != '.') {
	true => format!("-{}", result),
	false => result
    }
}

/// ASCII, lowercase, dash-separated form of a region name.
pub fn slug(name: &str) -> String {
    unidecode(name).to_lowercase()
	.split(|c: char| !c.is_ascii_alphanumeric())
	.filter(|part| !part.is_empty())
	.collect::<Vec<_>>()
	.join("-")
}
