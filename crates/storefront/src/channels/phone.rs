/// Normalize a phone number to E.164 (`+<country><subscriber>`).
///
/// Separators are dropped. Numbers already carrying `+` or a `00` international prefix keep
/// their country code; a 10-digit national number (optionally with a trunk `0`) gets
/// `default_country_code`. Returns `None` when the result is not 8 to 15 digits long.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let international = if trimmed.starts_with('+') {
        digits
    } else if let Some(rest) = digits.strip_prefix("00") {
        rest.to_string()
    } else {
        let national = match digits.strip_prefix('0') {
            Some(rest) if rest.len() == 10 => rest,
            _ => digits.as_str(),
        };
        if national.len() == 10 {
            format!("{default_country_code}{national}")
        } else if digits.starts_with(default_country_code)
            && digits.len() == default_country_code.len() + 10
        {
            digits
        } else {
            return None;
        }
    };

    (8..=15)
        .contains(&international.len())
        .then(|| format!("+{international}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_numbers_get_default_country_code() {
        assert_eq!(
            normalize_phone("98765 43210", "91").as_deref(),
            Some("+919876543210")
        );
        assert_eq!(
            normalize_phone("098765-43210", "91").as_deref(),
            Some("+919876543210")
        );
    }

    #[test]
    fn international_forms_are_kept() {
        assert_eq!(
            normalize_phone("+44 20 7946 0958", "91").as_deref(),
            Some("+442079460958")
        );
        assert_eq!(
            normalize_phone("0044 20 7946 0958", "91").as_deref(),
            Some("+442079460958")
        );
        assert_eq!(
            normalize_phone("919876543210", "91").as_deref(),
            Some("+919876543210")
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(normalize_phone("", "91"), None);
        assert_eq!(normalize_phone("call me", "91"), None);
        assert_eq!(normalize_phone("12345", "91"), None);
    }
}
