//! Phone number normalization and rendering
//!
//! National numbers are ten digits once separator punctuation is stripped;
//! anything else is implausible. Accepted numbers are rendered with their
//! country dialing code in the style conventional for that code.

/// Digits in a national phone number
const NATIONAL_DIGITS: usize = 10;

/// Strip separator punctuation and check plausibility
///
/// Returns the bare digit string, or `None` when the input contains
/// non-separator, non-digit characters or the wrong number of digits.
pub fn normalize(raw: &str) -> Option<String> {
    let mut digits = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }

    if digits.len() == NATIONAL_DIGITS {
        Some(digits)
    } else {
        None
    }
}

/// Render a raw phone number under the given dialing code
///
/// `None` means the number is implausible and should be rejected rather
/// than stored.
pub fn format(raw: &str, dialing_code: &str) -> Option<String> {
    let digits = normalize(raw)?;

    let formatted = match dialing_code {
        // NANP style: +1 (AAA) BBB-CCCC
        "1" => format!(
            "+1 ({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        ),
        // Mexico: +52 AA BBBB CCCC
        "52" => format!(
            "+52 {} {} {}",
            &digits[0..2],
            &digits[2..6],
            &digits[6..10]
        ),
        _ => format!("+{} {}", dialing_code, digits),
    };

    Some(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_mexican_numbers() {
        assert_eq!(
            format("5512345678", "52").as_deref(),
            Some("+52 55 1234 5678")
        );
        assert_eq!(
            format("5587654321", "52").as_deref(),
            Some("+52 55 8765 4321")
        );
    }

    #[test]
    fn test_formats_nanp_numbers() {
        assert_eq!(
            format("2125551234", "1").as_deref(),
            Some("+1 (212) 555-1234")
        );
        assert_eq!(
            format("6045551234", "1").as_deref(),
            Some("+1 (604) 555-1234")
        );
    }

    #[test]
    fn test_strips_separator_punctuation() {
        assert_eq!(normalize("(555) 123-4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize("555.123.4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize("55 1234 5678").as_deref(), Some("5512345678"));
    }

    #[test]
    fn test_rejects_short_numbers() {
        assert_eq!(normalize("123"), None);
        assert_eq!(format("123", "52"), None);
    }

    #[test]
    fn test_rejects_overlong_numbers() {
        assert_eq!(normalize("123456789012"), None);
    }

    #[test]
    fn test_rejects_letters() {
        assert_eq!(normalize("abc123def"), None);
        assert_eq!(format("abc123def", "52"), None);
    }

    #[test]
    fn test_other_dialing_codes_render_plainly() {
        assert_eq!(
            format("5512345678", "44").as_deref(),
            Some("+44 5512345678")
        );
    }
}
