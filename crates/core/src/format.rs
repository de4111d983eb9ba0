//! Input masks for user-entered strings.
//!
//! Each mask strips everything that is not a digit, caps the digit count,
//! and regroups. They are safe to call on every keystroke: partial input
//! produces a partial mask, and masking an already-masked string is a
//! no-op.

/// Mask a CPF as `###.###.###-##`, capped at 11 digits.
#[must_use]
pub fn mask_cpf(raw: &str) -> String {
    group_digits(raw, 11, &[(3, "."), (6, "."), (9, "-")])
}

/// Mask a date as `DD/MM/YYYY`, capped at 8 digits.
#[must_use]
pub fn mask_date(raw: &str) -> String {
    group_digits(raw, 8, &[(2, "/"), (4, "/")])
}

/// Mask a Brazilian mobile number as `(##) #####-####`, capped at 11 digits.
///
/// One or two digits are left bare; the area-code parentheses appear once a
/// third digit arrives.
#[must_use]
pub fn mask_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(11).collect();
    if digits.len() <= 2 {
        return digits;
    }

    let mut out = String::with_capacity(16);
    out.push('(');
    out.push_str(&digits[..2]);
    out.push_str(") ");
    if digits.len() <= 7 {
        out.push_str(&digits[2..]);
    } else {
        out.push_str(&digits[2..7]);
        out.push('-');
        out.push_str(&digits[7..]);
    }
    out
}

/// Uppercase the first letter of each word, lowercasing the rest.
///
/// Collapses runs of whitespace to a single space.
#[must_use]
pub fn capitalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep at most `cap` digits from `raw`, inserting `sep` before the digit
/// at each listed index.
fn group_digits(raw: &str, cap: usize, separators: &[(usize, &str)]) -> String {
    let mut out = String::with_capacity(cap + separators.len() * 2);
    for (i, c) in raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(cap)
        .enumerate()
    {
        if let Some((_, sep)) = separators.iter().find(|(at, _)| *at == i && i > 0) {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_cpf() {
        assert_eq!(mask_cpf(""), "");
        assert_eq!(mask_cpf("123"), "123");
        assert_eq!(mask_cpf("12345"), "123.45");
        assert_eq!(mask_cpf("123456789"), "123.456.789");
        assert_eq!(mask_cpf("12345678901"), "123.456.789-01");
        // Caps at 11 digits
        assert_eq!(mask_cpf("123456789012345"), "123.456.789-01");
        // Idempotent on already-masked input
        assert_eq!(mask_cpf("123.456.789-01"), "123.456.789-01");
    }

    #[test]
    fn test_mask_date() {
        assert_eq!(mask_date(""), "");
        assert_eq!(mask_date("1"), "1");
        assert_eq!(mask_date("1506"), "15/06");
        assert_eq!(mask_date("15061990"), "15/06/1990");
        assert_eq!(mask_date("150619901234"), "15/06/1990");
        assert_eq!(mask_date("15/06/1990"), "15/06/1990");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone(""), "");
        assert_eq!(mask_phone("1"), "1");
        assert_eq!(mask_phone("11"), "11");
        assert_eq!(mask_phone("119"), "(11) 9");
        assert_eq!(mask_phone("1198765"), "(11) 98765");
        assert_eq!(mask_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(mask_phone("(11) 98765-4321"), "(11) 98765-4321");
    }

    #[test]
    fn test_capitalize_name() {
        assert_eq!(capitalize_name(""), "");
        assert_eq!(capitalize_name("maria da silva"), "Maria Da Silva");
        assert_eq!(capitalize_name("  joão   PEDRO "), "João Pedro");
    }
}
