/// Formats an amount as `₹1,234,567.89` with the given number of decimals.
pub(crate) fn format_rupees(value: f64, decimals: usize) -> String {
    format!("₹{}", group_thousands(value, decimals))
}

/// Formats a number with comma thousands separators.
pub(crate) fn group_thousands(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_negative_zero = grouped.chars().all(|c| matches!(c, '0' | ',' | '.'));
    if value.is_sign_negative() && !is_negative_zero {
        grouped.insert(0, '-');
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_integer_digits() {
        assert_eq!(group_thousands(0.0, 0), "0");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1_000.0, 0), "1,000");
        assert_eq!(group_thousands(50_000_000.0, 0), "50,000,000");
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
    }

    #[test]
    fn keeps_sign_for_negative_amounts() {
        assert_eq!(group_thousands(-12_500.5, 1), "-12,500.5");
        assert_eq!(group_thousands(-0.001, 0), "0");
        assert_eq!(format_rupees(250_000.0, 0), "₹250,000");
    }
}
