//! Human-readable number formatting for dashboard metrics.

/// Unit labels, each 1000 times the previous one. The last one absorbs
/// anything larger.
const UNITS: [&str; 3] = ["", "thousand", "million"];

/// Format a magnitude with two decimals and a unit suffix.
///
/// The value is divided by 1000 until it drops below 1000 or the unit
/// list runs out. Empty parts are omitted, so `format_number(500.0, "")`
/// is `"500.00"` and `format_number(1500.0, "R$")` is `"R$ 1.50 thousand"`.
pub fn format_number(value: f64, prefix: &str) -> String {
    let mut scaled = value;
    let mut unit = UNITS[0];

    for (i, label) in UNITS.iter().enumerate() {
        unit = *label;
        if scaled < 1000.0 || i == UNITS.len() - 1 {
            break;
        }
        scaled /= 1000.0;
    }

    let number = format!("{:.2}", scaled);
    [prefix, number.as_str(), unit]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a sale count the same way as revenue, without a prefix.
pub fn format_count(count: usize) -> String {
    format_number(count as f64, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_thousand_has_no_unit() {
        assert_eq!(format_number(500.0, ""), "500.00");
        assert_eq!(format_number(0.0, ""), "0.00");
        assert_eq!(format_number(999.994, ""), "999.99");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(format_number(1500.0, ""), "1.50 thousand");
        assert_eq!(format_number(1000.0, ""), "1.00 thousand");
    }

    #[test]
    fn test_millions() {
        assert_eq!(format_number(2_500_000.0, ""), "2.50 million");
    }

    #[test]
    fn test_last_unit_absorbs_larger_values() {
        assert_eq!(format_number(3_000_000_000.0, ""), "3000.00 million");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(format_number(2_500_000.0, "R$"), "R$ 2.50 million");
        assert_eq!(format_number(12.5, "R$"), "R$ 12.50");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(8), "8.00");
        assert_eq!(format_count(9_436), "9.44 thousand");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(format_number(123_456.0, "R$"), format_number(123_456.0, "R$"));
    }
}
