//! Numeric display formats for dashboard fields.
//!
//! Output follows US conventions: `,` thousands separators, `.` decimal
//! point, a leading `$` for currency placed after the sign.

use dashdeck_core::TreeValue;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    /// Shortest round-trip form, no grouping.
    #[default]
    Plain,
    /// Grouped, fixed decimals.
    Number { decimals: usize },
    /// Grouped, fixed decimals, `$` prefix.
    Currency { decimals: usize },
    /// Fixed decimals, `%` suffix, no grouping.
    Percentage { decimals: usize },
}

impl NumberFormat {
    pub fn number(decimals: usize) -> Self {
        NumberFormat::Number { decimals }
    }

    pub fn currency(decimals: usize) -> Self {
        NumberFormat::Currency { decimals }
    }

    pub fn percentage(decimals: usize) -> Self {
        NumberFormat::Percentage { decimals }
    }

    pub fn apply(&self, n: f64) -> String {
        match *self {
            NumberFormat::Plain => TreeValue::Number(n).display_string(),
            NumberFormat::Number { decimals } => grouped(n, decimals),
            NumberFormat::Currency { decimals } => {
                let body = grouped(n.abs(), decimals);
                if is_negative(n, decimals) {
                    format!("-${}", body)
                } else {
                    format!("${}", body)
                }
            }
            NumberFormat::Percentage { decimals } => {
                format!("{:.*}%", decimals, normalize_zero(n, decimals))
            }
        }
    }

    /// Format a stored value. Numbers are formatted; text is shown as-is;
    /// anything else shows as zero.
    pub fn render(&self, value: &TreeValue) -> String {
        match value {
            TreeValue::Number(n) => self.apply(*n),
            TreeValue::Text(s) => s.clone(),
            _ => self.apply(0.0),
        }
    }
}


/// `1234567.891` with 2 decimals → `1,234,567.89`.
pub fn grouped(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, normalize_zero(n, decimals));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Compact money label: `46000000` → `$46.0M`, `8500` → `$8.5K`.
pub fn compact_currency(n: f64) -> String {
    let abs = n.abs();
    let sign = if n < 0.0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{}${:.1}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.1}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.1}K", sign, abs / 1e3)
    } else {
        format!("{}${:.0}", sign, abs)
    }
}


// Rounding -0.001 to 0 decimals must not print "-0".
fn normalize_zero(n: f64, decimals: usize) -> f64 {
    if is_negative(n, decimals) {
        n
    } else {
        n.abs()
    }
}

fn is_negative(n: f64, decimals: usize) -> bool {
    let scale = 10f64.powi(decimals.min(15) as i32);
    (n * scale).round() < 0.0
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_is_shortest() {
        assert_eq!(NumberFormat::Plain.apply(67.0), "67");
        assert_eq!(NumberFormat::Plain.apply(5.6), "5.6");
    }

    #[test]
    fn grouping() {
        assert_eq!(grouped(0.0, 0), "0");
        assert_eq!(grouped(999.0, 0), "999");
        assert_eq!(grouped(1000.0, 0), "1,000");
        assert_eq!(grouped(46_000_000.0, 0), "46,000,000");
        assert_eq!(grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(grouped(-1234.5, 1), "-1,234.5");
    }

    #[test]
    fn currency() {
        assert_eq!(NumberFormat::currency(0).apply(46_000_000.0), "$46,000,000");
        assert_eq!(NumberFormat::currency(2).apply(8500.0), "$8,500.00");
        assert_eq!(NumberFormat::currency(0).apply(-1500.0), "-$1,500");
    }

    #[test]
    fn percentage() {
        assert_eq!(NumberFormat::percentage(2).apply(27.17), "27.17%");
        assert_eq!(NumberFormat::percentage(0).apply(45.0), "45%");
        assert_eq!(NumberFormat::percentage(1).apply(3.26), "3.3%");
    }

    #[test]
    fn number_with_decimals() {
        assert_eq!(NumberFormat::number(1).apply(3.2), "3.2");
        assert_eq!(NumberFormat::number(1).apply(4.8), "4.8");
        assert_eq!(NumberFormat::number(0).apply(1247.0), "1,247");
    }

    #[test]
    fn no_negative_zero() {
        assert_eq!(NumberFormat::number(0).apply(-0.2), "0");
        assert_eq!(NumberFormat::currency(0).apply(-0.2), "$0");
        assert_eq!(NumberFormat::percentage(0).apply(-0.0), "0%");
    }

    #[test]
    fn render_non_numbers() {
        assert_eq!(NumberFormat::currency(0).render(&TreeValue::from("213K")), "213K");
        assert_eq!(NumberFormat::currency(0).render(&TreeValue::Null), "$0");
    }

    #[test]
    fn compact() {
        assert_eq!(compact_currency(46_000_000.0), "$46.0M");
        assert_eq!(compact_currency(8500.0), "$8.5K");
        assert_eq!(compact_currency(758_000_000.0), "$758.0M");
        assert_eq!(compact_currency(1_200_000_000.0), "$1.2B");
        assert_eq!(compact_currency(12.0), "$12");
    }
}
