//! Text rendering of money and ratios for notes and narrative prose.

/// Whole currency units with thousands separators, e.g. `$1,426,248`.
pub fn money(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

/// Millions with one decimal, e.g. `$79.2M`. Amounts under a million fall
/// back to thousands, e.g. `$529K`.
pub fn compact_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let magnitude = amount.abs();
    if magnitude >= 1_000_000.0 {
        format!("{sign}${:.1}M", magnitude / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{sign}${:.0}K", magnitude / 1_000.0)
    } else {
        format!("{sign}${magnitude:.0}")
    }
}

/// Ratio as a percentage with `decimals` digits, e.g. `percent(0.0886, 1)`
/// gives `8.9%`.
pub fn percent(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, ratio * 100.0)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(1_426_248.0), "$1,426,248");
        assert_eq!(money(999.4), "$999");
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(-4_098.0), "-$4,098");
        assert_eq!(money(1_000.0), "$1,000");
    }

    #[test]
    fn compact_money_picks_unit() {
        assert_eq!(compact_money(79_194_484.0), "$79.2M");
        assert_eq!(compact_money(529_469.0), "$529K");
        assert_eq!(compact_money(-2_622_076.0), "-$2.6M");
        assert_eq!(compact_money(12.0), "$12");
    }

    #[test]
    fn percent_formats_ratio() {
        assert_eq!(percent(0.0886, 1), "8.9%");
        assert_eq!(percent(0.045, 1), "4.5%");
        assert_eq!(percent(0.686, 0), "69%");
    }
}
