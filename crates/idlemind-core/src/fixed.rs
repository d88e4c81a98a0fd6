use fixed::types::{I32F32, I64F64};

/// Q32.32 fixed-point: seconds of game time and probabilities.
pub type Fixed64 = I32F32;

/// Q64.64 fixed-point for money. Exact for every integer payout and wide
/// enough that late-game balances never saturate.
pub type Amount = I64F64;

/// Seconds of game time.
pub type Seconds = Fixed64;

/// `n / 100` as a probability.
#[inline]
pub fn percent(n: u32) -> Fixed64 {
    Fixed64::from_num(n) / Fixed64::from_num(100)
}

/// Convert an f64 to Fixed64. Use only for initialization and data loading.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert an f64 to Amount. Use only for initialization and data loading.
#[inline]
pub fn f64_to_amount(v: f64) -> Amount {
    Amount::from_num(v)
}

/// Convert Amount to f64. Use only for display.
#[inline]
pub fn amount_to_f64(v: Amount) -> f64 {
    v.to_num::<f64>()
}

/// Scale an amount by a whole-number percentage (`bonus / 100`).
///
/// Multiplies before dividing so integer amounts at round percentages stay
/// exact.
#[inline]
pub fn apply_percent(amount: Amount, bonus: u32) -> Amount {
    amount.saturating_mul(Amount::from_num(bonus)) / Amount::from_num(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_values() {
        assert_eq!(percent(100), Fixed64::from_num(1));
        assert_eq!(percent(0), Fixed64::ZERO);
        assert_eq!(percent(50), Fixed64::from_num(0.5));
    }

    #[test]
    fn apply_percent_is_exact_for_round_bonuses() {
        assert_eq!(apply_percent(Amount::from_num(40), 150), Amount::from_num(60));
        assert_eq!(apply_percent(Amount::from_num(7), 100), Amount::from_num(7));
        assert_eq!(apply_percent(Amount::from_num(10), 125), Amount::from_num(12.5));
    }

    #[test]
    fn amount_holds_large_balances() {
        let big = Amount::from_num(1_000_000_000_000u64);
        let sum = big + big;
        assert_eq!(amount_to_f64(sum), 2_000_000_000_000.0);
    }
}
