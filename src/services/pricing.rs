/// Final charge for a course in cents: list price minus the discount
/// percentage, rounded half-up to the cent. Computed once when the
/// purchase is submitted and never recomputed, so later price edits do
/// not touch existing purchases.
pub(crate) fn final_amount_cents(price_cents: i64, discount_percent: i32) -> i64 {
    let discount = i64::from(discount_percent.clamp(0, 100));
    (price_cents * (100 - discount) + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_percent_off_hundred_dollars_is_eighty() {
        assert_eq!(final_amount_cents(10_000, 20), 8_000);
    }

    #[test]
    fn rounds_half_up_to_the_cent() {
        // $49.99 at 15% off = $42.4915 -> $42.49
        assert_eq!(final_amount_cents(4_999, 15), 4_249);
        // $0.99 at 50% off = $0.495 -> $0.50
        assert_eq!(final_amount_cents(99, 50), 50);
    }

    #[test]
    fn zero_and_full_discount_edges() {
        assert_eq!(final_amount_cents(10_000, 0), 10_000);
        assert_eq!(final_amount_cents(10_000, 100), 0);
    }

    #[test]
    fn out_of_range_discount_is_clamped() {
        assert_eq!(final_amount_cents(10_000, 120), 0);
        assert_eq!(final_amount_cents(10_000, -5), 10_000);
    }
}
