/// Ongoing enrollments needed before a new registration is discounted.
pub const DISCOUNT_THRESHOLD: usize = 2;

/// Percentage of the list price charged once the threshold is reached.
pub const DISCOUNTED_PERCENT: u64 = 75;

/// Price charged for a new registration given how many of the student's
/// courses are currently running.
///
/// Two tiers only. The discounted price is `price * 75 / 100` with integer
/// truncation, multiplying first.
pub fn final_price(list_price: u64, ongoing_count: usize) -> u64 {
    if ongoing_count >= DISCOUNT_THRESHOLD {
        // Never exceeds `list_price`, so narrowing back is lossless.
        (u128::from(list_price) * u128::from(DISCOUNTED_PERCENT) / 100) as u64
    } else {
        list_price
    }
}
