//! Money arithmetic for cart lines and orders.
//!
//! All amounts are [`Decimal`] values in the currency's standard unit
//! (dollars, not cents) and serialize to JSON as strings ("9.50").
//!
//! A cart line's price is never accepted from a client and never stored
//! independently of its factors: everywhere a line is built or updated, the
//! price comes from [`line_price`].

use rust_decimal::Decimal;

/// Compute the price of a line: quantity × unit price.
#[must_use]
pub fn line_price(quantity: u32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Sum line prices into an order total.
///
/// The total is computed once, at order-placement time, and stored on the
/// order; it is never recomputed from the lines afterwards.
#[must_use]
pub fn order_total<I>(prices: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    prices.into_iter().sum()
}
