//! Burning quantities
//!
//! A [`Quantity`] is a fraction of one unit of a fuel kind. Its absolute amount
//! (ticks of burning) only exists relative to a [`DurationLookup`]:
//!
//! ```text
//! value(lookup) = lookup.duration(kind) * fraction
//! ```
//!
//! All arithmetic is total. Out-of-range values are clamped to `zero()` / `one()`
//! and non-fuel kinds surface as `None`, never as errors.

use crate::{DurationLookup, ResourceKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Distance under which a float is snapped to the nearest whole tick
const TICK_EPSILON: f64 = 1e-6;

/// Truncate an absolute value to whole ticks
///
/// `duration * (v / duration)` can land a hair below `v`; those values snap back
/// to `v` instead of truncating to `v - 1`.
pub fn whole_ticks(value: f64) -> i64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if (value - rounded).abs() < TICK_EPSILON {
        rounded as i64
    } else {
        value.trunc() as i64
    }
}

/// Immutable fraction of a fuel's burn duration
///
/// Invariant: `0 <= fraction <= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuantityRecord")]
pub struct Quantity {
    fraction: f64,
    kind: ResourceKind,
}

/// Persisted form of a quantity, clamped on the way in
#[derive(Deserialize)]
struct QuantityRecord {
    #[serde(default)]
    fraction: f64,
    kind: ResourceKind,
}

impl From<QuantityRecord> for Quantity {
    fn from(record: QuantityRecord) -> Self {
        let fraction = if record.fraction.is_nan() {
            0.0
        } else {
            record.fraction.clamp(0.0, 1.0)
        };
        Self {
            fraction,
            kind: record.kind,
        }
    }
}

impl Quantity {
    /// Create a zeroed quantity of `kind`, if it is a fuel
    pub fn of(kind: &ResourceKind, lookup: &dyn DurationLookup) -> Option<Self> {
        lookup.is_fuel(kind).then(|| Self::zero_of(kind.clone()))
    }

    /// Create a zeroed quantity of `kind` without checking that it is a fuel
    pub fn zero_of(kind: ResourceKind) -> Self {
        Self {
            fraction: 0.0,
            kind,
        }
    }

    /// Create a full unit of `kind` without checking that it is a fuel
    pub fn one_of(kind: ResourceKind) -> Self {
        Self {
            fraction: 1.0,
            kind,
        }
    }

    /// The zeroed quantity of the lookup's largest fuel
    ///
    /// This is the fallback unit with the most headroom. `None` if the lookup has no fuel.
    pub fn min_value(lookup: &dyn DurationLookup) -> Option<Self> {
        lookup.largest_fuel().map(Self::zero_of)
    }

    /// A full unit of the lookup's largest fuel, i.e. `min_value(lookup).one()`
    pub fn max_value(lookup: &dyn DurationLookup) -> Option<Self> {
        lookup.largest_fuel().map(Self::one_of)
    }

    /// Fraction of one unit, between 0 and 1 inclusive
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// The fuel kind this quantity is a fraction of
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Check if the fraction is exactly 0
    pub fn is_zero(&self) -> bool {
        self.fraction == 0.0
    }

    /// Check if the fraction is exactly 1
    pub fn is_one(&self) -> bool {
        self.fraction == 1.0
    }

    /// Burn duration of one unit of this kind
    pub fn duration(&self, lookup: &dyn DurationLookup) -> u32 {
        lookup.duration(&self.kind)
    }

    /// Absolute amount in ticks, i.e. `duration * fraction`
    pub fn value(&self, lookup: &dyn DurationLookup) -> f64 {
        f64::from(self.duration(lookup)) * self.fraction
    }

    /// Ticks left before this unit is full, i.e. `duration * (1 - fraction)`
    pub fn reverse_value(&self, lookup: &dyn DurationLookup) -> f64 {
        f64::from(self.duration(lookup)) * (1.0 - self.fraction)
    }

    /// Absolute amount truncated to whole ticks
    pub fn ticks(&self, lookup: &dyn DurationLookup) -> u32 {
        u32::try_from(whole_ticks(self.value(lookup))).unwrap_or(u32::MAX)
    }

    /// Same kind, fraction 0
    pub fn zero(&self) -> Self {
        Self::zero_of(self.kind.clone())
    }

    /// Same kind, fraction 1
    pub fn one(&self) -> Self {
        Self::one_of(self.kind.clone())
    }

    /// Same kind, with an absolute amount of `value` ticks
    ///
    /// Values at or below 0 give `zero()`, values at or above the duration give `one()`.
    pub fn with_value(&self, value: i64, lookup: &dyn DurationLookup) -> Self {
        let duration = i64::from(self.duration(lookup));
        if value <= 0 {
            self.zero()
        } else if value >= duration {
            self.one()
        } else {
            Self {
                fraction: value as f64 / duration as f64,
                kind: self.kind.clone(),
            }
        }
    }

    /// The same absolute amount expressed in `kind`
    ///
    /// A zero quantity is simply retagged. When `kind` is not a fuel, or the amount
    /// does not fit into one unit of `kind`, `self` is returned unchanged so that no
    /// burning energy is lost or created by the conversion.
    pub fn with_fuel(&self, kind: &ResourceKind, lookup: &dyn DurationLookup) -> Self {
        let Some(target) = Self::of(kind, lookup) else {
            return self.clone();
        };
        if self.is_zero() {
            return target;
        }

        let fraction = self.value(lookup) / f64::from(target.duration(lookup));
        if fraction > 0.0 && fraction <= 1.0 {
            Self {
                fraction,
                kind: target.kind,
            }
        } else {
            self.clone()
        }
    }

    /// Sum of two quantities
    ///
    /// The result keeps the kind of the operand with the larger duration (`a` on a tie)
    /// if the sum fits into one unit of it, then the other operand's kind, and finally
    /// falls back to [`Quantity::min_value`], clamped at one unit.
    pub fn add(a: &Quantity, b: &Quantity, lookup: &dyn DurationLookup) -> Quantity {
        let value = a.value(lookup) + b.value(lookup);
        let (high, low) = Self::rank(a, b, lookup);
        Self::combine(high, low, value, lookup)
    }

    /// Difference of two quantities, floored at zero
    ///
    /// Kind selection follows [`Quantity::add`].
    pub fn subtract(a: &Quantity, b: &Quantity, lookup: &dyn DurationLookup) -> Quantity {
        let value = (a.value(lookup) - b.value(lookup)).max(0.0);
        let (high, low) = Self::rank(a, b, lookup);
        Self::combine(high, low, value, lookup)
    }

    /// Compare the absolute values of two quantities
    ///
    /// `None` is less than any quantity, and two `None`s are equal.
    pub fn compare_value(
        a: Option<&Quantity>,
        b: Option<&Quantity>,
        lookup: &dyn DurationLookup,
    ) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) if std::ptr::eq(a, b) => Ordering::Equal,
            (Some(a), Some(b)) => a.value(lookup).total_cmp(&b.value(lookup)),
        }
    }

    /// The quantity with the larger value (`a` when equal)
    pub fn max_by_value<'a>(
        a: &'a Quantity,
        b: &'a Quantity,
        lookup: &dyn DurationLookup,
    ) -> &'a Quantity {
        match Self::compare_value(Some(a), Some(b), lookup) {
            Ordering::Less => b,
            _ => a,
        }
    }

    /// The quantity with the smaller value (`a` when equal)
    pub fn min_by_value<'a>(
        a: &'a Quantity,
        b: &'a Quantity,
        lookup: &dyn DurationLookup,
    ) -> &'a Quantity {
        match Self::compare_value(Some(a), Some(b), lookup) {
            Ordering::Greater => b,
            _ => a,
        }
    }

    /// Order two operands by duration, first argument winning ties
    fn rank<'a>(
        a: &'a Quantity,
        b: &'a Quantity,
        lookup: &dyn DurationLookup,
    ) -> (&'a Quantity, &'a Quantity) {
        if a.duration(lookup) >= b.duration(lookup) {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn combine(
        high: &Quantity,
        low: &Quantity,
        value: f64,
        lookup: &dyn DurationLookup,
    ) -> Quantity {
        let ticks = whole_ticks(value);
        if let Some(fits) = [high, low]
            .into_iter()
            .find(|candidate| ticks <= i64::from(candidate.duration(lookup)))
        {
            return fits.with_value(ticks, lookup);
        }
        Self::min_value(lookup)
            .unwrap_or_else(|| high.zero())
            .with_value(ticks, lookup)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.fraction, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{halved, squared, FuelTable};

    fn coal() -> Quantity {
        Quantity::zero_of(ResourceKind::coal())
    }

    fn blaze() -> Quantity {
        Quantity::zero_of(ResourceKind::blaze_rod())
    }

    #[test]
    fn test_of_requires_fuel() {
        let table = FuelTable::vanilla();

        let lava = Quantity::of(&ResourceKind::lava_bucket(), &table).unwrap();
        assert!(lava.is_zero());
        assert_eq!(lava.kind(), &ResourceKind::lava_bucket());

        assert!(Quantity::of(&ResourceKind::new("stone"), &table).is_none());
    }

    #[test]
    fn test_with_value() {
        let table = FuelTable::vanilla();
        let lava = Quantity::zero_of(ResourceKind::lava_bucket()).with_value(10000, &table);

        assert_eq!(lava.fraction(), 0.5);
        assert_eq!(lava.value(&table), 10000.0);
        assert_eq!(lava.reverse_value(&table), 10000.0);
    }

    #[test]
    fn test_with_value_clamps() {
        let table = FuelTable::vanilla();

        assert_eq!(coal().with_value(-5, &table), coal().zero());
        assert_eq!(coal().with_value(1600 + 100, &table), coal().one());
        assert_eq!(coal().with_value(1600, &table), coal().one());
    }

    #[test]
    fn test_with_value_round_trips_every_tick() {
        let table = FuelTable::vanilla();
        for kind in [ResourceKind::coal(), ResourceKind::blaze_rod(), ResourceKind::new("dried_kelp_block")] {
            let unit = Quantity::zero_of(kind);
            let duration = i64::from(unit.duration(&table));
            for v in 0..=duration {
                assert_eq!(i64::from(unit.with_value(v, &table).ticks(&table)), v);
            }
        }
    }

    #[test]
    fn test_same_value_under_halved_lookup() {
        let table = FuelTable::vanilla();
        let halved_table = table.with(halved());

        let full = Quantity::zero_of(ResourceKind::lava_bucket()).with_value(10000, &table);
        let halved_half = Quantity::zero_of(ResourceKind::lava_bucket()).with_value(5000, &halved_table);

        assert_eq!(halved_half.value(&table), 10000.0);
        assert_eq!(full, halved_half);
    }

    #[test]
    fn test_with_fuel() {
        let table = FuelTable::vanilla();
        let coal8 = coal().with_value(800, &table);

        let as_blaze = coal8.with_fuel(&ResourceKind::blaze_rod(), &table);
        assert_eq!(as_blaze.kind(), &ResourceKind::blaze_rod());
        assert_eq!(as_blaze.ticks(&table), 800);

        // Zero is simply retagged
        assert_eq!(coal().with_fuel(&ResourceKind::blaze_rod(), &table), blaze());
    }

    #[test]
    fn test_with_fuel_keeps_energy_when_unrepresentable() {
        let table = FuelTable::vanilla();

        let blaze20 = blaze().with_value(2000, &table);
        assert_eq!(blaze20.with_fuel(&ResourceKind::coal(), &table), blaze20);

        let coal8 = coal().with_value(800, &table);
        assert_eq!(coal8.with_fuel(&ResourceKind::new("stone"), &table), coal8);
        assert_eq!(coal().with_fuel(&ResourceKind::new("stone"), &table), coal());
    }

    #[test]
    fn test_add_and_subtract_values() {
        let table = FuelTable::vanilla();
        let coal6 = coal().with_value(600, &table);
        let blaze10 = blaze().with_value(1000, &table);

        let sum = Quantity::add(&coal6, &blaze10, &table);
        assert_eq!(sum.ticks(&table), 1600);
        assert_eq!(sum.kind(), &ResourceKind::blaze_rod());
        assert_eq!(sum, Quantity::add(&blaze10, &coal6, &table));

        let difference = Quantity::subtract(&blaze10, &coal6, &table);
        assert_eq!(difference.ticks(&table), 400);

        let floored = Quantity::subtract(&coal6, &blaze10, &table);
        assert!(floored.is_zero());
    }

    #[test]
    fn test_add_overflowing_both_kinds_uses_largest_fuel() {
        let table = FuelTable::vanilla();
        let coal15 = coal().with_value(1500, &table);
        let blaze20 = blaze().with_value(2000, &table);

        let sum = Quantity::add(&coal15, &blaze20, &table);
        assert_eq!(sum.kind(), &ResourceKind::lava_bucket());
        assert_eq!(sum.ticks(&table), 3500);
    }

    #[test]
    fn test_add_clamps_at_max_value() {
        let table = FuelTable::vanilla();
        let lava = Quantity::max_value(&table).unwrap();

        let sum = Quantity::add(&lava, &lava, &table);
        assert_eq!(sum, lava);
    }

    #[test]
    fn test_add_tie_keeps_first_kind() {
        let table = FuelTable::vanilla();
        let coal4 = coal().with_value(400, &table);
        let charcoal4 = Quantity::zero_of(ResourceKind::charcoal()).with_value(400, &table);

        assert_eq!(Quantity::add(&coal4, &charcoal4, &table).kind(), &ResourceKind::coal());
        assert_eq!(Quantity::add(&charcoal4, &coal4, &table).kind(), &ResourceKind::charcoal());
    }

    #[test]
    fn test_arithmetic_under_squared_lookup() {
        let squared_table = FuelTable::vanilla().with(squared());
        let coal6 = coal().with_value(600 * 1600, &squared_table);
        let blaze10 = blaze().with_value(1000 * 1600, &squared_table);

        let sum = Quantity::add(&coal6, &blaze10, &squared_table);
        assert_eq!(sum.ticks(&squared_table), 1600 * 1600);

        let difference = Quantity::subtract(&blaze10, &coal6, &squared_table);
        assert_eq!(difference.ticks(&squared_table), 400 * 1600);
    }

    #[test]
    fn test_compare_value() {
        let table = FuelTable::vanilla();
        let coal4 = coal().with_value(400, &table);
        let coal6 = coal().with_value(600, &table);
        let blaze6 = blaze().with_value(600, &table);

        assert_eq!(Quantity::compare_value(Some(&coal4), Some(&coal6), &table), Ordering::Less);
        assert_eq!(Quantity::compare_value(Some(&coal6), Some(&blaze6), &table), Ordering::Equal);
        assert_eq!(Quantity::compare_value(None, Some(&coal().zero()), &table), Ordering::Less);
        assert_eq!(Quantity::compare_value(Some(&coal4), None, &table), Ordering::Greater);
        assert_eq!(Quantity::compare_value(None, None, &table), Ordering::Equal);

        assert_eq!(Quantity::min_by_value(&coal4, &coal6, &table), &coal4);
        assert_eq!(Quantity::min_by_value(&coal6, &coal4, &table), &coal4);
        assert_eq!(Quantity::max_by_value(&coal4, &coal6, &table), &coal6);
        assert_eq!(Quantity::max_by_value(&coal6, &coal4, &table), &coal6);
    }

    #[test]
    fn test_min_and_max_value() {
        let table = FuelTable::vanilla();
        let min = Quantity::min_value(&table).unwrap();
        let max = Quantity::max_value(&table).unwrap();

        assert_eq!(min.kind(), &ResourceKind::lava_bucket());
        assert!(min.is_zero());
        assert_eq!(max, min.one());
        assert!(Quantity::min_value(&FuelTable::new()).is_none());
    }

    #[test]
    fn test_deserialize_clamps_fraction() {
        let over: Quantity = serde_json::from_str(r#"{"fraction": 3.5, "kind": "coal"}"#).unwrap();
        assert_eq!(over, coal().one());

        let missing: Quantity = serde_json::from_str(r#"{"kind": "coal"}"#).unwrap();
        assert_eq!(missing, coal());

        let json = serde_json::to_string(&coal().one()).unwrap();
        assert_eq!(json, r#"{"fraction":1.0,"kind":"coal"}"#);
    }
}
