//! Request-scoped employer accumulator and top-N ranking.
//!
//! [`EmployerTotals`] is owned by one aggregation run and passed by value or
//! `&mut` through the call chain; nothing here is shared across requests.
//! Employers keep their first-seen position so that ranking ties resolve in
//! discovery order. Amounts are summed as whole cents, so totals do not
//! depend on the order records or committees are folded in.

use std::collections::HashMap;

use crate::model::{ContributionRecord, EmployerTotal, TopN, normalize_employer};

const CENTS_PER_UNIT: f64 = 100.0;

/// Rounds a currency amount to whole cents. Out-of-range values saturate.
pub fn to_cents(amount: f64) -> i64 {
    (amount * CENTS_PER_UNIT).round() as i64
}

/// Converts whole cents back to a currency amount.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / CENTS_PER_UNIT
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    employer: String,
    cents: i64,
}

impl Slot {
    fn to_total(&self) -> EmployerTotal {
        EmployerTotal::new(self.employer.clone(), from_cents(self.cents))
    }

    fn into_total(self) -> EmployerTotal {
        EmployerTotal::new(self.employer, from_cents(self.cents))
    }
}

/// Running totals per normalized employer, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployerTotals {
    index: HashMap<String, usize>,
    slots: Vec<Slot>,
}

impl EmployerTotals {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to `employer`, which must already be normalized.
    pub fn add(&mut self, employer: String, amount: f64) {
        self.add_cents(employer, to_cents(amount));
    }

    fn add_cents(&mut self, employer: String, cents: i64) {
        match self.index.get(&employer) {
            Some(&slot) => {
                let slot = &mut self.slots[slot];
                slot.cents = slot.cents.saturating_add(cents);
            }
            None => {
                self.index.insert(employer.clone(), self.slots.len());
                self.slots.push(Slot { employer, cents });
            }
        }
    }

    /// Normalizes the record's employer and adds its amount.
    pub fn record(&mut self, record: &ContributionRecord) {
        self.add(record.employer_key(), record.amount);
    }

    /// Adds a raw employer string after normalizing it.
    pub fn add_raw(&mut self, employer: Option<&str>, amount: f64) {
        self.add(normalize_employer(employer), amount);
    }

    /// Folds `other` into `self`, appending employers `self` has not seen
    /// in `other`'s order.
    pub fn merge(&mut self, other: EmployerTotals) {
        for slot in other.slots {
            self.add_cents(slot.employer, slot.cents);
        }
    }

    /// Total for `employer`, if any record mapped to it.
    pub fn get(&self, employer: &str) -> Option<f64> {
        self.index
            .get(employer)
            .map(|&slot| from_cents(self.slots[slot].cents))
    }

    /// Number of distinct employers.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Totals in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = EmployerTotal> + '_ {
        self.slots.iter().map(Slot::to_total)
    }

    /// All totals sorted by amount, descending. Ties keep first-seen order.
    pub fn into_ranked(self) -> Vec<EmployerTotal> {
        let mut ranked = self.slots;
        ranked.sort_by(|a, b| b.cents.cmp(&a.cents));
        ranked.into_iter().map(Slot::into_total).collect()
    }

    /// The `n` largest totals, descending.
    pub fn top(self, n: TopN) -> Vec<EmployerTotal> {
        let mut ranked = self.into_ranked();
        ranked.truncate(n.get());
        ranked
    }
}

impl Extend<ContributionRecord> for EmployerTotals {
    fn extend<I: IntoIterator<Item = ContributionRecord>>(&mut self, records: I) {
        for record in records {
            self.record(&record);
        }
    }
}

impl FromIterator<ContributionRecord> for EmployerTotals {
    fn from_iter<I: IntoIterator<Item = ContributionRecord>>(records: I) -> Self {
        let mut totals = Self::new();
        totals.extend(records);
        totals
    }
}
