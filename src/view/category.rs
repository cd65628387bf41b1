//! Expenditure by category: the data behind the dashboard's donut chart.

use crate::api::{Credentials, LedgerQueryService};
use crate::model::{Amount, DateRange, ExpenditureEntry};
use crate::view::load::{LoadSequence, LoadTicket};
use crate::view::Clock;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::{debug, error, warn};

/// One slice of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category_label: String,
    pub amount: Amount,
}

impl CategoryShare {
    pub fn new(category_label: impl Into<String>, amount: Amount) -> Self {
        Self {
            category_label: category_label.into(),
            amount,
        }
    }

    /// An absent label becomes the empty label and an absent amount becomes zero.
    pub fn from_entry(entry: ExpenditureEntry) -> Self {
        Self {
            category_label: entry.budget_name.unwrap_or_default(),
            amount: entry.expense.unwrap_or_default(),
        }
    }
}

/// Returned when a percentage cannot be computed. Both cases are caller mistakes: check
/// `CategorySeries::is_empty` and stay within `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageError {
    /// The series totals zero.
    UndefinedPercentage,
    IndexOutOfRange { index: usize, len: usize },
    Overflow,
}

impl Display for PercentageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PercentageError::UndefinedPercentage => {
                write!(f, "Percentages are undefined for a series that totals zero")
            }
            PercentageError::IndexOutOfRange { index, len } => {
                write!(f, "Share {index} requested from a series of {len}")
            }
            PercentageError::Overflow => write!(f, "The percentage overflowed"),
        }
    }
}

impl std::error::Error for PercentageError {}

/// The shares for one date range. Shares with the same label are merged, in first-seen order,
/// so the amounts always add up to the range's total expenditure. A share whose amount cannot be
/// added to its label's running total is dropped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeries {
    shares: Vec<CategoryShare>,
}

impl CategorySeries {
    pub fn new(shares: impl IntoIterator<Item = CategoryShare>) -> Self {
        let mut merged: Vec<CategoryShare> = Vec::new();
        for share in shares {
            match merged
                .iter_mut()
                .find(|s| s.category_label == share.category_label)
            {
                Some(existing) => match existing.amount.checked_add(share.amount) {
                    Some(sum) => existing.amount = sum,
                    None => warn!(
                        "Dropping {} from '{}': the category total overflowed",
                        share.amount, share.category_label
                    ),
                },
                None => merged.push(share),
            }
        }
        Self { shares: merged }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ExpenditureEntry>) -> Self {
        Self::new(entries.into_iter().map(CategoryShare::from_entry))
    }

    pub fn shares(&self) -> &[CategoryShare] {
        &self.shares
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// The sum of every share, or `None` if it does not fit in an `Amount`.
    pub fn total(&self) -> Option<Amount> {
        Amount::checked_sum(self.shares.iter().map(|s| s.amount))
    }

    /// True iff the amounts sum to exactly zero, which includes having no shares at all. An empty
    /// series gets the "no data" presentation rather than a chart.
    pub fn is_empty(&self) -> bool {
        self.total().is_some_and(|total| total.is_zero())
    }

    /// `amount[index] / total * 100`, rounded to two places with midpoints away from zero.
    pub fn percentage_of(&self, index: usize) -> Result<Decimal, PercentageError> {
        let total = self.total().ok_or(PercentageError::Overflow)?;
        if total.is_zero() {
            return Err(PercentageError::UndefinedPercentage);
        }
        let share = self
            .shares
            .get(index)
            .ok_or(PercentageError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        share
            .amount
            .value()
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(total.value()))
            .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .ok_or(PercentageError::Overflow)
    }

    /// Every share's percentage, in order.
    pub fn percentages(&self) -> Result<Vec<Decimal>, PercentageError> {
        (0..self.len()).map(|ix| self.percentage_of(ix)).collect()
    }

    /// Chart labels, parallel to `amounts`.
    pub fn labels(&self) -> Vec<&str> {
        self.shares
            .iter()
            .map(|s| s.category_label.as_str())
            .collect()
    }

    /// Chart values, parallel to `labels`.
    pub fn amounts(&self) -> Vec<Decimal> {
        self.shares.iter().map(|s| s.amount.value()).collect()
    }
}

/// Fetches and aggregates expenditure for `range`. A transport failure is logged and yields an
/// empty series; it never reaches the caller.
pub async fn fetch_series(
    service: &dyn LedgerQueryService,
    credentials: &Credentials,
    range: DateRange,
) -> CategorySeries {
    match service.fetch_entries(credentials, range).await {
        Ok(entries) => {
            debug!("Fetched {} expenditure entries for {range}", entries.len());
            CategorySeries::from_entries(entries)
        }
        Err(e) => {
            error!("Failed to fetch expenditures: {e:#}");
            CategorySeries::default()
        }
    }
}

/// Owns the series shown by the category chart and the date range it was loaded for.
#[derive(Debug, Clone)]
pub struct CategoryAggregator {
    range: DateRange,
    series: CategorySeries,
    loads: LoadSequence,
}

impl CategoryAggregator {
    /// Starts with an empty series and the current month as the range.
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            range: DateRange::month_of(clock.today()),
            series: CategorySeries::default(),
            loads: LoadSequence::default(),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn series(&self) -> &CategorySeries {
        &self.series
    }

    /// Records `range` as the requested range and stamps a new load for it.
    pub fn begin_load(&mut self, range: DateRange) -> LoadTicket {
        self.range = range;
        self.loads.issue(range)
    }

    /// Stores `series` unless a newer load has already been applied.
    pub fn apply(&mut self, ticket: LoadTicket, series: CategorySeries) -> bool {
        if !self.loads.accept(ticket) {
            return false;
        }
        self.series = series;
        true
    }

    /// Loads `range` and applies the result.
    pub async fn load(
        &mut self,
        service: &dyn LedgerQueryService,
        credentials: &Credentials,
        range: DateRange,
    ) -> &CategorySeries {
        let ticket = self.begin_load(range);
        let series = fetch_series(service, credentials, ticket.range()).await;
        self.apply(ticket, series);
        &self.series
    }

    /// Reloads the current range.
    pub async fn refresh(
        &mut self,
        service: &dyn LedgerQueryService,
        credentials: &Credentials,
    ) -> &CategorySeries {
        let range = self.range;
        self.load(service, credentials, range).await
    }
}
