use crate::api::Mode;
use crate::commands::{Out, Session};
use crate::model::{Amount, DateRange};
use crate::view::{CategoryAggregator, CategorySeries, SystemClock};
use crate::{Config, Result};
use anyhow::bail;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;

/// One bar of the category chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLine {
    pub label: String,
    pub amount: Amount,
    pub percentage: Decimal,
}

/// The category chart for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub range: DateRange,
    pub total: Amount,
    pub lines: Vec<CategoryLine>,
}

/// Shows expenditure by category for `range`.
pub async fn categories(
    config: Config,
    mode: Mode,
    token: Option<&str>,
    range: DateRange,
) -> Result<Out<CategoryReport>> {
    let session = Session::open(&config, mode, token).await?;
    let mut aggregator = CategoryAggregator::new(&SystemClock);
    aggregator
        .load(session.ledger.queries(), &session.credentials, range)
        .await;
    report(aggregator.range(), aggregator.series())
}

fn report(range: DateRange, series: &CategorySeries) -> Result<Out<CategoryReport>> {
    let Some(total) = series.total() else {
        bail!("The expenditure for {range} is too large to total")
    };
    let mut report = CategoryReport {
        range,
        total,
        lines: Vec::new(),
    };
    if series.is_empty() {
        return Ok(Out::new(
            format!("{range}\nNo Expenses.\nLet's create new transactions."),
            report,
        ));
    }

    let percentages = series.percentages()?;
    for (share, percentage) in series.shares().iter().zip(percentages) {
        report.lines.push(CategoryLine {
            label: share.category_label.clone(),
            amount: share.amount,
            percentage,
        });
    }

    let width = report
        .lines
        .iter()
        .map(|line| line.label.chars().count())
        .max()
        .unwrap_or_default()
        .max("Total".len());
    let mut message = format!("Expenditure by category, {range}");
    for line in &report.lines {
        let _ = write!(
            message,
            "\n  {:<width$}  {:>14}  {:>7}%",
            line.label,
            line.amount.to_string(),
            line.percentage
        );
    }
    let _ = write!(
        message,
        "\n  {:<width$}  {:>14}",
        "Total",
        report.total.to_string()
    );
    Ok(Out::new(message, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn october() -> DateRange {
        DateRange::parse("2025-10-01", "2025-10-31").unwrap()
    }

    #[tokio::test]
    async fn test_categories_in_test_mode() {
        let env = TestEnv::new().await;
        let out = categories(env.config(), Mode::Test, None, october())
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.lines.len(), 5);
        assert_eq!(report.total, Amount::from_str("802.87").unwrap());
        let groceries = report
            .lines
            .iter()
            .find(|line| line.label == "Groceries")
            .unwrap();
        assert_eq!(groceries.amount, Amount::from_str("365.02").unwrap());
        assert_eq!(groceries.percentage, Decimal::from_str("45.46").unwrap());
        assert!(out.message().contains("Groceries"));
        assert!(out.message().contains("$802.87"));
    }

    #[tokio::test]
    async fn test_categories_empty_range() {
        let env = TestEnv::new().await;
        let range = DateRange::parse("2020-01-01", "2020-01-31").unwrap();
        let out = categories(env.config(), Mode::Test, None, range)
            .await
            .unwrap();
        assert!(out.message().contains("No Expenses."));
        assert!(out.message().contains("Let's create new transactions."));
        assert!(out.structure().unwrap().lines.is_empty());
    }

    #[test]
    fn test_report_lines_follow_series_order() {
        let series = CategorySeries::new([
            crate::view::CategoryShare::new("Food", Amount::from_str("30").unwrap()),
            crate::view::CategoryShare::new("Rent", Amount::from_str("70").unwrap()),
        ]);
        let out = report(october(), &series).unwrap();
        let lines = &out.structure().unwrap().lines;
        assert_eq!(lines[0].label, "Food");
        assert_eq!(lines[0].percentage, Decimal::from(30));
        assert_eq!(lines[1].percentage, Decimal::from(70));
    }

    #[test]
    fn test_report_with_overflowing_total_is_an_error() {
        let series = CategorySeries::new([
            crate::view::CategoryShare::new("Food", Amount::new(Decimal::MAX)),
            crate::view::CategoryShare::new("Rent", Amount::from_str("70").unwrap()),
        ]);
        let err = report(october(), &series).unwrap_err();
        assert!(err.to_string().contains("too large to total"));
    }
}
