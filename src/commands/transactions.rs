use crate::api::{Credentials, Ledger, Mode};
use crate::cache::JsonFileCache;
use crate::commands::{Out, Session};
use crate::model::{DateRange, SortKey, Transaction, TransactionRow};
use crate::view::TransactionListModel;
use crate::{Config, Result};
use anyhow::bail;
use std::fmt::Write;

/// Shows the transaction table for `range`, filtered to `category` and sorted by replaying each
/// of `clicks` as a column-header click. The loaded list is saved to the cache unless the fetch
/// failed.
pub async fn transactions(
    config: Config,
    mode: Mode,
    token: Option<&str>,
    range: DateRange,
    category: &str,
    clicks: &[SortKey],
) -> Result<Out<Vec<TransactionRow>>> {
    let session = Session::open(&config, mode, token).await?;
    list_with(
        &config,
        session.ledger.as_ref(),
        &session.credentials,
        range,
        category,
        clicks,
    )
    .await
}

async fn list_with(
    config: &Config,
    ledger: &dyn Ledger,
    credentials: &Credentials,
    range: DateRange,
    category: &str,
    clicks: &[SortKey],
) -> Result<Out<Vec<TransactionRow>>> {
    let mut model = TransactionListModel::new()
        .with_cache(Box::new(JsonFileCache::new(config.cache_path())))
        .await;
    model.load(ledger.queries(), credentials, range).await;

    model.set_category(category);
    for key in clicks {
        model.toggle_sort(*key);
    }
    let spec = model.sort_spec();
    let rows = model.display_rows();

    let mut message = format!(
        "{} transactions, {range}, {}, sorted by {} {}",
        rows.len(),
        model.category(),
        spec.key,
        spec.direction
    );
    for row in &rows {
        let _ = write!(
            message,
            "\n  {:>6}  {:<10}  {:<16}  {:<28}  {:>12}  {:<7}  {}",
            row.id, row.date, row.category, row.name, row.amount, row.flow, row.note
        );
    }
    Ok(Out::new(message, rows))
}

/// Shows every field of the transaction with `id`, looked up within `range`.
pub async fn view(
    config: Config,
    mode: Mode,
    token: Option<&str>,
    range: DateRange,
    id: i64,
) -> Result<Out<Transaction>> {
    let session = Session::open(&config, mode, token).await?;
    let mut model = TransactionListModel::new();
    model
        .load(session.ledger.queries(), &session.credentials, range)
        .await;
    let Some(transaction) = model.find(id).cloned() else {
        bail!("Transaction {id} was not found between {range}")
    };
    model.select_for_view(&transaction);
    let Some(viewing) = model.viewing() else {
        bail!("Transaction {id} is no longer available")
    };

    let mut message = format!(
        "Transaction {}\n  Date:     {}\n  Category: {}\n  Name:     {}\n  Note:     {}\n  \
        Amount:   {}\n  Type:     {}",
        viewing.id(),
        viewing.date_string(),
        viewing.category(),
        viewing.name(),
        viewing.note(),
        viewing.amount(),
        viewing.kind()
    );
    if let Some(url) = viewing.image_url() {
        let _ = write!(message, "\n  Image:    {url}");
    }
    let structure = viewing.clone();
    model.clear_view();
    Ok(Out::new(message, structure))
}
