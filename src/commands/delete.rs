use crate::api::{Credentials, Ledger, Mode};
use crate::cache::JsonFileCache;
use crate::commands::{Out, Session};
use crate::model::DateRange;
use crate::view::{
    AssumeYes, ConfirmationPrompt, DeleteOutcome, NotificationSink, TerminalPrompt,
    TracingNotifier, TransactionListModel,
};
use crate::{Config, Result};
use anyhow::bail;

/// Deletes the transaction with `id` after confirmation. `yes` skips the prompt.
///
/// The transaction is looked up within `range` first so that the prompt is only shown for a
/// transaction that exists. On success it is also removed from the local cache.
///
/// # Errors
/// - The transaction is not in `range`.
/// - The remote delete failed. Nothing local is changed in that case.
pub async fn delete(
    config: Config,
    mode: Mode,
    token: Option<&str>,
    range: DateRange,
    id: i64,
    yes: bool,
) -> Result<Out<DeleteOutcome>> {
    let session = Session::open(&config, mode, token).await?;
    let confirmer: Box<dyn ConfirmationPrompt> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt)
    };
    delete_with(
        &config,
        session.ledger.as_ref(),
        &session.credentials,
        confirmer.as_ref(),
        &TracingNotifier,
        range,
        id,
    )
    .await
}

async fn delete_with(
    config: &Config,
    ledger: &dyn Ledger,
    credentials: &Credentials,
    confirmer: &dyn ConfirmationPrompt,
    notifier: &dyn NotificationSink,
    range: DateRange,
    id: i64,
) -> Result<Out<DeleteOutcome>> {
    let mut model = TransactionListModel::new()
        .with_cache(Box::new(JsonFileCache::new(config.cache_path())))
        .await;
    model.load(ledger.queries(), credentials, range).await;
    let Some(transaction) = model.find(id).cloned() else {
        bail!("Transaction {id} was not found between {range}")
    };

    match model
        .request_delete(&transaction, confirmer, ledger.deletes(), credentials, notifier)
        .await
    {
        DeleteOutcome::Declined => Ok(Out::new(
            format!("Transaction {id} was not deleted"),
            DeleteOutcome::Declined,
        )),
        DeleteOutcome::Deleted => Ok(Out::new(
            format!(
                "Deleted transaction {id} ({} {} {})",
                transaction.date_string(),
                transaction.name(),
                transaction.amount()
            ),
            DeleteOutcome::Deleted,
        )),
        DeleteOutcome::Failed => bail!("Failed to delete transaction {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestLedger;
    use crate::cache::TransactionCache;
    use crate::test::TestEnv;
    use crate::view::{Notice, NoticeLevel, Prompt};
    use std::sync::Mutex;

    struct Answer(bool);

    #[async_trait::async_trait]
    impl ConfirmationPrompt for Answer {
        async fn confirm(&self, _prompt: &Prompt) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct Notices(Mutex<Vec<Notice>>);

    impl NotificationSink for Notices {
        fn notify(&self, notice: Notice) {
            self.0.lock().unwrap().push(notice);
        }
    }

    fn october() -> DateRange {
        DateRange::parse("2025-10-01", "2025-10-31").unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("42", "token")
    }

    #[tokio::test]
    async fn test_delete_with_yes_in_test_mode() {
        let env = TestEnv::new().await;
        let out = delete(env.config(), Mode::Test, None, october(), 3, true)
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&DeleteOutcome::Deleted));
        assert!(out.message().contains("In-N-Out Burger"));

        let cached = JsonFileCache::new(env.config().cache_path())
            .load()
            .await
            .unwrap();
        assert_eq!(cached.len(), 14);
        assert!(cached.iter().all(|t| t.id() != 3));
    }

    #[tokio::test]
    async fn test_declined_delete_calls_nothing() {
        let env = TestEnv::new().await;
        let ledger = TestLedger::default();
        let notices = Notices::default();
        let out = delete_with(
            &env.config(),
            &ledger,
            &credentials(),
            &Answer(false),
            &notices,
            october(),
            3,
        )
        .await
        .unwrap();
        assert_eq!(out.structure(), Some(&DeleteOutcome::Declined));
        assert!(ledger.delete_calls().is_empty());
        assert!(notices.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_is_an_error_and_notifies() {
        let env = TestEnv::new().await;
        let ledger = TestLedger::default();
        ledger.set_fail_deletes(true);
        let notices = Notices::default();
        let err = delete_with(
            &env.config(),
            &ledger,
            &credentials(),
            &Answer(true),
            &notices,
            october(),
            3,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to delete transaction 3"));
        assert_eq!(ledger.delete_calls(), vec![3]);
        let notices = notices.0.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        let cached = JsonFileCache::new(env.config().cache_path())
            .load()
            .await
            .unwrap();
        assert!(cached.iter().any(|t| t.id() == 3));
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let env = TestEnv::new().await;
        let ledger = TestLedger::default();
        let err = delete_with(
            &env.config(),
            &ledger,
            &credentials(),
            &Answer(true),
            &Notices::default(),
            october(),
            99,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(ledger.delete_calls().is_empty());
    }
}
