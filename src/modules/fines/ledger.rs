use pocket_kernel::settings::FineSettings;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::models::{FineRecord, FineSummary};
use super::store::{PreferencesStore, StoreError};

#[derive(Error, Debug)]
pub enum FineError {
    #[error("Please enter the title of the book.")]
    MissingTitle,

    #[error("Fine amount must be a non-negative number, got {0}.")]
    InvalidAmount(f64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FineError {
    /// Input field at fault, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FineError::MissingTitle => Some("book_title"),
            FineError::InvalidAmount(_) => Some("amount"),
            FineError::Store(_) => None,
        }
    }
}

/// Fine history for the current reader.
///
/// Loaded once with [`FineLedger::load`]; every mutation writes the whole list
/// back under the preferences key.
pub struct FineLedger {
    store: PreferencesStore,
    key: String,
    records: Mutex<Vec<FineRecord>>,
}

impl FineLedger {
    pub fn new(store: PreferencesStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn from_settings(settings: &FineSettings) -> Self {
        Self::new(
            PreferencesStore::new(&settings.storage_path),
            settings.preferences_key.clone(),
        )
    }

    /// Replace the in-memory history with what is on disk.
    ///
    /// A missing or unreadable history loads as empty.
    pub async fn load(&self) -> usize {
        let loaded = match self.store.read::<Vec<FineRecord>>(&self.key).await {
            Ok(records) => records.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    error = %err,
                    "ignoring unreadable fine history"
                );
                Vec::new()
            }
        };

        let count = loaded.len();
        *self.records.lock().await = loaded;
        tracing::debug!(count, "fine history loaded");
        count
    }

    pub async fn add_fine(&self, book_title: &str, amount: f64) -> Result<FineRecord, FineError> {
        let book_title = book_title.trim();
        if book_title.is_empty() {
            return Err(FineError::MissingTitle);
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(FineError::InvalidAmount(amount));
        }

        let fine = FineRecord::new(book_title, amount, OffsetDateTime::now_utc());
        let mut records = self.records.lock().await;
        records.push(fine.clone());
        self.save(&records).await?;

        tracing::info!(fine_id = %fine.id, amount, title = %fine.book_title, "fine recorded");
        Ok(fine)
    }

    /// Clear every outstanding fine, returning how many were paid.
    pub async fn pay_all(&self) -> Result<usize, FineError> {
        let mut records = self.records.lock().await;
        let paid = records.len();
        records.clear();
        self.save(&records).await?;

        tracing::info!(paid, "fines paid");
        Ok(paid)
    }

    pub async fn records(&self) -> Vec<FineRecord> {
        self.records.lock().await.clone()
    }

    pub async fn total_amount(&self) -> f64 {
        self.records.lock().await.iter().map(|fine| fine.amount).sum()
    }

    pub async fn has_fines(&self) -> bool {
        !self.records.lock().await.is_empty()
    }

    pub async fn summary(&self) -> FineSummary {
        let records = self.records().await;
        let total_amount = records.iter().map(|fine| fine.amount).sum();
        FineSummary {
            has_fines: !records.is_empty(),
            records,
            total_amount,
        }
    }

    async fn save(&self, records: &[FineRecord]) -> Result<(), StoreError> {
        self.store.write(&self.key, &records).await.map_err(|err| {
            tracing::error!(
                path = %self.store.path().display(),
                error = %err,
                "failed to persist fine history"
            );
            err
        })
    }
}
