use crate::database::income_split::IncomeSplitRepository;
use crate::error::app_error::AppError;
use crate::models::bucket::{Bucket, TransactionType};
use crate::models::income_split::IncomeSplitRequest;
use crate::models::transaction::{NewTransaction, Transaction};
use crate::service::money::distribute_money;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

pub struct IncomeSplitService<'a, R> {
    repository: &'a R,
}

impl<'a, R> IncomeSplitService<'a, R>
where
    R: IncomeSplitRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Records one income transaction per bucket, splitting the amount so
    /// the parts add up exactly. Either all three are stored or none.
    pub async fn split_income(&self, request: &IncomeSplitRequest, user_id: &Uuid) -> Result<Vec<Transaction>, AppError> {
        if request.amount_minor <= 0 {
            return Err(AppError::BadRequest("Amount must be positive".to_string()));
        }

        let mut category_ids = Vec::with_capacity(Bucket::ALL.len());
        for bucket in Bucket::ALL {
            let category = self.repository.income_category_for_bucket(bucket, user_id).await?;
            category_ids.push(category.id);
        }

        let effective_at = request.effective_at.unwrap_or_else(Utc::now);
        let drafts = split_drafts(request, &category_ids, effective_at);
        let created = self.repository.create_transactions_atomically(&drafts, user_id).await?;

        info!(
            user_id = %user_id,
            amount_minor = request.amount_minor,
            currency = %request.currency_code,
            "Split income across buckets"
        );

        Ok(created)
    }
}

/// The three income drafts, in bucket order, for the given categories.
fn split_drafts(request: &IncomeSplitRequest, category_ids: &[Uuid], effective_at: DateTime<Utc>) -> Vec<NewTransaction> {
    let note = request.split_note();

    Bucket::ALL
        .iter()
        .zip(category_ids)
        .zip(distribute_money(request.amount_minor, Bucket::ALL.len()))
        .map(|((bucket, category_id), amount_minor)| NewTransaction {
            category_id: *category_id,
            bucket: *bucket,
            transaction_type: TransactionType::Income,
            amount_minor,
            currency_code: request.currency_code.clone(),
            effective_at,
            note: Some(note.clone()),
        })
        .collect()
}
