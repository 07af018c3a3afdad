use legbalancer_core::{AccountDirectory, AccountRecord, DirectoryError, DraftError};
use thiserror::Error;

use crate::{
    search::AccountSearch,
    store::{DraftAction, DraftStore, Outcome},
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error("step {step}: account not found: {account}")]
    UnknownAccount { step: usize, account: String },
    #[error("step {step}: {source}")]
    Rejected { step: usize, source: DraftError },
}

pub fn parse_script(contents: &str) -> Result<Vec<DraftAction>, ReplayError> {
    Ok(serde_json::from_str(contents)?)
}

/// Applies `actions` in order, resolving every referenced account by exact
/// alias or id first. Stops at the first rejected action.
///
/// Returns the account records picked along the way.
pub async fn replay<D: AccountDirectory + ?Sized>(
    store: &mut DraftStore,
    search: &AccountSearch<D>,
    actions: Vec<DraftAction>,
) -> Result<Vec<AccountRecord>, ReplayError> {
    let mut picked: Vec<AccountRecord> = Vec::new();

    for (index, action) in actions.into_iter().enumerate() {
        let step = index + 1;
        let account = match &action {
            DraftAction::AddLeg { account, .. } | DraftAction::ReplaceLegAccount { account, .. } => Some(account.clone()),
            _ => None,
        };
        if let Some(account) = account {
            let record = search
                .lookup(&account)
                .await?
                .ok_or_else(|| ReplayError::UnknownAccount { step, account: account.to_string() })?;
            if !picked.iter().any(|r| r.account_ref == record.account_ref) {
                picked.push(record);
            }
        }

        match store.dispatch(action) {
            Ok(Outcome::ConfirmationRequired(pending)) => {
                tracing::info!(step, discarded = pending.discarded_count(), "Mode change needs confirmation");
            }
            Ok(_) => {}
            Err(source) => return Err(ReplayError::Rejected { step, source }),
        }
    }

    Ok(picked)
}
