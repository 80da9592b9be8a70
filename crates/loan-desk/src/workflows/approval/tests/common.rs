use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::approval::domain::{LoanId, LoanStatus};
use crate::workflows::approval::record::LoanRecord;
use crate::workflows::approval::repository::{LoanEntry, LoanRepository, RepositoryError};
use crate::workflows::approval::{approval_router, LoanApprovalService};

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) entries: Arc<Mutex<HashMap<LoanId, LoanEntry>>>,
}

impl LoanRepository for MemoryRepository {
    fn insert(&self, entry: LoanEntry) -> Result<LoanEntry, RepositoryError> {
        let mut guard = self.entries.lock().expect("repository mutex poisoned");
        if guard.contains_key(&entry.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(entry.loan_id.clone(), entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: LoanEntry, expected: LoanStatus) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("repository mutex poisoned");
        let found = guard
            .get(&entry.loan_id)
            .ok_or(RepositoryError::NotFound)?
            .record
            .status();
        if found != expected {
            return Err(RepositoryError::StatusChanged { found });
        }
        guard.insert(entry.loan_id.clone(), entry);
        Ok(())
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanEntry>, RepositoryError> {
        let guard = self.entries.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Reads succeed but every write is refused.
pub(super) struct ReadOnlyRepository {
    pub(super) entry: LoanEntry,
}

impl LoanRepository for ReadOnlyRepository {
    fn insert(&self, _entry: LoanEntry) -> Result<LoanEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn update(&self, _entry: LoanEntry, _expected: LoanStatus) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanEntry>, RepositoryError> {
        Ok((id == &self.entry.loan_id).then(|| self.entry.clone()))
    }
}

/// Holds every `fetch` until the barrier's other party has fetched too.
pub(super) struct GatedRepository {
    pub(super) inner: MemoryRepository,
    pub(super) gate: Barrier,
}

impl LoanRepository for GatedRepository {
    fn insert(&self, entry: LoanEntry) -> Result<LoanEntry, RepositoryError> {
        self.inner.insert(entry)
    }

    fn update(&self, entry: LoanEntry, expected: LoanStatus) -> Result<(), RepositoryError> {
        self.inner.update(entry, expected)
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanEntry>, RepositoryError> {
        let entry = self.inner.fetch(id);
        self.gate.wait();
        entry
    }
}

pub(super) fn build_service() -> (LoanApprovalService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanApprovalService::new(repository.clone());
    (service, repository)
}

pub(super) fn suggested(amount: f64) -> LoanRecord {
    LoanRecord::open()
        .suggest(Some(amount))
        .expect("inactive loans accept a positive suggestion")
}

pub(super) fn approved() -> LoanRecord {
    suggested(500.0).approve().expect("suggested loans approve")
}

pub(super) fn rejected() -> LoanRecord {
    suggested(500.0).reject().expect("suggested loans reject")
}

pub(super) fn approval_router_with_service(
    service: LoanApprovalService<MemoryRepository>,
) -> axum::Router {
    approval_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
