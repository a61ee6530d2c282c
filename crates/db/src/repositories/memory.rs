use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use proposer_core::domain::client::{ClientFilter, ClientId, ClientRecord, ClientStatus, NewClient};
use proposer_core::domain::follow_up::{FollowUpId, FollowUpRecord, NewFollowUp};
use proposer_core::domain::proposal::{NewProposal, ProposalId, ProposalRecord};

use super::{
    ClientRepository, FollowUpRepository, ProposalRepository, RepositoryError, StatusChange,
};

/// Rows keyed by id; ids start at 1 and are never reused, like SQLite `AUTOINCREMENT`.
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { next_id: 1, rows: BTreeMap::new() }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: RwLock<Table<ClientRecord>>,
}

#[async_trait::async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn insert(
        &self,
        client: NewClient,
        now: DateTime<Utc>,
    ) -> Result<ClientRecord, RepositoryError> {
        let mut clients = self.clients.write().await;
        let id = clients.allocate();
        let record = ClientRecord::from_new(ClientId(id), client, now);
        clients.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: ClientId) -> Result<Option<ClientRecord>, RepositoryError> {
        let clients = self.clients.read().await;
        Ok(clients.rows.get(&id.0).cloned())
    }

    async fn list(&self, filter: &ClientFilter) -> Result<Vec<ClientRecord>, RepositoryError> {
        let clients = self.clients.read().await;
        Ok(clients.rows.values().filter(|record| filter.matches(record)).cloned().collect())
    }

    async fn update_status(
        &self,
        id: ClientId,
        status: ClientStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>, RepositoryError> {
        let mut clients = self.clients.write().await;
        let Some(record) = clients.rows.get_mut(&id.0) else {
            return Ok(None);
        };

        let previous_status = record.status;
        record.status = status;
        if note.is_some() {
            record.notes = note;
        }
        record.updated_at = now;

        Ok(Some(StatusChange { previous_status, client: record.clone() }))
    }
}

#[derive(Default)]
pub struct InMemoryProposalRepository {
    proposals: RwLock<Table<ProposalRecord>>,
}

#[async_trait::async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn insert(
        &self,
        proposal: NewProposal,
        now: DateTime<Utc>,
    ) -> Result<ProposalRecord, RepositoryError> {
        let mut proposals = self.proposals.write().await;
        let id = proposals.allocate();
        let record = ProposalRecord::from_new(ProposalId(id), proposal, now);
        proposals.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: ProposalId) -> Result<Option<ProposalRecord>, RepositoryError> {
        let proposals = self.proposals.read().await;
        Ok(proposals.rows.get(&id.0).cloned())
    }

    async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ProposalRecord>, RepositoryError> {
        let proposals = self.proposals.read().await;
        Ok(proposals.rows.values().filter(|p| p.client_id == client_id).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryFollowUpRepository {
    follow_ups: RwLock<Table<FollowUpRecord>>,
}

#[async_trait::async_trait]
impl FollowUpRepository for InMemoryFollowUpRepository {
    async fn insert(
        &self,
        follow_up: NewFollowUp,
        now: DateTime<Utc>,
    ) -> Result<FollowUpRecord, RepositoryError> {
        let mut follow_ups = self.follow_ups.write().await;
        let id = follow_ups.allocate();
        let record = FollowUpRecord::from_new(FollowUpId(id), follow_up, now);
        follow_ups.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<FollowUpRecord>, RepositoryError> {
        let follow_ups = self.follow_ups.read().await;
        let mut listed: Vec<FollowUpRecord> =
            follow_ups.rows.values().filter(|f| f.client_id == client_id).cloned().collect();
        listed.sort_by_key(|f| (f.scheduled_for, f.id.0));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use proposer_core::domain::client::{
        ClientFacts, ClientFilter, ClientId, ClientStatus, NewClient, Region,
    };
    use proposer_core::domain::follow_up::{FollowUpKind, NewFollowUp};
    use proposer_core::domain::plan::PlanId;
    use proposer_core::domain::proposal::NewProposal;
    use proposer_core::domain::segment::SegmentId;

    use crate::repositories::{
        ClientRepository, FollowUpRepository, InMemoryClientRepository,
        InMemoryFollowUpRepository, InMemoryProposalRepository, ProposalRepository,
    };

    fn client(company_name: &str, segment: SegmentId) -> NewClient {
        NewClient {
            facts: ClientFacts {
                company_name: company_name.to_string(),
                contact_name: "Ana".to_string(),
                contact_role: None,
                employee_count: 40,
                region: Region::Americas,
                segment,
                pain_points: Vec::new(),
                requirements: Vec::new(),
            },
            email: "ana@example.com".to_string(),
            phone: None,
            status: ClientStatus::Lead,
        }
    }

    #[tokio::test]
    async fn client_repository_assigns_ids_and_filters() {
        let repo = InMemoryClientRepository::default();
        let now = Utc::now();

        let first = repo.insert(client("Acme", SegmentId::Small), now).await.expect("insert");
        let second = repo.insert(client("Globex", SegmentId::Large), now).await.expect("insert");
        assert_eq!(first.id, ClientId(1));
        assert_eq!(second.id, ClientId(2));

        let large = ClientFilter { segment: Some(SegmentId::Large), ..ClientFilter::default() };
        assert_eq!(repo.list(&large).await.expect("list"), vec![second.clone()]);
        assert_eq!(repo.list(&ClientFilter::default()).await.expect("list").len(), 2);
        assert_eq!(repo.find_by_id(ClientId(3)).await.expect("find"), None);
    }

    #[tokio::test]
    async fn status_update_reports_previous_status() {
        let repo = InMemoryClientRepository::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).single().expect("time");
        let later = now + Duration::hours(4);
        let created = repo.insert(client("Acme", SegmentId::Small), now).await.expect("insert");

        let change = repo
            .update_status(created.id, ClientStatus::Qualified, Some("Budget confirmed".into()), later)
            .await
            .expect("update")
            .expect("client exists");
        assert_eq!(change.previous_status, ClientStatus::Lead);
        assert_eq!(change.client.status, ClientStatus::Qualified);
        assert_eq!(change.client.notes.as_deref(), Some("Budget confirmed"));
        assert_eq!(change.client.updated_at, later);

        let kept = repo
            .update_status(created.id, ClientStatus::Proposal, None, later)
            .await
            .expect("update")
            .expect("client exists");
        assert_eq!(kept.client.notes.as_deref(), Some("Budget confirmed"));

        let missing =
            repo.update_status(ClientId(42), ClientStatus::ClosedWon, None, later).await.expect("update");
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn proposals_and_follow_ups_are_scoped_to_client() {
        let proposals = InMemoryProposalRepository::default();
        let follow_ups = InMemoryFollowUpRepository::default();
        let now = Utc::now();

        let proposal = proposals
            .insert(
                NewProposal {
                    client_id: ClientId(1),
                    plan: PlanId::Starter,
                    unit_count: 40,
                    discount_pct: Decimal::ZERO,
                    unit_price_after_discount: Decimal::new(250, 2),
                    total_price: Decimal::from(100),
                    validity_days: 30,
                    notes: None,
                    html: "<html></html>".to_string(),
                },
                now,
            )
            .await
            .expect("insert");
        assert_eq!(proposals.list_for_client(ClientId(1)).await.expect("list"), vec![proposal]);
        assert!(proposals.list_for_client(ClientId(2)).await.expect("list").is_empty());

        let late = NewFollowUp::schedule(ClientId(1), FollowUpKind::Email, 10, None, now)
            .expect("valid delay");
        let soon = NewFollowUp::schedule(ClientId(1), FollowUpKind::Call, 2, None, now)
            .expect("valid delay");
        let late = follow_ups.insert(late, now).await.expect("insert");
        let soon = follow_ups.insert(soon, now).await.expect("insert");
        assert_eq!(follow_ups.list_for_client(ClientId(1)).await.expect("list"), vec![soon, late]);
    }
}
