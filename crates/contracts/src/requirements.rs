//! Requirements contract.
//!
//! Requirements are keyed under the `requirements` namespace by asset id plus
//! a unique suffix, so every requirements set of one asset shares a key prefix.
//! Requirements changes emit no events.

use tracing::Span;

use chainmetric_core::{Document, Entity, Validate};
use chainmetric_ledger::Ledger;
use chainmetric_models::Requirements;

use crate::admin::AdminCapability;
use crate::error::{ContractError, ContractResult};
use crate::keys::{KeyScheme, SuffixGenerator, TimeOrderedSuffix};
use crate::{notify, repository};

#[derive(Debug)]
pub struct RequirementsRepository<L, G = TimeOrderedSuffix> {
    ledger: L,
    keys: KeyScheme<G>,
    admin: Option<AdminCapability>,
    span: Span,
}

impl<L: Ledger> RequirementsRepository<L> {
    pub fn new(ledger: L) -> Self {
        Self::with_key_scheme(ledger, KeyScheme::default())
    }
}

impl<L, G> RequirementsRepository<L, G>
where
    L: Ledger,
    G: SuffixGenerator,
{
    pub fn with_key_scheme(ledger: L, keys: KeyScheme<G>) -> Self {
        Self {
            ledger,
            keys,
            admin: None,
            span: tracing::info_span!("contract", name = "requirements"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_admin(mut self, admin: Option<AdminCapability>) -> Self {
        self.admin = admin;
        self
    }

    pub fn admin(&self) -> Option<AdminCapability> {
        self.admin
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn retrieve(&self, id: &str) -> ContractResult<Requirements> {
        let _entered = self.span.enter();
        repository::retrieve(&self.ledger, id)
    }

    /// Every requirements record in this contract's state.
    pub fn list_all(&self) -> ContractResult<Vec<Requirements>> {
        let _entered = self.span.enter();
        let iter = self
            .ledger
            .state_by_range("", "")
            .inspect_err(|err| tracing::error!(error = %err, "failed to read from world state"))?;

        Ok(repository::collect(iter))
    }

    /// Requirements attached to one asset. The scan is always scoped to the
    /// asset's key prefix, so an empty asset id matches nothing.
    pub fn list_for_asset(&self, asset_id: &str) -> ContractResult<Vec<Requirements>> {
        let _entered = self.span.enter();

        let iter = self
            .ledger
            .state_by_partial_composite_key(Requirements::NAMESPACE, &[asset_id])
            .inspect_err(|err| {
                tracing::error!(asset_id = %asset_id, error = %err, "failed to read from world state");
            })?;

        Ok(repository::collect(iter))
    }

    /// Stores a new requirements record and returns its id.
    ///
    /// A fresh id is always minted under the record's asset; an id carried by
    /// the payload is discarded.
    pub fn insert(&self, payload: &[u8]) -> ContractResult<String> {
        let _entered = self.span.enter();

        let mut requirements = Requirements::decode(payload).map_err(|err| {
            tracing::warn!(error = %err, "failed to deserialize request");
            ContractError::Deserialization(err)
        })?;

        requirements
            .validate()
            .map_err(|err| ContractError::validation(Requirements::KIND, err))?;

        let id = self
            .keys
            .mint(&self.ledger, Requirements::NAMESPACE, &[requirements.asset_id.as_str()])
            .inspect_err(|err| tracing::error!(error = %err, "failed to generate composite key"))?;
        requirements.assign_id(id);

        notify::save(&self.ledger, &requirements, &[])
            .inspect_err(|err| tracing::error!(error = %err, "failed saving requirements"))?;

        tracing::info!(
            id = %requirements.id.escape_debug(),
            asset_id = %requirements.asset_id,
            metrics = requirements.metrics.len(),
            "requirements inserted"
        );
        Ok(requirements.id)
    }

    pub fn exists(&self, id: &str) -> ContractResult<bool> {
        let _entered = self.span.enter();
        repository::exists(&self.ledger, id)
    }

    pub fn remove(&self, id: &str) -> ContractResult<()> {
        let _entered = self.span.enter();
        repository::remove::<Requirements, _>(&self.ledger, id)
    }

    /// Removes every record in this contract's state, continuing past
    /// per-record failures. Returns the number of records removed.
    pub fn remove_all(&self, _admin: &AdminCapability) -> ContractResult<usize> {
        let _entered = self.span.enter();

        let iter = self
            .ledger
            .state_by_range("", "")
            .inspect_err(|err| tracing::error!(error = %err, "failed to read from world state"))?;

        let removed = repository::purge(&self.ledger, iter, |_| {});

        tracing::warn!(removed, "removed all requirements");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmetric_ledger::{Faults, InMemoryLedger, LedgerError, StateStore};
    use chainmetric_models::{Metric, Requirement};
    use std::sync::Arc;

    fn repo() -> RequirementsRepository<Arc<InMemoryLedger>> {
        RequirementsRepository::new(InMemoryLedger::arc())
    }

    fn insert(repo: &RequirementsRepository<Arc<InMemoryLedger>>, asset: &str) -> String {
        let requirements = Requirements::for_asset(asset)
            .with(Metric::TEMPERATURE, Requirement::between(2.0, 8.0));
        repo.insert(&requirements.encode()).unwrap()
    }

    #[test]
    fn insert_assigns_an_id_under_the_asset_prefix() {
        let repo = repo();
        let id = insert(&repo, "A1");

        let prefix = crate::keys::key_prefix("requirements", &["A1"]).unwrap();
        assert!(id.starts_with(&prefix));

        let stored = repo.retrieve(&id).unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.asset_id, "A1");
        assert_eq!(
            stored.get(Metric::TEMPERATURE),
            Some(&Requirement::between(2.0, 8.0))
        );
    }

    #[test]
    fn insert_discards_caller_supplied_id() {
        let repo = repo();
        let id = repo
            .insert(br#"{"id":"chosen","asset_id":"A1","metrics":{}}"#)
            .unwrap();

        assert_ne!(id, "chosen");
        assert!(!repo.exists("chosen").unwrap());
        assert!(repo.exists(&id).unwrap());
    }

    #[test]
    fn insert_emits_no_events() {
        let repo = repo();
        insert(&repo, "A1");
        assert!(repo.ledger().events().is_empty());
    }

    #[test]
    fn insert_rejects_inverted_bounds() {
        let repo = repo();
        let err = repo
            .insert(br#"{"asset_id":"A1","metrics":{"temp":{"minThreshold":9,"maxThreshold":1}}}"#)
            .unwrap_err();

        assert!(matches!(err, ContractError::Validation { kind: "requirement", .. }));
        assert!(repo.ledger().is_empty());
    }

    #[test]
    fn insert_rejects_malformed_payload() {
        let repo = repo();
        assert!(matches!(
            repo.insert(b"").unwrap_err(),
            ContractError::Deserialization(_)
        ));
    }

    #[test]
    fn list_for_asset_is_scoped_to_the_asset() {
        let repo = repo();
        let a1 = [insert(&repo, "A1"), insert(&repo, "A1")];
        insert(&repo, "A2");
        insert(&repo, "A10");

        let mut listed: Vec<String> = repo
            .list_for_asset("A1")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        listed.sort();
        let mut expected = a1.to_vec();
        expected.sort();

        assert_eq!(listed, expected);
        assert!(repo.list_for_asset("").unwrap().is_empty());
        assert!(repo.list_for_asset("A3").unwrap().is_empty());
    }

    #[test]
    fn empty_asset_lookup_stays_inside_its_prefix() {
        let repo = repo();
        insert(&repo, "A1");
        insert(&repo, "A2");

        let listed = repo.list_for_asset("").unwrap();

        let prefix = crate::keys::key_prefix("requirements", &[""]).unwrap();
        assert!(listed.iter().all(|r| r.id.starts_with(&prefix)));
        assert!(listed.is_empty());
        assert_eq!(repo.ledger().open_cursors(), 0);
    }

    #[test]
    fn list_all_returns_every_record() {
        let repo = repo();
        insert(&repo, "A1");
        insert(&repo, "A2");

        assert_eq!(repo.list_all().unwrap().len(), 2);
        assert_eq!(repo.ledger().open_cursors(), 0);
    }

    #[test]
    fn list_all_propagates_scan_failure() {
        let repo = repo();
        repo.ledger().inject(Faults {
            scans: Some(LedgerError::Unavailable("peer down".to_string())),
            ..Faults::default()
        });

        assert!(matches!(
            repo.list_all().unwrap_err(),
            ContractError::Store(LedgerError::Unavailable(_))
        ));
    }

    #[test]
    fn remove_then_retrieve_is_not_found() {
        let repo = repo();
        let id = insert(&repo, "A1");

        repo.remove(&id).unwrap();

        assert!(!repo.exists(&id).unwrap());
        assert!(repo.retrieve(&id).unwrap_err().is_not_found());
        assert!(repo.remove(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn remove_all_clears_everything() {
        let repo = repo();
        insert(&repo, "A1");
        insert(&repo, "A2");
        repo.ledger().put_state("stray", b"not json").unwrap();

        let removed = repo.remove_all(&AdminCapability::grant()).unwrap();

        assert_eq!(removed, 3);
        assert!(repo.ledger().is_empty());
    }
}
