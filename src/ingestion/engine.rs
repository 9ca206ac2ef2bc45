//! Merges a ranked batch of candidates into the album store.

use crate::album_store::{AlbumStore, Category, StoreError};
use crate::feed::Candidate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Outcome of one reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub created: usize,
    pub updated: usize,
    pub demoted: usize,
}

#[derive(Clone)]
pub struct ReconciliationEngine {
    store: Arc<dyn AlbumStore>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn AlbumStore>) -> Self {
        Self { store }
    }

    /// Apply `candidates` as the new chart, all or nothing.
    ///
    /// Every candidate is upserted as top with its rank and categories;
    /// top albums missing from the batch are demoted but keep every other
    /// field. Nothing is deleted, including categories that end up unused.
    /// Any error drops the open transaction, which rolls the whole batch back.
    pub fn reconcile(&self, candidates: &[Candidate]) -> Result<ReconciliationResult, StoreError> {
        let batch_ids: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        let mut result = ReconciliationResult::default();

        let mut tx = self.store.begin_write()?;

        for candidate in candidates {
            if tx.get_album(&candidate.id)?.is_some() {
                result.updated += 1;
            } else {
                result.created += 1;
            }
            tx.upsert_album(&candidate.to_album())?;

            let mut categories: Vec<Category> = Vec::with_capacity(candidate.categories.len());
            for name in &candidate.categories {
                if categories.iter().any(|c| &c.name == name) {
                    continue;
                }
                categories.push(tx.get_or_create_category(name)?);
            }
            tx.set_album_categories(&candidate.id, &categories)?;
            debug!(
                "Upserted album {} at rank {} with {} categories",
                candidate.id,
                candidate.rank,
                categories.len()
            );
        }

        for id in tx.top_album_ids()? {
            if !batch_ids.contains(id.as_str()) {
                tx.set_album_top_flag(&id, false)?;
                debug!("Demoted album {}", id);
                result.demoted += 1;
            }
        }

        tx.commit()?;
        Ok(result)
    }
}
