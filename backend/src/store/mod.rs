//! Invoice Store (C4, spec §4.1): the primary invoice map plus the two
//! indexes the kernel's pre-checks query — content-hash uniqueness
//! (invariant 005) and per-supplier hourly rate limiting (invariant 006).

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::models::invoice::Invoice;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no invoice with id {0}")]
    NotFound(String),
    #[error("content hash {0} already exists")]
    DuplicateContentHash(String),
}

/// Invoices keyed by id, with a content-hash index and a per-supplier
/// sliding log of creation timestamps for rate limiting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceStore {
    by_id: HashMap<String, Invoice>,
    by_content_hash: HashMap<String, String>,
    creation_log: HashMap<String, Vec<i64>>,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Invoice> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Invoice> {
        self.by_id.get_mut(id)
    }

    /// Invariant 005: no two invoices may share a content hash.
    pub fn has_content_hash(&self, content_hash: &str) -> bool {
        self.by_content_hash.contains_key(content_hash)
    }

    pub fn insert(&mut self, invoice: Invoice) -> Result<(), StoreError> {
        if self.has_content_hash(invoice.content_hash()) {
            return Err(StoreError::DuplicateContentHash(invoice.content_hash().to_string()));
        }
        self.by_content_hash
            .insert(invoice.content_hash().to_string(), invoice.id().to_string());
        self.creation_log
            .entry(invoice.supplier_id().to_string())
            .or_default()
            .push(invoice.created_at());
        self.by_id.insert(invoice.id().to_string(), invoice);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Invoice, StoreError> {
        let invoice = self.by_id.remove(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.by_content_hash.remove(invoice.content_hash());
        Ok(invoice)
    }

    /// Invariant 006: count of invoices the supplier created in the hour
    /// ending at `now`.
    pub fn invoices_in_last_hour(&self, supplier_id: &str, now: i64) -> usize {
        self.creation_log
            .get(supplier_id)
            .map(|log| log.iter().filter(|&&t| now - t < 3600).count())
            .unwrap_or(0)
    }

    pub fn rate_limit_ok(&self, supplier_id: &str, now: i64, max_per_hour: usize) -> bool {
        self.invoices_in_last_hour(supplier_id, now) < max_per_hour
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invoice> {
        self.by_id.values()
    }
}
