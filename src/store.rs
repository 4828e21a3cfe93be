//! Inventory synchronization store.
//!
//! Single owner of the in-memory inventory list. Every mutation path (the
//! add-item form, the scan flow, in-list increment/decrement) goes through
//! this store; nothing else replaces or edits records.
//!
//! Consistency policy: per-record mutations are last-responder-wins. A
//! response arriving later overwrites local state regardless of when its
//! request was issued. The per-id in-flight flag lets callers disable
//! duplicate controls while a mutation is outstanding, which bounds - but
//! does not eliminate - that race.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::api::{ApiClient, ApiError};
use crate::model::{InventoryRecord, ItemUpdate};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Rejected locally; no request was issued.
    #[error("Quantity cannot be negative")]
    NegativeQuantity,
    /// Rejected locally; no request was issued.
    #[error("No inventory record with id '{0}'")]
    UnknownRecord(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Authoritative in-memory inventory list plus the remote mutations that
/// keep it in sync.
///
/// The locks guard only short synchronous sections and are never held
/// across an await, so concurrent operations interleave at their network
/// suspension points exactly as the consistency policy above describes.
pub struct InventoryStore {
    client: ApiClient,
    items: Mutex<Vec<InventoryRecord>>,
    in_flight: Mutex<HashSet<String>>,
}

impl InventoryStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            items: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Snapshot of the current list, in server order.
    pub fn items(&self) -> Vec<InventoryRecord> {
        self.items.lock().expect("inventory lock poisoned").clone()
    }

    /// Look up a single record by id.
    pub fn get(&self, id: &str) -> Option<InventoryRecord> {
        self.items
            .lock()
            .expect("inventory lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Whether a quantity mutation for `id` is currently outstanding.
    /// Callers use this to disable duplicate actions; it is a hint, not a
    /// lock.
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight lock poisoned")
            .contains(id)
    }

    /// Fetch the full list from the API and replace local state wholesale.
    ///
    /// Concurrent refreshes are allowed; the last response to arrive wins.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let fetched = self.client.fetch_items().await?;
        log::debug!("Refreshed inventory: {} records", fetched.len());
        *self.items.lock().expect("inventory lock poisoned") = fetched;
        Ok(())
    }

    /// Set the quantity of `id` to `new_quantity` via the remote API.
    ///
    /// Unknown ids are rejected locally without a network call. On success
    /// the local record is replaced with the server's returned
    /// representation - the server is authoritative for every field, not
    /// just the requested quantity. On failure the local record is left
    /// unchanged and the error is surfaced without any automatic retry.
    pub async fn mutate_quantity(
        &self,
        id: &str,
        new_quantity: u32,
    ) -> Result<InventoryRecord, StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::UnknownRecord(id.to_string()));
        }

        // Cleared when this operation resolves, or when its future is
        // dropped by a caller that went away mid-flight.
        let _flag = InFlightFlag::mark(&self.in_flight, id);

        let update = ItemUpdate {
            quantity: new_quantity,
            location: None,
        };
        let result = self.client.update_item(id, &update).await;

        match result {
            Ok(record) => {
                self.apply_server_record(record.clone());
                Ok(record)
            }
            Err(e) => {
                log::warn!("Quantity update for '{}' failed: {}", id, e);
                Err(e.into())
            }
        }
    }

    /// Signed entry point for externally supplied quantities. A negative
    /// value is rejected locally; no request is issued and local state is
    /// unchanged.
    pub async fn mutate_quantity_signed(
        &self,
        id: &str,
        new_quantity: i64,
    ) -> Result<InventoryRecord, StoreError> {
        if new_quantity < 0 {
            return Err(StoreError::NegativeQuantity);
        }
        self.mutate_quantity(id, new_quantity as u32).await
    }

    /// Increase the quantity of `id` by one, from the last known local
    /// value.
    pub async fn increment(&self, id: &str) -> Result<InventoryRecord, StoreError> {
        let current = self
            .get(id)
            .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))?;
        self.mutate_quantity(id, current.quantity.saturating_add(1))
            .await
    }

    /// Decrease the quantity of `id` by one, from the last known local
    /// value. Returns `Ok(None)` without a network call when the quantity
    /// is already 0.
    pub async fn decrement(&self, id: &str) -> Result<Option<InventoryRecord>, StoreError> {
        let current = self
            .get(id)
            .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))?;
        if current.quantity == 0 {
            return Ok(None);
        }
        self.mutate_quantity(id, current.quantity - 1)
            .await
            .map(Some)
    }

    /// Case-insensitive substring search over the list as currently held.
    /// Purely local; never touches the network.
    pub fn filter(&self, query: &str) -> Vec<InventoryRecord> {
        filter_records(&self.items.lock().expect("inventory lock poisoned"), query)
    }

    /// Number of records at or below the low-stock threshold, recomputed
    /// from current state on every call.
    pub fn low_stock_count(&self) -> usize {
        self.items
            .lock()
            .expect("inventory lock poisoned")
            .iter()
            .filter(|r| r.is_low_stock())
            .count()
    }

    /// Replace the local record matching the server representation's id.
    /// A record the server knows but the local list doesn't (e.g. created
    /// elsewhere since the last refresh) is appended.
    fn apply_server_record(&self, record: InventoryRecord) {
        let mut items = self.items.lock().expect("inventory lock poisoned");
        match items.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => items.push(record),
        }
    }
}

/// Marks a record id as having an outstanding mutation for as long as the
/// guard lives.
struct InFlightFlag<'a> {
    flags: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlightFlag<'a> {
    fn mark(flags: &'a Mutex<HashSet<String>>, id: &str) -> Self {
        flags
            .lock()
            .expect("in-flight lock poisoned")
            .insert(id.to_string());
        Self {
            flags,
            id: id.to_string(),
        }
    }
}

impl Drop for InFlightFlag<'_> {
    fn drop(&mut self) {
        if let Ok(mut flags) = self.flags.lock() {
            flags.remove(&self.id);
        }
    }
}

/// Filter records by a case-insensitive substring match over name and
/// category. An empty query returns the input unchanged and in order.
pub fn filter_records(records: &[InventoryRecord], query: &str) -> Vec<InventoryRecord> {
    if query.is_empty() {
        return records.to_vec();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.category.as_str().contains(&needle)
        })
        .cloned()
        .collect()
}
