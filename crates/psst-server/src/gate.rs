/// Access gate: the local "is this code paid for" decision.
///
/// Entitlement is keyed by industry code, not by an authenticated user — a
/// known limitation inherited from the product's storage layout. Every
/// caller goes through this type over the `StateStore` seam, so a user-keyed
/// database backend can replace the file store without touching call sites.
///
/// The gate never errors toward the user: an unavailable or corrupt store
/// reads as "not paid" (fail closed), logged at warn level.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use navi_common::store::StateStore;

/// The single storage key holding the JSON map from industry code to record.
const STORAGE_KEY: &str = "psst_payment_status";

/// 결제 금액 (고정, KRW)
pub const PAYMENT_AMOUNT_KRW: u32 = 39_000;
/// 주문명
pub const ORDER_NAME: &str = "나랏돈네비 2026 합격 리포트 (1회권)";

/// Per-code payment state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

pub struct AccessGate {
    store: StateStore,
}

impl AccessGate {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Mark `code` as paid now with the given transaction id. Idempotent:
    /// a re-invocation overwrites the prior record, keeping the latest
    /// transaction id. Returns `false` when the store rejected the write.
    pub fn record_payment(&self, code: &str, transaction_id: &str) -> bool {
        let mut map = self.read_map();
        map.insert(
            code.to_string(),
            AccessRecord {
                is_paid: true,
                payment_date: Some(Utc::now()),
                transaction_id: Some(transaction_id.to_string()),
            },
        );
        self.write_map(&map)
    }

    /// Purely local trust decision; actual payment verification happened at
    /// the gateway redirect. Absent record or unreadable store → `false`.
    pub fn is_paid(&self, code: &str) -> bool {
        self.status(code).is_paid
    }

    /// Full record for `code`, or the unpaid default.
    pub fn status(&self, code: &str) -> AccessRecord {
        self.read_map().remove(code).unwrap_or_default()
    }

    /// Delete the access record for `code` (explicit cancel).
    pub fn revoke(&self, code: &str) -> bool {
        let mut map = self.read_map();
        if map.remove(code).is_none() {
            return true;
        }
        self.write_map(&map)
    }

    fn read_map(&self) -> BTreeMap<String, AccessRecord> {
        let Some(raw) = self.store.get(STORAGE_KEY) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "payment state corrupt, treating all codes as unpaid");
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, AccessRecord>) -> bool {
        let json = match serde_json::to_string(map) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "payment state serialization failed");
                return false;
            }
        };
        let ok = self.store.set(STORAGE_KEY, &json);
        if !ok {
            warn!("payment state write failed");
        }
        ok
    }
}

/// 주문번호: NAVY_<업종코드>_<밀리초>
pub fn new_order_id(code: &str, now: DateTime<Utc>) -> String {
    format!("NAVY_{}_{}", code, now.timestamp_millis())
}
