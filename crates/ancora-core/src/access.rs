use crate::error::{AccessError, AncoraError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Date layout of the third credential field.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// CredentialRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Trimmed and lower-cased.
    pub identity: String,
    pub access_code: String,
    /// Kept raw; a bad date only locks out the user it belongs to.
    pub expires_on: String,
}

impl CredentialRecord {
    pub fn expiry(&self) -> std::result::Result<NaiveDate, AccessError> {
        NaiveDate::parse_from_str(&self.expires_on, EXPIRY_FORMAT)
            .map_err(|_| AccessError::MalformedExpiry)
    }
}

pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// CredentialRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CredentialRegistry {
    records: HashMap<String, CredentialRecord>,
}

impl CredentialRegistry {
    /// Parse `identity,access_code,YYYY-MM-DD` lines. Lines with fewer than
    /// three fields are skipped; a repeated identity replaces the earlier one.
    pub fn parse(text: &str) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut records = HashMap::new();
        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::debug!(record = index + 1, error = %e, "skipping unreadable credential line");
                    continue;
                }
            };
            if row.len() < 3 {
                tracing::debug!(record = index + 1, fields = row.len(), "skipping short credential line");
                continue;
            }
            let record = CredentialRecord {
                identity: normalize_identity(&row[0]),
                access_code: row[1].to_string(),
                expires_on: row[2].to_string(),
            };
            records.insert(record.identity.clone(), record);
        }
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "credential registry unreadable");
            AncoraError::RegistryUnavailable(e)
        })?;
        let registry = Self::parse(&data);
        tracing::info!(path = %path.display(), users = registry.len(), "credential registry loaded");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<&CredentialRecord> {
        self.records.get(&normalize_identity(identity))
    }

    /// Check an identity/code pair as of `today`. The expiry day itself is
    /// still valid.
    pub fn authenticate(
        &self,
        identity: &str,
        code: &str,
        today: NaiveDate,
    ) -> std::result::Result<(), AccessError> {
        let identity = normalize_identity(identity);
        let code = code.trim();

        let record = match self.records.get(&identity) {
            Some(r) if r.access_code == code => r,
            _ => {
                tracing::info!(identity = %identity, "sign-in refused: invalid credential");
                return Err(AccessError::InvalidCredential);
            }
        };

        let expires_on = record.expiry().inspect_err(|_| {
            tracing::warn!(identity = %identity, raw = %record.expires_on, "malformed expiry date");
        })?;
        if today > expires_on {
            tracing::info!(identity = %identity, %expires_on, "sign-in refused: access expired");
            return Err(AccessError::Expired);
        }

        tracing::info!(identity = %identity, "sign-in accepted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RegistryCache
// ---------------------------------------------------------------------------

/// Memoized registry read. The expiry timestamp is checked on every access;
/// there is no background refresh.
#[derive(Debug)]
pub struct RegistryCache {
    path: PathBuf,
    ttl: Duration,
    cached: Option<CachedRegistry>,
}

#[derive(Debug)]
struct CachedRegistry {
    registry: Arc<CredentialRegistry>,
    expires_at: DateTime<Utc>,
}

impl RegistryCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&mut self) -> Result<Arc<CredentialRegistry>> {
        self.get_at(Utc::now())
    }

    pub fn get_at(&mut self, now: DateTime<Utc>) -> Result<Arc<CredentialRegistry>> {
        if let Some(cached) = &self.cached {
            if now < cached.expires_at {
                return Ok(Arc::clone(&cached.registry));
            }
        }

        // Drop the stale copy first so a failed reload never serves it.
        self.cached = None;
        let registry = Arc::new(CredentialRegistry::load(&self.path)?);
        self.cached = Some(CachedRegistry {
            registry: Arc::clone(&registry),
            expires_at: now + self.ttl,
        });
        Ok(registry)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
