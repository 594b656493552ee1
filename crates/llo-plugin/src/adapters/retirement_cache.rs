//! In-memory retirement report cache
//!
//! One instance is shared (behind an `Arc`) by a retiring protocol instance
//! and its successor. Entries are write-once per config digest.

use crate::domain::{AttestedRetirementReport, RetirementReport};
use crate::error::RetirementError;
use crate::ports::outbound::PredecessorRetirementReportCache;
use llo_types::ConfigDigest;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct InMemoryRetirementReportCache {
    reports: RwLock<HashMap<ConfigDigest, Vec<u8>>>,
}

impl InMemoryRetirementReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the attested retirement report of `config_digest`
    ///
    /// A retired instance emits the same report every round, so identical
    /// rewrites succeed. A different payload for a stored digest is rejected.
    pub fn store_attested_retirement_report(
        &self,
        config_digest: ConfigDigest,
        attested_retirement_report: Vec<u8>,
    ) -> Result<(), RetirementError> {
        let mut reports = self.reports.write();
        match reports.get(&config_digest) {
            Some(existing) if *existing == attested_retirement_report => Ok(()),
            Some(_) => {
                warn!(
                    %config_digest,
                    "[llo] Rejected conflicting attested retirement report"
                );
                Err(RetirementError::ConflictingWrite { config_digest })
            }
            None => {
                info!(
                    %config_digest,
                    len = attested_retirement_report.len(),
                    "[llo] Stored attested retirement report"
                );
                reports.insert(config_digest, attested_retirement_report);
                Ok(())
            }
        }
    }
}

impl PredecessorRetirementReportCache for InMemoryRetirementReportCache {
    fn attested_retirement_report(
        &self,
        predecessor_config_digest: ConfigDigest,
    ) -> Result<Vec<u8>, RetirementError> {
        self.reports
            .read()
            .get(&predecessor_config_digest)
            .cloned()
            .ok_or(RetirementError::NotYetAvailable {
                config_digest: predecessor_config_digest,
            })
    }

    fn check_attested_retirement_report(
        &self,
        predecessor_config_digest: ConfigDigest,
        attested_retirement_report: &[u8],
    ) -> Result<RetirementReport, RetirementError> {
        let malformed = |reason: String| RetirementError::Malformed {
            len: attested_retirement_report.len(),
            reason,
        };

        let attested = AttestedRetirementReport::decode(attested_retirement_report)
            .map_err(|e| malformed(e.to_string()))?;
        if attested.config_digest != predecessor_config_digest {
            return Err(RetirementError::DigestMismatch {
                expected: predecessor_config_digest,
                actual: attested.config_digest,
            });
        }
        RetirementReport::decode(&attested.retirement_report).map_err(|e| malformed(e.to_string()))
    }
}
