//! Data source serving values from an in-memory table
//!
//! Used by nodes fed from an external pipeline and by tests.

use crate::error::DataSourceError;
use crate::ports::outbound::{DataSource, DataSourceOpts};
use async_trait::async_trait;
use llo_types::{StreamId, StreamValue, StreamValues};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    values: RwLock<HashMap<StreamId, StreamValue>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, stream_id: StreamId, value: StreamValue) {
        self.values.write().insert(stream_id, value);
    }

    pub fn remove(&self, stream_id: StreamId) {
        self.values.write().remove(&stream_id);
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn observe(
        &self,
        stream_values: &mut StreamValues,
        opts: &DataSourceOpts,
    ) -> Result<(), DataSourceError> {
        let values = self.values.read();
        let mut missing = 0usize;
        for (stream_id, slot) in stream_values.iter_mut() {
            *slot = values.get(stream_id).copied();
            if slot.is_none() {
                missing += 1;
            }
        }
        if opts.verbose_logging {
            debug!(
                seq_nr = opts.seq_nr,
                requested = stream_values.len(),
                missing,
                "[llo] Observed stream values"
            );
        }
        Ok(())
    }
}
