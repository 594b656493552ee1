//! Channel definition cache holding the desired configuration in memory
//!
//! Whatever process tracks the on-chain configuration pushes new snapshots
//! through `set_definitions`; rounds read the latest one.

use crate::ports::outbound::ChannelDefinitionCache;
use llo_types::ChannelDefinitions;
use parking_lot::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct StaticChannelDefinitionCache {
    definitions: RwLock<ChannelDefinitions>,
}

impl StaticChannelDefinitionCache {
    pub fn new(definitions: ChannelDefinitions) -> Self {
        Self {
            definitions: RwLock::new(definitions),
        }
    }

    /// Replace the desired configuration
    pub fn set_definitions(&self, definitions: ChannelDefinitions) {
        debug!(
            channels = definitions.len(),
            "[llo] Channel definition cache updated"
        );
        *self.definitions.write() = definitions;
    }
}

impl ChannelDefinitionCache for StaticChannelDefinitionCache {
    fn definitions(&self) -> ChannelDefinitions {
        self.definitions.read().clone()
    }
}
