//! Should-retire oracle backed by an atomic flag

use crate::error::RetirementError;
use crate::ports::outbound::ShouldRetireCache;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flag flipped by the operator once a successor instance is in place
#[derive(Debug, Default)]
pub struct StaticShouldRetireCache {
    should_retire: AtomicBool,
}

impl StaticShouldRetireCache {
    pub fn new(should_retire: bool) -> Self {
        Self {
            should_retire: AtomicBool::new(should_retire),
        }
    }

    pub fn set_should_retire(&self, should_retire: bool) {
        self.should_retire.store(should_retire, Ordering::SeqCst);
    }
}

impl ShouldRetireCache for StaticShouldRetireCache {
    fn should_retire(&self) -> Result<bool, RetirementError> {
        Ok(self.should_retire.load(Ordering::SeqCst))
    }
}
