//! Capability gates
//!
//! Optional validation modules are switched on or off through
//! [`cs_core::Capabilities`]. An operation that needs a disabled module
//! fails instead of skipping the validation.

use crate::error::{EngineError, EngineResult};
use cs_core::Capabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Mbql,
    CardParameters,
}

impl Capability {
    fn enabled_in(self, capabilities: &Capabilities) -> bool {
        match self {
            Capability::Mbql => capabilities.mbql,
            Capability::CardParameters => capabilities.card_parameters,
        }
    }

    fn unavailable(self) -> EngineError {
        let (error, message) = match self {
            Capability::Mbql => (
                "MBQL functionality not available",
                "MBQL validation is disabled (capabilities.mbql)",
            ),
            Capability::CardParameters => (
                "Card parameters functionality not available",
                "Card parameter processing is disabled (capabilities.card_parameters)",
            ),
        };
        EngineError::UnavailableCapability {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Fail with an unavailable-capability error unless `capability` is enabled
pub fn require(capabilities: &Capabilities, capability: Capability) -> EngineResult<()> {
    if capability.enabled_in(capabilities) {
        Ok(())
    } else {
        log::warn!("{:?} capability requested but disabled", capability);
        Err(capability.unavailable())
    }
}
