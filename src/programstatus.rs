use std::sync::{Arc, PoisonError, RwLock};

pub const NO_PROGRAM: &str = "none";

/// Name of the program currently driving the strip, shared between the
/// engine thread (sole writer) and status queries. Readers may see a value
/// that is a frame or two stale.
#[derive(Clone)]
pub struct ProgramStatus {
    current: Arc<RwLock<&'static str>>,
}

impl ProgramStatus {
    pub fn new() -> ProgramStatus {
        ProgramStatus {
            current: Arc::new(RwLock::new(NO_PROGRAM)),
        }
    }

    pub fn current(&self) -> &'static str {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publish(&self, name: &'static str) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = name;
    }

    pub(crate) fn clear(&self) {
        self.publish(NO_PROGRAM);
    }
}
