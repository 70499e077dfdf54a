use serde::{Deserialize, Serialize};

/// A yes/no prompt guarding a destructive action on at most one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation<T> {
    pending: Option<T>,
}

impl<T> Default for Confirmation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Confirmation<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Stage a target and open the prompt, replacing any earlier target
    pub fn stage(&mut self, target: T) {
        self.pending = Some(target);
    }

    /// Close the prompt and hand back the staged target
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Close the prompt without acting
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }
}
