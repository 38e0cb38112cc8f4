//! Identity provider contract.

use parking_lot::RwLock;

/// Yields the subject of the signed-in principal.
pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_subject(&self) -> Option<String>;
}

/// Identity held in memory, settable at runtime.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    subject: RwLock<Option<String>>,
}

impl StaticIdentity {
    pub fn signed_in(subject: impl Into<String>) -> Self {
        Self {
            subject: RwLock::new(Some(subject.into())),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set(&self, subject: Option<String>) {
        *self.subject.write() = subject;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_subject(&self) -> Option<String> {
        self.subject.read().clone()
    }
}
