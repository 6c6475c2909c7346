//! User-facing failure notices.
//!
//! Every failed cart operation ends with its generic [`Notice`], preceded by
//! [`Notice::OutOfStock`] when stock was the cause. Notices are handed to a
//! [`Notifier`] and hosts decide how to render them.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// The cart operation a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add_product",
            Self::Remove => "remove_product",
            Self::UpdateAmount => "update_product_amount",
        })
    }
}

/// A static, human-readable failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The requested quantity exceeds available stock.
    OutOfStock,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a product's quantity failed.
    UpdateFailed,
}

impl Notice {
    /// The generic failure notice for `operation`.
    #[must_use]
    pub const fn failed(operation: Operation) -> Self {
        match operation {
            Operation::Add => Self::AddFailed,
            Operation::Remove => Self::RemoveFailed,
            Operation::UpdateAmount => Self::UpdateFailed,
        }
    }

    /// The message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Failed to add product",
            Self::RemoveFailed => "Failed to remove product",
            Self::UpdateFailed => "Failed to update product quantity",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives failure notices.
pub trait Notifier: Send + Sync {
    /// Surface `notice` to the user.
    fn notify(&self, notice: Notice);
}

impl<N: Notifier> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Emits notices as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Records notices in memory.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_notice_per_operation() {
        assert_eq!(Notice::failed(Operation::Add), Notice::AddFailed);
        assert_eq!(Notice::failed(Operation::Remove), Notice::RemoveFailed);
        assert_eq!(Notice::failed(Operation::UpdateAmount), Notice::UpdateFailed);
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(
            Notice::OutOfStock.to_string(),
            "Requested quantity is out of stock"
        );
        assert_eq!(Notice::AddFailed.to_string(), "Failed to add product");
    }

    #[test]
    fn test_memory_notifier_clones_share_log() {
        let notifier = MemoryNotifier::new();
        let handle = notifier.clone();
        notifier.notify(Notice::OutOfStock);
        notifier.notify(Notice::RemoveFailed);
        assert_eq!(handle.notices(), vec![Notice::OutOfStock, Notice::RemoveFailed]);
        assert_eq!(notifier.notices(), handle.notices());
    }
}
