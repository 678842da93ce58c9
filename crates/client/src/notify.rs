//! Toast notifications.
//!
//! Stores report user-visible events (item added, logged out, errors) as
//! transient toasts. The UI drains the queue and renders them; nothing in
//! this crate blocks on a toast being seen.

/// A transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Ordered queue of pending toasts.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    pending: Vec<Toast>,
}

impl Toasts {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a toast.
    pub fn push(&mut self, message: impl Into<String>) {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Toast {
            id,
            message: message.into(),
        });
    }

    /// Pending toasts, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[Toast] {
        &self.pending
    }

    /// Remove a displayed toast by id. Idempotent.
    pub fn dismiss(&mut self, id: u64) {
        self.pending.retain(|toast| toast.id != id);
    }

    /// Take all pending toasts, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut toasts = Toasts::new();
        toasts.push("Welcome back, Ada!");
        toasts.push("You have been logged out.");

        let drained = toasts.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "Welcome back, Ada!");
        assert!(toasts.pending().is_empty());
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut toasts = Toasts::new();
        toasts.push("one");
        let id = toasts.pending()[0].id;
        toasts.dismiss(id);
        toasts.dismiss(id);
        assert!(toasts.pending().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut toasts = Toasts::new();
        toasts.push("a");
        toasts.push("b");
        let ids: Vec<u64> = toasts.pending().iter().map(|t| t.id).collect();
        assert_ne!(ids[0], ids[1]);
    }
}
