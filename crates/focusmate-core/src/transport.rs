//! Outbound message delivery.
//!
//! The request path hands replies back to its caller directly; a transport is
//! only needed for messages nobody asked for, such as focus notifications.

use std::sync::{Mutex, PoisonError};

use crate::error::TransportError;
use crate::profile::UserId;
use crate::reply::Reply;

pub trait Transport: Send + Sync {
    fn deliver(&self, user: UserId, reply: Reply) -> Result<(), TransportError>;
}

/// Keeps every delivered reply in order.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    delivered: Mutex<Vec<(UserId, Reply)>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<(UserId, Reply)> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return everything delivered so far.
    pub fn take(&self) -> Vec<(UserId, Reply)> {
        std::mem::take(&mut *self.delivered.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Transport for MemoryTransport {
    fn deliver(&self, user: UserId, reply: Reply) -> Result<(), TransportError> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((user, reply));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::Notification;

    #[test]
    fn memory_transport_records_in_order() {
        let transport = MemoryTransport::new();
        transport
            .deliver(1, Reply::Notification(Notification::WorkComplete))
            .unwrap();
        transport.deliver(2, Reply::TaskPrompt).unwrap();

        let delivered = transport.take();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].0, 1);
        assert_eq!(delivered[1].1, Reply::TaskPrompt);
        assert!(transport.delivered().is_empty());
    }
}
