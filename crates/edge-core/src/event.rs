//! Readiness events and the tokens that identify registrations.

use std::fmt;

/// User data carried by a readiness registration.
///
/// Connection tokens are slab indices. The top two values are reserved
/// for the listener and the shutdown notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub u64);

impl Token {
    /// Reserved token for the shutdown notifier.
    pub const SHUTDOWN: Token = Token(u64::MAX);
    /// Reserved token for the listening socket.
    pub const LISTENER: Token = Token(u64::MAX - 1);

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Token(idx as u64)
    }

    /// Slab index for connection tokens, `None` for reserved ones.
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.is_reserved() {
            None
        } else {
            Some(self.0 as usize)
        }
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        self == Self::SHUTDOWN || self == Self::LISTENER
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Token::SHUTDOWN => write!(f, "shutdown"),
            Token::LISTENER => write!(f, "listener"),
            Token(n) => write!(f, "conn#{}", n),
        }
    }
}

/// Interest mask for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interest(u8);

impl Interest {
    pub const READABLE: Interest = Interest(0b001);
    /// Edge-triggered mode: notify on transitions to ready only.
    pub const EDGE: Interest = Interest(0b100);

    #[inline]
    pub const fn add(self, other: Interest) -> Interest {
        Interest(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Interest) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_readable(self) -> bool {
        self.contains(Self::READABLE)
    }

    #[inline]
    pub fn is_edge(self) -> bool {
        self.contains(Self::EDGE)
    }
}

impl std::ops::BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest {
        self.add(rhs)
    }
}

/// Condition flags reported for one descriptor by one wait call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Readiness(u8);

impl Readiness {
    pub const EMPTY: Readiness = Readiness(0);
    pub const READABLE: Readiness = Readiness(0b0001);
    pub const ERROR: Readiness = Readiness(0b0100);
    pub const HANGUP: Readiness = Readiness(0b1000);

    #[inline]
    pub const fn with(self, other: Readiness) -> Readiness {
        Readiness(self.0 | other.0)
    }

    #[inline]
    pub fn is_readable(self) -> bool {
        self.0 & Self::READABLE.0 != 0
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self.0 & Self::ERROR.0 != 0
    }

    #[inline]
    pub fn is_hangup(self) -> bool {
        self.0 & Self::HANGUP.0 != 0
    }

    /// Error or hangup reported with nothing left to read.
    #[inline]
    pub fn is_fault_only(self) -> bool {
        (self.is_error() || self.is_hangup()) && !self.is_readable()
    }
}

impl std::ops::BitOr for Readiness {
    type Output = Readiness;

    fn bitor(self, rhs: Readiness) -> Readiness {
        self.with(rhs)
    }
}

/// One entry of an event batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub token: Token,
    pub readiness: Readiness,
}

/// Events produced by a single wait call, in the order the monitor
/// reported them. Reused across iterations; never retained.
#[derive(Debug)]
pub struct EventBatch {
    events: Vec<Event>,
    capacity: usize,
}

impl EventBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of events a single wait may report.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Append an event. Silently drops past capacity; monitors never
    /// ask the kernel for more than `capacity()` events.
    #[inline]
    pub fn push(&mut self, event: Event) {
        if self.events.len() < self.capacity {
            self.events.push(event);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Event> {
        self.events.get(i).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_tokens() {
        assert!(Token::LISTENER.is_reserved());
        assert!(Token::SHUTDOWN.is_reserved());
        assert_eq!(Token::LISTENER.index(), None);
        assert_eq!(Token::from_index(7).index(), Some(7));
        assert_eq!(format!("{}", Token(3)), "conn#3");
    }

    #[test]
    fn test_interest_bits() {
        let i = Interest::READABLE | Interest::EDGE;
        assert!(i.is_readable());
        assert!(i.is_edge());
        assert!(!Interest::READABLE.is_edge());
    }

    #[test]
    fn test_fault_only() {
        assert!(Readiness::HANGUP.is_fault_only());
        assert!(Readiness::ERROR.is_fault_only());
        // Hangup with pending data still drains first.
        assert!(!(Readiness::HANGUP | Readiness::READABLE).is_fault_only());
        assert!(!Readiness::READABLE.is_fault_only());
    }

    #[test]
    fn test_batch_capacity() {
        let mut batch = EventBatch::with_capacity(2);
        for i in 0..4 {
            batch.push(Event { token: Token(i), readiness: Readiness::READABLE });
        }
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get(1).map(|e| e.token), Some(Token(1)));
        batch.clear();
        assert!(batch.is_empty());
    }
}
