use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::lookup::ResourceKind;

/// One line of user-visible state. Every settled, non-superseded check
/// commits exactly one of these; superseded checks commit none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Checking,
    Exists { key: String, kind: ResourceKind },
    Missing { key: String },
    LookupFailed { key: String },
    InvalidKey { key: String },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Checking => write!(f, "checking"),
            Status::Exists { key, kind } => write!(f, "{} exists and is a {}", key, kind),
            Status::Missing { key } => write!(f, "{} does not exist", key),
            Status::LookupFailed { key } => write!(f, "error checking {}", key),
            Status::InvalidKey { key } => write!(f, "'{}' is not a valid key", key),
        }
    }
}

/// The surface statuses are written to.
///
/// Besides the status line itself, the sink carries a validity flag shared
/// between the synchronous validation path and the asynchronous completion
/// path: once a key is declared invalid, a lookup that settles later (for a
/// previously valid key) must check the flag and keep quiet.
pub trait StatusSink: Send + Sync {
    fn set_status(&self, status: Status);
    fn set_valid(&self, valid: bool);
    fn is_valid(&self) -> bool;
}

/// Prints each status as a line on stdout. Used by the binary.
#[derive(Default)]
pub struct ConsoleSink {
    invalid: AtomicBool,
}

impl StatusSink for ConsoleSink {
    fn set_status(&self, status: Status) {
        println!("{}", status);
    }

    fn set_valid(&self, valid: bool) {
        self.invalid.store(!valid, Ordering::SeqCst);
    }

    fn is_valid(&self) -> bool {
        !self.invalid.load(Ordering::SeqCst)
    }
}

/// Records every committed status. Lets tests (or an embedding application)
/// observe exactly which effects landed and in which order.
#[derive(Default)]
pub struct MemorySink {
    statuses: Mutex<Vec<Status>>,
    invalid: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Status> {
        self.statuses.lock().unwrap().last().cloned()
    }
}

impl StatusSink for MemorySink {
    fn set_status(&self, status: Status) {
        self.statuses.lock().unwrap().push(status);
    }

    fn set_valid(&self, valid: bool) {
        self.invalid.store(!valid, Ordering::SeqCst);
    }

    fn is_valid(&self) -> bool {
        !self.invalid.load(Ordering::SeqCst)
    }
}
