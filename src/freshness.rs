use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared "the world has moved on" signal between a throttler and the calls
/// it dispatches. There is one token per throttler, living as long as the
/// throttler itself; each dispatched call only keeps the [`Stamp`] it was
/// handed at dispatch time.
///
/// The token is a monotonic generation counter: every dispatch takes a fresh
/// generation, buffering a newer call bumps it too, and a stamp is stale as
/// soon as its captured generation falls behind. A stamp can therefore never
/// outlive the next dispatch, even one opening a brand-new cooling window.
#[derive(Clone, Default)]
pub struct Token {
    generation: Arc<AtomicU64>,
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every outstanding stamp as superseded.
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Takes a fresh generation for a new dispatch. Every stamp handed out
    /// before becomes superseded; the new one stays fresh until the next
    /// call to [`stamp`](Token::stamp) or [`supersede`](Token::supersede).
    pub fn stamp(&self) -> Stamp {
        Stamp {
            seen: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            token: self.clone(),
        }
    }
}

/// What a dispatched call carries into its asynchronous work.
///
/// The call must check [`superseded`](Stamp::superseded) once its work
/// settles, before producing any externally visible effect, so that a slow
/// early lookup can never overwrite the answer of a fast later one.
pub struct Stamp {
    seen: u64,
    token: Token,
}

impl Stamp {
    /// True if a newer call arrived since this stamp was captured.
    pub fn superseded(&self) -> bool {
        self.token.generation.load(Ordering::SeqCst) != self.seen
    }
}
