use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::CheckError;
use crate::freshness::Stamp;
use crate::lookup::Lookup;
use crate::status::{Status, StatusSink};
use crate::throttler::Throttler;
use crate::validate::is_valid_key;

/// Ties the pieces together: validation in front, the throttler in the
/// middle, the lookup and its staleness check behind.
pub struct Checker {
    throttler: Throttler<String>,
    sink: Arc<dyn StatusSink>,
}

impl Checker {
    pub fn new(
        interval: Duration,
        lookup: Arc<dyn Lookup>,
        sink: Arc<dyn StatusSink>,
    ) -> Result<Self, CheckError> {
        let dispatch_sink = Arc::clone(&sink);
        let throttler = Throttler::new(interval, move |stamp, key: String| {
            let lookup = Arc::clone(&lookup);
            let sink = Arc::clone(&dispatch_sink);
            tokio::spawn(check_and_report(lookup, sink, stamp, key));
        })?;
        Ok(Self { throttler, sink })
    }

    /// Handles one key event. An invalid key never reaches the throttler:
    /// it commits the invalid-format status right away and flips the shared
    /// validity flag, silencing any lookup still in flight for an earlier
    /// key. A valid key shows "checking" and goes through the throttler.
    pub fn submit(&self, raw: &str) {
        let key = raw.trim();
        if !is_valid_key(key) {
            debug!("rejecting invalid key '{}'", key);
            self.sink.set_valid(false);
            self.sink.set_status(Status::InvalidKey { key: key.to_string() });
            return;
        }
        self.sink.set_valid(true);
        self.sink.set_status(Status::Checking);
        self.throttler.invoke(key.to_string());
    }
}

/// The dispatched operation: resolve the key, then decide whether the answer
/// is still authoritative before writing it out. A call superseded while it
/// was waiting on the server stays silent, as does one whose key was
/// declared invalid in the meantime. This holds for failures too: an error
/// is only reported if this call still has the last word.
async fn check_and_report(
    lookup: Arc<dyn Lookup>,
    sink: Arc<dyn StatusSink>,
    stamp: Stamp,
    key: String,
) {
    let outcome = lookup.resolve(&key).await;
    if stamp.superseded() || !sink.is_valid() {
        debug!("suppressing a stale result for '{}'", key);
        return;
    }
    let status = match outcome {
        Ok(resource) if resource.exists => Status::Exists { key, kind: resource.kind },
        Ok(_) => Status::Missing { key },
        Err(e) => {
            warn!("lookup failed: {}", e);
            Status::LookupFailed { key }
        }
    };
    sink.set_status(status);
}
