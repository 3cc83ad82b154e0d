use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;

use crate::errors::CheckError;

/// What a key turned out to be on the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Folder,
    None,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::File => "file",
            ResourceKind::Folder => "folder",
            ResourceKind::None => "none",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub exists: bool,
    pub kind: ResourceKind,
}

/// Where existence checks are answered. Resolution is asynchronous and may
/// fail; callers must treat both outcomes uniformly with respect to
/// staleness (a failed lookup is just as stale as a successful one).
pub trait Lookup: Send + Sync + 'static {
    fn resolve(&self, key: &str) -> BoxFuture<'static, Result<Resource, CheckError>>;
}

/// A simulated remote server: answers after a fixed latency, classifying
/// keys by their name. Keys mentioning "file" exist as files, keys
/// mentioning "folder" exist as folders, everything else does not exist.
pub struct MockServer {
    latency: Duration,
}

impl MockServer {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Lookup for MockServer {
    fn resolve(&self, key: &str) -> BoxFuture<'static, Result<Resource, CheckError>> {
        let latency = self.latency;
        let key = key.to_string();
        async move {
            tokio::time::sleep(latency).await;
            let resource = if key.contains("file") {
                Resource { exists: true, kind: ResourceKind::File }
            } else if key.contains("folder") {
                Resource { exists: true, kind: ResourceKind::Folder }
            } else {
                Resource { exists: false, kind: ResourceKind::None }
            };
            debug!("resolved '{}' as {:?}", key, resource);
            Ok(resource)
        }
        .boxed()
    }
}
