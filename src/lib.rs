use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

pub use arguments::Arguments;
pub use checker::Checker;
pub use errors::CheckError;
pub use freshness::Stamp;
pub use lookup::{Lookup, MockServer, Resource, ResourceKind};
pub use status::{ConsoleSink, MemorySink, Status, StatusSink};
pub use throttler::Throttler;
pub use validate::is_valid_key;

mod arguments;
mod checker;
mod errors;
mod freshness;
mod lookup;
mod status;
mod throttler;
mod validate;

/// Runs the checker with the given arguments: either a burst of keys taken
/// from the command line, or an interactive loop over stdin where each line
/// is one key event.
pub async fn probe(args: &Arguments) -> Result<(), CheckError> {
    let _ = env_logger::Builder::new()
        .parse_filters(&args.logging)
        .try_init();
    let sink: Arc<dyn StatusSink> = Arc::new(ConsoleSink::default());
    let server = Arc::new(MockServer::new(args.latency));
    let checker = Checker::new(args.interval, server, sink)?;
    if args.keys.is_empty() {
        interactive(&checker).await
    } else {
        burst(&checker, args).await
    }
}

async fn interactive(checker: &Checker) -> Result<(), CheckError> {
    println!("Enter a key to check (for example 'a/file.txt'):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        checker.submit(&line);
    }
    Ok(())
}

async fn burst(checker: &Checker, args: &Arguments) -> Result<(), CheckError> {
    for key in &args.keys {
        checker.submit(key);
        tokio::time::sleep(args.keystroke_gap).await;
    }
    // Let the trailing dispatch and its lookup settle before exiting
    tokio::time::sleep(args.interval + args.latency).await;
    Ok(())
}
