use clap::Parser;
use colour::{green_ln, red_ln};
use human_panic::setup_panic;
use keyprobe::{probe, Arguments};

#[tokio::main]
async fn main() {
    setup_panic!();
    let args = Arguments::parse();
    if let Err(err) = probe(&args).await {
        red_ln!("ERROR {}", err);
        std::process::exit(1);
    }
    green_ln!("Done!");
}
