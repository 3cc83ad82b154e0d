use std::time::Duration;

use clap::Parser;
use regex::Regex;

#[derive(Parser, Debug)]
#[command(author, about)]
pub struct Arguments {
    /// Keys to check, submitted as one rapid burst. When no key is given,
    /// keyprobe reads key events interactively from stdin, one per line.
    pub keys: Vec<String>,

    /// Minimum time between two lookups sent to the server. Calls arriving
    /// closer together than this are coalesced: only the most recent one
    /// survives to the next window boundary.
    #[arg(short, long, default_value = "3s", value_parser = parse_duration)]
    pub interval: Duration,

    /// Simulated latency of the server answering each lookup.
    #[arg(short, long, default_value = "1s", value_parser = parse_duration)]
    pub latency: Duration,

    /// Pause between two keys submitted from the command line.
    #[arg(long, default_value = "100ms", value_parser = parse_duration)]
    pub keystroke_gap: Duration,

    /// Level of logging verbosity. Set it to "debug" to get all logging messages.
    #[arg(long, default_value = "warn")]
    pub logging: String,
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            keys: vec![],
            interval: Duration::from_secs(3),
            latency: Duration::from_secs(1),
            keystroke_gap: Duration::from_millis(100),
            logging: "warn".to_string(),
        }
    }
}

fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let err_msg = "Invalid duration. \
                        A duration is a number followed by a unit, such as '10ms' or '5s'";
    let re = Regex::new(r"^(\d+)\s*(min|s|ms|ns)$").unwrap();
    let caps = re.captures(s).ok_or(err_msg)?;
    let val: u64 = caps[1].parse().map_err(|_| err_msg)?;
    match &caps[2] {
        "min" => Ok(Duration::from_secs(60 * val)),
        "s" => Ok(Duration::from_secs(val)),
        "ms" => Ok(Duration::from_millis(val)),
        "ns" => Ok(Duration::from_nanos(val)),
        _ => Err(err_msg),
    }
}

#[test]
fn test_durations_and_keys() {
    let args = Arguments::try_parse_from([
        "keyprobe",
        "--interval",
        "500ms",
        "--latency",
        "2s",
        "a/file.txt",
        "a/folder/",
    ])
    .expect("args should parse");
    assert_eq!(args.interval, Duration::from_millis(500));
    assert_eq!(args.latency, Duration::from_secs(2));
    assert_eq!(args.keys, vec!["a/file.txt", "a/folder/"]);
}
