use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref KEY_RE: Regex = Regex::new(
        r"(?x)
    ^
        [\w.-]+             # first segment
        (?: / [\w.-]* )*    # further segments; the last may be empty (folder keys)
    $
    "
    )
    .unwrap();
}

/// Checks whether a key is well-formed: slash-separated segments of word
/// characters, dots and dashes, optionally ending with a slash. Malformed
/// keys must never reach the server.
pub fn is_valid_key(key: &str) -> bool {
    KEY_RE.is_match(key)
}
