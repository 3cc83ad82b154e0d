use custom_error::custom_error;

custom_error! {
    pub CheckError
    BadInterval = "the throttling interval must be greater than zero",
    Lookup{key: String} = "the server could not check '{key}'",
    Io{source: std::io::Error} = "Input/Output error: {source}",
}
