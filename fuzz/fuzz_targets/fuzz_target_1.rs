#![no_main]
extern crate libfuzzer_sys;

extern crate ethicrawl;
use ethicrawl::{Logger, LoggerConfig, RobotsPolicy, Url};

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let base = Url::parse("https://example.com", false).unwrap();
    let logger = Logger::new("fuzz", LoggerConfig::default());
    let _r = RobotsPolicy::from_bytes(base, data, logger);
});
