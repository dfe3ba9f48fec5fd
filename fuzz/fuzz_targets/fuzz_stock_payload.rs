#![no_main]
use finwatch_sources::ItemQuery;
use finwatch_sources::payload::{parse_item, parse_restock};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let query = ItemQuery::new("haw", 1485);
    let _ = parse_item(data, &query);
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_restock(s);
    }
});
