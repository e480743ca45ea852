#![no_main]
use libfuzzer_sys::fuzz_target;
use stride_config::history::RunHistory;

fuzz_target!(|data: &str| {
    if let Ok(load) = RunHistory::parse(data) {
        // Whatever survived parsing must serialize and read back with the same length.
        let json = load.history.to_json().expect("serialize parsed history");
        let again = RunHistory::parse(&json).expect("reparse own output");
        assert_eq!(again.history.len(), load.history.len());
        assert_eq!(again.replaced, 0);
    }
});
