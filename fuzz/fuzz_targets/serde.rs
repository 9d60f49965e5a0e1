#![no_main]

use libfuzzer_sys::fuzz_target;
use nostr_hll::HyperLogLog;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut counter) = serde_json::from_slice::<HyperLogLog>(data) {
        counter.update(&[0x42; 32]);
        assert!(counter.estimate() > 0);

        let json = serde_json::to_string(&counter).expect("serialization never fails");
        let reloaded: HyperLogLog = serde_json::from_str(&json).expect("round trip");
        assert_eq!(reloaded, counter);
    }
});
