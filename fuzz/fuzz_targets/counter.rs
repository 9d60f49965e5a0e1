#![no_main]

use libfuzzer_sys::fuzz_target;
use nostr_hll::HyperLogLog;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let seed = wyhash(data, 0);
    let offset = (seed % 25) as u8;
    let split_index = (seed as usize / 25) % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut lhs = HyperLogLog::new(offset).expect("offset is always in range");
    for chunk in first_half.chunks(32) {
        let mut key = [0u8; 32];
        key[..chunk.len()].copy_from_slice(chunk);
        lhs.update(&key);
        assert!(lhs.estimate() > 0);
    }

    let mut rhs = HyperLogLog::new(offset).expect("offset is always in range");
    for chunk in second_half.chunks(32) {
        let mut key = [0u8; 32];
        key[..chunk.len()].copy_from_slice(chunk);
        rhs.update(&key);
        assert!(rhs.estimate() > 0);
    }

    let mut ab = lhs.clone();
    ab.merge(&rhs);
    let mut ba = rhs.clone();
    ba.merge(&lhs);
    assert_eq!(ab.registers().as_bytes(), ba.registers().as_bytes());
    assert!(ab.estimate() >= lhs.estimate().max(rhs.estimate()));

    let reloaded = HyperLogLog::from_registers(ab.registers().as_bytes(), offset)
        .expect("registers round trip");
    assert_eq!(reloaded.estimate(), ab.estimate());

    match lhs.merge_registers(data) {
        Ok(()) => {
            assert_eq!(data.len(), 256);
            // Arbitrary register bytes must still estimate without panicking.
            lhs.estimate();
        }
        Err(_) => assert_ne!(data.len(), 256),
    }
});
