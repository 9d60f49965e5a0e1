//! End-to-end tests over register files shared with other
//! implementations, plus the full event-to-estimate pipeline.

use std::collections::HashMap;

use nostr_hll::event::KIND_FOLLOW_LIST;
use nostr_hll::offset::{event_contributions, filter_offset};
use nostr_hll::{Event, Filter, HyperLogLog, Registers, KEY_LEN, REGISTER_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Register file of a follower counter with 121 distinct observed keys;
/// 159 registers are still zero, keeping it in the linear-counting
/// regime.
const FOLLOWERS_121: &str = "010002000102010000000000000102000001010100000100000000000001000001020101000101000000010000000000010000010000000100000200000000010000000000000001010100000200020200000101000201000001000004030002010001040002000100000000020a0000000000000001000000020001000000030301000000000000000000000002000000000301000001000500000000020000000002010200020000020100010501000000000000010301020000040100040000000100000000040001000001010000000202000000000000000400000001010000020100000200000101000000000001010000000300000300030203010100";

/// Register file of a reaction counter deep in the bias-corrected
/// regime; every register is occupied and the estimate is 15070.
const REACTIONS_15070: &str = "070806060b060709060a080608020608050705090706060608060808060705060a09060906060a0605060b0e0806060508060709060805060a090a0707060706050508090607050607050707050706070606050c040a0606070804090808080906060706070708050407090908080a08080d08060709070e07090608060d06070707070704060706070607080608080705080608070608060906050605080b0a06070806050a08070806080706070805060a060606060906060607080d070606080a09060b07080606070809070607060705080b06090b060806080707080a090709080a0606070905080708070709070a03060609060707070706060c09070b";

fn from_hex(hex_registers: &str, offset: u8) -> HyperLogLog {
    let buffer = hex::decode(hex_registers).unwrap();
    HyperLogLog::from_registers(&buffer, offset).unwrap()
}

#[test]
fn test_follower_register_file_estimate() {
    let counter = from_hex(FOLLOWERS_121, 9);
    assert_eq!(counter.registers().zero_count(), 159);
    assert_eq!(counter.estimate(), 121);
}

#[test]
fn test_reaction_register_file_estimate() {
    let counter = from_hex(REACTIONS_15070, 8);
    assert_eq!(counter.registers().zero_count(), 0);
    assert_eq!(counter.estimate(), 15070);
}

#[test]
fn test_register_files_round_trip_through_hex() {
    for vector in [FOLLOWERS_121, REACTIONS_15070] {
        let buffer = hex::decode(vector).unwrap();
        let registers = Registers::try_from(buffer.as_slice()).unwrap();
        assert_eq!(registers.to_hex(), vector);
    }
}

#[test]
fn test_merging_register_files_is_commutative() {
    let small = hex::decode(FOLLOWERS_121).unwrap();
    let large = hex::decode(REACTIONS_15070).unwrap();

    let mut ab = HyperLogLog::from_registers(&small, 8).unwrap();
    ab.merge_registers(&large).unwrap();
    let mut ba = HyperLogLog::from_registers(&large, 8).unwrap();
    ba.merge_registers(&small).unwrap();

    assert_eq!(ab.registers(), ba.registers());
    assert_eq!(ab.estimate(), 15084);
}

#[test]
fn test_low_raw_estimate_falls_back_to_linear_counting() {
    // 148 occupied registers: the linear count (220.94) is already past
    // its ceiling, but the raw estimate (258.64) is still at most 3m,
    // so the shared branch structure returns the floored linear count.
    let vector = "01".repeat(148) + &"00".repeat(108);
    let counter = from_hex(&vector, 8);
    assert_eq!(counter.registers().zero_count(), 108);
    assert_eq!(counter.estimate(), 220);
}

#[test]
fn test_update_rebuilds_reaction_register_file() {
    // One key per bucket, each crafted so the window at offset 8
    // decodes to exactly the rank recorded in the vector.
    let target = hex::decode(REACTIONS_15070).unwrap();
    let mut counter = HyperLogLog::new(8).unwrap();
    for (bucket, &rank) in target.iter().enumerate() {
        let low = if rank == 57 { 0 } else { 1u64 << (56 - rank) };
        let window = ((bucket as u64) << 56) | low;
        let mut key = [0u8; KEY_LEN];
        key[8..16].copy_from_slice(&window.to_be_bytes());
        counter.update(&key);
    }
    assert_eq!(counter.registers().to_hex(), REACTIONS_15070);
    assert_eq!(counter.estimate(), 15070);
}

fn follow_event(author: [u8; KEY_LEN], followed: &[&str]) -> Event {
    Event {
        kind: KIND_FOLLOW_LIST,
        pubkey: author,
        tags: followed
            .iter()
            .map(|hex_key| vec!["p".to_string(), hex_key.to_string()])
            .collect(),
    }
}

fn apply_contributions(events: &[Event]) -> HashMap<(String, u8), HyperLogLog> {
    let mut counters: HashMap<(String, u8), HyperLogLog> = HashMap::new();
    for event in events {
        for contribution in event_contributions(event) {
            let counter = counters
                .entry((contribution.reference.to_string(), contribution.offset))
                .or_insert_with(|| HyperLogLog::new(contribution.offset).unwrap());
            counter.update(&event.pubkey);
        }
    }
    counters
}

#[test]
fn test_follow_counting_across_relays() {
    let alice = "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1c2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2";
    let bob = "3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f";

    let relay1 = apply_contributions(&[
        follow_event([0xA1; KEY_LEN], &[alice, bob]),
        follow_event([0xB2; KEY_LEN], &[alice]),
        follow_event([0xC3; KEY_LEN], &[alice]),
    ]);
    let relay2 = apply_contributions(&[
        follow_event([0xC3; KEY_LEN], &[alice]),
        follow_event([0xD4; KEY_LEN], &[alice]),
    ]);

    let mut tags = std::collections::BTreeMap::new();
    tags.insert("#p".to_string(), vec![alice.to_string()]);
    let filter = Filter {
        kinds: vec![KIND_FOLLOW_LIST],
        tags,
        ..Filter::default()
    };
    let offset = filter_offset(&filter).expect("filter should be countable");
    assert_eq!(offset, 20);

    // Each reference gets its own counter at its own derived offset.
    let local = &relay1[&(alice.to_string(), offset)];
    assert_eq!(local.estimate(), 3);
    assert_eq!(relay1[&(bob.to_string(), 11)].estimate(), 1);

    // Combining the remote relay's registers deduplicates the shared
    // follower.
    let remote = &relay2[&(alice.to_string(), offset)];
    assert_eq!(remote.estimate(), 2);
    let mut combined = local.clone();
    combined.merge_registers(remote.registers().as_bytes()).unwrap();
    assert_eq!(combined.estimate(), 4);
}

#[test]
fn test_random_streams_merge_and_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut lhs = HyperLogLog::new(16).unwrap();
    let mut rhs = HyperLogLog::new(16).unwrap();
    for _ in 0..5_000 {
        let key: [u8; KEY_LEN] = rng.gen();
        lhs.update(&key);
        let key: [u8; KEY_LEN] = rng.gen();
        rhs.update(&key);
    }

    let mut merged = lhs.clone();
    merged.merge(&rhs);
    assert!(merged.estimate() >= lhs.estimate().max(rhs.estimate()));

    let mut again = merged.clone();
    again.merge(&rhs);
    again.merge(&lhs);
    assert_eq!(again, merged);

    let reloaded =
        HyperLogLog::from_registers(merged.registers().as_bytes(), merged.offset()).unwrap();
    assert_eq!(reloaded.estimate(), merged.estimate());
    assert_eq!(reloaded.registers().to_hex().len(), 2 * REGISTER_COUNT);
}
