use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use nostr_hll::event::KIND_FOLLOW_LIST;
use nostr_hll::offset::{event_contributions, filter_offset};
use nostr_hll::{Error, Event, Filter, HyperLogLog};

const ALICE: &str = "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1c2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2";
const BOB: &str = "3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f3f";

fn follow_event(author: [u8; 32], followed: &[&str]) -> Event {
    Event {
        kind: KIND_FOLLOW_LIST,
        pubkey: author,
        tags: followed
            .iter()
            .map(|hex_key| vec!["p".to_string(), hex_key.to_string()])
            .collect(),
    }
}

fn followers_filter(pubkey: &str) -> Filter {
    let mut tags = BTreeMap::new();
    tags.insert("#p".to_string(), vec![pubkey.to_string()]);
    Filter {
        kinds: vec![KIND_FOLLOW_LIST],
        tags,
        ..Filter::default()
    }
}

fn main() -> Result<(), Error> {
    // Follow lists as seen by this relay.
    let events = [
        follow_event([0x6e; 32], &[ALICE, BOB]),
        follow_event([0x7d; 32], &[ALICE]),
        follow_event([0x8c; 32], &[ALICE, BOB]),
    ];

    // One counter per (reference, offset) pair, the same key a storage
    // layer would use.
    let mut counters: HashMap<(String, u8), HyperLogLog> = HashMap::new();
    for event in &events {
        for contribution in event_contributions(event) {
            let key = (contribution.reference.to_string(), contribution.offset);
            let counter = match counters.entry(key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(HyperLogLog::new(contribution.offset)?),
            };
            counter.update(&event.pubkey);
        }
    }

    // Approximate COUNT queries for both pubkeys.
    for pubkey in [ALICE, BOB] {
        if let Some(offset) = filter_offset(&followers_filter(pubkey)) {
            if let Some(counter) = counters.get(&(pubkey.to_string(), offset)) {
                println!(
                    "followers of {}… = {} (window offset {})",
                    &pubkey[..8],
                    counter.estimate(),
                    offset
                );
            }
        }
    }

    // Another relay saw one shared follower and one new one. Merging
    // its registers deduplicates the overlap.
    if let Some(offset) = filter_offset(&followers_filter(ALICE)) {
        let mut remote = HyperLogLog::new(offset)?;
        remote.update(&[0x8c; 32]);
        remote.update(&[0x9b; 32]);

        if let Some(counter) = counters.get_mut(&(ALICE.to_string(), offset)) {
            counter.merge_registers(remote.registers().as_bytes())?;
            println!(
                "followers of {}… after merging a remote relay = {}",
                &ALICE[..8],
                counter.estimate()
            );
        }
    }

    Ok(())
}
