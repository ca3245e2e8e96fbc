//! Administrative greylist shared by both compounding ledgers.
//!
//! A greylisted address cannot stake or exit on its own; governance
//! liquidates its position into the quarantine escrow instead.

use soroban_sdk::{contracttype, Address, Env};

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

#[contracttype]
#[derive(Clone)]
enum GreyListKey {
    Flag(Address),
}

pub fn is_grey_listed(env: &Env, who: &Address) -> bool {
    let key = GreyListKey::Flag(who.clone());
    let flagged = env.storage().persistent().get(&key).unwrap_or(false);
    if flagged {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    flagged
}

/// Flags or clears `who`. Clearing removes the entry rather than storing
/// `false`, so un-flagged addresses never occupy storage.
pub fn set_grey_listed(env: &Env, who: &Address, flagged: bool) {
    let key = GreyListKey::Flag(who.clone());
    if flagged {
        env.storage().persistent().set(&key, &true);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    } else {
        env.storage().persistent().remove(&key);
    }
}
