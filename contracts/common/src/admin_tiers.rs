use soroban_sdk::{contracttype, Address, Env};

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

#[contracttype]
#[derive(Clone)]
enum TierKey {
    Tier(Address),
    SuperAdmin,
}

/// Three-tier governance hierarchy shared by the pool and both ledgers.
///
/// - `SuperAdmin`    – promotes/demotes other admins, plus everything below.
/// - `ContractAdmin` – notifies rewards, changes durations and weights,
///                     clears greylist flags and forces greylisted exits.
/// - `OperatorAdmin` – flags depositors onto a ledger's greylist.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AdminTier {
    OperatorAdmin = 1,
    ContractAdmin = 2,
    SuperAdmin = 3,
}

impl AdminTier {
    pub fn rank(&self) -> u32 {
        match self {
            AdminTier::OperatorAdmin => 1,
            AdminTier::ContractAdmin => 2,
            AdminTier::SuperAdmin => 3,
        }
    }

    /// Returns true if this tier is at least as high as `min_tier`.
    pub fn has_at_least(&self, min_tier: &AdminTier) -> bool {
        self.rank() >= min_tier.rank()
    }
}

pub fn set_admin_tier(env: &Env, admin: &Address, tier: AdminTier) {
    let key = TierKey::Tier(admin.clone());
    env.storage().persistent().set(&key, &tier);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn get_admin_tier(env: &Env, admin: &Address) -> Option<AdminTier> {
    let key = TierKey::Tier(admin.clone());
    let tier: Option<AdminTier> = env.storage().persistent().get(&key);
    if tier.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    tier
}

pub fn remove_admin_tier(env: &Env, admin: &Address) {
    env.storage()
        .persistent()
        .remove(&TierKey::Tier(admin.clone()));
}

/// Returns `false` if the caller has no tier or their tier is below
/// `min_tier`. Callers turn this into their own `Unauthorized` error.
pub fn require_tier(env: &Env, caller: &Address, min_tier: &AdminTier) -> bool {
    match get_admin_tier(env, caller) {
        Some(tier) => tier.has_at_least(min_tier),
        None => false,
    }
}

/// Records the bootstrap admin and grants it `SuperAdmin`.
pub fn set_super_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&TierKey::SuperAdmin, admin);
    set_admin_tier(env, admin, AdminTier::SuperAdmin);
}

pub fn get_super_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&TierKey::SuperAdmin)
}

/// Only a `SuperAdmin` may promote. The caller must already have been
/// authenticated via `require_auth()`.
pub fn promote_admin(env: &Env, caller: &Address, target: &Address, tier: AdminTier) -> bool {
    if !require_tier(env, caller, &AdminTier::SuperAdmin) {
        return false;
    }
    set_admin_tier(env, target, tier);
    true
}

/// Only a `SuperAdmin` may demote, and the bootstrap admin cannot be
/// demoted (the ledgers would otherwise be left without governance).
pub fn demote_admin(env: &Env, caller: &Address, target: &Address) -> bool {
    if !require_tier(env, caller, &AdminTier::SuperAdmin) {
        return false;
    }
    if get_super_admin(env).as_ref() == Some(target) {
        return false;
    }
    remove_admin_tier(env, target);
    true
}
