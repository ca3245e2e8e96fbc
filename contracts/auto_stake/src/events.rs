#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::shares::WeightConfig;

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub pool: Address,
    pub token: Address,
    pub escrow: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub shares_minted: i128,
    pub weight: i128,
    pub total_shares: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitedEvent {
    pub staker: Address,
    pub paid: i128,
    pub timestamp: u64,
}

/// Fired when pool reward is pulled and re-staked outside a deposit/exit.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefreshedEvent {
    pub harvested: i128,
    pub value_per_share: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GreyListedEvent {
    pub user: Address,
    pub flagged: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForcedExitEvent {
    pub user: Address,
    pub escrow: Address,
    pub paid: i128,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address, pool: Address, token: Address, escrow: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            pool,
            token,
            escrow,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    amount: i128,
    shares_minted: i128,
    weight: i128,
    total_shares: i128,
) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            shares_minted,
            weight,
            total_shares,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_exited(env: &Env, staker: Address, paid: i128) {
    env.events().publish(
        (symbol_short!("EXITED"), staker.clone()),
        ExitedEvent {
            staker,
            paid,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_refreshed(env: &Env, harvested: i128, value_per_share: i128) {
    env.events().publish(
        (symbol_short!("REFRESH"),),
        RefreshedEvent {
            harvested,
            value_per_share,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_grey_listed(env: &Env, user: Address, flagged: bool) {
    env.events().publish(
        (symbol_short!("GREYLIST"), user.clone()),
        GreyListedEvent {
            user,
            flagged,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_forced_exit(env: &Env, user: Address, escrow: Address, paid: i128) {
    env.events().publish(
        (symbol_short!("FORCE_EX"), user.clone()),
        ForcedExitEvent {
            user,
            escrow,
            paid,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_weight_set(env: &Env, config: WeightConfig) {
    env.events()
        .publish((symbol_short!("WEIGHT"),), (config, env.ledger().timestamp()));
}
