#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub principal_pool: Address,
    pub compounding_pool: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub escrow: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub crystallized: i128,
    pub total_stake: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitedEvent {
    pub staker: Address,
    pub stake: i128,
    pub reward: i128,
    pub timestamp: u64,
}

/// Pool reward harvested by a settlement and the multiplier it left behind.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefreshedEvent {
    pub principal_reward: i128,
    pub compounding_reward: i128,
    pub debt_per_debt_share: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForcedExitEvent {
    pub user: Address,
    pub escrow: Address,
    pub stake: i128,
    pub reward: i128,
    pub timestamp: u64,
}

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    principal_pool: Address,
    compounding_pool: Address,
    stake_token: Address,
    reward_token: Address,
    escrow: Address,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            principal_pool,
            compounding_pool,
            stake_token,
            reward_token,
            escrow,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, amount: i128, crystallized: i128, total_stake: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            crystallized,
            total_stake,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_exited(env: &Env, staker: Address, stake: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("EXITED"), staker.clone()),
        ExitedEvent {
            staker,
            stake,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_refreshed(
    env: &Env,
    principal_reward: i128,
    compounding_reward: i128,
    debt_per_debt_share: i128,
) {
    env.events().publish(
        (symbol_short!("REFRESH"),),
        RefreshedEvent {
            principal_reward,
            compounding_reward,
            debt_per_debt_share,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_grey_listed(env: &Env, user: Address, flagged: bool) {
    env.events().publish(
        (symbol_short!("GREYLIST"), user),
        (flagged, env.ledger().timestamp()),
    );
}

pub fn publish_forced_exit(env: &Env, user: Address, escrow: Address, stake: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("FORCE_EX"), user.clone()),
        ForcedExitEvent {
            user,
            escrow,
            stake,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}
