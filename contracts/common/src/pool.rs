//! Client side of the linear emission pool.
//!
//! The compounding ledgers never touch pool storage; they only reach a pool
//! through [`EmissionPoolClient`] and treat it as a pull-based reward source:
//! [`PoolPosition::pending_reward`] to look, [`PoolPosition::claim`] to take.

use soroban_sdk::{contractclient, token, Address, Env};

/// Entry points of `emission_pool` that other contracts call. Return types
/// are the success values; a pool error traps and aborts the caller.
#[allow(dead_code)]
#[contractclient(name = "EmissionPoolClient")]
pub trait EmissionPoolInterface {
    fn stake(env: Env, staker: Address, amount: i128);
    fn withdraw(env: Env, staker: Address, amount: i128);
    fn get_reward(env: Env, staker: Address) -> i128;
    fn exit(env: Env, staker: Address) -> (i128, i128);
    fn balance_of(env: Env, staker: Address) -> i128;
    fn earned(env: Env, staker: Address) -> i128;
    fn reward_rate(env: Env) -> i128;
    fn period_finish(env: Env) -> u64;
    fn stake_token(env: Env) -> Address;
    fn reward_token(env: Env) -> Address;
}

/// The current contract's stake inside one emission pool.
pub struct PoolPosition<'a> {
    env: &'a Env,
    client: EmissionPoolClient<'a>,
    pool: Address,
}

impl<'a> PoolPosition<'a> {
    pub fn new(env: &'a Env, pool: &Address) -> Self {
        Self {
            env,
            client: EmissionPoolClient::new(env, pool),
            pool: pool.clone(),
        }
    }

    pub fn stake_token(&self) -> Address {
        self.client.stake_token()
    }

    pub fn reward_token(&self) -> Address {
        self.client.reward_token()
    }

    /// Reward earned by this contract and not yet claimed.
    pub fn pending_reward(&self) -> i128 {
        self.client.earned(&self.env.current_contract_address())
    }

    /// Pulls all earned reward into this contract; returns the amount.
    pub fn claim(&self) -> i128 {
        self.client.get_reward(&self.env.current_contract_address())
    }

    /// Approves the pool for exactly `amount` of its stake token and stakes
    /// it. The allowance expires with the current ledger.
    pub fn deposit(&self, stake_token: &Address, amount: i128) {
        if amount <= 0 {
            return;
        }
        let me = self.env.current_contract_address();
        token::Client::new(self.env, stake_token).approve(
            &me,
            &self.pool,
            &amount,
            &self.env.ledger().sequence(),
        );
        self.client.stake(&me, &amount);
    }

    pub fn withdraw(&self, amount: i128) {
        if amount <= 0 {
            return;
        }
        self.client
            .withdraw(&self.env.current_contract_address(), &amount);
    }
}
