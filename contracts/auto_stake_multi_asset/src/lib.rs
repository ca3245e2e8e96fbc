#![no_std]

//! Dual-asset compounding ledger.
//!
//! Depositors stake one token into a *principal* emission pool that pays a
//! second token. That reward is never left idle: the ledger keeps it staked
//! in a *compounding* pool, and the compounding pool's own reward raises the
//! value of every depositor's still-pending share. See [`ledger`] for the
//! accounting.

pub mod events;
pub mod ledger;

use common::admin_tiers::{self, AdminTier};
use common::greylist;
use common::math::MathError;
use common::pool::PoolPosition;
use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

use ledger::{Depositor, LedgerState};

// ── Storage ──────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    State,
    Depositor(Address),
}

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InsufficientBalance = 5,
    GreyListed = 6,
    NotGreyListed = 7,
    TokenMismatch = 8,
    ArithmeticOverflow = 9,
}

impl From<MathError> for ContractError {
    fn from(_: MathError) -> Self {
        ContractError::ArithmeticOverflow
    }
}

// ── Public types ─────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Pays `reward_token` for staked `stake_token`.
    pub principal_pool: Address,
    /// Pays `reward_token` for staked `reward_token`.
    pub compounding_pool: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub escrow: Address,
}

/// Reward harvested from both pools during one settlement.
struct Harvest {
    principal: i128,
    compounding: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct AutoStakeMultiAsset;

#[contractimpl]
impl AutoStakeMultiAsset {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger on a principal pool and a compounding pool.
    ///
    /// The compounding pool must stake and pay the principal pool's reward
    /// token, and that token must differ from the stake token; otherwise
    /// `TokenMismatch`.
    pub fn initialize(
        env: Env,
        admin: Address,
        principal_pool: Address,
        compounding_pool: Address,
        escrow: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ContractError::AlreadyInitialized);
        }

        let principal = PoolPosition::new(&env, &principal_pool);
        let compounding = PoolPosition::new(&env, &compounding_pool);
        let stake_token = principal.stake_token();
        let reward_token = principal.reward_token();

        if stake_token == reward_token
            || compounding.stake_token() != reward_token
            || compounding.reward_token() != reward_token
        {
            return Err(ContractError::TokenMismatch);
        }

        let config = Config {
            principal_pool,
            compounding_pool,
            stake_token,
            reward_token,
            escrow,
        };
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage()
            .instance()
            .set(&DataKey::State, &LedgerState::new());

        admin_tiers::set_super_admin(&env, &admin);

        events::publish_initialized(
            &env,
            admin,
            config.principal_pool,
            config.compounding_pool,
            config.stake_token,
            config.reward_token,
            config.escrow,
        );

        Ok(())
    }

    // ── Depositor entry points ──────────────────────────────────────────────

    /// Deposit `amount` stake tokens. Pending reward on the existing balance
    /// is crystallized first.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        if greylist::is_grey_listed(&env, &staker) {
            log!(&env, "stake rejected for greylisted depositor");
            return Err(ContractError::GreyListed);
        }

        let mut state = Self::load_state(&env)?;
        let harvest = Self::accrue(&env, &config, &mut state)?;

        let mut depositor = Self::load_depositor(&env, &staker);
        let crystallized = ledger::deposit(&mut state, &mut depositor, amount)?;

        Self::save_state(&env, &state);
        Self::save_depositor(&env, &staker, &depositor);

        // Ledger state is final; move tokens.
        token::Client::new(&env, &config.stake_token).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );
        Self::sync_pools(&env, &config, &harvest, amount, 0);

        events::publish_staked(&env, staker, amount, crystallized, state.total_stake);

        Ok(())
    }

    /// Withdraw the caller's whole stake together with their reward.
    /// Returns `(stake, reward)`.
    pub fn exit(env: Env, staker: Address) -> Result<(i128, i128), ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if greylist::is_grey_listed(&env, &staker) {
            log!(&env, "exit rejected for greylisted depositor");
            return Err(ContractError::GreyListed);
        }

        let (stake, reward) = Self::exit_to(&env, &config, &staker, &staker)?;
        events::publish_exited(&env, staker, stake, reward);
        Ok((stake, reward))
    }

    /// Harvest both pools and advance the accumulators. Touches no
    /// depositor; a no-op when neither pool has anything pending.
    pub fn refresh_auto_stake(env: Env) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        let mut state = Self::load_state(&env)?;

        let harvest = Self::accrue(&env, &config, &mut state)?;
        if harvest.principal == 0 && harvest.compounding == 0 {
            return Ok(());
        }

        Self::save_state(&env, &state);
        Self::sync_pools(&env, &config, &harvest, 0, 0);

        events::publish_refreshed(
            &env,
            harvest.principal,
            harvest.compounding,
            state.debt_per_debt_share,
        );

        Ok(())
    }

    // ── Governance ──────────────────────────────────────────────────────────

    /// Liquidate a greylisted depositor into the escrow. Requires at least
    /// `ContractAdmin` tier. Returns `(stake, reward)` sent to escrow.
    pub fn force_grey_listed_exit(
        env: Env,
        caller: Address,
        target: Address,
    ) -> Result<(i128, i128), ContractError> {
        let config = Self::load_config(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::ContractAdmin)?;

        if !greylist::is_grey_listed(&env, &target) {
            return Err(ContractError::NotGreyListed);
        }

        let escrow = config.escrow.clone();
        let (stake, reward) = Self::exit_to(&env, &config, &target, &escrow)?;
        events::publish_forced_exit(&env, target, escrow, stake, reward);
        Ok((stake, reward))
    }

    /// Flag or clear `user`. Flagging needs at least `OperatorAdmin`;
    /// clearing a flag needs `ContractAdmin`.
    pub fn set_grey_listed(
        env: Env,
        caller: Address,
        user: Address,
        flagged: bool,
    ) -> Result<(), ContractError> {
        Self::load_config(&env)?;
        caller.require_auth();
        let min_tier = if flagged {
            AdminTier::OperatorAdmin
        } else {
            AdminTier::ContractAdmin
        };
        Self::require_admin_tier(&env, &caller, &min_tier)?;

        greylist::set_grey_listed(&env, &user, flagged);
        events::publish_grey_listed(&env, user, flagged);
        Ok(())
    }

    // ── Views ────────────────────────────────────────────────────────────────
    //
    // Reward views fold in what both pools currently owe the ledger, so they
    // match what a settlement at this instant would produce. The multiplier
    // is the exception: it is reported as of the last settlement.

    /// Stake-token balance of `user`.
    pub fn balance_of(env: Env, user: Address) -> i128 {
        Self::load_depositor(&env, &user).stake
    }

    /// `(stake, reward entitlement)` of `user`.
    pub fn balance_of_joint(env: Env, user: Address) -> Result<(i128, i128), ContractError> {
        let state = Self::live_state(&env)?;
        let depositor = Self::load_depositor(&env, &user);
        Ok((depositor.stake, ledger::entitlement(&state, &depositor)?))
    }

    /// Debt shares booked against `user` at their last settlement.
    pub fn debt_share(env: Env, user: Address) -> Result<i128, ContractError> {
        Ok(ledger::reward_debt(&Self::load_depositor(&env, &user))?)
    }

    /// Settled layer-2 multiplier. Pending compounding reward is spread over
    /// whatever basis exists when it is harvested, so it only shows here
    /// after a settlement.
    pub fn debt_per_debt_share(env: Env) -> Result<i128, ContractError> {
        Ok(Self::load_state(&env)?.debt_per_debt_share)
    }

    pub fn total_stake(env: Env) -> Result<i128, ContractError> {
        Ok(Self::load_state(&env)?.total_stake)
    }

    /// Reward-token value owed to all depositors together.
    pub fn total_value(env: Env) -> Result<i128, ContractError> {
        Ok(ledger::total_value(&Self::live_state(&env)?)?)
    }

    /// State a settlement at this instant would leave behind.
    pub fn state(env: Env) -> Result<LedgerState, ContractError> {
        Self::live_state(&env)
    }

    pub fn stake_token(env: Env) -> Result<Address, ContractError> {
        Ok(Self::load_config(&env)?.stake_token)
    }

    pub fn reward_token(env: Env) -> Result<Address, ContractError> {
        Ok(Self::load_config(&env)?.reward_token)
    }

    pub fn is_grey_listed(env: Env, user: Address) -> bool {
        greylist::is_grey_listed(&env, &user)
    }

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        Self::load_config(&env)
    }

    /// Where `force_grey_listed_exit` sends proceeds.
    pub fn escrow(env: Env) -> Result<Address, ContractError> {
        Ok(Self::load_config(&env)?.escrow)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&DataKey::Config)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Admin tier management ────────────────────────────────────────────────

    pub fn promote_admin(
        env: Env,
        caller: Address,
        target: Address,
        tier: AdminTier,
    ) -> Result<(), ContractError> {
        Self::load_config(&env)?;
        caller.require_auth();
        if !admin_tiers::promote_admin(&env, &caller, &target, tier) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn demote_admin(env: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        Self::load_config(&env)?;
        caller.require_auth();
        if !admin_tiers::demote_admin(&env, &caller, &target) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn get_admin_tier(env: Env, admin: Address) -> Option<AdminTier> {
        admin_tiers::get_admin_tier(&env, &admin)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Fold whatever both pools owe the ledger into `state`, principal pool
    /// first. Nothing is claimed yet.
    fn accrue(env: &Env, config: &Config, state: &mut LedgerState) -> Result<Harvest, ContractError> {
        let principal = PoolPosition::new(env, &config.principal_pool).pending_reward();
        ledger::accrue_principal_reward(state, principal)?;

        let compounding = PoolPosition::new(env, &config.compounding_pool).pending_reward();
        ledger::accrue_compounding_reward(state, compounding)?;

        Ok(Harvest {
            principal,
            compounding,
        })
    }

    /// Claim the harvest, move `stake_delta` in or out of the principal pool
    /// and leave every reward token not paid out staked in the compounding
    /// pool. `payout` is reward the caller is about to transfer away.
    fn sync_pools(env: &Env, config: &Config, harvest: &Harvest, stake_delta: i128, payout: i128) {
        let principal = PoolPosition::new(env, &config.principal_pool);
        let compounding = PoolPosition::new(env, &config.compounding_pool);

        if harvest.principal > 0 {
            principal.claim();
        }
        if harvest.compounding > 0 {
            compounding.claim();
        }

        if stake_delta > 0 {
            principal.deposit(&config.stake_token, stake_delta);
        } else {
            principal.withdraw(-stake_delta);
        }

        let net = harvest.principal + harvest.compounding - payout;
        if net > 0 {
            compounding.deposit(&config.reward_token, net);
        } else {
            compounding.withdraw(-net);
        }
    }

    /// Settle `owner`, close their position and send both balances to
    /// `recipient`.
    fn exit_to(
        env: &Env,
        config: &Config,
        owner: &Address,
        recipient: &Address,
    ) -> Result<(i128, i128), ContractError> {
        let mut depositor = Self::load_depositor(env, owner);
        if depositor.stake <= 0 {
            return Err(ContractError::InsufficientBalance);
        }

        let mut state = Self::load_state(env)?;
        let harvest = Self::accrue(env, config, &mut state)?;
        let (stake, reward) = ledger::withdraw_all(&mut state, &mut depositor)?;

        Self::save_state(env, &state);
        env.storage()
            .persistent()
            .remove(&DataKey::Depositor(owner.clone()));

        Self::sync_pools(env, config, &harvest, -stake, reward);

        let me = env.current_contract_address();
        token::Client::new(env, &config.stake_token).transfer(&me, recipient, &stake);
        if reward > 0 {
            token::Client::new(env, &config.reward_token).transfer(&me, recipient, &reward);
        }

        Ok((stake, reward))
    }

    fn load_config(env: &Env) -> Result<Config, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_state(env: &Env) -> Result<LedgerState, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::State)
            .ok_or(ContractError::NotInitialized)
    }

    fn save_state(env: &Env, state: &LedgerState) {
        env.storage().instance().set(&DataKey::State, state);
    }

    fn live_state(env: &Env) -> Result<LedgerState, ContractError> {
        let config = Self::load_config(env)?;
        let mut state = Self::load_state(env)?;
        Self::accrue(env, &config, &mut state)?;
        Ok(state)
    }

    fn load_depositor(env: &Env, user: &Address) -> Depositor {
        env.storage()
            .persistent()
            .get(&DataKey::Depositor(user.clone()))
            .unwrap_or_default()
    }

    fn save_depositor(env: &Env, user: &Address, depositor: &Depositor) {
        let key = DataKey::Depositor(user.clone());
        env.storage().persistent().set(&key, depositor);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn require_admin_tier(
        env: &Env,
        caller: &Address,
        min_tier: &AdminTier,
    ) -> Result<(), ContractError> {
        if admin_tiers::require_tier(env, caller, min_tier) {
            return Ok(());
        }
        if *caller != Self::get_admin(env.clone())? {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }
}
