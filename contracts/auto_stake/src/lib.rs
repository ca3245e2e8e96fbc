#![no_std]

//! Single-asset compounding ledger.
//!
//! Wraps one emission pool whose stake token is also its reward token.
//! Every interaction first pulls whatever the pool has paid the ledger and
//! re-stakes it, so depositors' shares grow in value without anyone
//! claiming.

pub mod events;
pub mod shares;

use common::admin_tiers::{self, AdminTier};
use common::greylist;
use common::math::MathError;
use common::pool::PoolPosition;
use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

use shares::{ShareState, WeightConfig};

// ── Storage ──────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    State,
    Weight,
    Position(Address),
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
    /// Emission pool the ledger stakes into.
    pub pool: Address,
    /// The pool's stake token, which is also its reward token.
    pub token: Address,
    /// Receives the proceeds of `force_grey_listed_exit`.
    pub escrow: Address,
}

/// A depositor's record. `reward_debt` is the value-per-share observed at
/// the depositor's last settlement.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub shares: i128,
    pub reward_debt: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct AutoStake;

#[contractimpl]
impl AutoStake {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger on top of `pool`.
    ///
    /// Fails with `TokenMismatch` unless the pool pays rewards in the token
    /// it accepts as stake.
    pub fn initialize(
        env: Env,
        admin: Address,
        pool: Address,
        escrow: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ContractError::AlreadyInitialized);
        }

        let position = PoolPosition::new(&env, &pool);
        let token = position.stake_token();
        if token != position.reward_token() {
            return Err(ContractError::TokenMismatch);
        }

        let config = Config {
            pool,
            token,
            escrow,
        };
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage()
            .instance()
            .set(&DataKey::State, &ShareState::default());
        env.storage()
            .instance()
            .set(&DataKey::Weight, &WeightConfig::default());

        admin_tiers::set_super_admin(&env, &admin);

        events::publish_initialized(&env, admin, config.pool, config.token, config.escrow);

        Ok(())
    }

    // ── Depositor entry points ──────────────────────────────────────────────

    /// Deposit `amount` tokens and mint shares at the current (possibly
    /// time-weighted) price. Returns the shares minted.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        if greylist::is_grey_listed(&env, &staker) {
            log!(&env, "stake rejected for greylisted depositor");
            return Err(ContractError::GreyListed);
        }

        let pool = PoolPosition::new(&env, &config.pool);
        let mut state = Self::load_state(&env)?;
        let harvested = pool.pending_reward();
        shares::accrue(&mut state, harvested)?;

        let weight = shares::time_weight(&Self::weight_config(env.clone()), env.ledger().timestamp())?;
        let minted = shares::mint(&mut state, amount, weight)?;
        if minted == 0 {
            return Err(ContractError::InvalidInput);
        }

        let mut position = Self::load_position(&env, &staker);
        position.shares = position
            .shares
            .checked_add(minted)
            .ok_or(ContractError::ArithmeticOverflow)?;
        position.reward_debt = shares::value_per_share(&state)?;

        Self::save_state(&env, &state);
        Self::save_position(&env, &staker, &position);

        // Effects are committed; now move tokens.
        token::Client::new(&env, &config.token).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );
        if harvested > 0 {
            pool.claim();
        }
        pool.deposit(&config.token, amount + harvested);

        events::publish_staked(&env, staker, amount, minted, weight, state.total_shares);

        Ok(minted)
    }

    /// Burn all of the caller's shares and pay out their value.
    /// Returns the amount paid.
    pub fn exit(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if greylist::is_grey_listed(&env, &staker) {
            log!(&env, "exit rejected for greylisted depositor");
            return Err(ContractError::GreyListed);
        }

        let paid = Self::exit_to(&env, &config, &staker, &staker)?;
        events::publish_exited(&env, staker, paid);
        Ok(paid)
    }

    /// Pull and re-stake any reward the pool has paid the ledger.
    /// A no-op when nothing is pending.
    pub fn refresh_auto_stake(env: Env) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        let pool = PoolPosition::new(&env, &config.pool);

        let harvested = pool.pending_reward();
        if harvested == 0 {
            return Ok(());
        }

        let mut state = Self::load_state(&env)?;
        shares::accrue(&mut state, harvested)?;
        Self::save_state(&env, &state);

        pool.claim();
        pool.deposit(&config.token, harvested);

        events::publish_refreshed(&env, harvested, shares::value_per_share(&state)?);

        Ok(())
    }

    // ── Governance ──────────────────────────────────────────────────────────

    /// Liquidate a greylisted depositor into the escrow. Requires at least
    /// `ContractAdmin` tier. Returns the amount sent to escrow.
    pub fn force_grey_listed_exit(
        env: Env,
        caller: Address,
        target: Address,
    ) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::ContractAdmin)?;

        if !greylist::is_grey_listed(&env, &target) {
            return Err(ContractError::NotGreyListed);
        }

        let escrow = config.escrow.clone();
        let paid = Self::exit_to(&env, &config, &target, &escrow)?;
        events::publish_forced_exit(&env, target, escrow, paid);
        Ok(paid)
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

    /// Requires at least `ContractAdmin` tier.
    pub fn set_weight_config(
        env: Env,
        caller: Address,
        config: WeightConfig,
    ) -> Result<(), ContractError> {
        Self::load_config(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::ContractAdmin)?;

        if !config.is_valid() {
            return Err(ContractError::InvalidInput);
        }
        env.storage().instance().set(&DataKey::Weight, &config);
        events::publish_weight_set(&env, config);
        Ok(())
    }

    // ── Views ────────────────────────────────────────────────────────────────

    /// Current token value of `user`'s shares, including reward the pool
    /// has earned for the ledger but not yet paid.
    pub fn balance_of(env: Env, user: Address) -> Result<i128, ContractError> {
        let state = Self::live_state(&env)?;
        let position = Self::load_position(&env, &user);
        Ok(shares::value_of(&state, position.shares)?)
    }

    pub fn value_per_share(env: Env) -> Result<i128, ContractError> {
        Ok(shares::value_per_share(&Self::live_state(&env)?)?)
    }

    pub fn total_value(env: Env) -> Result<i128, ContractError> {
        Ok(Self::live_state(&env)?.total_value)
    }

    pub fn total_shares(env: Env) -> Result<i128, ContractError> {
        Ok(Self::load_state(&env)?.total_shares)
    }

    pub fn shares_of(env: Env, user: Address) -> i128 {
        Self::load_position(&env, &user).shares
    }

    /// Value-per-share recorded at `user`'s last settlement.
    pub fn debt_snapshot(env: Env, user: Address) -> i128 {
        Self::load_position(&env, &user).reward_debt
    }

    pub fn weight_config(env: Env) -> WeightConfig {
        env.storage()
            .instance()
            .get(&DataKey::Weight)
            .unwrap_or_default()
    }

    /// Weight a deposit made now would receive, scaled.
    pub fn current_weight(env: Env) -> Result<i128, ContractError> {
        Ok(shares::time_weight(
            &Self::weight_config(env.clone()),
            env.ledger().timestamp(),
        )?)
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

    /// Settle, burn every share `owner` holds and send the proceeds to
    /// `recipient`.
    fn exit_to(
        env: &Env,
        config: &Config,
        owner: &Address,
        recipient: &Address,
    ) -> Result<i128, ContractError> {
        let position = Self::load_position(env, owner);
        if position.shares <= 0 {
            return Err(ContractError::InsufficientBalance);
        }

        let pool = PoolPosition::new(env, &config.pool);
        let mut state = Self::load_state(env)?;
        let harvested = pool.pending_reward();
        shares::accrue(&mut state, harvested)?;
        let owed = shares::burn(&mut state, position.shares)?;

        Self::save_state(env, &state);
        env.storage()
            .persistent()
            .remove(&DataKey::Position(owner.clone()));

        if harvested > 0 {
            pool.claim();
        }
        // Only the net difference between harvested reward and payout
        // crosses the pool boundary.
        if harvested >= owed {
            pool.deposit(&config.token, harvested - owed);
        } else {
            pool.withdraw(owed - harvested);
        }
        token::Client::new(env, &config.token).transfer(
            &env.current_contract_address(),
            recipient,
            &owed,
        );

        Ok(owed)
    }

    fn load_config(env: &Env) -> Result<Config, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_state(env: &Env) -> Result<ShareState, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::State)
            .ok_or(ContractError::NotInitialized)
    }

    fn save_state(env: &Env, state: &ShareState) {
        env.storage().instance().set(&DataKey::State, state);
    }

    /// Stored state plus reward the pool would pay out right now.
    fn live_state(env: &Env) -> Result<ShareState, ContractError> {
        let config = Self::load_config(env)?;
        let mut state = Self::load_state(env)?;
        shares::accrue(
            &mut state,
            PoolPosition::new(env, &config.pool).pending_reward(),
        )?;
        Ok(state)
    }

    fn load_position(env: &Env, user: &Address) -> Position {
        env.storage()
            .persistent()
            .get(&DataKey::Position(user.clone()))
            .unwrap_or_default()
    }

    fn save_position(env: &Env, user: &Address, position: &Position) {
        let key = DataKey::Position(user.clone());
        env.storage().persistent().set(&key, position);
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
