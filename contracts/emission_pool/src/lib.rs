#![no_std]

pub mod events;
pub mod rewards;

use common::admin_tiers::{self, AdminTier};
use common::math::MathError;
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, Env, Symbol,
};

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const REWARD_RATE: Symbol = symbol_short!("RWD_RATE");
const DURATION: Symbol = symbol_short!("DURATION");
const PERIOD_FINISH: Symbol = symbol_short!("PRD_FIN");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const REWARD_PER_TOKEN: Symbol = symbol_short!("RPT");
const LAST_UPDATE: Symbol = symbol_short!("LAST_UPD");

// Per-user persistent storage uses tuple keys:  (prefix, user_address)
const USER_STAKE: Symbol = symbol_short!("STK");
const USER_RPT_PAID: Symbol = symbol_short!("RPT_PAID");
const USER_EARNED: Symbol = symbol_short!("ERND");

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
    InsufficientRewardBalance = 6,
    PeriodNotFinished = 7,
    ArithmeticOverflow = 8,
}

impl From<MathError> for ContractError {
    fn from(_: MathError) -> Self {
        ContractError::ArithmeticOverflow
    }
}

/// Snapshot of a staker's position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub staked: i128,
    pub earned: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Linear emission pool: stakers deposit `stake_token` and earn
/// `reward_token` at a constant rate until `period_finish`.
#[contract]
pub struct EmissionPool;

#[contractimpl]
impl EmissionPool {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `stake_token`      – token deposited by stakers.
    /// * `reward_token`     – token emitted; may equal `stake_token`.
    /// * `rewards_duration` – length in seconds of each reward period.
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_token: Address,
        rewards_duration: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if rewards_duration == 0 {
            return Err(ContractError::InvalidInput);
        }

        let now = env.ledger().timestamp();

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&DURATION, &rewards_duration);
        env.storage().instance().set(&LAST_UPDATE, &now);
        env.storage().instance().set(&PERIOD_FINISH, &now);
        // REWARD_RATE, TOTAL_STAKED and REWARD_PER_TOKEN start at zero;
        // unwrap_or(0) covers the absent keys.

        admin_tiers::set_super_admin(&env, &admin);

        events::publish_initialized(&env, admin, stake_token, reward_token, rewards_duration);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// Tokens are pulled with `transfer_from`, so the staker must first
    /// approve this pool for at least `amount`.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        Self::update_reward(&env, Some(&staker))?;

        let user_stake_key = (USER_STAKE, staker.clone());
        let prev_stake: i128 = env
            .storage()
            .persistent()
            .get(&user_stake_key)
            .unwrap_or(0);
        let new_stake = prev_stake
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        env.storage().persistent().set(&user_stake_key, &new_stake);

        let new_total = Self::get_total_staked(env.clone())
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        let me = env.current_contract_address();
        token::Client::new(&env, &Self::stake_token(env.clone())?)
            .transfer_from(&me, &staker, &me, &amount);

        events::publish_staked(&env, staker, amount, new_total);

        Ok(())
    }

    /// Withdraw `amount` of the caller's principal. Earned reward stays
    /// claimable.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        Self::update_reward(&env, Some(&staker))?;
        Self::withdraw_internal(&env, &staker, amount)
    }

    /// Claim all earned reward. Returns the amount paid, zero included.
    pub fn get_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        Self::update_reward(&env, Some(&staker))?;
        Self::pay_reward(&env, &staker)
    }

    /// Withdraw the full principal and claim all reward.
    /// Returns `(principal, reward)`.
    pub fn exit(env: Env, staker: Address) -> Result<(i128, i128), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        Self::update_reward(&env, Some(&staker))?;

        let staked = Self::balance_of(env.clone(), staker.clone());
        if staked <= 0 {
            return Err(ContractError::InsufficientBalance);
        }
        Self::withdraw_internal(&env, &staker, staked)?;
        let reward = Self::pay_reward(&env, &staker)?;

        Ok((staked, reward))
    }

    // ── Reward funding ──────────────────────────────────────────────────────

    /// Start (or extend) a reward period emitting `reward` over the
    /// configured duration.
    ///
    /// The reward tokens must already sit in the pool. Reward still unemitted
    /// from a running period is rolled into the new rate. Requires at least
    /// `ContractAdmin` tier.
    pub fn notify_reward_amount(
        env: Env,
        caller: Address,
        reward: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::ContractAdmin)?;

        if reward < 0 {
            return Err(ContractError::InvalidInput);
        }

        Self::update_reward(&env, None)?;

        let now = env.ledger().timestamp();
        let duration = Self::rewards_duration(env.clone());
        let period_finish = Self::period_finish(env.clone());
        let current_rate = Self::reward_rate(env.clone());
        let new_rate =
            rewards::next_reward_rate(reward, duration, now, period_finish, current_rate)?;

        // Principal is not reward: when both tokens coincide, staked funds
        // must not be counted toward covering the emission.
        let reward_token = Self::reward_token(env.clone())?;
        let mut available =
            token::Client::new(&env, &reward_token).balance(&env.current_contract_address());
        if reward_token == Self::stake_token(env.clone())? {
            available = available.saturating_sub(Self::get_total_staked(env.clone()));
        }
        if new_rate > available / duration as i128 {
            log!(&env, "reward rate {} exceeds balance {}", new_rate, available);
            return Err(ContractError::InsufficientRewardBalance);
        }

        let new_finish = now.saturating_add(duration);
        env.storage().instance().set(&REWARD_RATE, &new_rate);
        env.storage().instance().set(&LAST_UPDATE, &now);
        env.storage().instance().set(&PERIOD_FINISH, &new_finish);

        events::publish_reward_added(&env, reward, new_rate, new_finish);

        Ok(())
    }

    /// Change the length of future reward periods. Only allowed once the
    /// current period has finished.
    pub fn set_rewards_duration(
        env: Env,
        caller: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::ContractAdmin)?;

        if duration == 0 {
            return Err(ContractError::InvalidInput);
        }
        if env.ledger().timestamp() < Self::period_finish(env.clone()) {
            return Err(ContractError::PeriodNotFinished);
        }

        env.storage().instance().set(&DURATION, &duration);

        events::publish_duration_set(&env, duration);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn balance_of(env: Env, staker: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(USER_STAKE, staker))
            .unwrap_or(0)
    }

    /// Real-time earned reward for a staker without mutating state.
    pub fn earned(env: Env, staker: Address) -> Result<i128, ContractError> {
        let current_rpt = Self::reward_per_token(env.clone())?;
        let (staked, paid, accrued) = Self::read_user(&env, &staker);
        Ok(rewards::earned(staked, current_rpt, paid, accrued)?)
    }

    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let current_rpt = Self::reward_per_token(env.clone())?;
        let (staked, paid, accrued) = Self::read_user(&env, &staker);
        Ok(StakerInfo {
            staked,
            earned: rewards::earned(staked, current_rpt, paid, accrued)?,
        })
    }

    /// Accumulator value as of now, without writing it back.
    pub fn reward_per_token(env: Env) -> Result<i128, ContractError> {
        let stored: i128 = env
            .storage()
            .instance()
            .get(&REWARD_PER_TOKEN)
            .unwrap_or(0);
        let last_update: u64 = env.storage().instance().get(&LAST_UPDATE).unwrap_or(0);
        let applicable = Self::last_time_reward_applicable(env.clone());
        Ok(rewards::reward_per_token(
            stored,
            Self::reward_rate(env.clone()),
            applicable.saturating_sub(last_update),
            Self::get_total_staked(env),
        )?)
    }

    pub fn last_time_reward_applicable(env: Env) -> u64 {
        rewards::last_time_reward_applicable(
            env.ledger().timestamp(),
            Self::period_finish(env.clone()),
        )
    }

    pub fn reward_rate(env: Env) -> i128 {
        env.storage().instance().get(&REWARD_RATE).unwrap_or(0)
    }

    pub fn period_finish(env: Env) -> u64 {
        env.storage().instance().get(&PERIOD_FINISH).unwrap_or(0)
    }

    pub fn rewards_duration(env: Env) -> u64 {
        env.storage().instance().get(&DURATION).unwrap_or(0)
    }

    pub fn get_total_staked(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
    }

    pub fn stake_token(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn reward_token(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Admin tier management ────────────────────────────────────────────────

    /// Only a `SuperAdmin` may call this.
    pub fn promote_admin(
        env: Env,
        caller: Address,
        target: Address,
        tier: AdminTier,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::promote_admin(&env, &caller, &target, tier) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Only a `SuperAdmin` may call this.
    pub fn demote_admin(env: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
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

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: `caller` must hold at least `min_tier`, or be the stored admin.
    fn require_admin_tier(
        env: &Env,
        caller: &Address,
        min_tier: &AdminTier,
    ) -> Result<(), ContractError> {
        if admin_tiers::require_tier(env, caller, min_tier) {
            return Ok(());
        }
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn read_user(env: &Env, staker: &Address) -> (i128, i128, i128) {
        let staked: i128 = env
            .storage()
            .persistent()
            .get(&(USER_STAKE, staker.clone()))
            .unwrap_or(0);
        let paid: i128 = env
            .storage()
            .persistent()
            .get(&(USER_RPT_PAID, staker.clone()))
            .unwrap_or(0);
        let accrued: i128 = env
            .storage()
            .persistent()
            .get(&(USER_EARNED, staker.clone()))
            .unwrap_or(0);
        (staked, paid, accrued)
    }

    /// Flush the global accumulator and, when `user` is given, crystallize
    /// that user's earned reward against it.
    fn update_reward(env: &Env, user: Option<&Address>) -> Result<(), ContractError> {
        let current_rpt = Self::reward_per_token(env.clone())?;
        let applicable = Self::last_time_reward_applicable(env.clone());
        env.storage().instance().set(&REWARD_PER_TOKEN, &current_rpt);
        env.storage().instance().set(&LAST_UPDATE, &applicable);

        if let Some(user) = user {
            let (staked, paid, accrued) = Self::read_user(env, user);
            let new_earned = rewards::earned(staked, current_rpt, paid, accrued)?;
            env.storage()
                .persistent()
                .set(&(USER_EARNED, user.clone()), &new_earned);
            env.storage()
                .persistent()
                .set(&(USER_RPT_PAID, user.clone()), &current_rpt);
        }
        Ok(())
    }

    fn withdraw_internal(env: &Env, staker: &Address, amount: i128) -> Result<(), ContractError> {
        let user_stake_key = (USER_STAKE, staker.clone());
        let prev_stake: i128 = env
            .storage()
            .persistent()
            .get(&user_stake_key)
            .unwrap_or(0);
        if prev_stake < amount {
            return Err(ContractError::InsufficientBalance);
        }

        let new_stake = prev_stake - amount;
        if new_stake == 0 {
            env.storage().persistent().remove(&user_stake_key);
        } else {
            env.storage().persistent().set(&user_stake_key, &new_stake);
        }
        let new_total = Self::get_total_staked(env.clone()).saturating_sub(amount);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        // Effects are committed; now move the tokens.
        token::Client::new(env, &Self::stake_token(env.clone())?).transfer(
            &env.current_contract_address(),
            staker,
            &amount,
        );

        events::publish_withdrawn(env, staker.clone(), amount, new_total);

        Ok(())
    }

    fn pay_reward(env: &Env, staker: &Address) -> Result<i128, ContractError> {
        let earned_key = (USER_EARNED, staker.clone());
        let earned: i128 = env.storage().persistent().get(&earned_key).unwrap_or(0);
        if earned <= 0 {
            return Ok(0);
        }

        env.storage().persistent().set(&earned_key, &0i128);

        token::Client::new(env, &Self::reward_token(env.clone())?).transfer(
            &env.current_contract_address(),
            staker,
            &earned,
        );

        events::publish_reward_paid(env, staker.clone(), earned);

        Ok(earned)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
