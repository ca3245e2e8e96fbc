//! Two-layer debt-share accounting for the dual-asset compounding ledger.
//!
//! Layer 1 is the principal pool: reward-token reward proportional to each
//! depositor's stake. Layer 2 is the compounding pool: reward-token reward
//! earned by the unclaimed layer-1 reward itself.
//!
//! Layer-1 reward is booked as *debt shares*. A debt share is worth
//! `debt_per_debt_share / SCALE` reward tokens, so layer-2 growth is a single
//! multiplier bump that lifts every not-yet-crystallized debt share at once.
//! Debt shares are carried scaled by `SCALE`:
//!
//! ```text
//! minted            = reward × SCALE² / debt_per_debt_share   (scaled shares)
//! acc_reward_per_stake += minted / total_stake
//! pending(u)        = stake(u) × (acc_reward_per_stake − acc_reward_paid(u))
//! entitlement(u)    = crystallized(u) + pending(u) × debt_per_debt_share / SCALE²
//! ```
//!
//! `pending(u)` is exact, so `total_debt_shares` is exactly the sum of every
//! depositor's pending debt shares and drops to zero once all of them have
//! crystallized. That sum is the basis a layer-2 reward is spread over.
//!
//! Reward the ledger holds but owes nobody sits in `undistributed`: principal
//! reward that arrives with no stake, layer-2 reward that finds no basis,
//! and the dust every rounding step leaves behind. It goes out with the next
//! layer-2 step that has a basis. At all times
//!
//! ```text
//! held = total_crystallized + ⌈total_debt_shares × debt_per_debt_share / SCALE²⌉ + undistributed
//! ```
//!
//! Everything here is host-free; the contract loads a [`LedgerState`] and
//! the caller's [`Depositor`], applies these functions and writes both back.

use common::math::{self, MathError, SCALE};
use soroban_sdk::contracttype;

const SCALE_SQ: i128 = SCALE * SCALE;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerState {
    pub total_stake: i128,
    /// Scaled debt shares per staked unit.
    pub acc_reward_per_stake: i128,
    /// Reward-token value of one debt share, scaled. Starts at `SCALE`.
    pub debt_per_debt_share: i128,
    /// Scaled debt shares pending across all depositors.
    pub total_debt_shares: i128,
    pub total_crystallized: i128,
    /// Reward held by the ledger but not yet owed to anyone.
    pub undistributed: i128,
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            total_stake: 0,
            acc_reward_per_stake: 0,
            debt_per_debt_share: SCALE,
            total_debt_shares: 0,
            total_crystallized: 0,
            undistributed: 0,
        }
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Depositor {
    pub stake: i128,
    /// `acc_reward_per_stake` at the last settlement.
    pub acc_reward_paid: i128,
    /// Reward-token amount locked in for this depositor.
    pub crystallized: i128,
}

/// Reward tokens set aside for `shares` scaled debt shares.
fn reserved(state: &LedgerState, shares: i128) -> Result<i128, MathError> {
    math::mul_div_ceil(shares, state.debt_per_debt_share, SCALE_SQ)
}

/// Book `reward` reward tokens harvested from the principal pool.
pub fn accrue_principal_reward(state: &mut LedgerState, reward: i128) -> Result<(), MathError> {
    if reward < 0 {
        return Err(MathError::NegativeOperand);
    }
    if reward == 0 {
        return Ok(());
    }
    if state.total_stake == 0 {
        state.undistributed = math::checked_add(state.undistributed, reward)?;
        return Ok(());
    }

    let shares = math::mul_div_floor(reward, SCALE_SQ, state.debt_per_debt_share)?;
    let delta = shares / state.total_stake;
    if delta == 0 {
        state.undistributed = math::checked_add(state.undistributed, reward)?;
        return Ok(());
    }

    // Exactly what the stakers' pending amounts grow by.
    let minted = math::checked_mul(delta, state.total_stake)?;
    let total = math::checked_add(state.total_debt_shares, minted)?;
    let reserve = math::checked_sub(
        reserved(state, total)?,
        reserved(state, state.total_debt_shares)?,
    )?;

    state.acc_reward_per_stake = math::checked_add(state.acc_reward_per_stake, delta)?;
    state.total_debt_shares = total;
    state.undistributed = math::checked_add(
        state.undistributed,
        math::checked_sub(reward, reserve)?,
    )?;
    Ok(())
}

/// Book `reward` reward tokens harvested from the compounding pool by
/// raising `debt_per_debt_share`.
///
/// With less than one whole debt share outstanding there is nobody to
/// credit; the reward is carried in `undistributed` and goes out with the
/// next layer-2 reward that finds a basis.
pub fn accrue_compounding_reward(state: &mut LedgerState, reward: i128) -> Result<(), MathError> {
    if reward < 0 {
        return Err(MathError::NegativeOperand);
    }
    if reward == 0 {
        return Ok(());
    }

    let total = math::checked_add(reward, state.undistributed)?;
    if state.total_debt_shares < SCALE {
        state.undistributed = total;
        return Ok(());
    }

    let delta = math::mul_div_floor(total, SCALE_SQ, state.total_debt_shares)?;
    if delta == 0 {
        state.undistributed = total;
        return Ok(());
    }

    let before = reserved(state, state.total_debt_shares)?;
    state.debt_per_debt_share = math::checked_add(state.debt_per_debt_share, delta)?;
    let used = math::checked_sub(reserved(state, state.total_debt_shares)?, before)?;
    state.undistributed = math::checked_sub(total, used)?;
    Ok(())
}

/// Scaled debt shares `depositor` has accrued since their last settlement.
pub fn pending_debt_shares(state: &LedgerState, depositor: &Depositor) -> Result<i128, MathError> {
    let growth = math::checked_sub(state.acc_reward_per_stake, depositor.acc_reward_paid)?;
    math::checked_mul(depositor.stake, growth)
}

/// Whole debt shares already accounted for in `depositor`'s snapshot.
pub fn reward_debt(depositor: &Depositor) -> Result<i128, MathError> {
    math::mul_div_ceil(depositor.stake, depositor.acc_reward_paid, SCALE)
}

/// Live reward-token balance of `depositor`.
pub fn entitlement(state: &LedgerState, depositor: &Depositor) -> Result<i128, MathError> {
    let pending = pending_debt_shares(state, depositor)?;
    let value = math::mul_div_floor(pending, state.debt_per_debt_share, SCALE_SQ)?;
    math::checked_add(depositor.crystallized, value)
}

/// Lock in `depositor`'s pending reward at the current multiplier and
/// re-snapshot the accumulator. Returns the reward-token amount crystallized.
///
/// Running it twice in a row crystallizes nothing the second time.
pub fn crystallize(state: &mut LedgerState, depositor: &mut Depositor) -> Result<i128, MathError> {
    let pending = pending_debt_shares(state, depositor)?;
    let mut value = 0;
    if pending > 0 {
        value = math::mul_div_floor(pending, state.debt_per_debt_share, SCALE_SQ)?;
        let remaining = math::checked_sub(state.total_debt_shares, pending)?;
        let released = math::checked_sub(
            reserved(state, state.total_debt_shares)?,
            reserved(state, remaining)?,
        )?;

        depositor.crystallized = math::checked_add(depositor.crystallized, value)?;
        state.total_crystallized = math::checked_add(state.total_crystallized, value)?;
        state.total_debt_shares = remaining;
        state.undistributed = math::checked_add(
            state.undistributed,
            math::checked_sub(released, value)?,
        )?;
    }
    depositor.acc_reward_paid = state.acc_reward_per_stake;
    Ok(value)
}

/// Add `amount` principal. Pending reward on the existing balance is
/// crystallized first; returns the amount crystallized.
pub fn deposit(
    state: &mut LedgerState,
    depositor: &mut Depositor,
    amount: i128,
) -> Result<i128, MathError> {
    if amount < 0 {
        return Err(MathError::NegativeOperand);
    }
    let crystallized = crystallize(state, depositor)?;
    depositor.stake = math::checked_add(depositor.stake, amount)?;
    state.total_stake = math::checked_add(state.total_stake, amount)?;
    Ok(crystallized)
}

/// Crystallize and remove the whole position. Returns
/// `(stake, crystallized reward)`.
pub fn withdraw_all(
    state: &mut LedgerState,
    depositor: &mut Depositor,
) -> Result<(i128, i128), MathError> {
    crystallize(state, depositor)?;
    let stake = depositor.stake;
    let reward = depositor.crystallized;
    state.total_stake = math::checked_sub(state.total_stake, stake)?;
    state.total_crystallized = math::checked_sub(state.total_crystallized, reward)?;
    *depositor = Depositor::default();
    Ok((stake, reward))
}

/// Reward-token value owed to all depositors together.
pub fn total_value(state: &LedgerState) -> Result<i128, MathError> {
    let pending = math::mul_div_floor(state.total_debt_shares, state.debt_per_debt_share, SCALE_SQ)?;
    math::checked_add(state.total_crystallized, pending)
}

/// Reward tokens set aside for depositors, rounding dust included. Together
/// with `undistributed` this is everything the ledger holds.
pub fn backing(state: &LedgerState) -> Result<i128, MathError> {
    math::checked_add(
        state.total_crystallized,
        reserved(state, state.total_debt_shares)?,
    )
}
