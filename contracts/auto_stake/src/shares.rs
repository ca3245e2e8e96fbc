//! Share accounting for the single-asset compounding ledger.
//!
//! Depositors hold shares of one growing pot (`total_value`): their own
//! principal plus every reward the pool has paid out and the ledger has
//! re-staked. Rewards raise `total_value` without minting shares, so the
//! value of a share only ever goes up.
//!
//! Nothing here touches the host; the contract loads a [`ShareState`], runs
//! these functions, and writes it back.

use common::math::{self, MathError, SCALE};
use soroban_sdk::contracttype;

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShareState {
    pub total_shares: i128,
    /// Principal plus re-staked reward held in the pool for all depositors.
    pub total_value: i128,
}

/// Deposit weighting that discounts shares minted late in a reward window.
///
/// ```text
/// w(t) = 1 + (t − start) × slope_numerator / slope_denominator   (capped)
/// shares = amount × total_shares / total_value / w(t)
/// ```
///
/// The weight is a discount: minted shares are *divided* by `w`, never
/// multiplied. A late depositor therefore pays more than the current value
/// per share, and the surplus stays in the pot for existing holders, so
/// `value_per_share` cannot fall.
///
/// `slope_denominator == 0` disables weighting (`w = 1`).
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WeightConfig {
    pub start: u64,
    pub slope_numerator: i128,
    pub slope_denominator: i128,
    /// Upper bound on `w`, scaled by `SCALE`.
    pub cap: i128,
}

impl WeightConfig {
    pub fn is_enabled(&self) -> bool {
        self.slope_denominator > 0 && self.slope_numerator > 0
    }

    pub fn is_valid(&self) -> bool {
        if self.slope_numerator < 0 || self.slope_denominator < 0 {
            return false;
        }
        !self.is_enabled() || self.cap >= SCALE
    }
}

/// Value of one share, scaled. An empty ledger prices shares at `1.0`.
pub fn value_per_share(state: &ShareState) -> Result<i128, MathError> {
    if state.total_shares == 0 {
        return Ok(SCALE);
    }
    math::mul_div_floor(state.total_value, SCALE, state.total_shares)
}

/// Fold freshly earned reward into the pot.
pub fn accrue(state: &mut ShareState, reward: i128) -> Result<(), MathError> {
    if reward < 0 {
        return Err(MathError::NegativeOperand);
    }
    state.total_value = math::checked_add(state.total_value, reward)?;
    Ok(())
}

pub fn time_weight(config: &WeightConfig, now: u64) -> Result<i128, MathError> {
    if !config.is_enabled() || now <= config.start {
        return Ok(SCALE);
    }
    let elapsed = (now - config.start) as i128;
    let growth = math::mul_div_floor(
        elapsed
            .checked_mul(config.slope_numerator)
            .ok_or(MathError::Overflow)?,
        SCALE,
        config.slope_denominator,
    )?;
    let weight = math::checked_add(SCALE, growth)?;
    Ok(weight.min(config.cap))
}

/// Mint shares for `amount` of new principal at `weight` and add both to
/// the totals. Returns the shares minted, rounded down.
pub fn mint(state: &mut ShareState, amount: i128, weight: i128) -> Result<i128, MathError> {
    if amount < 0 {
        return Err(MathError::NegativeOperand);
    }
    let unweighted = if state.total_shares == 0 || state.total_value == 0 {
        amount
    } else {
        math::mul_div_floor(amount, state.total_shares, state.total_value)?
    };
    let shares = math::mul_div_floor(unweighted, SCALE, weight.max(SCALE))?;

    state.total_shares = math::checked_add(state.total_shares, shares)?;
    state.total_value = math::checked_add(state.total_value, amount)?;
    Ok(shares)
}

/// Value currently backing `shares`, rounded down.
pub fn value_of(state: &ShareState, shares: i128) -> Result<i128, MathError> {
    if shares == 0 || state.total_shares == 0 {
        return Ok(0);
    }
    math::mul_div_floor(shares, state.total_value, state.total_shares)
}

/// Burn `shares` and return the value released for them.
pub fn burn(state: &mut ShareState, shares: i128) -> Result<i128, MathError> {
    if shares > state.total_shares {
        return Err(MathError::Underflow);
    }
    let owed = value_of(state, shares)?;
    state.total_shares = math::checked_sub(state.total_shares, shares)?;
    state.total_value = math::checked_sub(state.total_value, owed)?;
    Ok(owed)
}
