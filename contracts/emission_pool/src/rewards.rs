//! Reward-per-token accounting for the linear emission pool.
//!
//! All accumulator values are scaled by [`SCALE`]:
//!
//! ```text
//! Δrpt   = reward_rate × elapsed × SCALE / total_staked
//! earned = staked × (rpt − rpt_paid) / SCALE + accrued
//! ```
//!
//! Both divisions round down, so the pool never owes more than it emitted.

use common::math::{self, MathError, SCALE};

/// Advance `stored` by the emission over `elapsed` seconds.
///
/// With nothing staked the accumulator does not move and the reward emitted
/// during that window stays in the pool unallocated.
pub fn reward_per_token(
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Result<i128, MathError> {
    if total_staked <= 0 || elapsed == 0 {
        return Ok(stored);
    }
    let emitted = reward_rate
        .checked_mul(elapsed as i128)
        .ok_or(MathError::Overflow)?;
    let delta = math::mul_div_floor(emitted, SCALE, total_staked)?;
    math::checked_add(stored, delta)
}

/// Reward owed to a staker holding `staked` since their last snapshot.
pub fn earned(
    staked: i128,
    current_rpt: i128,
    rpt_paid: i128,
    accrued: i128,
) -> Result<i128, MathError> {
    let delta = math::checked_sub(current_rpt, rpt_paid)?;
    let fresh = math::mul_div_floor(staked, delta, SCALE)?;
    math::checked_add(accrued, fresh)
}

/// Emission stops at `period_finish`.
pub fn last_time_reward_applicable(now: u64, period_finish: u64) -> u64 {
    now.min(period_finish)
}

/// Rate for a new reward period of `duration` seconds starting `now`.
///
/// Any reward not yet emitted from a running period is rolled into the new
/// one rather than forfeited.
pub fn next_reward_rate(
    reward: i128,
    duration: u64,
    now: u64,
    period_finish: u64,
    current_rate: i128,
) -> Result<i128, MathError> {
    if duration == 0 {
        return Err(MathError::DivisionByZero);
    }
    let total = if now >= period_finish {
        reward
    } else {
        let remaining = (period_finish - now) as i128;
        let leftover = remaining
            .checked_mul(current_rate)
            .ok_or(MathError::Overflow)?;
        math::checked_add(reward, leftover)?
    };
    Ok(total / duration as i128)
}
