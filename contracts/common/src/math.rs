//! Scaled-integer arithmetic shared by the emission pool and both
//! compounding ledgers.
//!
//! Every accumulator, multiplier and per-share value in the suite is an
//! `i128` scaled by [`SCALE`], so `SCALE` itself represents `1.0`.
//! Operands are token amounts and are never negative; the helpers reject
//! negative input instead of guessing a rounding direction for it.
//!
//! Rounding convention: anything credited to a depositor (entitlements,
//! minted shares, accumulator increments) uses [`mul_div_floor`]; anything
//! charged against a depositor (reward debts) uses [`mul_div_ceil`]. The
//! ledger keeps the truncation dust, never the user.

use uint::construct_uint;

/// Fixed-point unit. Products of two amounts are taken at 256 bits, so any
/// `mul_div` whose result fits an `i128` succeeds.
pub const SCALE: i128 = 1_000_000_000_000;

construct_uint! {
    /// 256-bit intermediate for `a * b / d`.
    pub struct U256(4);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MathError {
    Overflow,
    Underflow,
    DivisionByZero,
    NegativeOperand,
}

fn check_operands(a: i128, b: i128, denominator: i128) -> Result<(), MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    if a < 0 || b < 0 || denominator < 0 {
        return Err(MathError::NegativeOperand);
    }
    Ok(())
}

// Operands are checked non-negative before widening.
fn widen(v: i128) -> U256 {
    U256::from(v as u128)
}

fn narrow(v: U256) -> Result<i128, MathError> {
    if v > widen(i128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(v.as_u128() as i128)
}

/// `a * b` at full width, with quotient and remainder by `denominator`.
fn wide_div_mod(a: i128, b: i128, denominator: i128) -> (U256, U256) {
    (widen(a) * widen(b)).div_mod(widen(denominator))
}

/// `floor(a * b / denominator)`.
pub fn mul_div_floor(a: i128, b: i128, denominator: i128) -> Result<i128, MathError> {
    check_operands(a, b, denominator)?;

    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }
    narrow(wide_div_mod(a, b, denominator).0)
}

/// `ceil(a * b / denominator)`.
pub fn mul_div_ceil(a: i128, b: i128, denominator: i128) -> Result<i128, MathError> {
    check_operands(a, b, denominator)?;

    if let Some(product) = a.checked_mul(b) {
        let floor = product / denominator;
        if product % denominator == 0 {
            return Ok(floor);
        }
        return checked_add(floor, 1);
    }
    let (quotient, rem) = wide_div_mod(a, b, denominator);
    if rem.is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient + U256::one())
    }
}

pub fn checked_add(a: i128, b: i128) -> Result<i128, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

pub fn checked_mul(a: i128, b: i128) -> Result<i128, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// Subtraction that refuses to go below zero.
pub fn checked_sub(a: i128, b: i128) -> Result<i128, MathError> {
    match a.checked_sub(b) {
        Some(v) if v >= 0 => Ok(v),
        _ => Err(MathError::Underflow),
    }
}
