#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the share engine.
//!
//! Invariants tested:
//! - Value per share never decreases, whatever mix of deposits, rewards and
//!   exits is applied
//! - The sum of every holder's shares always equals `total_shares`
//! - Holders can never jointly claim more than `total_value`

use auto_stake::shares::{self, ShareState};
use common::math::SCALE;
use proptest::prelude::*;

const HOLDERS: usize = 4;

#[derive(Clone, Debug)]
enum Op {
    Deposit { holder: usize, amount: i128, weight: i128 },
    Reward(i128),
    Exit(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..HOLDERS, 1i128..=1_000_000_000, SCALE..=3 * SCALE)
            .prop_map(|(holder, amount, weight)| Op::Deposit { holder, amount, weight }),
        (0i128..=10_000_000).prop_map(Op::Reward),
        (0..HOLDERS).prop_map(Op::Exit),
    ]
}

proptest! {
    #[test]
    fn prop_value_per_share_is_monotonic(ops in prop::collection::vec(op(), 1..60)) {
        let mut state = ShareState::default();
        let mut held = [0i128; HOLDERS];
        let mut last = shares::value_per_share(&state).unwrap();

        for op in ops {
            match op {
                Op::Deposit { holder, amount, weight } => {
                    held[holder] += shares::mint(&mut state, amount, weight).unwrap();
                }
                Op::Reward(amount) => shares::accrue(&mut state, amount).unwrap(),
                Op::Exit(holder) => {
                    shares::burn(&mut state, held[holder]).unwrap();
                    held[holder] = 0;
                }
            }

            // An emptied ledger resets to par; the monotone run starts over.
            if state.total_shares == 0 {
                last = SCALE;
                continue;
            }
            let now = shares::value_per_share(&state).unwrap();
            prop_assert!(now >= last, "value per share fell from {} to {}", last, now);
            last = now;
        }
    }

    #[test]
    fn prop_shares_and_value_are_conserved(ops in prop::collection::vec(op(), 1..60)) {
        let mut state = ShareState::default();
        let mut held = [0i128; HOLDERS];

        for op in ops {
            match op {
                Op::Deposit { holder, amount, weight } => {
                    held[holder] += shares::mint(&mut state, amount, weight).unwrap();
                }
                Op::Reward(amount) => shares::accrue(&mut state, amount).unwrap(),
                Op::Exit(holder) => {
                    shares::burn(&mut state, held[holder]).unwrap();
                    held[holder] = 0;
                }
            }

            prop_assert_eq!(held.iter().sum::<i128>(), state.total_shares);
            let claims: i128 = held
                .iter()
                .map(|h| shares::value_of(&state, *h).unwrap())
                .sum();
            prop_assert!(claims <= state.total_value);
        }
    }

    /// Burning every outstanding share releases the whole pot.
    #[test]
    fn prop_last_exit_drains_pot(
        deposits in prop::collection::vec(1i128..=1_000_000, 1..8),
        reward in 0i128..=1_000_000,
    ) {
        let mut state = ShareState::default();
        let mut held = Vec::new();
        for amount in &deposits {
            held.push(shares::mint(&mut state, *amount, SCALE).unwrap());
        }
        shares::accrue(&mut state, reward).unwrap();

        let paid: i128 = held
            .iter()
            .map(|h| shares::burn(&mut state, *h).unwrap())
            .sum();
        prop_assert_eq!(paid, deposits.iter().sum::<i128>() + reward);
        prop_assert_eq!(state.total_value, 0);
        prop_assert_eq!(state.total_shares, 0);
    }
}
