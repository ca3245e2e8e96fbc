#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based state machine tests for the two-layer accounting engine.
//!
//! The model tracks every reward token that enters the ledger and every one
//! paid out, and replays random interleavings of deposits, exits, touches
//! and rewards from both layers.
//!
//! Invariants tested:
//! - Solvency: the sum of all entitlements never exceeds the reward held
//! - Every reward token held is either backing depositors or undistributed,
//!   and entitlements fall short of the backing by at most one token per
//!   depositor
//! - `debt_per_debt_share` and `acc_reward_per_stake` never decrease
//! - Pending debt shares add up to exactly `total_debt_shares`
//! - `total_stake` and `total_crystallized` always equal the per-depositor sums
//! - A depositor joining after a reward has nothing pending

use auto_stake_multi_asset::ledger::{self, Depositor, LedgerState};
use proptest::prelude::*;
use proptest_derive::Arbitrary;

const USERS: usize = 4;

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    #[proptest(weight = 3)]
    Stake(
        #[proptest(strategy = "0..USERS")] usize,
        #[proptest(strategy = "1i128..=1_000_000_000_000")] i128,
    ),
    Exit(#[proptest(strategy = "0..USERS")] usize),
    Touch(#[proptest(strategy = "0..USERS")] usize),
    #[proptest(weight = 2)]
    PrincipalReward(#[proptest(strategy = "0i128..=1_000_000_000")] i128),
    #[proptest(weight = 2)]
    CompoundingReward(#[proptest(strategy = "0i128..=1_000_000_000")] i128),
}

fn op() -> impl Strategy<Value = Op> {
    any::<Op>()
}

struct Model {
    state: LedgerState,
    users: [Depositor; USERS],
    /// Reward tokens the ledger has received minus those it paid out.
    held: i128,
}

impl Model {
    fn new() -> Self {
        Self {
            state: LedgerState::new(),
            users: Default::default(),
            held: 0,
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Stake(u, amount) => {
                ledger::deposit(&mut self.state, &mut self.users[u], amount).unwrap();
            }
            Op::Exit(u) => {
                if self.users[u].stake == 0 {
                    return;
                }
                let (_, reward) = ledger::withdraw_all(&mut self.state, &mut self.users[u]).unwrap();
                self.held -= reward;
            }
            Op::Touch(u) => {
                ledger::crystallize(&mut self.state, &mut self.users[u]).unwrap();
            }
            Op::PrincipalReward(reward) => {
                ledger::accrue_principal_reward(&mut self.state, reward).unwrap();
                self.held += reward;
            }
            Op::CompoundingReward(reward) => {
                ledger::accrue_compounding_reward(&mut self.state, reward).unwrap();
                self.held += reward;
            }
        }
    }

    fn owed(&self) -> i128 {
        self.users
            .iter()
            .map(|u| ledger::entitlement(&self.state, u).unwrap())
            .sum()
    }
}

proptest! {
    #[test]
    fn prop_ledger_never_over_promises(ops in prop::collection::vec(op(), 1..80)) {
        let mut model = Model::new();

        for op in &ops {
            model.apply(op);
            prop_assert!(model.held >= 0, "paid out more than received after {:?}", op);
            prop_assert!(
                model.owed() + model.state.undistributed <= model.held,
                "owed {} + undistributed {} > held {}",
                model.owed(),
                model.state.undistributed,
                model.held
            );
            prop_assert!(ledger::total_value(&model.state).unwrap() <= model.held);
        }
    }

    #[test]
    fn prop_rounding_loss_stays_bounded(ops in prop::collection::vec(op(), 1..80)) {
        let mut model = Model::new();

        for op in &ops {
            model.apply(op);
            let backing = ledger::backing(&model.state).unwrap();
            prop_assert_eq!(backing + model.state.undistributed, model.held);

            let dust = model.held - model.owed() - model.state.undistributed;
            prop_assert!(
                (0..=USERS as i128).contains(&dust),
                "{} reward tokens unaccounted for after {:?}",
                dust,
                op
            );
        }
    }

    /// A sole depositor that exits once the last carried reward has been
    /// swept walks away with everything bar the rounding dust.
    #[test]
    fn prop_sole_depositor_collects_everything(
        amount in 1i128..=1_000_000_000_000,
        rewards in prop::collection::vec((any::<bool>(), 0i128..=1_000_000_000), 1..40),
    ) {
        let mut model = Model::new();
        model.apply(&Op::Stake(0, amount));
        for (compounding, reward) in rewards {
            if compounding {
                model.apply(&Op::CompoundingReward(reward));
            } else {
                model.apply(&Op::PrincipalReward(reward));
            }
        }
        model.apply(&Op::PrincipalReward(1_000_000_000));
        model.apply(&Op::CompoundingReward(1));

        model.apply(&Op::Exit(0));
        prop_assert_eq!(model.held, model.state.undistributed);
        prop_assert!(model.held <= 2, "{} reward tokens left behind", model.held);
    }

    #[test]
    fn prop_accumulators_are_monotonic(ops in prop::collection::vec(op(), 1..80)) {
        let mut model = Model::new();
        let mut dpds = model.state.debt_per_debt_share;
        let mut acc = model.state.acc_reward_per_stake;

        for op in &ops {
            model.apply(op);
            prop_assert!(model.state.debt_per_debt_share >= dpds);
            prop_assert!(model.state.acc_reward_per_stake >= acc);
            dpds = model.state.debt_per_debt_share;
            acc = model.state.acc_reward_per_stake;
        }
    }

    #[test]
    fn prop_totals_match_depositors(ops in prop::collection::vec(op(), 1..80)) {
        let mut model = Model::new();

        for op in &ops {
            model.apply(op);

            let stake: i128 = model.users.iter().map(|u| u.stake).sum();
            let crystallized: i128 = model.users.iter().map(|u| u.crystallized).sum();
            let pending: i128 = model
                .users
                .iter()
                .map(|u| ledger::pending_debt_shares(&model.state, u).unwrap())
                .sum();

            prop_assert_eq!(stake, model.state.total_stake);
            prop_assert_eq!(crystallized, model.state.total_crystallized);
            prop_assert_eq!(pending, model.state.total_debt_shares);
        }
    }

    /// Whatever happened before, a new depositor's entitlement starts at zero
    /// and nobody else's entitlement moves when they join.
    #[test]
    fn prop_joining_never_dilutes(
        ops in prop::collection::vec(op(), 0..40),
        amount in 1i128..=1_000_000_000_000,
    ) {
        let mut model = Model::new();
        for op in &ops {
            model.apply(op);
        }

        let before: Vec<i128> = model
            .users
            .iter()
            .map(|u| ledger::entitlement(&model.state, u).unwrap())
            .collect();

        let mut newcomer = Depositor::default();
        ledger::deposit(&mut model.state, &mut newcomer, amount).unwrap();

        prop_assert_eq!(ledger::entitlement(&model.state, &newcomer).unwrap(), 0);
        for (user, was) in model.users.iter().zip(before) {
            prop_assert_eq!(ledger::entitlement(&model.state, user).unwrap(), was);
        }
    }

    #[test]
    fn prop_zero_reward_refresh_is_idempotent(ops in prop::collection::vec(op(), 0..40)) {
        let mut model = Model::new();
        for op in &ops {
            model.apply(op);
        }

        let before = model.state.clone();
        ledger::accrue_principal_reward(&mut model.state, 0).unwrap();
        ledger::accrue_compounding_reward(&mut model.state, 0).unwrap();
        prop_assert_eq!(model.state, before);
    }
}
