#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the deployed ledger on top of a real pool.
//!
//! Invariants tested:
//! - Value per share never decreases across random deposit schedules
//! - Depositors never jointly withdraw more than principal plus emitted reward
//! - Once everyone has exited, neither the ledger nor its pool stake holds value

use auto_stake::{AutoStake, AutoStakeClient};
use emission_pool::{EmissionPool, EmissionPoolClient};
use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::StellarAssetClient;
use soroban_sdk::{Address, Env};

const DURATION: u64 = 10;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn setup() -> (Env, AutoStakeClient<'static>, EmissionPoolClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(0);

    let farm = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let admin = Address::generate(&env);

    let pool = EmissionPoolClient::new(&env, &env.register(EmissionPool, ()));
    pool.initialize(&admin, &farm, &farm, &DURATION);

    let ledger = AutoStakeClient::new(&env, &env.register(AutoStake, ()));
    ledger.initialize(&admin, &pool.address, &Address::generate(&env));

    (env, ledger, pool, farm, admin)
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_deposit_schedule_is_solvent(
        reward in 0i128..=100_000,
        schedule in prop::collection::vec((0usize..3, 1i128..=50_000, 0u64..=3), 1..8),
    ) {
        let (env, ledger, pool, farm, admin) = setup();
        let minter = StellarAssetClient::new(&env, &farm);
        let users = [
            Address::generate(&env),
            Address::generate(&env),
            Address::generate(&env),
        ];

        // Seed deposit so the pool has a staker before the period starts.
        minter.mint(&users[0], &1_000);
        ledger.stake(&users[0], &1_000);
        let mut deposited = 1_000i128;

        minter.mint(&pool.address, &reward);
        if reward >= DURATION as i128 {
            pool.notify_reward_amount(&admin, &reward);
        }

        let mut now = 0u64;
        let mut last = ledger.value_per_share();
        for (user, amount, dt) in schedule {
            now += dt;
            env.ledger().set_timestamp(now);

            minter.mint(&users[user], &amount);
            // Dust below one share at the current price is refused.
            if ledger.try_stake(&users[user], &amount).is_ok() {
                deposited += amount;
            }

            let vps = ledger.value_per_share();
            prop_assert!(vps >= last);
            last = vps;
        }

        env.ledger().set_timestamp(now + 2 * DURATION);
        let mut paid = 0i128;
        for user in users.iter() {
            if ledger.shares_of(user) > 0 {
                paid += ledger.exit(user);
            }
        }

        prop_assert!(paid <= deposited + reward);
        prop_assert_eq!(ledger.total_shares(), 0);
        prop_assert_eq!(ledger.total_value(), 0);
        prop_assert_eq!(pool.balance_of(&ledger.address), 0);
    }
}
