#![no_main]

use arbitrary::Arbitrary;
use auto_stake_multi_asset::{AutoStakeMultiAsset, AutoStakeMultiAssetClient};
use emission_pool::{EmissionPool, EmissionPoolClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::StellarAssetClient;
use soroban_sdk::{Address, Env};

const DURATION: u64 = 10;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { user: u8, amount: u32 },
    Exit { user: u8 },
    Refresh,
    NotifyPrincipal { amount: u32 },
    NotifyCompounding { amount: u32 },
    Advance { seconds: u8 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let farm = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let admin = Address::generate(&env);

    let principal = EmissionPoolClient::new(&env, &env.register(EmissionPool, ()));
    principal.initialize(&admin, &stake_token, &farm, &DURATION);
    let compounding = EmissionPoolClient::new(&env, &env.register(EmissionPool, ()));
    compounding.initialize(&admin, &farm, &farm, &DURATION);

    let ledger = AutoStakeMultiAssetClient::new(&env, &env.register(AutoStakeMultiAsset, ()));
    ledger.initialize(
        &admin,
        &principal.address,
        &compounding.address,
        &Address::generate(&env),
    );

    let users: Vec<Address> = (0..3).map(|_| Address::generate(&env)).collect();
    let stake_minter = StellarAssetClient::new(&env, &stake_token);
    let farm_minter = StellarAssetClient::new(&env, &farm);
    let mut now = 0u64;
    let mut multiplier = ledger.debt_per_debt_share();

    // Errors are fine; traps and broken solvency are not.
    for action in actions {
        match action {
            FuzzAction::Stake { user, amount } => {
                let who = &users[user as usize % users.len()];
                stake_minter.mint(who, &(amount as i128));
                let _ = ledger.try_stake(who, &(amount as i128));
            }
            FuzzAction::Exit { user } => {
                let _ = ledger.try_exit(&users[user as usize % users.len()]);
            }
            FuzzAction::Refresh => {
                let _ = ledger.try_refresh_auto_stake();
            }
            FuzzAction::NotifyPrincipal { amount } => {
                farm_minter.mint(&principal.address, &(amount as i128));
                let _ = principal.try_notify_reward_amount(&admin, &(amount as i128));
            }
            FuzzAction::NotifyCompounding { amount } => {
                farm_minter.mint(&compounding.address, &(amount as i128));
                let _ = compounding.try_notify_reward_amount(&admin, &(amount as i128));
            }
            FuzzAction::Advance { seconds } => {
                now += seconds as u64;
                env.ledger().set_timestamp(now);
            }
        }

        let me = &ledger.address;
        let redeemable =
            compounding.balance_of(me) + principal.earned(me) + compounding.earned(me);
        assert!(redeemable >= ledger.total_value(), "ledger over-promised");

        let next = ledger.debt_per_debt_share();
        assert!(next >= multiplier, "multiplier went down");
        multiplier = next;
    }
});
