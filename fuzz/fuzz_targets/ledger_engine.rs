#![no_main]

use arbitrary::Arbitrary;
use auto_stake_multi_asset::ledger::{self, Depositor, LedgerState};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { user: u8, amount: u64 },
    Exit { user: u8 },
    Touch { user: u8 },
    PrincipalReward { amount: u32 },
    CompoundingReward { amount: u32 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let mut state = LedgerState::new();
    let mut users: [Depositor; 4] = Default::default();
    let mut held: i128 = 0;

    for action in actions {
        match action {
            FuzzAction::Stake { user, amount } => {
                let d = &mut users[user as usize % 4];
                ledger::deposit(&mut state, d, amount as i128).unwrap();
            }
            FuzzAction::Exit { user } => {
                let d = &mut users[user as usize % 4];
                let (_, reward) = ledger::withdraw_all(&mut state, d).unwrap();
                held -= reward;
            }
            FuzzAction::Touch { user } => {
                ledger::crystallize(&mut state, &mut users[user as usize % 4]).unwrap();
            }
            FuzzAction::PrincipalReward { amount } => {
                ledger::accrue_principal_reward(&mut state, amount as i128).unwrap();
                held += amount as i128;
            }
            FuzzAction::CompoundingReward { amount } => {
                ledger::accrue_compounding_reward(&mut state, amount as i128).unwrap();
                held += amount as i128;
            }
        }

        let owed: i128 = users
            .iter()
            .map(|d| ledger::entitlement(&state, d).unwrap())
            .sum();
        assert!(owed + state.undistributed <= held, "ledger over-promised");
        assert_eq!(
            ledger::backing(&state).unwrap() + state.undistributed,
            held,
            "reward leaked out of the books"
        );
        assert!(held - owed - state.undistributed <= 4, "rounding loss grew");
        assert!(state.debt_per_debt_share >= 1_000_000_000_000);
    }
});
