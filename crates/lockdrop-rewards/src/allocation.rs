// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Genesis balance and vesting record construction.

use alloy::primitives::{Bytes, U256};
use serde::Serialize;
use std::collections::HashMap;

use crate::{locks::RecipientLockAggregate, signals::RecipientSignalAggregate};

/// Vesting lock-up applied to the delayed portion of signals: one year.
pub const VESTING_DURATION_SECS: u64 = 365 * 86_400;

/// An immediately-available genesis balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceRecord {
    /// Base-58 rendering of the recipient key.
    pub address: String,
    #[serde(serialize_with = "crate::serialize_u256_dec")]
    pub amount: U256,
}

/// A delayed genesis balance, unlocked after `duration_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VestingRecord {
    /// Base-58 rendering of the recipient key.
    pub address: String,
    #[serde(serialize_with = "crate::serialize_u256_dec")]
    pub amount: U256,
    pub duration_secs: u64,
}

/// The full genesis distribution derived from one computation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Distribution {
    pub balances: Vec<BalanceRecord>,
    pub vesting: Vec<VestingRecord>,
}

/// Combine lock and signal aggregates into balance and vesting records,
/// scaled so that effective values map proportionally onto `total_allocation`.
///
/// A recipient that both locked and signaled gets a single balance record
/// (lock effective value plus the immediate signal portion) and a vesting
/// record for the delayed signal portion. Scaling divisions truncate; the
/// summed output can fall short of `total_allocation` by a small remainder
/// that is intentionally not reconciled.
pub fn build_distribution(
    locks: &HashMap<Bytes, RecipientLockAggregate>,
    signals: &HashMap<Bytes, RecipientSignalAggregate>,
    total_allocation: U256,
    total_eth: U256,
) -> anyhow::Result<Distribution> {
    anyhow::ensure!(total_eth > U256::ZERO, "cannot scale allocations against a zero ETH total");

    let mut distribution = Distribution::default();

    // Rows are emitted in recipient-key order so runs are reproducible.
    let mut lock_keys: Vec<&Bytes> = locks.keys().collect();
    lock_keys.sort();

    for key in lock_keys {
        let aggregate = &locks[key];
        let effective = match signals.get(key) {
            // The recipient also signaled: the immediate signal portion joins
            // the locked value in the same genesis balance.
            Some(signal) => aggregate.effective_value + signal.immediate_effective_value,
            None => aggregate.effective_value,
        };
        distribution.balances.push(BalanceRecord {
            address: encode_address(key),
            amount: scale(effective, total_allocation, total_eth),
        });
    }

    let mut signal_keys: Vec<&Bytes> = signals.keys().collect();
    signal_keys.sort();

    for key in signal_keys {
        let signal = &signals[key];
        if !locks.contains_key(key) {
            // Signal-only recipients still get their immediate portion at
            // genesis.
            distribution.balances.push(BalanceRecord {
                address: encode_address(key),
                amount: scale(signal.immediate_effective_value, total_allocation, total_eth),
            });
        }
        distribution.vesting.push(VestingRecord {
            address: encode_address(key),
            amount: scale(signal.delayed_effective_value, total_allocation, total_eth),
            duration_secs: VESTING_DURATION_SECS,
        });
    }

    Ok(distribution)
}

fn scale(amount: U256, total_allocation: U256, total_eth: U256) -> U256 {
    amount * total_allocation / total_eth
}

fn encode_address(key: &Bytes) -> String {
    bs58::encode(key.as_ref()).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn key(tag: u8) -> Bytes {
        Bytes::from(vec![tag; 36])
    }

    fn lock_aggregate(effective: u64) -> RecipientLockAggregate {
        RecipientLockAggregate {
            lock_amount: U256::from(effective),
            effective_value: U256::from(effective),
            lock_addresses: vec![Address::repeat_byte(0xaa)],
        }
    }

    fn signal_aggregate(delayed: u64, immediate: u64) -> RecipientSignalAggregate {
        RecipientSignalAggregate {
            signal_amount: U256::from(delayed + immediate),
            delayed_effective_value: U256::from(delayed),
            immediate_effective_value: U256::from(immediate),
        }
    }

    #[test]
    fn lock_only_recipient_gets_balance_without_vesting() {
        let locks = HashMap::from([(key(1), lock_aggregate(200))]);
        let signals = HashMap::new();

        let distribution =
            build_distribution(&locks, &signals, U256::from(1_000), U256::from(200)).unwrap();

        assert_eq!(distribution.balances.len(), 1);
        assert_eq!(distribution.balances[0].amount, U256::from(1_000));
        assert_eq!(distribution.balances[0].address, bs58::encode(key(1).as_ref()).into_string());
        assert!(distribution.vesting.is_empty());
    }

    #[test]
    fn signal_only_recipient_gets_balance_and_vesting() {
        let locks = HashMap::new();
        let signals = HashMap::from([(key(2), signal_aggregate(150, 50))]);

        let distribution =
            build_distribution(&locks, &signals, U256::from(1_000), U256::from(200)).unwrap();

        assert_eq!(distribution.balances.len(), 1);
        assert_eq!(distribution.balances[0].amount, U256::from(250));
        assert_eq!(distribution.vesting.len(), 1);
        assert_eq!(distribution.vesting[0].amount, U256::from(750));
        assert_eq!(distribution.vesting[0].duration_secs, VESTING_DURATION_SECS);
    }

    #[test]
    fn locker_who_also_signaled_gets_combined_balance() {
        let locks = HashMap::from([(key(3), lock_aggregate(100))]);
        let signals = HashMap::from([(key(3), signal_aggregate(75, 25))]);

        let distribution =
            build_distribution(&locks, &signals, U256::from(1_000), U256::from(200)).unwrap();

        // One balance row covering lock + immediate signal, one vesting row.
        assert_eq!(distribution.balances.len(), 1);
        assert_eq!(distribution.balances[0].amount, U256::from(625));
        assert_eq!(distribution.vesting.len(), 1);
        assert_eq!(distribution.vesting[0].amount, U256::from(375));
    }

    #[test]
    fn output_is_sorted_by_recipient_key() {
        let locks = HashMap::from([
            (key(9), lock_aggregate(10)),
            (key(1), lock_aggregate(20)),
            (key(5), lock_aggregate(30)),
        ]);
        let signals = HashMap::new();

        let distribution =
            build_distribution(&locks, &signals, U256::from(600), U256::from(60)).unwrap();

        let addresses: Vec<&str> =
            distribution.balances.iter().map(|record| record.address.as_str()).collect();
        let expected: Vec<String> = [key(1), key(5), key(9)]
            .iter()
            .map(|k| bs58::encode(k.as_ref()).into_string())
            .collect();
        assert_eq!(addresses, expected);
    }

    #[test]
    fn distribution_never_exceeds_total_allocation() {
        let locks = HashMap::from([
            (key(1), lock_aggregate(101)),
            (key(2), lock_aggregate(57)),
            (key(3), lock_aggregate(999)),
        ]);
        let signals = HashMap::from([
            (key(3), signal_aggregate(76, 26)),
            (key(4), signal_aggregate(31, 11)),
        ]);

        let total_allocation = U256::from(5_000_000);
        let total_eth = U256::from(101 + 57 + 999 + 76 + 26 + 31 + 11);
        let distribution =
            build_distribution(&locks, &signals, total_allocation, total_eth).unwrap();

        let mut distributed = U256::ZERO;
        for record in &distribution.balances {
            distributed += record.amount;
        }
        for record in &distribution.vesting {
            distributed += record.amount;
        }
        assert!(distributed <= total_allocation);
    }

    #[test]
    fn zero_total_is_an_error() {
        let locks = HashMap::from([(key(1), lock_aggregate(100))]);
        let signals = HashMap::new();
        assert!(build_distribution(&locks, &signals, U256::from(1_000), U256::ZERO).is_err());
    }
}
