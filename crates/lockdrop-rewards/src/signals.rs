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

//! Signal event aggregation.
//!
//! Signals are balance-snapshot based: the value credited to a recipient is
//! derived from the signaling contract's balance at the reference block, not
//! from the amount declared in the signal call. Moving funds after signaling
//! therefore cannot inflate a result.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
};
use anyhow::Context;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::collections::HashMap;

use crate::{effective::signal_effective_value, events::SignalEvent};

/// Share of a signal's effective value that vests after the lock-up.
const DELAYED_PERCENT: u64 = 75;
/// Share of a signal's effective value available at genesis.
const IMMEDIATE_PERCENT: u64 = 25;

/// Source of native-currency balances for signaling contracts.
///
/// A failed lookup aborts the whole aggregation run; the engine never
/// substitutes a default, since a silent zero would misstate a participant's
/// allocation.
#[async_trait]
pub trait BalanceSource {
    /// Balance of `address` in wei, optionally at a historical block.
    async fn balance_of(&self, address: Address, at_block: Option<u64>) -> anyhow::Result<U256>;
}

/// [`BalanceSource`] backed by an RPC provider.
pub struct RpcBalanceSource<'a, P> {
    provider: &'a P,
}

impl<'a, P> RpcBalanceSource<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider> BalanceSource for RpcBalanceSource<'_, P> {
    async fn balance_of(&self, address: Address, at_block: Option<u64>) -> anyhow::Result<U256> {
        let mut call = self.provider.get_balance(address);
        if let Some(block) = at_block {
            call = call.block_id(block.into());
        }
        let balance =
            call.await.with_context(|| format!("Failed to get balance of {address}"))?;
        Ok(balance)
    }
}

/// Running totals for one recipient key across all of its signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSignalAggregate {
    /// Exact sum of declared signal amounts in wei.
    pub signal_amount: U256,
    /// Portion of effective value subject to the vesting lock-up.
    pub delayed_effective_value: U256,
    /// Portion of effective value available at genesis.
    pub immediate_effective_value: U256,
}

/// Result of folding every signal event once.
#[derive(Debug, Clone, Default)]
pub struct SignalAggregation {
    /// Aggregates for every recipient key.
    pub signals: HashMap<Bytes, RecipientSignalAggregate>,
    /// Sum of effective values across all events.
    pub total_effective_value: U256,
}

/// Fold signal events into per-recipient aggregates.
///
/// Balance lookups are independent and resolved in parallel; the results are
/// then folded through a single sequential accumulator, so completion order
/// never affects the totals. `at_block` pins the balance snapshot to a
/// historical block, typically the end of the campaign.
pub async fn aggregate_signals<S: BalanceSource + Sync>(
    events: &[SignalEvent],
    source: &S,
    at_block: Option<u64>,
) -> anyhow::Result<SignalAggregation> {
    let balances = try_join_all(events.iter().map(|event| async move {
        source.balance_of(event.contract_address, at_block).await.with_context(|| {
            format!("Failed to resolve balance of signaling contract {}", event.contract_address)
        })
    }))
    .await?;

    let mut aggregation = SignalAggregation::default();
    for (event, balance) in events.iter().zip(balances) {
        let value = signal_effective_value(balance);
        aggregation.total_effective_value += value;

        // The truncating 75/25 split can lose up to one base unit per call;
        // that remainder is intentionally not reconciled.
        let entry = aggregation.signals.entry(event.recipient_key.clone()).or_default();
        entry.signal_amount += event.declared_eth_amount;
        entry.delayed_effective_value += value * U256::from(DELAYED_PERCENT) / U256::from(100);
        entry.immediate_effective_value += value * U256::from(IMMEDIATE_PERCENT) / U256::from(100);
    }

    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedBalances(HashMap<Address, U256>);

    #[async_trait]
    impl BalanceSource for FixedBalances {
        async fn balance_of(
            &self,
            address: Address,
            _at_block: Option<u64>,
        ) -> anyhow::Result<U256> {
            self.0.get(&address).copied().ok_or_else(|| anyhow!("no balance for {address}"))
        }
    }

    fn key(tag: u8) -> Bytes {
        Bytes::from(vec![tag; 36])
    }

    fn signal(tag: u8, contract: Address, declared: u64) -> SignalEvent {
        SignalEvent {
            contract_address: contract,
            recipient_key: key(tag),
            declared_eth_amount: U256::from(declared),
        }
    }

    fn source(balances: &[(Address, u64)]) -> FixedBalances {
        FixedBalances(
            balances.iter().map(|&(address, wei)| (address, U256::from(wei))).collect(),
        )
    }

    #[tokio::test]
    async fn splits_effective_value_75_25() {
        let contract = Address::repeat_byte(0x11);
        let events = [signal(1, contract, 1000)];
        let aggregation =
            aggregate_signals(&events, &source(&[(contract, 1000)]), None).await.unwrap();

        // 1000 * 20% = 200 effective, split 150 / 50.
        assert_eq!(aggregation.total_effective_value, U256::from(200));
        let entry = &aggregation.signals[&key(1)];
        assert_eq!(entry.delayed_effective_value, U256::from(150));
        assert_eq!(entry.immediate_effective_value, U256::from(50));
        assert_eq!(entry.signal_amount, U256::from(1000));
    }

    #[tokio::test]
    async fn values_come_from_balances_not_declared_amounts() {
        let contract = Address::repeat_byte(0x22);
        // Declared 5 wei, but the contract actually holds 1000.
        let events = [signal(1, contract, 5)];
        let aggregation =
            aggregate_signals(&events, &source(&[(contract, 1000)]), None).await.unwrap();

        assert_eq!(aggregation.total_effective_value, U256::from(200));
        let entry = &aggregation.signals[&key(1)];
        assert_eq!(entry.signal_amount, U256::from(5));
        assert_eq!(entry.immediate_effective_value, U256::from(50));
    }

    #[tokio::test]
    async fn split_never_exceeds_effective_value() {
        // Balance 505 -> effective 101; 75 + 25 = 100 < 101. One unit is
        // lost to truncation by design.
        let contract = Address::repeat_byte(0x33);
        let events = [signal(1, contract, 505)];
        let aggregation =
            aggregate_signals(&events, &source(&[(contract, 505)]), None).await.unwrap();

        let entry = &aggregation.signals[&key(1)];
        assert_eq!(entry.delayed_effective_value, U256::from(75));
        assert_eq!(entry.immediate_effective_value, U256::from(25));
        assert!(
            entry.delayed_effective_value + entry.immediate_effective_value
                <= aggregation.total_effective_value
        );
    }

    #[tokio::test]
    async fn repeated_key_accumulates() {
        let a = Address::repeat_byte(0x44);
        let b = Address::repeat_byte(0x55);
        let events = [signal(1, a, 1000), signal(1, b, 2000)];
        let aggregation =
            aggregate_signals(&events, &source(&[(a, 1000), (b, 2000)]), None).await.unwrap();

        assert_eq!(aggregation.signals.len(), 1);
        let entry = &aggregation.signals[&key(1)];
        assert_eq!(entry.signal_amount, U256::from(3000));
        assert_eq!(entry.delayed_effective_value, U256::from(150 + 300));
        assert_eq!(entry.immediate_effective_value, U256::from(50 + 100));
        assert_eq!(aggregation.total_effective_value, U256::from(600));
    }

    #[tokio::test]
    async fn totals_are_order_independent() {
        let a = Address::repeat_byte(0x66);
        let b = Address::repeat_byte(0x77);
        let balances = [(a, 1234), (b, 987_654)];
        let mut events = vec![signal(1, a, 1), signal(2, b, 2)];

        let forward = aggregate_signals(&events, &source(&balances), None).await.unwrap();
        events.reverse();
        let reversed = aggregate_signals(&events, &source(&balances), None).await.unwrap();

        assert_eq!(forward.total_effective_value, reversed.total_effective_value);
        for (k, entry) in &forward.signals {
            assert_eq!(entry, &reversed.signals[k]);
        }
    }

    #[tokio::test]
    async fn failed_lookup_aborts_the_run() {
        let known = Address::repeat_byte(0x88);
        let unknown = Address::repeat_byte(0x99);
        let events = [signal(1, known, 1000), signal(2, unknown, 1000)];

        let result = aggregate_signals(&events, &source(&[(known, 1000)]), None).await;
        assert!(result.is_err());
    }
}
