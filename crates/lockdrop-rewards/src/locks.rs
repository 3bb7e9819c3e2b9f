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

//! Lock event aggregation.

use alloy::primitives::{Address, Bytes, U256};
use std::collections::HashMap;

use crate::{bonus::BonusPolicy, effective::lock_effective_value, events::LockEvent};

/// Running totals for one recipient key across all of its locks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientLockAggregate {
    /// Exact sum of raw locked amounts in wei.
    pub lock_amount: U256,
    /// Sum of bonus-adjusted values; never decreases as events fold in.
    pub effective_value: U256,
    /// Contributing lock contract addresses, most recent first.
    pub lock_addresses: Vec<Address>,
}

/// Result of folding every lock event once.
#[derive(Debug, Clone, Default)]
pub struct LockAggregation {
    /// Aggregates for every recipient key.
    pub locks: HashMap<Bytes, RecipientLockAggregate>,
    /// Aggregates for validator-intent locks only, for the election.
    pub validating_locks: HashMap<Bytes, RecipientLockAggregate>,
    /// Sum of effective values across all events.
    pub total_effective_value: U256,
}

/// Fold lock events into per-recipient aggregates.
///
/// Every event is processed exactly once, in input order; a recipient reusing
/// the same key across multiple lock contracts accumulates. Totals do not
/// depend on event order, only the `lock_addresses` ordering does.
pub fn aggregate_locks(
    events: &[LockEvent],
    campaign_start: u64,
    policy: BonusPolicy,
    total_raised: U256,
) -> LockAggregation {
    let mut aggregation = LockAggregation::default();

    for event in events {
        let value = lock_effective_value(
            event.eth_amount,
            event.term,
            event.lock_timestamp,
            campaign_start,
            policy,
            total_raised,
        );
        aggregation.total_effective_value += value;

        if event.is_validator_intent {
            upsert(&mut aggregation.validating_locks, event, value);
        }
        upsert(&mut aggregation.locks, event, value);
    }

    aggregation
}

fn upsert(map: &mut HashMap<Bytes, RecipientLockAggregate>, event: &LockEvent, value: U256) {
    let entry = map.entry(event.recipient_key.clone()).or_default();
    entry.lock_amount += event.eth_amount;
    entry.effective_value += value;
    entry.lock_addresses.insert(0, event.lock_address);
}
