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

//! Validator selection over validator-intent lock aggregates.

use alloy::primitives::{Bytes, B256, U256};
use serde::Serialize;
use std::collections::HashMap;

use crate::locks::RecipientLockAggregate;

// Recipient keys frame the 32-byte chain address with a 2-byte prefix and a
// 2-byte suffix.
const KEY_PREFIX_LEN: usize = 2;
const KEY_SUFFIX_LEN: usize = 2;
const FRAMED_KEY_LEN: usize = KEY_PREFIX_LEN + 32 + KEY_SUFFIX_LEN;

/// A ranked validator candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorCandidate {
    /// The 32-byte target-chain address, unframed from the recipient key.
    pub address: B256,
    /// The candidate's share of the total allocation.
    #[serde(serialize_with = "crate::serialize_u256_dec")]
    pub allocation: U256,
}

/// Rank validator-intent recipients by allocation and keep the top
/// `num_validators`.
///
/// Candidates are ordered by recipient key before the stable sort, so equal
/// allocations rank the same way on every run. Returns exactly
/// `min(num_validators, candidates)` entries, highest allocation first.
pub fn select_validators(
    validating_locks: &HashMap<Bytes, RecipientLockAggregate>,
    total_allocation: U256,
    total_eth: U256,
    num_validators: usize,
) -> anyhow::Result<Vec<ValidatorCandidate>> {
    anyhow::ensure!(total_eth > U256::ZERO, "cannot rank validators against a zero ETH total");

    let mut keys: Vec<&Bytes> = validating_locks.keys().collect();
    keys.sort();

    let mut candidates = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(address) = strip_key_framing(key) else {
            tracing::warn!("Skipping validator candidate with malformed recipient key {key}");
            continue;
        };
        let aggregate = &validating_locks[key];
        candidates.push(ValidatorCandidate {
            address,
            allocation: aggregate.effective_value * total_allocation / total_eth,
        });
    }

    candidates.sort_by(|a, b| b.allocation.cmp(&a.allocation));
    candidates.truncate(num_validators);
    Ok(candidates)
}

fn strip_key_framing(key: &Bytes) -> Option<B256> {
    if key.len() != FRAMED_KEY_LEN {
        return None;
    }
    Some(B256::from_slice(&key[KEY_PREFIX_LEN..FRAMED_KEY_LEN - KEY_SUFFIX_LEN]))
}
