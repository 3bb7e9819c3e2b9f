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

//! Allocation computation for the lockdrop genesis distribution.
//!
//! The engine replays the lockdrop contract's `Locked` and `Signaled` event
//! history into per-recipient effective values, ranks validator candidates,
//! and emits the balance and vesting records for the target chain's genesis.
//! All arithmetic is exact integer over [`alloy::primitives::U256`]; the same
//! event history always produces the same records.

// Declare modules
pub mod allocation;
pub mod bonus;
pub mod effective;
pub mod events;
pub mod locks;
pub mod signals;
pub mod validators;

// Re-export commonly used types
pub use allocation::{
    build_distribution, BalanceRecord, Distribution, VestingRecord, VESTING_DURATION_SECS,
};

pub use bonus::{additive_bonus, BonusPolicy, CAMPAIGN_START_TIME};

pub use effective::{lock_effective_value, signal_effective_value, LockTerm};

pub use events::{
    campaign_end, campaign_start, fetch_lock_events, fetch_signal_events, lock_storage,
    query_logs_chunked, ILockdrop, LockEvent, LockStorage, SignalEvent,
};

pub use locks::{aggregate_locks, LockAggregation, RecipientLockAggregate};

pub use signals::{
    aggregate_signals, BalanceSource, RecipientSignalAggregate, RpcBalanceSource,
    SignalAggregation,
};

pub use validators::{select_validators, ValidatorCandidate};

use alloy::primitives::{uint, U256};

/// Default genesis token allocation distributed to participants, in base
/// units (5,000,000 tokens at 18 decimals).
pub const DEFAULT_TOTAL_ALLOCATION: U256 = uint!(5_000_000_000000000000000000_U256);

// Amounts are emitted as decimal strings, matching the genesis spec format.
pub(crate) fn serialize_u256_dec<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}
