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

//! Event fetching and lockdrop contract access.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::{BlockNumberOrTag, Filter, Log},
    sol,
    sol_types::SolEvent,
};
use anyhow::Context;

sol! {
    #[sol(rpc)]
    contract ILockdrop {
        event Locked(
            address indexed owner,
            uint256 eth,
            address lockAddr,
            uint8 term,
            bytes edgewareAddr,
            bool isValidator,
            uint256 time
        );

        event Signaled(address indexed contractAddr, bytes edgewareAddr, uint256 eth);

        function LOCK_START_TIME() external view returns (uint256);
        function LOCK_END_TIME() external view returns (uint256);
    }
}

/// A `Locked` event as consumed by the accounting engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEvent {
    /// Address of the lock contract holding the funds.
    pub lock_address: Address,
    /// Ethereum account that placed the lock.
    pub owner: Address,
    /// Target-chain public key the allocation is credited to.
    pub recipient_key: Bytes,
    /// Locked amount in wei.
    pub eth_amount: U256,
    /// Raw term code (0 = three months, 1 = six, 2 = twelve).
    pub term: u8,
    /// Unix timestamp of the lock.
    pub lock_timestamp: u64,
    /// Whether the participant wants to be considered for validation.
    pub is_validator_intent: bool,
}

/// A `Signaled` event as consumed by the accounting engine.
///
/// The amount that matters downstream is the signaling contract's balance at
/// the reference block, not `declared_eth_amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalEvent {
    /// Contract whose balance is pledged.
    pub contract_address: Address,
    /// Target-chain public key the allocation is credited to.
    pub recipient_key: Bytes,
    /// Amount declared in the signal call, in wei.
    pub declared_eth_amount: U256,
}

/// Owner and unlock time read straight out of a lock contract's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStorage {
    pub owner: Address,
    pub unlock_time: u64,
}

/// Query logs in chunks to avoid hitting provider limits
pub async fn query_logs_chunked<P: Provider>(
    provider: &P,
    filter: Filter,
    from_block: u64,
    to_block: u64,
) -> anyhow::Result<Vec<Log>> {
    const BLOCK_CHUNK_SIZE: u64 = 50_000;
    let mut all_logs = Vec::new();

    let mut current_from = from_block;
    while current_from <= to_block {
        let current_to = (current_from + BLOCK_CHUNK_SIZE - 1).min(to_block);

        let chunk_filter = filter
            .clone()
            .from_block(BlockNumberOrTag::Number(current_from))
            .to_block(BlockNumberOrTag::Number(current_to));

        let logs = provider.get_logs(&chunk_filter).await?;
        all_logs.extend(logs);

        current_from = current_to + 1;
    }

    Ok(all_logs)
}

/// Fetch and decode every `Locked` event, optionally filtered by owner.
pub async fn fetch_lock_events<P: Provider>(
    provider: &P,
    lockdrop_address: Address,
    from_block: u64,
    to_block: u64,
    owner: Option<Address>,
) -> anyhow::Result<Vec<LockEvent>> {
    let mut filter = Filter::new()
        .address(lockdrop_address)
        .event_signature(ILockdrop::Locked::SIGNATURE_HASH);
    if let Some(owner) = owner {
        filter = filter.topic1(owner.into_word());
    }

    let logs = query_logs_chunked(provider, filter, from_block, to_block)
        .await
        .context("Failed to get lock events")?;
    tracing::debug!("Fetched {} Locked logs", logs.len());

    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        match log.log_decode::<ILockdrop::Locked>() {
            Ok(decoded) => {
                let data = decoded.inner.data;
                events.push(LockEvent {
                    lock_address: data.lockAddr,
                    owner: data.owner,
                    recipient_key: data.edgewareAddr,
                    eth_amount: data.eth,
                    term: data.term,
                    lock_timestamp: data.time.to::<u64>(),
                    is_validator_intent: data.isValidator,
                });
            }
            Err(err) => {
                tracing::warn!("Skipping undecodable Locked log: {err:?}");
            }
        }
    }

    Ok(events)
}

/// Fetch and decode every `Signaled` event, optionally filtered by signaling
/// contract.
pub async fn fetch_signal_events<P: Provider>(
    provider: &P,
    lockdrop_address: Address,
    from_block: u64,
    to_block: u64,
    signaling_contract: Option<Address>,
) -> anyhow::Result<Vec<SignalEvent>> {
    let mut filter = Filter::new()
        .address(lockdrop_address)
        .event_signature(ILockdrop::Signaled::SIGNATURE_HASH);
    if let Some(contract) = signaling_contract {
        filter = filter.topic1(contract.into_word());
    }

    let logs = query_logs_chunked(provider, filter, from_block, to_block)
        .await
        .context("Failed to get signal events")?;
    tracing::debug!("Fetched {} Signaled logs", logs.len());

    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        match log.log_decode::<ILockdrop::Signaled>() {
            Ok(decoded) => {
                let data = decoded.inner.data;
                events.push(SignalEvent {
                    contract_address: data.contractAddr,
                    recipient_key: data.edgewareAddr,
                    declared_eth_amount: data.eth,
                });
            }
            Err(err) => {
                tracing::warn!("Skipping undecodable Signaled log: {err:?}");
            }
        }
    }

    Ok(events)
}

/// Campaign start time as recorded on the lockdrop contract.
pub async fn campaign_start<P: Provider>(
    provider: &P,
    lockdrop_address: Address,
) -> anyhow::Result<u64> {
    let lockdrop = ILockdrop::new(lockdrop_address, provider);
    let start =
        lockdrop.LOCK_START_TIME().call().await.context("Failed to read LOCK_START_TIME")?;
    Ok(start.to::<u64>())
}

/// Campaign end time as recorded on the lockdrop contract.
pub async fn campaign_end<P: Provider>(
    provider: &P,
    lockdrop_address: Address,
) -> anyhow::Result<u64> {
    let lockdrop = ILockdrop::new(lockdrop_address, provider);
    let end = lockdrop.LOCK_END_TIME().call().await.context("Failed to read LOCK_END_TIME")?;
    Ok(end.to::<u64>())
}

/// Read the owner and unlock time of an individual lock contract from its
/// first two storage slots.
pub async fn lock_storage<P: Provider>(
    provider: &P,
    lock_address: Address,
) -> anyhow::Result<LockStorage> {
    let (owner_slot, unlock_slot) = tokio::try_join!(
        provider.get_storage_at(lock_address, U256::ZERO),
        provider.get_storage_at(lock_address, U256::from(1)),
    )
    .context("Failed to read lock contract storage")?;

    Ok(LockStorage {
        owner: Address::from_word(owner_slot.into()),
        unlock_time: unlock_slot.to::<u64>(),
    })
}
