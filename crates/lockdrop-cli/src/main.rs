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

//! Read-only reporting CLI for the lockdrop: balances, campaign timing,
//! allocation records, and validator ranking. The tool never constructs or
//! broadcasts transactions.

use alloy::{
    primitives::{utils::format_units, Address, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::BlockNumberOrTag,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lockdrop_rewards::{
    aggregate_locks, aggregate_signals, build_distribution, campaign_end, campaign_start,
    fetch_lock_events, fetch_signal_events, lock_storage, select_validators, BonusPolicy,
    LockAggregation, RpcBalanceSource, SignalAggregation, DEFAULT_TOTAL_ALLOCATION,
};
use url::Url;

/// Arguments of the lockdrop reporting tool.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// URL of the Ethereum RPC endpoint.
    #[clap(short, long, env)]
    rpc_url: Url,
    /// Address of the deployed lockdrop contract.
    #[clap(long, env)]
    lockdrop_contract_address: Address,
    /// First block to scan for lockdrop events.
    #[clap(long, env, default_value_t = 0)]
    from_block: u64,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get the total balance across all locks
    Balance,
    /// Get the remaining time of the lockdrop
    Ending,
    /// Compute genesis balance and vesting records for all participants
    Allocation {
        /// Total token allocation to distribute, in base units
        #[clap(long, default_value_t = DEFAULT_TOTAL_ALLOCATION)]
        total_allocation: U256,
        /// Historical block at which signaling balances are snapshotted
        #[clap(long)]
        at_block: Option<u64>,
    },
    /// Rank validator-intent participants by allocation share
    Validators {
        /// Total token allocation to distribute, in base units
        #[clap(long, default_value_t = DEFAULT_TOTAL_ALLOCATION)]
        total_allocation: U256,
        /// Number of validator slots to fill
        #[clap(long)]
        num_validators: usize,
        /// Historical block at which signaling balances are snapshotted
        #[clap(long)]
        at_block: Option<u64>,
    },
    /// Inspect the owner and unlock time of an individual lock contract
    LockInfo {
        /// The Ethereum address for a lock contract (NOT the lockdrop itself)
        #[clap(long)]
        lock_contract_address: Address,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = MainArgs::parse();
    run(&args).await
}

async fn run(args: &MainArgs) -> Result<()> {
    let provider = ProviderBuilder::new().connect_http(args.rpc_url.clone());
    let lockdrop = args.lockdrop_contract_address;

    match &args.command {
        Command::Balance => {
            let to_block = provider.get_block_number().await?;
            let events =
                fetch_lock_events(&provider, lockdrop, args.from_block, to_block, None).await?;
            let total: U256 = events.iter().map(|event| event.eth_amount).sum();
            println!("{} ETH locked across {} locks", format_units(total, "ether")?, events.len());
        }
        Command::Ending => {
            let end = campaign_end(&provider, lockdrop).await?;
            let block = provider
                .get_block_by_number(BlockNumberOrTag::Latest)
                .await?
                .context("No latest block")?;
            let now = block.header.timestamp;
            if now >= end {
                println!("Lockdrop ended {} minutes ago", (now - end) / 60);
            } else {
                println!("Ending in {} minutes", (end - now) / 60);
            }
        }
        Command::Allocation { total_allocation, at_block } => {
            let (locks, signals) = compute_aggregates(&provider, args, *at_block).await?;
            let total_eth = locks.total_effective_value + signals.total_effective_value;
            anyhow::ensure!(
                total_eth > U256::ZERO,
                "no locks or signals found; nothing to allocate"
            );

            let distribution =
                build_distribution(&locks.locks, &signals.signals, *total_allocation, total_eth)?;
            println!("{}", serde_json::to_string_pretty(&distribution)?);
        }
        Command::Validators { total_allocation, num_validators, at_block } => {
            let (locks, signals) = compute_aggregates(&provider, args, *at_block).await?;
            let total_eth = locks.total_effective_value + signals.total_effective_value;
            anyhow::ensure!(
                total_eth > U256::ZERO,
                "no locks or signals found; nothing to rank"
            );

            let validators = select_validators(
                &locks.validating_locks,
                *total_allocation,
                total_eth,
                *num_validators,
            )?;
            println!("{}", serde_json::to_string_pretty(&validators)?);
        }
        Command::LockInfo { lock_contract_address } => {
            let info = lock_storage(&provider, *lock_contract_address).await?;
            println!("owner: {}", info.owner);
            println!("unlock time: {}", info.unlock_time);
        }
    }

    Ok(())
}

/// Replay the full event history into lock and signal aggregates.
async fn compute_aggregates<P: Provider>(
    provider: &P,
    args: &MainArgs,
    at_block: Option<u64>,
) -> Result<(LockAggregation, SignalAggregation)> {
    let lockdrop = args.lockdrop_contract_address;
    let to_block = match at_block {
        Some(block) => block,
        None => provider.get_block_number().await?,
    };

    let (lock_events, signal_events) = tokio::join!(
        fetch_lock_events(provider, lockdrop, args.from_block, to_block, None),
        fetch_signal_events(provider, lockdrop, args.from_block, to_block, None),
    );
    let lock_events = lock_events?;
    let signal_events = signal_events?;

    let start = campaign_start(provider, lockdrop).await?;
    let policy = BonusPolicy::for_campaign_start(start);
    let total_raised: U256 = lock_events.iter().map(|event| event.eth_amount).sum();

    tracing::info!(
        "Aggregating {} lock events and {} signal events with the {:?} schedule",
        lock_events.len(),
        signal_events.len(),
        policy
    );

    let locks = aggregate_locks(&lock_events, start, policy, total_raised);
    let source = RpcBalanceSource::new(provider);
    let signals = aggregate_signals(&signal_events, &source, at_block).await?;

    Ok((locks, signals))
}
