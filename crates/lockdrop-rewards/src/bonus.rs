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

//! Additive bonus schedules for lock rewards.

use alloy::primitives::{uint, U256};

/// Canonical mainnet campaign start, 2019-06-01 00:00:00 UTC.
pub const CAMPAIGN_START_TIME: u64 = 1_559_347_200;

// Tiered-schedule date cutovers (UTC).
pub const JUNE_16TH_UTC: u64 = 1_560_643_200;
pub const JULY_1ST_UTC: u64 = 1_561_939_200;
pub const JULY_16TH_UTC: u64 = 1_563_235_200;
pub const JULY_31ST_UTC: u64 = 1_564_531_200;
pub const AUG_15TH_UTC: u64 = 1_565_827_200;
pub const AUG_30TH_UTC: u64 = 1_567_123_200;

// Cumulative-raised thresholds for the tiered bonus ceiling, in wei.
pub const RAISED_200K: U256 = uint!(200_000_000000000000000000_U256);
pub const RAISED_400K: U256 = uint!(400_000_000000000000000000_U256);
pub const RAISED_700K: U256 = uint!(700_000_000000000000000000_U256);
pub const RAISED_1100K: U256 = uint!(1_100_000_000000000000000000_U256);
pub const RAISED_1600K: U256 = uint!(1_600_000_000000000000000000_U256);
pub const RAISED_2200K: U256 = uint!(2_200_000_000000000000000000_U256);

const SECONDS_IN_MONTH: u64 = 3600 * 24 * 31;

/// Which bonus schedule applies to a computation run.
///
/// The schedule is an explicit input rather than being inferred inside the
/// engine, so fixtures that vary the campaign start still get the schedule
/// the caller intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusPolicy {
    /// Elapsed-time schedule used by test fixtures and non-canonical
    /// deployments: 31-day buckets from the campaign start.
    Fixture,
    /// Mainnet schedule: calendar-date buckets capped by a ceiling derived
    /// from the cumulative amount raised.
    Tiered,
}

impl BonusPolicy {
    /// Reproduces the historical dispatch: exactly the canonical mainnet
    /// start selects the tiered schedule, any other start falls back to the
    /// fixture schedule.
    pub fn for_campaign_start(campaign_start: u64) -> Self {
        if campaign_start == CAMPAIGN_START_TIME {
            Self::Tiered
        } else {
            Self::Fixture
        }
    }
}

/// Additive bonus in percentage points for a lock placed at `lock_time`.
///
/// `total_raised` is the cumulative raised amount in wei at computation time;
/// it only affects the [`BonusPolicy::Tiered`] schedule.
pub fn additive_bonus(
    policy: BonusPolicy,
    lock_time: u64,
    campaign_start: u64,
    total_raised: U256,
) -> U256 {
    match policy {
        BonusPolicy::Fixture => fixture_bonus(lock_time, campaign_start),
        BonusPolicy::Tiered => tiered_bonus(lock_time, total_raised),
    }
}

fn fixture_bonus(lock_time: u64, campaign_start: u64) -> U256 {
    // Non-lock calls carry no timestamps and earn no bonus.
    if lock_time == 0 || campaign_start == 0 {
        return U256::ZERO;
    }

    if lock_time < campaign_start + SECONDS_IN_MONTH {
        U256::from(40)
    } else if lock_time < campaign_start + 2 * SECONDS_IN_MONTH {
        U256::from(30)
    } else {
        U256::ZERO
    }
}

fn tiered_bonus(lock_time: u64, total_raised: U256) -> U256 {
    let date_bonus = if lock_time <= JUNE_16TH_UTC {
        50u64
    } else if lock_time <= JULY_1ST_UTC {
        40
    } else if lock_time <= JULY_16TH_UTC {
        30
    } else if lock_time <= JULY_31ST_UTC {
        20
    } else if lock_time <= AUG_15TH_UTC {
        10
    } else {
        // Locks after August 15th earn nothing, including past the campaign end.
        0
    };

    if date_bonus == 0 {
        return U256::ZERO;
    }

    U256::from(date_bonus).min(raised_ceiling(total_raised))
}

// The ceiling is the bonus of the first threshold the raised total has not
// yet reached.
fn raised_ceiling(total_raised: U256) -> U256 {
    if total_raised < RAISED_200K {
        U256::from(50)
    } else if total_raised < RAISED_400K {
        U256::from(40)
    } else if total_raised < RAISED_700K {
        U256::from(30)
    } else if total_raised < RAISED_1100K {
        U256::from(20)
    } else if total_raised < RAISED_1600K {
        U256::from(10)
    } else {
        // At or beyond 1.6M ether the ceiling is already zero.
        U256::ZERO
    }
}
