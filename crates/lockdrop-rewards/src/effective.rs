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

//! Effective-value computation: the bonus-adjusted quantity that weights a
//! participant's share of the allocation.

use alloy::primitives::U256;

use crate::bonus::{additive_bonus, BonusPolicy};

/// Lock term as encoded in the `Locked` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTerm {
    ThreeMonth,
    SixMonth,
    TwelveMonth,
}

impl LockTerm {
    /// Decode the raw on-chain term code. Unknown codes are not an error;
    /// they simply contribute no effective value.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::ThreeMonth),
            1 => Some(Self::SixMonth),
            2 => Some(Self::TwelveMonth),
            _ => None,
        }
    }

    // Base multiplier in percent: 3-month locks earn no term bonus, 6-month
    // locks earn 10%, 12-month locks earn 40%.
    fn base_percent(self) -> u64 {
        match self {
            Self::ThreeMonth => 100,
            Self::SixMonth => 110,
            Self::TwelveMonth => 140,
        }
    }
}

/// Signaled balances are valued at 20% of face value (an 80% discount).
const SIGNAL_PERCENT: u64 = 20;

/// Effective value of a locked amount.
///
/// Multiplication happens before the truncating division by 100 so no
/// precision is lost beyond the final truncation. An unrecognized term code
/// yields zero rather than an error.
pub fn lock_effective_value(
    eth_amount: U256,
    term_code: u8,
    lock_time: u64,
    campaign_start: u64,
    policy: BonusPolicy,
    total_raised: U256,
) -> U256 {
    let Some(term) = LockTerm::from_code(term_code) else {
        return U256::ZERO;
    };

    // Only genuine lock calls carry both timestamps; anything else earns no
    // additive bonus.
    let bonus = if lock_time != 0 && campaign_start != 0 {
        additive_bonus(policy, lock_time, campaign_start, total_raised)
    } else {
        U256::ZERO
    };

    eth_amount * (U256::from(term.base_percent()) + bonus) / U256::from(100)
}

/// Effective value of a signaled balance.
pub fn signal_effective_value(balance: U256) -> U256 {
    balance * U256::from(SIGNAL_PERCENT) / U256::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A start far enough in the past that fixture locks at `NO_BONUS_TIME`
    // fall in the zero-bonus bucket.
    const START: u64 = 1_000_000;
    const NO_BONUS_TIME: u64 = START + 3600 * 24 * 31 * 3;

    fn value(amount: u64, term_code: u8, lock_time: u64) -> U256 {
        lock_effective_value(
            U256::from(amount),
            term_code,
            lock_time,
            START,
            BonusPolicy::Fixture,
            U256::ZERO,
        )
    }

    #[test]
    fn three_month_without_bonus_is_face_value() {
        assert_eq!(value(1000, 0, NO_BONUS_TIME), U256::from(1000));
    }

    #[test]
    fn term_multipliers_without_bonus() {
        assert_eq!(value(1000, 1, NO_BONUS_TIME), U256::from(1100));
        assert_eq!(value(1000, 2, NO_BONUS_TIME), U256::from(1400));
    }

    #[test]
    fn longer_terms_never_earn_less() {
        for amount in [1u64, 33, 1000, 123_456_789] {
            let three = value(amount, 0, NO_BONUS_TIME);
            let six = value(amount, 1, NO_BONUS_TIME);
            let twelve = value(amount, 2, NO_BONUS_TIME);
            assert!(three <= six && six <= twelve);
        }
    }

    #[test]
    fn additive_bonus_applies_to_early_locks() {
        // First fixture bucket adds 40 points.
        assert_eq!(value(1000, 0, START + 1), U256::from(1400));
        assert_eq!(value(1000, 2, START + 1), U256::from(1800));
    }

    #[test]
    fn division_truncates() {
        // 33 * 140 / 100 = 46.2 -> 46
        assert_eq!(value(33, 0, START + 1), U256::from(46));
    }

    #[test]
    fn unknown_term_code_is_worthless() {
        assert_eq!(value(1000, 3, NO_BONUS_TIME), U256::ZERO);
        assert_eq!(value(1000, 255, START + 1), U256::ZERO);
    }

    #[test]
    fn zero_timestamps_suppress_bonus() {
        let v = lock_effective_value(
            U256::from(1000),
            0,
            0,
            0,
            BonusPolicy::Fixture,
            U256::ZERO,
        );
        assert_eq!(v, U256::from(1000));
    }

    #[test]
    fn signal_value_is_one_fifth_of_balance() {
        assert_eq!(signal_effective_value(U256::from(1000)), U256::from(200));
        assert_eq!(signal_effective_value(U256::from(99)), U256::from(19));
        assert_eq!(signal_effective_value(U256::ZERO), U256::ZERO);
    }
}
