//! Medicare Part B income-related monthly adjustment (IRMAA).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{FilingStatus, IrmaaParameters};

/// Monthly Part B premium for one beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrmaaPremium {
    /// Zero-based tier; tier 0 pays no surcharge.
    pub tier: usize,
    pub monthly_surcharge: Decimal,
    /// Standard premium plus the surcharge.
    pub monthly_premium: Decimal,
}

/// Looks up the IRMAA tier for `magi` and the resulting monthly premium.
///
/// A MAGI exactly on a tier's upper bound stays in that tier. Negative MAGI
/// is treated as zero.
pub fn irmaa_premium(
    magi: Decimal,
    filing_status: FilingStatus,
    params: &IrmaaParameters,
) -> IrmaaPremium {
    let magi = non_negative("magi", magi);
    let schedule = params.tiers.get(filing_status);

    let tier = schedule.tier_index(magi);
    let monthly_surcharge = schedule
        .tiers()
        .get(tier)
        .map_or(Decimal::ZERO, |t| t.monthly_surcharge);

    IrmaaPremium {
        tier,
        monthly_surcharge,
        monthly_premium: round_half_up(params.standard_premium + monthly_surcharge),
    }
}
