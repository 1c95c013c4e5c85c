//! Inverter status predicates.
//!
//! All of them require every inverter to agree; a single inverter missing a
//! bit makes the whole check fail.

use vcu_common::consts::NUM_INVERTERS;
use vcu_common::vehicle::config::InverterErrorScan;
use vcu_common::vehicle::inverter::{InverterId, InverterStatus};

/// High voltage confirmed: every inverter reports DC quit-ack and DC on.
pub fn check_hv(statuses: &[InverterStatus; NUM_INVERTERS]) -> bool {
    statuses.iter().all(InverterStatus::hv_confirmed)
}

/// Bring-up confirmed: every inverter reports inverter quit-ack and inverter on.
pub fn check_init(statuses: &[InverterStatus; NUM_INVERTERS]) -> bool {
    statuses.iter().all(InverterStatus::bringup_confirmed)
}

/// Main contactor interlock: every inverter reports inverter on.
pub fn all_inverters_on(statuses: &[InverterStatus; NUM_INVERTERS]) -> bool {
    statuses.iter().all(InverterStatus::inverter_on)
}

/// First inverter within the scan set with its error bit raised.
pub fn first_inverter_error(
    statuses: &[InverterStatus; NUM_INVERTERS],
    scan: InverterErrorScan,
) -> Option<InverterId> {
    InverterId::ALL
        .into_iter()
        .filter(|id| match scan {
            InverterErrorScan::All => true,
            InverterErrorScan::FrontPair => id.is_front_pair(),
        })
        .find(|id| statuses[id.index()].has_error())
}
