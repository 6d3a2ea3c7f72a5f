// Machine status line
use crate::domain::fragment::MachineStatus;
use crate::domain::series::Snapshot;

const PLACEHOLDER_STATUS: &str = "VC open loop";

/// There is no machine-status series in the database yet, so this always
/// reports the fixed ventilation mode and marks itself as not live.
pub fn render_machine_status(_snapshot: &Snapshot) -> MachineStatus {
    MachineStatus {
        text: PLACEHOLDER_STATUS.to_string(),
        live: false,
    }
}
