use sillage_types::BrowserContext;
use tracing::trace;

use crate::accumulator::{CONNECTION_DOWNLINK, CONNECTION_RTT, MeasurementAccumulator};
use crate::platform::ClientProbe;

/// Copies whatever the client reports about its network and hardware.
///
/// Connection class, device memory and processor count go into `context`;
/// round-trip time and downlink become measurements. Fields the probe does
/// not carry are left untouched.
pub fn collect_navigator_context(
    probe: &ClientProbe,
    context: &mut BrowserContext,
    measurements: &MeasurementAccumulator,
) {
    if let Some(connection) = &probe.connection {
        if let Some(effective_type) = connection
            .effective_type
            .as_deref()
            .filter(|value| !value.is_empty())
        {
            context.effective_connection_type = Some(effective_type.to_string());
        }
        if let Some(rtt) = connection.rtt {
            measurements.record(CONNECTION_RTT, rtt);
        }
        if let Some(downlink) = connection.downlink {
            measurements.record(CONNECTION_DOWNLINK, downlink);
        }
    }

    if let Some(device_memory) = probe.device_memory {
        context.device_memory = Some(device_memory);
    }
    if let Some(hardware_concurrency) = probe.hardware_concurrency {
        context.hardware_concurrency = Some(hardware_concurrency);
    }

    trace!(?context, "collected navigator context");
}
