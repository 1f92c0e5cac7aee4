//! Task-context half of the sample handoff.

use crate::hx711::interrupt::SampleSignal;
use crate::protocol::{MessageIds, StateReport};
use crate::{LoadCellProbe, TransportOutput};

/// Drain every pending signal once: feed linked probes, then report to the host.
///
/// Returns the number of `hx711_in_state` messages emitted. Call it once per
/// pass of the main loop.
pub fn hx711_task<P, T>(
    signals: &[SampleSignal],
    ids: &MessageIds,
    probe: &mut P,
    transport: &mut T,
) -> usize
where
    P: LoadCellProbe,
    T: TransportOutput,
{
    let mut sent = 0;
    for signal in signals {
        let Some(report) = signal.take() else {
            continue;
        };
        if let Some(endstop) = report.endstop {
            probe.on_sample(endstop, report.value, report.clock);
        }
        match StateReport::from(report).encode(ids) {
            Ok(message) => {
                log::trace!(
                    "hx711 oid={} clock={} value={}",
                    report.oid,
                    report.clock,
                    report.value
                );
                transport.output(&message);
                sent += 1;
            }
            Err(err) => log::warn!("hx711 oid={} report dropped: {}", report.oid, err),
        }
    }
    sent
}
