use log::*;
use tokio::task::JoinHandle;

use crate::{
    engine_api::AuditApi,
    traits::{AuditLedger, AuditTrailDatabase},
};

/// Starts the audit retry sweep worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_sweep_worker<B, L>(api: AuditApi<B, L>) -> JoinHandle<()>
where
    B: AuditTrailDatabase + 'static,
    L: AuditLedger + 'static,
{
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(api.config().sweep_period);
        info!("🧹️ Audit retry sweep worker started");
        loop {
            timer.tick().await;
            info!("🧹️ Running audit retry sweep");
            match api.retry_failed().await {
                Ok(report) if report.attempted == 0 => {
                    debug!("🧹️ Nothing to sweep");
                },
                Ok(report) => {
                    info!("🧹️ Sweep complete: {report}");
                },
                Err(e) => {
                    error!("🧹️ Error running audit retry sweep: {e}");
                },
            }
        }
    })
}
