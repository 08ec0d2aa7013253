// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::matcher::scan_devices;
use crate::{MatchedDevice, ReportError, ReporterContext, ReporterState};
use hidreplay_hid::{parse_buffer, token_count, HidBackend, HidError, ReportSession};
use log::{debug, info, trace};
use std::sync::Arc;
use tokio::task::yield_now;
use tokio::time::sleep;

/// Why a dispatch loop returned
#[derive(Debug)]
pub enum LoopExit {
    /// A scan or transport error ended the loop after one pause
    Failed(ReportError),
    /// The cycle budget ran out
    BudgetExhausted,
}

/// Upper bound on the number of cycles to run. Unbounded in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleBudget {
    remaining: Option<u64>,
}

impl CycleBudget {
    pub fn unbounded() -> Self {
        Self { remaining: None }
    }

    pub fn cycles(count: u64) -> Self {
        Self { remaining: Some(count) }
    }

    /// Consume one cycle, returns false once the budget is spent
    pub fn take(&mut self) -> bool {
        match &mut self.remaining {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }
}

/// Replays the configured reports to every matched device on a fixed interval
pub struct ReportDispatcher<B: HidBackend> {
    context: Arc<ReporterContext>,
    backend: B,
    devices: Vec<MatchedDevice>,
    state: ReporterState,
}

impl<B: HidBackend> ReportDispatcher<B> {
    pub fn new(context: Arc<ReporterContext>, backend: B) -> Self {
        Self {
            context,
            backend,
            devices: Vec::new(),
            state: ReporterState::Idle,
        }
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    pub fn devices(&self) -> &[MatchedDevice] {
        &self.devices
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn set_state(&mut self, state: ReporterState) {
        if self.state != state {
            trace!("Reporter state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Replace the device list with a fresh scan
    pub fn scan(&mut self) -> Result<(), ReportError> {
        self.set_state(ReporterState::Scanning);
        self.devices = scan_devices(&self.context, &mut self.backend)?;
        Ok(())
    }

    /// Write every configured report to every device in list order.
    ///
    /// The first failure aborts the whole pass; devices after the failing one
    /// are not touched. Yields after each device so a shutdown can interrupt a
    /// long pass. Returns the number of reports written.
    pub async fn dispatch_pass(&mut self) -> Result<usize, ReportError> {
        self.set_state(ReporterState::Dispatching);
        let mut written = 0;
        for device in &self.devices {
            info!("{}", device.device.summary());
            let transport = |source: HidError| ReportError::Transport {
                path: device.path().to_string(),
                source,
            };

            let mut session = self.backend.open(device.path()).map_err(transport)?;
            for raw_buffer in &device.byte_strings {
                let buffer = parse_buffer(raw_buffer, token_count(raw_buffer));
                if buffer.is_empty() {
                    debug!("Skipping unparsable report {:?}", raw_buffer);
                    continue;
                }
                if let Err(e) = session.write(&buffer) {
                    if let Err(close_err) = session.close() {
                        debug!("Failed to close {} after write error: {}", device.path(), close_err);
                    }
                    return Err(transport(e));
                }
                written += 1;
            }
            session.close().map_err(transport)?;
            yield_now().await;
        }
        Ok(written)
    }

    /// Run scan/dispatch/sleep cycles until an error or the budget ends the
    /// loop. Even cycles rescan the host, odd cycles reuse the last scan.
    pub async fn run_dispatch_loop(&mut self, budget: &mut CycleBudget) -> LoopExit {
        let interval = self.context.poll_interval();
        debug!("Starting {}ms loop", interval.as_millis());

        let mut cycle: u64 = 0;
        loop {
            if !budget.take() {
                return LoopExit::BudgetExhausted;
            }

            let result = self.run_cycle(cycle).await;
            cycle += 1;

            self.set_state(ReporterState::Sleeping);
            match result {
                Ok(()) => sleep(interval).await,
                Err(e) => {
                    info!("{}", e);
                    sleep(interval).await;
                    return LoopExit::Failed(e);
                }
            }
        }
    }

    async fn run_cycle(&mut self, cycle: u64) -> Result<(), ReportError> {
        if cycle % 2 == 0 {
            self.scan()?;
            yield_now().await;
        }
        let written = self.dispatch_pass().await?;
        trace!("Cycle {} wrote {} reports", cycle, written);
        Ok(())
    }
}
