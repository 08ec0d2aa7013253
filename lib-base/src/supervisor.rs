// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use crate::dispatcher::{CycleBudget, LoopExit, ReportDispatcher};
use crate::{ReporterContext, ReporterState};
use hidreplay_hid::HidBackend;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;

/// Totals for a supervised run that ended on its cycle budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Dispatch loop restarts after a failure
    pub restarts: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Cancelled,
    Completed(RunSummary),
}

/// Restarts the dispatch loop every time it terminates.
///
/// The loop only ends on failure, so in production this runs until the
/// shutdown future passed to [`Supervisor::run_until`] resolves.
pub struct Supervisor<B: HidBackend> {
    dispatcher: ReportDispatcher<B>,
    budget: CycleBudget,
    restarts: u64,
}

impl<B: HidBackend> Supervisor<B> {
    pub fn new(context: Arc<ReporterContext>, backend: B) -> Self {
        Self {
            dispatcher: ReportDispatcher::new(context, backend),
            budget: CycleBudget::unbounded(),
            restarts: 0,
        }
    }

    pub fn with_budget(mut self, budget: CycleBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn dispatcher(&self) -> &ReportDispatcher<B> {
        &self.dispatcher
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Scan once, then run the dispatch loop and restart it whenever it ends
    pub async fn run(&mut self) -> RunSummary {
        if let Err(e) = self.dispatcher.scan() {
            warn!("Initial scan failed: {}", e);
        }

        loop {
            info!("Starting reporter tasks");
            match self.dispatcher.run_dispatch_loop(&mut self.budget).await {
                LoopExit::Failed(e) => {
                    self.restarts += 1;
                    debug!("Restarting reporter tasks after: {}", e);
                }
                LoopExit::BudgetExhausted => break,
            }
        }

        self.dispatcher.set_state(ReporterState::Stopped);
        RunSummary {
            restarts: self.restarts,
        }
    }

    /// Run until `shutdown` resolves or the cycle budget is spent
    pub async fn run_until<F>(&mut self, shutdown: F) -> RunOutcome
    where
        F: Future<Output = ()>,
    {
        let completed = tokio::select! {
            biased;
            _ = shutdown => None,
            summary = self.run() => Some(summary),
        };

        match completed {
            Some(summary) => RunOutcome::Completed(summary),
            None => {
                self.dispatcher.set_state(ReporterState::Stopped);
                RunOutcome::Cancelled
            }
        }
    }
}
