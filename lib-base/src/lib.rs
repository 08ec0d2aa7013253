// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

mod types;
mod config;
pub mod matcher;
pub mod dispatcher;
pub mod supervisor;

pub use types::*;
pub use config::*;
pub use matcher::{match_devices, scan_devices};
pub use dispatcher::{CycleBudget, LoopExit, ReportDispatcher};
pub use supervisor::{RunOutcome, RunSummary, Supervisor};
