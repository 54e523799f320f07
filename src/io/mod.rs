// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistence: the history ledger and report artifacts.

pub mod ledger;
pub mod report;
