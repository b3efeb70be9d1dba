// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod cat;
mod convert;
mod demo;
mod inspect;

pub use cat::CatCmd;
pub use convert::ConvertCmd;
pub use demo::DemoCmd;
pub use inspect::InspectCmd;
