//! CLI subcommands

pub mod capacity;
pub mod config;
pub mod nodes;
pub mod summary;
pub mod usage;

use crate::output::OutputFormat;
use headroom_lib::{Attribution, PodFilter};

/// Options shared by the snapshot subcommands
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub filter: PodFilter,
    pub attribution: Attribution,
    pub format: OutputFormat,
}
