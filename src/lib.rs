#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::needless_return)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod misc;
pub mod error;
pub mod instance;
pub mod pattern;
pub mod expansion;
pub mod model;
pub mod knapsack;
pub mod pool;
pub mod solvers;
mod generator;
mod ui;

pub use error::{PricingError, Result};
pub use instance::CuttingStockInstance;
pub use pattern::{Pattern, PATTERN_COST};
pub use expansion::{BitExpansion, BitVar};
pub use model::cuts::CutSummary;
pub use model::{PricingModel, Row, RowKind};
pub use knapsack::{KnapsackSolution, KnapsackSolver};
pub use pool::{PoolEntry, SolutionPool};
pub use solvers::{CombinatorialSolver, SubproblemSolver};
pub use generator::*;
pub use ui::*;
