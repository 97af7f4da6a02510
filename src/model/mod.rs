//! Model structure: candidate term generation, cluster analysis, and
//! free-run simulation of an estimated model.

pub mod clusters;
pub mod simulate;
pub mod terms;

pub use clusters::*;
pub use simulate::*;
pub use terms::*;
