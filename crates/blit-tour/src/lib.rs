//! Tour of the blit engine: a catalog of scenarios and the app that plays them.

pub mod scenario;
pub mod tour;
