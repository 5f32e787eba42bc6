mod steps;
mod world;

pub use world::{MarketplaceSystem, MarketplaceWorld};
