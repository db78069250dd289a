// HTTP surface over the brickhole-catalog listing.

pub mod handlers;
pub mod params;
