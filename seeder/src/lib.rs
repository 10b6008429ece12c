pub mod seed;
pub mod seeds;
