pub mod analysis;
pub mod decode;
pub mod mono;
pub mod stats;
