//! Secret material: the process-wide signing key and the mint-path bearer credential.

pub mod bearer;
pub mod key;

pub use bearer::*;
pub use key::*;
