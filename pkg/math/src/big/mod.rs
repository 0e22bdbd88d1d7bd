mod modulo;
mod secret;
mod uint;

pub use modulo::Modulo;
pub use secret::Secret;
pub use uint::BigUint;
