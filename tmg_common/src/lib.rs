mod amount;
mod secret;

pub use amount::{TalerAmount, TalerAmountError};
pub use secret::Secret;
