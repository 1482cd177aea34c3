//! Plain data types shared by the actors, the pricing engine and the notification pipeline.

pub mod address;
pub mod cart;
pub mod money;
pub mod order;
pub mod product;
pub mod user;

pub use address::*;
pub use cart::*;
pub use money::*;
pub use order::*;
pub use product::*;
pub use user::*;
