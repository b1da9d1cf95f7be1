pub mod phone;
pub mod platform;
pub mod response;

pub use phone::*;
pub use platform::*;
pub use response::*;
