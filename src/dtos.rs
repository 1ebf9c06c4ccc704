pub mod referraldtos;
pub mod shopdtos;
pub mod userdtos;

pub use referraldtos::*;
pub use shopdtos::*;
pub use userdtos::*;
