mod attendance;
mod enrollment;
mod menu;
mod mess;
mod notice;
mod user;

pub use attendance::*;
pub use enrollment::*;
pub use menu::*;
pub use mess::*;
pub use notice::*;
pub use user::*;
