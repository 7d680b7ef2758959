pub mod session;
pub mod user;

pub use session::SessionRecord;
pub use user::User;
