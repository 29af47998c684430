mod asset;
mod part;
mod project;
mod user;

pub use asset::Asset;
pub use part::Part;
pub use project::Project;
pub use user::User;
