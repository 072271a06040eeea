pub mod category;
pub mod expense;
pub mod trip;
pub mod user;

pub use category::Category;
pub use expense::Expense;
pub use trip::Trip;
pub use user::User;
