mod bill;
mod user;

pub use bill::{Bill, BillDraft, BillStatus};
pub use user::{User, UserType};
