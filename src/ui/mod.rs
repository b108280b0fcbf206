pub mod bills;
pub mod components;
pub mod document;
pub mod new_bill;
