pub mod error_page;
pub mod layout;
pub mod loading_page;
