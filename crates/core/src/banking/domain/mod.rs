pub mod account;
pub mod session_menu;
