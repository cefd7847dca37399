pub mod menu;
pub mod role;
