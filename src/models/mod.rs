pub mod goal;
pub mod month;
pub mod settings;
pub mod transaction;
