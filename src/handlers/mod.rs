pub mod health;
pub mod schools;
pub mod students;
