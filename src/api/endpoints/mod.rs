pub mod dashboard;
pub mod generate;
pub mod health;
pub mod patients;
pub mod plans;
pub mod session;
