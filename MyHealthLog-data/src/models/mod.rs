//! Row models and write inputs for every table

pub mod daily;
pub mod exercise;
pub mod finance;
pub mod medication;
pub mod memo;
pub mod money;
pub mod period;
pub mod sex;
pub mod stool;
pub mod user;
pub mod weight;

pub use money::Money;
