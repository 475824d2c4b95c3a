pub mod account;
pub mod survey;
