pub mod admin;
pub mod subjects;
