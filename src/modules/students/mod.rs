// Students and their enrolment

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::Student;
pub use services::StudentService;
