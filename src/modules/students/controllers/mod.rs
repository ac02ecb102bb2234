mod student_controller;

pub use student_controller::{configure, EnrolmentResponse};
