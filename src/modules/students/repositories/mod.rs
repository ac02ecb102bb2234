mod student_repository;

pub(crate) use student_repository::STUDENT_COLUMNS;
pub use student_repository::{MySqlStudentRepository, StudentRepository};
