mod student;

pub use student::{CreateStudentRequest, NewStudent, Student};
