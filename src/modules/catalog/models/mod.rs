mod bus_stop;
mod course;
mod fee_head;
mod fee_structure;

pub use bus_stop::{BusStop, CreateBusStopRequest};
pub use course::{Course, CreateCourseRequest};
pub use fee_head::{CreateFeeHeadRequest, FeeHead};
pub use fee_structure::{
    validate_terms, CreateFeeStructureRequest, FeeStructure, FeeStructureLine,
    UpdateFeeStructureRequest,
};
