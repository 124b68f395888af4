pub mod course;
pub mod time_slot;

pub use course::{Course, CourseRecord, CourseSummary, NewCourse};
pub use time_slot::{CourseTimeSlot, TimeSlot};
