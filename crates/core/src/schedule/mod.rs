mod entry;
mod error;
mod lesson;
mod overlap;
mod types;
mod validation;
mod working_hours;

pub use entry::{TimelineEntry, UNNAMED_ENTRY};
pub use error::{ValidationFailure, ValidationRule, WorkingHoursError};
pub use lesson::{Bookable, HostedEvent, Lesson, LessonInfo};
pub use overlap::{intervals_overlap, OverlapIndex};
pub use types::{weekday_from_index, Slots, Teacher, WorkingHours};
pub use validation::{
    check_capacity, check_host, check_interval, check_overlap, check_working_hours,
    validate_intrinsic, SchedulingValidator,
};
pub use working_hours::{
    day_segments, local_day_segments, weekdays_touched, DaySegment, WorkingHoursCalendar, END_OF_DAY,
};
