mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result, TimeRangeError};
pub use traits::{
    CustomerRepository, EntryRepository, SubscriptionRepository, TeacherRepository,
    WorkingHoursRepository,
};
pub use types::{EntryScope, TimeRange};
