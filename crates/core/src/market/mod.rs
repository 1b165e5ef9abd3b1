mod inactivity;
mod types;

pub use inactivity::{
    find_inactive_customers, inactivity_notification, is_recent_subscription_class,
    DEFAULT_INACTIVITY_WINDOW_DAYS, INACTIVITY_TEMPLATE,
};
pub use types::{Class, Customer, Subscription};
