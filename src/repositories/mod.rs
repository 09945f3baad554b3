pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod notifications;
pub(crate) mod progress;
pub(crate) mod purchases;
pub(crate) mod testimonials;
pub(crate) mod users;
