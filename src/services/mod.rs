pub(crate) mod checkout;
pub(crate) mod content_policy;
pub(crate) mod fanout;
pub(crate) mod payments;
pub(crate) mod pricing;
pub(crate) mod progress;
pub(crate) mod storage;
pub(crate) mod testimonials;
