pub mod mailer;
pub mod quiz;
pub mod review;
pub mod study;
