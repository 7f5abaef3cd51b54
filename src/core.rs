pub mod calendar;
pub mod classifier;
pub mod clock;
pub mod definition;
pub mod event;
pub mod period;
pub mod season;
pub mod switch;
pub mod trigger;
