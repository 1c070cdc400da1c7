//! Leave calendar: turns leave intervals into per-day status markings.
//!
//! [`expand`] produces the days of a single range, [`aggregate`] folds many
//! status-tagged ranges into a [`DayStatusMap`]. The map is precedence
//! agnostic: a day covered by an approved and a pending leave is listed under
//! both. Choosing a single status per day is left to [`RenderPrecedence`] at
//! display time.

mod aggregate;
mod expand;
mod precedence;

pub use aggregate::{DayStatusMap, aggregate, aggregate_within};
pub use expand::{expand, expand_datetimes};
pub use precedence::RenderPrecedence;
