pub mod report;
pub mod roster;

pub use report::{CoreSummary, DailyRecord, MonthKey, MonthlyReport};
pub use roster::{CoreNode, NodeType, Roster, RosterError};
