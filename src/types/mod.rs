pub mod records;
pub mod requests;
pub mod role;

pub use records::{
    Amount, Announcement, AtRiskMember, AttendanceRecord, Member, OfferingCategory,
    OfferingRecord, User, WelfareContribution,
};
pub use role::{Operation, Role};
