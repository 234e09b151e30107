use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission tier attached to every login account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Accountant,
    Member,
}

/// Every operation the record layer exposes. Authorization is a lookup of
/// `(Role, Operation)` in the static table below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LogAttendance,
    RecordOffering,
    RecordWelfare,
    SearchMembers,
    ManageMembers,
    ManageUsers,
    PostAnnouncement,
    ViewAnnouncement,
    ViewReports,
    ViewAtRisk,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::LogAttendance,
        Operation::RecordOffering,
        Operation::RecordWelfare,
        Operation::SearchMembers,
        Operation::ManageMembers,
        Operation::ManageUsers,
        Operation::PostAnnouncement,
        Operation::ViewAnnouncement,
        Operation::ViewReports,
        Operation::ViewAtRisk,
    ];
}

const MEMBER_OPERATIONS: &[Operation] = &[
    Operation::LogAttendance,
    Operation::RecordWelfare,
    Operation::SearchMembers,
    Operation::ViewAnnouncement,
    Operation::ViewAtRisk,
];

const ACCOUNTANT_OPERATIONS: &[Operation] = &[
    Operation::LogAttendance,
    Operation::RecordWelfare,
    Operation::SearchMembers,
    Operation::ViewAnnouncement,
    Operation::ViewAtRisk,
    Operation::RecordOffering,
    Operation::PostAnnouncement,
    Operation::ViewReports,
];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accountant => "accountant",
            Role::Member => "member",
        }
    }

    pub fn permits(self, op: Operation) -> bool {
        match self {
            Role::Admin => true,
            Role::Accountant => ACCOUNTANT_OPERATIONS.contains(&op),
            Role::Member => MEMBER_OPERATIONS.contains(&op),
        }
    }

    pub fn allowed_operations(self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.permits(*op))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role `{}`", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "accountant" => Ok(Role::Accountant),
            "member" => Ok(Role::Member),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
