pub mod annotations;
pub mod approvals;
pub mod collaborations;
pub mod designs;
pub mod health;
pub mod versions;
