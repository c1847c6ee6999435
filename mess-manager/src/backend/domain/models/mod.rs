//! Domain models parsed from raw store documents.
//!
//! Parsing never fails: every field goes through the coercion helpers so a
//! malformed document becomes a record with zeros and empty strings rather
//! than an error.

pub mod bill;
pub mod member;
pub mod records;
pub mod settings;

pub use bill::{BillTrackingRecord, FixedBills};
pub use member::{Member, MemberDirectory, MemberLookup, UNKNOWN_MEMBER_NAME};
pub use records::{BazarEntry, BazarKind, Deposit, Fine, MealDay};
pub use settings::{ManagerConfig, NoticeConfig, DEFAULT_MANAGER_PIN};
