use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    /// Read-only access (initial state)
    #[default]
    Viewer,
    /// Allowed to mutate shared state
    Manager,
}

/// How a bazar purchase was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BazarType {
    /// Paid from the shared fund
    #[default]
    Cash,
    /// Bought on credit, settled outside the fund
    Credit,
}

impl BazarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BazarType::Cash => "cash",
            BazarType::Credit => "credit",
        }
    }
}

/// One of the three fixed monthly bills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    Wifi,
    /// Electricity
    Current,
    Rent,
}

impl BillKind {
    pub const ALL: [BillKind; 3] = [BillKind::Wifi, BillKind::Current, BillKind::Rent];

    /// Field name used in bill tracking and fixed bills documents
    pub fn field_name(&self) -> &'static str {
        match self {
            BillKind::Wifi => "wifi",
            BillKind::Current => "current",
            BillKind::Rent => "rent",
        }
    }
}

impl fmt::Display for BillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Day of the month by which each payment is due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DueDates {
    pub meal: u32,
    pub rent: u32,
    pub wifi: u32,
    pub current: u32,
}

impl Default for DueDates {
    fn default() -> Self {
        Self {
            meal: 5,
            rent: 8,
            wifi: 15,
            current: 25,
        }
    }
}

/// Each member's share of the fixed bills
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SharePerHead {
    pub wifi: f64,
    pub current: f64,
    pub rent: f64,
}

/// Derived figures for a single member
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberStats {
    /// Sum of the member's recorded meals
    pub meals: f64,
    /// Two meal-equivalents per fine
    pub fine_meals: f64,
    /// (meals + fine_meals) x meal rate
    pub meal_cost: f64,
    /// Sum of the member's deposits
    pub paid: f64,
    /// meal_cost + bill per head
    pub total_cost: f64,
    /// paid - total_cost, negative when the member owes the mess
    pub balance: f64,
}

/// A member row on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member_id: String,
    pub name: String,
    pub is_manager_tag: bool,
    pub stats: MemberStats,
    pub formatted_meal_cost: String,
    pub formatted_balance: String,
}

/// Everything the dashboard shows, computed from one snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub member_count: usize,
    pub total_meals: f64,
    pub fine_meals: f64,
    /// Cash bazar spending (the shared fund outflow)
    pub cash_outflow: f64,
    /// Bazar bought on credit, shown separately
    pub credit_outflow: f64,
    pub total_deposits: f64,
    /// Full precision meal rate
    pub meal_rate: f64,
    pub share_per_head: SharePerHead,
    pub bill_per_head: f64,
    /// total_deposits - cash_outflow
    pub fund_status: f64,
    pub formatted_meal_rate: String,
    pub formatted_bill_per_head: String,
    pub formatted_fund_status: String,
    pub notice: String,
    pub members: Vec<MemberSummary>,
}

/// Paid flags of one member for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillStatusRow {
    pub member_id: String,
    pub name: String,
    pub wifi: bool,
    pub current: bool,
    pub rent: bool,
}

/// Number of members who paid each bill
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BillPaidCounts {
    pub wifi: usize,
    pub current: usize,
    pub rent: usize,
}

/// Bill payment overview for a month (YYYY-MM)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillBoard {
    pub month: String,
    pub share_per_head: SharePerHead,
    pub due_dates: DueDates,
    pub rows: Vec<BillStatusRow>,
    pub paid_counts: BillPaidCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BazarHistoryRow {
    pub id: String,
    pub item: String,
    pub amount: f64,
    pub member_name: String,
    /// DD/MM/YYYY, empty when the stored date is unreadable
    pub display_date: String,
    /// None when the stored type is not recognised
    pub bazar_type: Option<BazarType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositHistoryRow {
    pub id: String,
    pub member_name: String,
    pub amount: f64,
    pub display_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineHistoryRow {
    pub id: String,
    pub member_name: String,
    pub reason: String,
    pub display_date: String,
}

/// Request for manager login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerLoginRequest {
    pub pin: String,
}

/// Response from manager login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerLoginResponse {
    pub success: bool,
    pub role: Role,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePinRequest {
    /// Exactly four digits
    pub new_pin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
}

/// Response after creating a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberResponse {
    pub member_id: String,
    pub success_message: String,
}

/// Request to set a member's meal count for a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMealRequest {
    /// YYYY-MM-DD
    pub date: String,
    pub member_id: String,
    /// Non-negative, in steps of 0.5
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDepositRequest {
    pub member_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddBazarRequest {
    pub item: String,
    pub amount: f64,
    /// Member who did the shopping
    pub member_id: String,
    /// YYYY-MM-DD
    pub date: String,
    pub bazar_type: BazarType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddFineRequest {
    pub member_id: String,
    pub reason: String,
}

/// Id of a document created by an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRecordResponse {
    pub id: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleBillRequest {
    pub member_id: String,
    /// YYYY-MM
    pub month: String,
    pub bill: BillKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNoticeRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFixedBillsRequest {
    pub wifi: f64,
    pub current: f64,
    pub rent: f64,
}

/// How many documents were removed from one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurgedCollection {
    pub collection: String,
    pub deleted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetMonthResponse {
    pub purged: Vec<PurgedCollection>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStatementResponse {
    pub file_path: String,
    pub row_count: usize,
    pub success_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bazar_type_serializes_lowercase() {
        let json = serde_json::to_string(&BazarType::Credit).unwrap();
        assert_eq!(json, "\"credit\"");
        assert_eq!(BazarType::default(), BazarType::Cash);
    }

    #[test]
    fn test_due_dates_fill_missing_fields() {
        let dates: DueDates = serde_json::from_str(r#"{"rent": 10}"#).unwrap();
        assert_eq!(dates.rent, 10);
        assert_eq!(dates.meal, 5);
        assert_eq!(dates.wifi, 15);
        assert_eq!(dates.current, 25);
    }

    #[test]
    fn test_bill_kind_field_names() {
        let names: Vec<&str> = BillKind::ALL.iter().map(|b| b.field_name()).collect();
        assert_eq!(names, vec!["wifi", "current", "rent"]);
        assert_eq!(BillKind::Current.to_string(), "current");
    }
}
