//! # Ledger Engine
//!
//! Pure functions deriving every financial figure of the mess from a
//! [`LedgerSnapshot`].
//!
//! ## Business Rules
//!
//! - Only cash bazar (or bazar with no type) leaves the shared fund
//! - Each fine adds two meal-equivalents to the offender's cost basis
//! - Meal rate = cash bazar / (all meals + all fine-meals), 0 when nothing was eaten
//! - Fixed bills are split evenly across the current members
//! - Balance = deposits - (meal cost + bill per head); negative means the member owes
//!
//! Values keep full precision; rounding happens only when a figure is
//! formatted for display, so recomputing from the same snapshot always gives
//! the same numbers. A figure that overflows to a non-finite value is
//! reported as 0, and no figure is ever `-0.0`.

use std::collections::BTreeMap;

use shared::{DashboardSummary, MemberStats, MemberSummary, SharePerHead};

use crate::backend::domain::coerce::format_money;
use crate::backend::domain::models::{
    BazarEntry, BazarKind, Deposit, Fine, FixedBills, MealDay, MemberLookup,
};
use crate::backend::domain::snapshot::LedgerSnapshot;

/// Meal-equivalents charged per fine
pub const FINE_MEALS_PER_FINE: f64 = 2.0;

/// `value`, or 0 when it is NaN or infinite; `-0.0` becomes `0.0`
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value + 0.0
    } else {
        0.0
    }
}

fn sum(values: impl Iterator<Item = f64>) -> f64 {
    finite(values.fold(0.0, |total, value| total + value))
}

/// Sum of every member's meal count across every date
pub fn total_meals(meals_by_date: &BTreeMap<String, MealDay>) -> f64 {
    sum(meals_by_date.values().map(MealDay::total))
}

pub fn fine_meal_count(fines: &[Fine]) -> f64 {
    fines.len() as f64 * FINE_MEALS_PER_FINE
}

/// Spending paid from the shared fund
pub fn cash_outflow(bazar: &[BazarEntry]) -> f64 {
    sum(bazar.iter().filter(|e| e.is_cash()).map(|e| e.amount))
}

/// Bazar bought on credit, which does not touch the fund
pub fn credit_outflow(bazar: &[BazarEntry]) -> f64 {
    sum(bazar
        .iter()
        .filter(|e| e.kind == BazarKind::Credit)
        .map(|e| e.amount))
}

pub fn total_deposits(deposits: &[Deposit]) -> f64 {
    sum(deposits.iter().map(|d| d.amount))
}

/// Cost of one meal-equivalent; 0 when the meal factor is not positive
pub fn meal_rate(cash_outflow: f64, total_meals: f64, fine_meal_count: f64) -> f64 {
    let meal_factor = finite(total_meals + fine_meal_count);
    if meal_factor > 0.0 {
        finite(cash_outflow / meal_factor)
    } else {
        0.0
    }
}

pub fn share_per_head(fixed_bills: &FixedBills, member_count: usize) -> SharePerHead {
    if member_count == 0 {
        return SharePerHead::default();
    }
    let heads = member_count as f64;
    SharePerHead {
        wifi: fixed_bills.wifi / heads,
        current: fixed_bills.current / heads,
        rent: fixed_bills.rent / heads,
    }
}

pub fn bill_per_head(share: &SharePerHead) -> f64 {
    finite(share.wifi + share.current + share.rent)
}

pub fn member_stats(
    member_id: &str,
    meals_by_date: &BTreeMap<String, MealDay>,
    deposits: &[Deposit],
    fines: &[Fine],
    meal_rate: f64,
    bill_per_head: f64,
) -> MemberStats {
    let meals = sum(meals_by_date.values().map(|day| day.count_for(member_id)));
    let fine_meals = fines.iter().filter(|f| f.member_id == member_id).count() as f64 * FINE_MEALS_PER_FINE;
    let paid = sum(deposits
        .iter()
        .filter(|d| d.member_id == member_id)
        .map(|d| d.amount));

    let meal_cost = finite((meals + fine_meals) * meal_rate);
    let total_cost = finite(meal_cost + bill_per_head);

    MemberStats {
        meals,
        fine_meals,
        meal_cost,
        paid,
        total_cost,
        balance: finite(paid - total_cost),
    }
}

/// Overall cash position of the mess
pub fn fund_status(total_deposits: f64, cash_outflow: f64) -> f64 {
    finite(total_deposits - cash_outflow)
}

/// Every derived figure for one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReport {
    pub member_count: usize,
    pub total_meals: f64,
    pub fine_meals: f64,
    pub cash_outflow: f64,
    pub credit_outflow: f64,
    pub total_deposits: f64,
    pub meal_rate: f64,
    pub share_per_head: SharePerHead,
    pub bill_per_head: f64,
    pub fund_status: f64,
    /// One entry per current member, in member order
    pub members: Vec<(String, MemberStats)>,
}

impl LedgerReport {
    pub fn compute(snapshot: &LedgerSnapshot) -> Self {
        let total_meals = total_meals(&snapshot.meals);
        let fine_meals = fine_meal_count(&snapshot.fines);
        let cash_outflow = cash_outflow(&snapshot.bazar);
        let total_deposits = total_deposits(&snapshot.deposits);
        let meal_rate = meal_rate(cash_outflow, total_meals, fine_meals);
        let share_per_head = share_per_head(&snapshot.fixed_bills, snapshot.members.len());
        let bill_per_head = bill_per_head(&share_per_head);

        let members = snapshot
            .members
            .iter()
            .map(|member| {
                let stats = member_stats(
                    &member.id,
                    &snapshot.meals,
                    &snapshot.deposits,
                    &snapshot.fines,
                    meal_rate,
                    bill_per_head,
                );
                (member.id.clone(), stats)
            })
            .collect();

        Self {
            member_count: snapshot.members.len(),
            total_meals,
            fine_meals,
            cash_outflow,
            credit_outflow: credit_outflow(&snapshot.bazar),
            total_deposits,
            meal_rate,
            share_per_head,
            bill_per_head,
            fund_status: fund_status(total_deposits, cash_outflow),
            members,
        }
    }

    pub fn stats_for(&self, member_id: &str) -> Option<&MemberStats> {
        self.members
            .iter()
            .find(|(id, _)| id == member_id)
            .map(|(_, stats)| stats)
    }

    /// Dashboard view with display formatting applied
    pub fn to_summary(&self, snapshot: &LedgerSnapshot) -> DashboardSummary {
        let directory = snapshot.member_directory();
        let members = self
            .members
            .iter()
            .map(|(member_id, stats)| {
                let lookup = directory.lookup(member_id);
                MemberSummary {
                    member_id: member_id.clone(),
                    name: lookup.display_name().to_string(),
                    is_manager_tag: matches!(lookup, MemberLookup::Found(m) if m.is_manager_tag),
                    stats: *stats,
                    formatted_meal_cost: format_money(stats.meal_cost),
                    formatted_balance: format_money(stats.balance),
                }
            })
            .collect();

        DashboardSummary {
            member_count: self.member_count,
            total_meals: self.total_meals,
            fine_meals: self.fine_meals,
            cash_outflow: self.cash_outflow,
            credit_outflow: self.credit_outflow,
            total_deposits: self.total_deposits,
            meal_rate: self.meal_rate,
            share_per_head: self.share_per_head,
            bill_per_head: self.bill_per_head,
            fund_status: self.fund_status,
            formatted_meal_rate: format_money(self.meal_rate),
            formatted_bill_per_head: format_money(self.bill_per_head),
            formatted_fund_status: format_money(self.fund_status),
            notice: snapshot.notice.text.clone(),
            members,
        }
    }
}

/// Compute the dashboard for a snapshot in one step
pub fn compute_dashboard(snapshot: &LedgerSnapshot) -> DashboardSummary {
    LedgerReport::compute(snapshot).to_summary(snapshot)
}
