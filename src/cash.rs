use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CashTransaction, TransactionKind};

/// Point-in-time reconciliation of a cash shift, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShiftSummary {
    pub base: i64,
    pub total_sales_cash: i64,
    pub total_incomes: i64,
    pub total_expenses: i64,
    pub expected_total: i64,
}

/// expected = base + sales + incomes - expenses
pub fn summarize(
    base: i64,
    transactions: &[CashTransaction],
    paid_order_totals: impl IntoIterator<Item = i64>,
) -> ShiftSummary {
    let (total_incomes, total_expenses) =
        transactions
            .iter()
            .fold((0_i64, 0_i64), |(incomes, expenses), tx| match tx.kind {
                TransactionKind::Income => (incomes + tx.amount, expenses),
                TransactionKind::Expense => (incomes, expenses + tx.amount),
            });
    let total_sales_cash: i64 = paid_order_totals.into_iter().sum();

    ShiftSummary {
        base,
        total_sales_cash,
        total_incomes,
        total_expenses,
        expected_total: base + total_sales_cash + total_incomes - total_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn tx(kind: TransactionKind, amount: i64) -> CashTransaction {
        CashTransaction {
            id: Uuid::new_v4(),
            shift_id: Uuid::nil(),
            kind,
            amount,
            description: "manual".into(),
            user_id: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expected_total_adds_sales_and_incomes_and_subtracts_expenses() {
        let transactions = vec![
            tx(TransactionKind::Income, 20),
            tx(TransactionKind::Income, 5),
            tx(TransactionKind::Expense, 10),
        ];
        let summary = summarize(100, &transactions, [50]);
        assert_eq!(
            summary,
            ShiftSummary {
                base: 100,
                total_sales_cash: 50,
                total_incomes: 25,
                total_expenses: 10,
                expected_total: 165,
            }
        );
    }

    #[test]
    fn empty_shift_expects_its_base() {
        let summary = summarize(80, &[], std::iter::empty());
        assert_eq!(summary.expected_total, 80);
        assert_eq!(summary.total_sales_cash, 0);
    }

    #[test]
    fn expenses_can_push_expected_below_base() {
        let summary = summarize(10, &[tx(TransactionKind::Expense, 30)], [5, 5]);
        assert_eq!(summary.expected_total, -10);
    }
}
