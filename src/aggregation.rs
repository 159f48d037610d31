//! Transaction aggregation for charts and summary widgets.
//!
//! Everything in this module is a pure function over a slice of transactions
//! that has already been fetched from the database: no I/O, no shared state,
//! and the input is never mutated, so these are safe to call from any number
//! of handlers at once. The handlers decide which transactions to pass in
//! (e.g. pre-filtered to a single year or a single kind); the aggregation
//! itself only groups and sums.

use crate::transaction::{OTHER_CATEGORY, Transaction, TransactionKind};

/// Three-letter labels for the twelve calendar months, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One month's entry in a twelve-slot series.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPoint {
    /// Three-letter month label, e.g. "Jan".
    pub month: &'static str,
    /// The signed net amount for the month (income minus expenses).
    pub amount: f64,
}

/// A full year of net amounts, one entry per calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyNetSeries {
    /// The reporting year the series is labelled with.
    ///
    /// The year is a label only: callers are expected to filter the input to
    /// a single year before aggregating.
    pub year: i32,
    /// Exactly twelve entries, index 0 = January through index 11 = December.
    pub points: Vec<MonthlyPoint>,
}

impl MonthlyNetSeries {
    /// The sum of the net amounts across all twelve months.
    pub fn net_total(&self) -> f64 {
        self.points.iter().map(|point| point.amount).sum()
    }
}

/// Reduces transactions into a twelve-slot series of signed net amounts.
///
/// Each transaction contributes `+amount` (income) or `-amount` (expense) to
/// the slot for its calendar month. Months without transactions stay at zero,
/// so the output always has exactly twelve entries in January..December
/// order. The result does not depend on the order of the input.
///
/// `year` labels the series and does not filter: callers that want a
/// single-year chart must pass in only that year's transactions.
pub fn monthly_net_series(transactions: &[Transaction], year: i32) -> MonthlyNetSeries {
    let mut points: Vec<MonthlyPoint> = MONTH_LABELS
        .iter()
        .map(|&month| MonthlyPoint { month, amount: 0.0 })
        .collect();

    for transaction in transactions {
        let index = transaction.date.month() as usize - 1;
        points[index].amount += transaction.signed_amount();
    }

    MonthlyNetSeries { year, points }
}

/// The total amount recorded under one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category name, with missing categories folded into "Other".
    pub category: String,
    /// The sum of the amounts recorded under the category.
    pub value: f64,
}

/// Totals transaction amounts per category for one transaction kind.
///
/// Input records of the other kind are ignored, so mixed lists are safe.
/// Transactions without a category are counted under the canonical
/// [OTHER_CATEGORY] bucket. Categories appear in the order they are first
/// seen in the input, which keeps pie chart legends stable across renders of
/// the same data; only categories that actually occur are emitted.
pub fn category_totals(transactions: &[Transaction], kind: TransactionKind) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions.iter().filter(|t| t.kind == kind) {
        let category = if transaction.category.is_empty() {
            OTHER_CATEGORY
        } else {
            transaction.category.as_str()
        };

        match totals.iter_mut().find(|entry| entry.category == category) {
            Some(entry) => entry.value += transaction.amount,
            None => totals.push(CategoryTotal {
                category: category.to_owned(),
                value: transaction.amount,
            }),
        }
    }

    totals
}

/// The scalar figures shown at the top of the income and expense pages.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    /// The sum of all amounts.
    pub total: f64,
    /// The largest single amount, or zero for an empty list.
    pub highest: f64,
    /// The arithmetic mean, or zero for an empty list.
    pub average: f64,
}

/// Derives total, highest and average amounts over a list of transactions.
///
/// Intended for lists already filtered to a single kind; the amounts are
/// summed as magnitudes without applying the income/expense sign. Empty
/// input yields all zeroes rather than NaN or a panic.
pub fn summary_statistics(transactions: &[Transaction]) -> SummaryStatistics {
    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    let highest = transactions.iter().map(|t| t.amount).fold(0.0, f64::max);
    let average = if transactions.is_empty() {
        0.0
    } else {
        total / transactions.len() as f64
    };

    SummaryStatistics {
        total,
        highest,
        average,
    }
}

/// One month's separate income and expense totals.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyFlow {
    /// Three-letter month label, e.g. "Jan".
    pub month: &'static str,
    /// Total income recorded in the month.
    pub income: f64,
    /// Total expenses recorded in the month.
    pub expenses: f64,
}

/// A full year of per-month income and expense totals.
///
/// This is the two-series counterpart of [MonthlyNetSeries], used by the
/// income-vs-expense trend chart on the reports page.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBreakdown {
    /// The reporting year the breakdown is labelled with.
    pub year: i32,
    /// Exactly twelve entries, index 0 = January through index 11 = December.
    pub months: Vec<MonthlyFlow>,
}

/// Reduces transactions into per-month income and expense totals.
///
/// Like [monthly_net_series] but keeps the two kinds separate instead of
/// netting them, and `year` is again a label rather than a filter.
pub fn monthly_breakdown(transactions: &[Transaction], year: i32) -> MonthlyBreakdown {
    let mut months: Vec<MonthlyFlow> = MONTH_LABELS
        .iter()
        .map(|&month| MonthlyFlow {
            month,
            income: 0.0,
            expenses: 0.0,
        })
        .collect();

    for transaction in transactions {
        let entry = &mut months[transaction.date.month() as usize - 1];
        match transaction.kind {
            TransactionKind::Income => entry.income += transaction.amount,
            TransactionKind::Expense => entry.expenses += transaction.amount,
        }
    }

    MonthlyBreakdown { year, months }
}

/// Overall income, expense and balance totals for the stat cards.
#[derive(Debug, Clone, PartialEq)]
pub struct NetTotals {
    /// Total income across the input.
    pub income: f64,
    /// Total expenses across the input.
    pub expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// Totals income and expenses across a (typically mixed) transaction list.
pub fn net_totals(transactions: &[Transaction]) -> NetTotals {
    let mut income = 0.0;
    let mut expenses = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => income += transaction.amount,
            TransactionKind::Expense => expenses += transaction.amount,
        }
    }

    NetTotals {
        income,
        expenses,
        balance: income - expenses,
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::transaction::{Transaction, TransactionKind};

    use super::{
        MONTH_LABELS, category_totals, monthly_breakdown, monthly_net_series, net_totals,
        summary_statistics,
    };

    fn record(kind: TransactionKind, amount: f64, date: Date, category: &str) -> Transaction {
        Transaction {
            id: 0,
            kind,
            name: "Test".to_owned(),
            category: category.to_owned(),
            amount,
            date,
        }
    }

    fn income(amount: f64, date: Date) -> Transaction {
        record(TransactionKind::Income, amount, date, "Salary")
    }

    fn expense(amount: f64, date: Date) -> Transaction {
        record(TransactionKind::Expense, amount, date, "Food")
    }

    #[test]
    fn monthly_net_series_sums_signed_amounts_per_month() {
        let transactions = vec![
            income(1000.0, date!(2025 - 01 - 15)),
            expense(400.0, date!(2025 - 01 - 20)),
            income(200.0, date!(2025 - 03 - 01)),
        ];

        let series = monthly_net_series(&transactions, 2025);

        assert_eq!(series.year, 2025);
        assert_eq!(series.points.len(), 12);
        assert_eq!(series.points[0].amount, 600.0);
        assert_eq!(series.points[2].amount, 200.0);
        for (index, point) in series.points.iter().enumerate() {
            if index != 0 && index != 2 {
                assert_eq!(point.amount, 0.0, "month {} should be zero", point.month);
            }
        }
    }

    #[test]
    fn monthly_net_series_returns_twelve_zeroed_months_for_empty_input() {
        let series = monthly_net_series(&[], 2024);

        assert_eq!(series.points.len(), 12);
        for (point, want_label) in series.points.iter().zip(MONTH_LABELS) {
            assert_eq!(point.month, want_label);
            assert_eq!(point.amount, 0.0);
        }
    }

    #[test]
    fn monthly_net_series_conserves_the_signed_sum() {
        let transactions = vec![
            income(1234.56, date!(2025 - 02 - 02)),
            income(78.9, date!(2025 - 06 - 30)),
            expense(432.1, date!(2025 - 02 - 14)),
            expense(0.45, date!(2025 - 12 - 31)),
        ];

        let want: f64 = transactions.iter().map(|t| t.signed_amount()).sum();
        let series = monthly_net_series(&transactions, 2025);

        assert!((series.net_total() - want).abs() < 1e-9);
    }

    #[test]
    fn monthly_net_series_is_order_independent() {
        let mut transactions = vec![
            income(100.0, date!(2025 - 01 - 01)),
            expense(25.0, date!(2025 - 01 - 31)),
            income(50.0, date!(2025 - 11 - 11)),
        ];

        let forwards = monthly_net_series(&transactions, 2025);
        transactions.reverse();
        let backwards = monthly_net_series(&transactions, 2025);

        assert_eq!(forwards, backwards);
    }

    #[test]
    fn category_totals_groups_in_first_seen_order() {
        let transactions = vec![
            record(TransactionKind::Expense, 100.0, date!(2025 - 01 - 01), "Food"),
            record(TransactionKind::Expense, 50.0, date!(2025 - 01 - 02), "Food"),
            record(
                TransactionKind::Expense,
                75.0,
                date!(2025 - 01 - 03),
                "Transportation",
            ),
        ];

        let totals = category_totals(&transactions, TransactionKind::Expense);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "Food");
        assert_eq!(totals[0].value, 150.0);
        assert_eq!(totals[1].category, "Transportation");
        assert_eq!(totals[1].value, 75.0);
    }

    #[test]
    fn category_totals_ignores_the_other_kind() {
        let transactions = vec![
            record(TransactionKind::Expense, 100.0, date!(2025 - 01 - 01), "Food"),
            record(
                TransactionKind::Income,
                5000.0,
                date!(2025 - 01 - 02),
                "Salary",
            ),
        ];

        let totals = category_totals(&transactions, TransactionKind::Expense);

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].category, "Food");
    }

    #[test]
    fn category_totals_conserves_the_filtered_sum() {
        let transactions = vec![
            record(TransactionKind::Expense, 12.5, date!(2025 - 01 - 01), "Food"),
            record(TransactionKind::Expense, 7.5, date!(2025 - 02 - 01), "Gifts"),
            record(TransactionKind::Expense, 30.0, date!(2025 - 03 - 01), "Food"),
            record(TransactionKind::Income, 99.0, date!(2025 - 03 - 02), "Bonus"),
        ];

        let want: f64 = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .map(|t| t.amount)
            .sum();
        let got: f64 = category_totals(&transactions, TransactionKind::Expense)
            .iter()
            .map(|entry| entry.value)
            .sum();

        assert!((got - want).abs() < 1e-9);
    }

    #[test]
    fn category_totals_defaults_missing_category_to_other() {
        let transactions = vec![
            record(TransactionKind::Expense, 10.0, date!(2025 - 01 - 01), ""),
            record(TransactionKind::Expense, 5.0, date!(2025 - 01 - 02), "Other"),
        ];

        let totals = category_totals(&transactions, TransactionKind::Expense);

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].category, "Other");
        assert_eq!(totals[0].value, 15.0);
    }

    #[test]
    fn category_totals_returns_empty_for_empty_input() {
        assert!(category_totals(&[], TransactionKind::Income).is_empty());
        assert!(category_totals(&[], TransactionKind::Expense).is_empty());
    }

    #[test]
    fn category_totals_permutation_changes_order_not_values() {
        let mut transactions = vec![
            record(TransactionKind::Expense, 1.0, date!(2025 - 01 - 01), "Food"),
            record(TransactionKind::Expense, 2.0, date!(2025 - 01 - 02), "Gifts"),
            record(TransactionKind::Expense, 4.0, date!(2025 - 01 - 03), "Food"),
        ];

        let forwards = category_totals(&transactions, TransactionKind::Expense);
        transactions.reverse();
        let backwards = category_totals(&transactions, TransactionKind::Expense);

        for entry in &forwards {
            let other = backwards
                .iter()
                .find(|candidate| candidate.category == entry.category)
                .expect("category missing after permutation");
            assert_eq!(entry.value, other.value);
        }
        assert_eq!(forwards.len(), backwards.len());
    }

    #[test]
    fn summary_statistics_matches_list_page_figures() {
        let transactions = vec![
            income(5500.0, date!(2025 - 02 - 17)),
            income(50000.0, date!(2025 - 05 - 21)),
            income(2100.0, date!(2025 - 06 - 06)),
        ];

        let stats = summary_statistics(&transactions);

        assert_eq!(stats.total, 57600.0);
        assert_eq!(stats.highest, 50000.0);
        assert_eq!(stats.average, 19200.0);
    }

    #[test]
    fn summary_statistics_returns_zeroes_for_empty_input() {
        let stats = summary_statistics(&[]);

        assert_eq!(stats.total, 0.0);
        assert_eq!(stats.highest, 0.0);
        assert_eq!(stats.average, 0.0);
    }

    #[test]
    fn summary_statistics_is_order_independent() {
        let mut transactions = vec![
            income(1.0, date!(2025 - 01 - 01)),
            income(2.0, date!(2025 - 01 - 02)),
            income(3.0, date!(2025 - 01 - 03)),
        ];

        let forwards = summary_statistics(&transactions);
        transactions.reverse();
        let backwards = summary_statistics(&transactions);

        assert_eq!(forwards, backwards);
    }

    #[test]
    fn monthly_breakdown_keeps_kinds_separate() {
        let transactions = vec![
            income(1000.0, date!(2025 - 01 - 15)),
            expense(400.0, date!(2025 - 01 - 20)),
            expense(100.0, date!(2025 - 04 - 02)),
        ];

        let breakdown = monthly_breakdown(&transactions, 2025);

        assert_eq!(breakdown.months.len(), 12);
        assert_eq!(breakdown.months[0].income, 1000.0);
        assert_eq!(breakdown.months[0].expenses, 400.0);
        assert_eq!(breakdown.months[3].income, 0.0);
        assert_eq!(breakdown.months[3].expenses, 100.0);
    }

    #[test]
    fn net_totals_balances_income_against_expenses() {
        let transactions = vec![
            income(1000.0, date!(2025 - 01 - 15)),
            expense(400.0, date!(2025 - 01 - 20)),
            income(200.0, date!(2025 - 03 - 01)),
        ];

        let totals = net_totals(&transactions);

        assert_eq!(totals.income, 1200.0);
        assert_eq!(totals.expenses, 400.0);
        assert_eq!(totals.balance, 800.0);
    }

    #[test]
    fn net_totals_of_empty_input_is_zero() {
        let totals = net_totals(&[]);

        assert_eq!(totals.income, 0.0);
        assert_eq!(totals.expenses, 0.0);
        assert_eq!(totals.balance, 0.0);
    }
}
