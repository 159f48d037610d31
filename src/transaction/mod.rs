//! Transaction management for FlowTrack.
//!
//! This module contains everything related to income and expense records:
//! - The [Transaction] model, the [TransactionKind] tagged union and the
//!   fixed per-kind category sets
//! - Database functions for storing, querying and managing transactions
//! - Route handlers for the transactions pages and the transaction API,
//!   including CSV/JSON export

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit;
mod export;
mod form;
mod transactions_page;

pub use core::{
    EXPENSE_CATEGORIES, INCOME_CATEGORIES, NewTransaction, OTHER_CATEGORY,
    ParseTransactionKindError, SortOrder, Transaction, TransactionId, TransactionKind,
    TransactionQuery, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, query_transactions, update_transaction,
};

pub(crate) use create_endpoint::create_transaction_endpoint;
pub(crate) use create_page::get_new_transaction_page;
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use edit::{edit_transaction_endpoint, get_edit_transaction_page};
pub(crate) use export::export_transactions_endpoint;
pub(crate) use transactions_page::get_transactions_page;
