use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use flowtrack::{
    PasswordHash, ValidatedPassword, initialize_db,
    transaction::{NewTransaction, TransactionKind, create_transaction},
    user::create_user,
};

/// A utility for creating a test database for the FlowTrack server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user("test@example.com", password_hash, &conn)?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();

    for (kind, name, category, amount, days_ago) in sample_transactions() {
        create_transaction(
            NewTransaction {
                kind,
                name: name.to_owned(),
                category: category.to_owned(),
                amount,
                date: days_ago_date(today, days_ago),
            },
            user.id,
            &conn,
        )?;
    }

    println!("Success! Log in as test@example.com with the password 'test'.");

    Ok(())
}

fn days_ago_date(today: Date, days_ago: i64) -> Date {
    today - Duration::days(days_ago)
}

type SampleTransaction = (TransactionKind, &'static str, &'static str, f64, i64);

fn sample_transactions() -> Vec<SampleTransaction> {
    use TransactionKind::{Expense, Income};

    vec![
        (Income, "Monthly Salary", "Salary", 5000.0, 95),
        (Income, "Monthly Salary", "Salary", 5000.0, 65),
        (Income, "Monthly Salary", "Salary", 5000.0, 34),
        (Income, "Monthly Salary", "Salary", 5000.0, 4),
        (Income, "Vision Dividend", "Dividend", 1750.0, 50),
        (Income, "Overtime", "Overtime", 420.0, 22),
        (Expense, "Rent", "Utilities", 1200.0, 90),
        (Expense, "Rent", "Utilities", 1200.0, 60),
        (Expense, "Rent", "Utilities", 1200.0, 29),
        (Expense, "KFC", "Food", 55.0, 80),
        (Expense, "Groceries", "Food", 150.0, 45),
        (Expense, "Groceries", "Food", 145.5, 14),
        (Expense, "Bus Pass", "Transportation", 120.0, 40),
        (Expense, "Cinema Night", "Entertainment", 21.0, 33),
        (Expense, "New Jacket", "Clothing", 65.0, 18),
        (Expense, "Pharmacy", "Healthcare", 32.5, 10),
        (Expense, "Birthday Present", "Gifts", 40.0, 6),
        (Expense, "Stationery", "Other", 12.0, 2),
    ]
}
