//! Explicit transaction boundary.
//!
//! # Responsibility
//! - Group repository calls so that they commit together or not at all.
//! - Let nested units of work join the transaction already open on the
//!   connection instead of starting another one.
//!
//! # Invariants
//! - A unit of work that returns `Err` leaves no writes behind when it owns
//!   the transaction; the error is handed back unchanged.
//! - A panicking unit of work rolls back when the guard is dropped.
//! - A joined unit of work never commits or rolls back on its own.

use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;

/// Returns whether `conn` is currently inside a transaction.
pub fn is_transaction_active(conn: &Connection) -> bool {
    !conn.is_autocommit()
}

/// Runs `work` inside a transaction on `conn`.
///
/// When no transaction is active, an IMMEDIATE transaction is opened,
/// committed on `Ok` and rolled back on `Err`. When one is already active,
/// `work` joins it and the outermost caller decides the outcome.
///
/// The connection handed to `work` is the one every repository inside the
/// unit of work must be built on.
pub fn run_in_transaction<T, E, F>(conn: &Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<rusqlite::Error> + Display,
{
    if is_transaction_active(conn) {
        debug!("event=tx_join module=transaction status=ok");
        return work(conn);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    debug!("event=tx_begin module=transaction status=ok");

    match work(&*tx) {
        Ok(value) => {
            tx.commit()?;
            debug!("event=tx_commit module=transaction status=ok");
            Ok(value)
        }
        Err(err) => {
            warn!("event=tx_rollback module=transaction status=start cause={err}");
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=tx_rollback module=transaction status=error error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_transaction_active, run_in_transaction};
    use rusqlite::Connection;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER NOT NULL);")
            .unwrap();
        conn
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn ok_commits_and_leaves_autocommit() {
        let conn = scratch();
        let value: Result<i32, rusqlite::Error> = run_in_transaction(&conn, |tx| {
            assert!(is_transaction_active(tx));
            tx.execute("INSERT INTO t (v) VALUES (1);", [])?;
            Ok(7)
        });
        assert_eq!(value.unwrap(), 7);
        assert!(!is_transaction_active(&conn));
        assert_eq!(row_count(&conn), 1);
    }

    #[test]
    fn err_rolls_back_every_write() {
        let conn = scratch();
        let result: Result<(), rusqlite::Error> = run_in_transaction(&conn, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1);", [])?;
            tx.execute("INSERT INTO t (v) VALUES (NULL);", [])?;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!is_transaction_active(&conn));
        assert_eq!(row_count(&conn), 0);
    }

    #[test]
    fn nested_work_joins_outer_transaction() {
        let conn = scratch();
        let result: Result<(), rusqlite::Error> = run_in_transaction(&conn, |outer| {
            run_in_transaction(outer, |inner| {
                inner.execute("INSERT INTO t (v) VALUES (1);", [])?;
                Ok::<(), rusqlite::Error>(())
            })?;
            assert!(is_transaction_active(outer));
            outer.execute("INSERT INTO t (v) VALUES (NULL);", [])?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(row_count(&conn), 0);
    }
}
