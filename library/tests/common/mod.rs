#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use library::config::PoolOptions;
use library::db::{self, DbPool};
use rand::Rng;

/// A throwaway SQLite database, deleted (with its WAL files) on drop.
pub struct TestDb {
    pub path: PathBuf,
    pub pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let name = format!("iaq-test-{:016x}.db", rand::thread_rng().gen::<u64>());
        let path = std::env::temp_dir().join(name);
        let opts = PoolOptions {
            max_size: 4,
            ..PoolOptions::default()
        };
        let pool = db::build_pool(path.to_str().unwrap(), &opts).unwrap();
        TestDb { path, pool }
    }

    pub fn count(&self) -> i64 {
        let mut conn = self.pool.get().unwrap();
        db::actions::count_readings(&mut conn).unwrap()
    }

    pub fn execute(&self, sql: &str) {
        let mut conn = self.pool.get().unwrap();
        diesel::connection::SimpleConnection::batch_execute(&mut *conn, sql).unwrap();
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}

/// A pool whose connections can never be opened.
pub fn unreachable_pool() -> DbPool {
    let opts = PoolOptions {
        max_size: 1,
        connection_timeout: Duration::from_millis(250),
    };
    let manager = ConnectionManager::<SqliteConnection>::new("/nonexistent-iaq-dir/nested/iaq.db");
    db::actions::pool_builder(&opts).build_unchecked(manager)
}

pub fn form(location: &str, temp: &str, rh: &str) -> Vec<(&'static str, String)> {
    vec![
        ("location", location.to_owned()),
        ("temp", temp.to_owned()),
        ("rH", rh.to_owned()),
        ("pmass1", "1.2".to_owned()),
        ("pmass25", "2.4".to_owned()),
        ("pmass4", "3.1".to_owned()),
        ("pmass10", "3.3".to_owned()),
        ("pcount1", "10.5".to_owned()),
        ("pcount25", "11".to_owned()),
        ("pcount4", "11.2".to_owned()),
        ("pcount10", "11.3".to_owned()),
        ("typPartSize", "0.61".to_owned()),
        ("HCHO", "12".to_owned()),
        ("CO2", "612".to_owned()),
    ]
}

pub fn without(mut fields: Vec<(&'static str, String)>, name: &str) -> Vec<(&'static str, String)> {
    fields.retain(|(k, _)| *k != name);
    fields
}
