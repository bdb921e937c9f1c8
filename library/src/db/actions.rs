use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use std::time::Duration;

use crate::{
    config::PoolOptions,
    db::model::{DbReading, GetReadings, NewReading},
    error::StoreError,
    schema::iaq,
};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

/// Applied to every connection the pool hands out. Concurrent writers wait on
/// the database lock for up to `busy_timeout` instead of failing outright.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn pool_builder(opts: &PoolOptions) -> r2d2::Builder<ConnectionManager<SqliteConnection>> {
    r2d2::Pool::builder()
        .max_size(opts.max_size)
        .connection_timeout(opts.connection_timeout)
        .connection_customizer(Box::new(ConnectionOptions::default()))
}

/// Opens the pool and brings the schema up to date.
pub fn build_pool(database_url: &str, opts: &PoolOptions) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = pool_builder(opts).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    Ok(pool)
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    if applied.is_empty() {
        info!("database schema is up to date");
    } else {
        let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
        info!("applied {} migration(s): {}", applied.len(), names);
    }
    Ok(())
}

/// Appends one reading and returns the stored row.
///
/// Both statements run in one immediate transaction so the row read back is
/// the one just written, and a dropped request never leaves half a write.
pub fn insert_reading(conn: &mut SqliteConnection, new_reading: &NewReading) -> QueryResult<DbReading> {
    conn.immediate_transaction(|conn| {
        diesel::insert_into(iaq::table)
            .values(new_reading)
            .execute(conn)?;
        iaq::table
            .order(iaq::id.desc())
            .select(DbReading::as_select())
            .first(conn)
    })
}

/// Newest first, by store time then id.
pub fn load_readings(conn: &mut SqliteConnection, msg: &GetReadings) -> QueryResult<Vec<DbReading>> {
    use crate::schema::iaq::dsl::*;

    let mut query = iaq.select(DbReading::as_select()).into_boxed();
    if let Some(start) = msg.start {
        query = query.filter(rec_time.ge(start));
    }
    if let Some(end) = msg.end {
        query = query.filter(rec_time.le(end));
    }
    query
        .order((rec_time.desc(), id.desc()))
        .limit(msg.limit)
        .load(conn)
}

pub fn count_readings(conn: &mut SqliteConnection) -> QueryResult<i64> {
    iaq::table.count().get_result(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{ReadingForm, SensorReading};
    use chrono::NaiveDate;
    use rand::Rng;
    use std::path::PathBuf;

    struct TempDb(PathBuf);

    impl TempDb {
        fn new() -> Self {
            let name = format!("iaq-actions-{:016x}.db", rand::thread_rng().gen::<u64>());
            TempDb(std::env::temp_dir().join(name))
        }

        fn pool(&self) -> DbPool {
            let opts = PoolOptions {
                max_size: 2,
                ..PoolOptions::default()
            };
            build_pool(self.0.to_str().unwrap(), &opts).unwrap()
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut p = self.0.clone().into_os_string();
                p.push(suffix);
                let _ = std::fs::remove_file(p);
            }
        }
    }

    fn reading(location: &str, temp: &str, rh: &str) -> SensorReading {
        let s = |v: &str| Some(v.to_owned());
        SensorReading::try_from(ReadingForm {
            location: s(location),
            temp: s(temp),
            rh: s(rh),
            pmass1: s("1"),
            pmass25: s("2"),
            pmass4: s("3"),
            pmass10: s("4"),
            pcount1: s("5"),
            pcount25: s("6"),
            pcount4: s("7"),
            pcount10: s("8"),
            typ_part_size: s("0.5"),
            hcho: s("9"),
            co2: s("1200"),
        })
        .unwrap()
    }

    #[test]
    fn insert_stores_derived_indoor_td() {
        let db = TempDb::new();
        let pool = db.pool();
        let mut conn = pool.get().unwrap();

        let rd = reading("lab", "24.0", "55.0");
        let stored = insert_reading(&mut conn, &NewReading::from(&rd)).unwrap();
        assert_eq!(stored.location, "lab");
        assert_eq!(stored.co2, 1200.0);
        assert!((stored.indoor_td - 15.0).abs() < 1e-9);
        assert_eq!(count_readings(&mut conn).unwrap(), 1);
    }

    #[test]
    fn ids_increase_with_insertion_order() {
        let db = TempDb::new();
        let pool = db.pool();
        let mut conn = pool.get().unwrap();

        let a = insert_reading(&mut conn, &NewReading::from(&reading("a", "20", "50"))).unwrap();
        let b = insert_reading(&mut conn, &NewReading::from(&reading("b", "20", "50"))).unwrap();
        assert!(b.id > a.id);

        let rows = load_readings(&mut conn, &GetReadings::latest(10)).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let rows = load_readings(&mut conn, &GetReadings::latest(1)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location, "b");
    }

    #[test]
    fn ids_beyond_32_bits_round_trip() {
        let db = TempDb::new();
        let pool = db.pool();
        let mut conn = pool.get().unwrap();
        insert_reading(&mut conn, &NewReading::from(&reading("a", "20", "50"))).unwrap();
        conn.batch_execute("UPDATE sqlite_sequence SET seq = 3000000000 WHERE name = 'iaq';")
            .unwrap();

        let stored = insert_reading(&mut conn, &NewReading::from(&reading("b", "20", "50"))).unwrap();
        assert_eq!(stored.id, 3_000_000_001);
        let rows = load_readings(&mut conn, &GetReadings::latest(1)).unwrap();
        assert_eq!(rows[0].id, 3_000_000_001);
    }

    #[test]
    fn time_bounds_filter_rows() {
        let db = TempDb::new();
        let pool = db.pool();
        let mut conn = pool.get().unwrap();
        let stored = insert_reading(&mut conn, &NewReading::from(&reading("a", "20", "50"))).unwrap();

        let past = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let future = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();

        let within = GetReadings {
            start: Some(past),
            end: Some(future),
            limit: 10,
        };
        assert_eq!(load_readings(&mut conn, &within).unwrap(), vec![stored]);

        let after = GetReadings {
            start: Some(future),
            end: None,
            limit: 10,
        };
        assert!(load_readings(&mut conn, &after).unwrap().is_empty());
    }

    #[test]
    fn migrations_are_idempotent() {
        let db = TempDb::new();
        let pool = db.pool();
        let mut conn = pool.get().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(count_readings(&mut conn).unwrap(), 0);
    }
}
