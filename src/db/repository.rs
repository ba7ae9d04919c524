use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};

use crate::models::{DailyFocus, SessionRecord, WeeklyGrid};

// ─── Session log ─────────────────────────────────────────────────────────────

pub struct SessionRepo;

impl SessionRepo {
    pub fn record(conn: &Connection, session: &SessionRecord) -> Result<i64> {
        conn.execute(
            "INSERT INTO session_log (date, minutes, task, xp_earned, coins_earned, distractions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.date,
                session.minutes,
                session.task,
                session.xp_earned as i64,
                session.coins_earned as i64,
                session.distractions,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, minutes, task, xp_earned, coins_earned, distractions
             FROM session_log ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(SessionRecord {
                id: Some(row.get::<_, i64>(0)?),
                date: row.get(1)?,
                minutes: row.get(2)?,
                task: row.get(3)?,
                xp_earned: row.get::<_, i64>(4)?.max(0) as u64,
                coins_earned: row.get::<_, i64>(5)?.max(0) as u64,
                distractions: row.get(6)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// One entry per day in `start..=end`, zero-filled where nothing was logged.
    pub fn daily_range(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyFocus>> {
        let mut stmt = conn.prepare(
            "SELECT date, SUM(minutes), COUNT(*)
             FROM session_log
             WHERE date >= ?1 AND date <= ?2
             GROUP BY date
             ORDER BY date",
        )?;

        let logged = stmt
            .query_map(params![day_key(start), day_key(end)], |row| {
                Ok(DailyFocus {
                    date: row.get(0)?,
                    minutes: row.get(1)?,
                    sessions: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut days = Vec::new();
        let mut day = start;
        while day <= end {
            let key = day_key(day);
            let entry = logged
                .iter()
                .find(|d| d.date == key)
                .cloned()
                .unwrap_or_else(|| DailyFocus::empty(key));
            days.push(entry);
            day += Duration::days(1);
        }
        Ok(days)
    }

    /// The seven days ending at `today`.
    pub fn weekly_grid(conn: &Connection, today: NaiveDate) -> Result<WeeklyGrid> {
        let start = today - Duration::days(6);
        Ok(WeeklyGrid::new(Self::daily_range(conn, start, today)?))
    }

    /// Longest run of consecutive days with at least one logged session.
    pub fn best_streak(conn: &Connection) -> Result<u32> {
        let mut stmt = conn.prepare("SELECT DISTINCT date FROM session_log ORDER BY date")?;
        let dates: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(calculate_best_streak(&dates))
    }
}

pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn calculate_best_streak(dates: &[String]) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates
        .iter()
        .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .collect();
    if sorted.is_empty() {
        return 0;
    }
    sorted.sort();
    sorted.dedup();

    let mut best = 1u32;
    let mut current = 1u32;

    for pair in sorted.windows(2) {
        if pair[0].succ_opt() == Some(pair[1]) {
            current += 1;
        } else {
            current = 1;
        }
        best = best.max(current);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn session(date: &str, minutes: u32) -> SessionRecord {
        SessionRecord {
            id: None,
            date: date.to_string(),
            minutes,
            task: Some("write report".to_string()),
            xp_earned: u64::from(minutes) * 2,
            coins_earned: u64::from(minutes) * 2,
            distractions: 0,
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn record_and_read_back() {
        let conn = conn();
        SessionRepo::record(&conn, &session("2026-03-09", 25)).unwrap();
        let id = SessionRepo::record(&conn, &session("2026-03-10", 45)).unwrap();

        let recent = SessionRepo::recent(&conn, 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, Some(id));
        assert_eq!(recent[0].minutes, 45);
        assert_eq!(recent[0].xp_earned, 90);
        assert_eq!(recent[0].task.as_deref(), Some("write report"));
    }

    #[test]
    fn weekly_grid_fills_gaps() {
        let conn = conn();
        SessionRepo::record(&conn, &session("2026-03-04", 25)).unwrap();
        SessionRepo::record(&conn, &session("2026-03-08", 25)).unwrap();
        SessionRepo::record(&conn, &session("2026-03-08", 15)).unwrap();
        SessionRepo::record(&conn, &session("2026-02-20", 60)).unwrap();

        let grid = SessionRepo::weekly_grid(&conn, d("2026-03-10")).unwrap();
        assert_eq!(grid.days.len(), 7);
        assert_eq!(grid.days[0].date, "2026-03-04");
        assert_eq!(grid.days[0].minutes, 25);
        assert_eq!(grid.days[4].minutes, 40);
        assert_eq!(grid.days[4].sessions, 2);
        assert_eq!(grid.days[6].sessions, 0);
        assert_eq!(grid.total_minutes(), 65);
    }

    #[test]
    fn best_streak_from_log() {
        let conn = conn();
        assert_eq!(SessionRepo::best_streak(&conn).unwrap(), 0);
        for date in ["2026-03-01", "2026-03-02", "2026-03-02", "2026-03-03", "2026-03-07", "2026-03-08"] {
            SessionRepo::record(&conn, &session(date, 10)).unwrap();
        }
        assert_eq!(SessionRepo::best_streak(&conn).unwrap(), 3);
    }

    #[test]
    fn best_streak_single_day() {
        assert_eq!(calculate_best_streak(&["2026-03-01".to_string()]), 1);
        assert_eq!(calculate_best_streak(&["garbage".to_string()]), 0);
    }
}
