use rusqlite::{params, Row};

use super::models::EventLog;
use super::{now, AssetStore, StoreError};

const EVENT_COLUMNS: &str =
    "id, name, event_type, asset_id, new_asset_id, component, detail, date, user_id, memo";

fn event_from_row(row: &Row) -> rusqlite::Result<EventLog> {
    Ok(EventLog {
        id: row.get("id")?,
        name: row.get("name")?,
        event_type: row.get("event_type")?,
        asset_id: row.get("asset_id")?,
        new_asset_id: row.get("new_asset_id")?,
        component: row.get("component")?,
        detail: row.get("detail")?,
        date: row.get("date")?,
        user_id: row.get("user_id")?,
        memo: row.get("memo")?,
    })
}

impl AssetStore {
    /// Append an entry to the event log. A missing date is filled with the current time.
    pub fn log_event(&self, event: &EventLog) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO event_logs(name, event_type, asset_id, new_asset_id, component, detail, date, user_id, memo)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                event.name,
                event.event_type,
                event.asset_id,
                event.new_asset_id,
                event.component,
                event.detail,
                event.date.unwrap_or_else(now),
                event.user_id,
                event.memo
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_events(&self) -> Result<Vec<EventLog>, StoreError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM event_logs ORDER BY date DESC, id DESC");
        let mut statement = self.conn.prepare(&query)?;
        let rows = statement.query_map((), event_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn events_for_asset(&self, asset_id: i64) -> Result<Vec<EventLog>, StoreError> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM event_logs WHERE asset_id = ?1 ORDER BY date DESC, id DESC"
        );
        let mut statement = self.conn.prepare(&query)?;
        let rows = statement.query_map(params![asset_id], event_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::store::models::{EventLog, EventType};
    use crate::store::AssetStore;
    use chrono::NaiveDate;

    #[test]
    fn test_log_event() {
        let store = AssetStore::open_in_memory().unwrap();
        let user = store.add_user("ops").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        store
            .log_event(&EventLog {
                name: String::from("rack move"),
                event_type: EventType::Maintenance,
                detail: String::from("moved to rack B4"),
                date: Some(date),
                user_id: Some(user),
                ..Default::default()
            })
            .unwrap();
        store
            .log_event(&EventLog {
                name: String::from("note"),
                detail: String::from("default type"),
                ..Default::default()
            })
            .unwrap();

        let events = store.list_events().unwrap();
        assert_eq!(events.len(), 2);
        // the undated entry gets the current time and sorts first
        assert_eq!(events[0].event_type, EventType::AssetOnline);
        assert!(events[0].date.unwrap() > date);
        assert_eq!(events[1].date, Some(date));
        assert_eq!(events[1].user_id, Some(user));
    }

    #[test]
    fn test_unknown_asset_reference() {
        let store = AssetStore::open_in_memory().unwrap();
        let result = store.log_event(&EventLog {
            name: String::from("ghost"),
            asset_id: Some(404),
            detail: String::from("no such asset"),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_user_deletion_keeps_event() {
        let store = AssetStore::open_in_memory().unwrap();
        let user = store.add_user("temp").unwrap();
        store
            .log_event(&EventLog {
                name: String::from("audit"),
                detail: String::from("checked"),
                user_id: Some(user),
                ..Default::default()
            })
            .unwrap();
        store.conn.execute("DELETE FROM users WHERE id = ?1", [user]).unwrap();

        let events = store.list_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, None);
    }
}
