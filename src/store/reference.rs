use rusqlite::{params, OptionalExtension};

use super::models::{BusinessUnit, Contract, Idc, Manufacturer, Tag};
use super::{now, AssetStore, StoreError};

impl AssetStore {
    pub fn add_user(&self, username: &str) -> Result<i64, StoreError> {
        self.conn.execute("INSERT INTO users(username) VALUES (?1)", params![username])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_user(&self, username: &str) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row("SELECT id FROM users WHERE username = ?1", params![username], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    pub fn get_or_create_user(&self, username: &str) -> Result<i64, StoreError> {
        match self.find_user(username)? {
            Some(id) => Ok(id),
            None => self.add_user(username),
        }
    }

    pub fn add_manufacturer(&self, manufacturer: &Manufacturer) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO manufacturers(name, telephone, memo) VALUES (?1, ?2, ?3)",
            params![manufacturer.name, manufacturer.telephone, manufacturer.memo],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Manufacturer names coming from reports are matched exactly.
    pub fn get_or_create_manufacturer(&self, name: &str) -> Result<i64, StoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM manufacturers WHERE name = ?1", params![name], |row| row.get(0))
            .optional()?;
        match existing {
            Some(id) => Ok(id),
            None => self.add_manufacturer(&Manufacturer {
                name: name.to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, StoreError> {
        let mut statement = self.conn.prepare("SELECT id, name, telephone, memo FROM manufacturers ORDER BY name")?;
        let rows = statement.query_map((), |row| {
            Ok(Manufacturer {
                id: row.get("id")?,
                name: row.get("name")?,
                telephone: row.get("telephone")?,
                memo: row.get("memo")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_business_unit(&self, unit: &BusinessUnit) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO business_units(parent_unit_id, name, memo) VALUES (?1, ?2, ?3)",
            params![unit.parent_unit_id, unit.name, unit.memo],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_business_unit(&self, id: i64) -> Result<BusinessUnit, StoreError> {
        self.conn
            .query_row(
                "SELECT id, parent_unit_id, name, memo FROM business_units WHERE id = ?1",
                params![id],
                |row| {
                    Ok(BusinessUnit {
                        id: row.get("id")?,
                        parent_unit_id: row.get("parent_unit_id")?,
                        name: row.get("name")?,
                        memo: row.get("memo")?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("business unit {id}")))
    }

    pub fn add_idc(&self, idc: &Idc) -> Result<i64, StoreError> {
        self.conn
            .execute("INSERT INTO idcs(name, memo) VALUES (?1, ?2)", params![idc.name, idc.memo])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_idc(&self, id: i64) -> Result<Idc, StoreError> {
        self.conn
            .query_row("SELECT id, name, memo FROM idcs WHERE id = ?1", params![id], |row| {
                Ok(Idc {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    memo: row.get("memo")?,
                })
            })
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("idc {id}")))
    }

    pub fn add_contract(&self, contract: &Contract) -> Result<i64, StoreError> {
        let today = now().date();
        self.conn.execute(
            "INSERT INTO contracts(sn, name, memo, price, detail, start_day, end_day, license_num, c_day, m_day)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                contract.sn,
                contract.name,
                contract.memo,
                contract.price,
                contract.detail,
                contract.start_day,
                contract.end_day,
                contract.license_num,
                today,
                today
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_contract(&self, id: i64) -> Result<Contract, StoreError> {
        self.conn
            .query_row(
                "SELECT id, sn, name, memo, price, detail, start_day, end_day, license_num FROM contracts WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Contract {
                        id: row.get("id")?,
                        sn: row.get("sn")?,
                        name: row.get("name")?,
                        memo: row.get("memo")?,
                        price: row.get("price")?,
                        detail: row.get("detail")?,
                        start_day: row.get("start_day")?,
                        end_day: row.get("end_day")?,
                        license_num: row.get("license_num")?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("contract {id}")))
    }

    pub fn add_tag(&self, name: &str) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO tags(name, c_day) VALUES (?1, ?2)",
            params![name, now().date()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_or_create_tag(&self, name: &str) -> Result<i64, StoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| row.get(0))
            .optional()?;
        match existing {
            Some(id) => Ok(id),
            None => self.add_tag(name),
        }
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut statement = self.conn.prepare("SELECT id, name, c_day FROM tags ORDER BY name")?;
        let rows = statement.query_map((), |row| {
            Ok(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
                c_day: row.get("c_day")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
