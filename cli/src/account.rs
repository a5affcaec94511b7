use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::config::AccountKeys;
use crate::error::{Result, StatsError};
use crate::models::{AccountFiles, AccountSummary, Playlist};

/// Parsed account-data files of an export.
///
/// A file key that is absent, or present with a null body, means the file
/// was not part of the export.
#[derive(Debug, Clone, Default)]
pub struct AccountData {
    files: AccountFiles,
}

impl AccountData {
    pub fn new(files: AccountFiles) -> Self {
        Self { files }
    }

    pub fn file_keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Value of `field_key` inside the file `file_key`.
    ///
    /// Returns `Ok(None)` when the file exists but has no such field.
    pub fn lookup(&self, file_key: &str, field_key: &str) -> Result<Option<&Value>> {
        match self.files.get(file_key) {
            None | Some(Value::Null) => Err(StatsError::MissingFile(file_key.to_string())),
            Some(file) => Ok(file.get(field_key).filter(|v| !v.is_null())),
        }
    }

    fn lookup_str(&self, file_key: &str, field_key: &str) -> Result<Option<&str>> {
        Ok(self.lookup(file_key, field_key)?.and_then(Value::as_str))
    }

    fn lookup_date(&self, file_key: &str, field_key: &str) -> Result<Option<NaiveDate>> {
        self.lookup_str(file_key, field_key)?.map(parse_date).transpose()
    }

    /// Display name from the identity file, if that file is an object.
    pub fn username(&self, keys: &AccountKeys) -> Option<String> {
        self.lookup_str(&keys.identity_file, &keys.username)
            .ok()
            .flatten()
            .map(str::to_string)
    }

    /// Playlists in export order.
    pub fn playlists(&self, keys: &AccountKeys) -> Result<Vec<Playlist>> {
        let list = match self.lookup(&keys.playlists_file, &keys.playlists)? {
            Some(Value::Array(items)) => items,
            _ => return Ok(Vec::new()),
        };

        Ok(list
            .iter()
            .filter_map(|p| {
                let name = p.get("name")?.as_str()?.to_string();
                let description = p
                    .get("description")
                    .and_then(Value::as_str)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string);
                Some(Playlist { name, description })
            })
            .collect())
    }

    /// Everything the account view prints, as of `today`.
    pub fn summary(&self, keys: &AccountKeys, today: NaiveDate) -> Result<AccountSummary> {
        let first = self.lookup_str(&keys.userdata_file, &keys.first_name)?;
        let last = self.lookup_str(&keys.userdata_file, &keys.last_name)?;
        let user_reference = match (first, last) {
            (Some(f), Some(l)) if !f.is_empty() && !l.is_empty() => Some(format!("{} {}", f, l)),
            _ => self.username(keys),
        };

        let created_on = self.lookup_date(&keys.userdata_file, &keys.creation_time)?;
        let birthday = self.lookup_date(&keys.userdata_file, &keys.birthdate)?;
        let birthday_today = birthday.is_some_and(|b| is_birthday_today(b, today));

        let playlists = match self.playlists(keys) {
            Err(StatsError::MissingFile(_)) => Vec::new(),
            other => other?,
        };

        Ok(AccountSummary {
            user_reference,
            created_on,
            birthday,
            birthday_today,
            playlists,
        })
    }
}

/// Month and day match, year ignored.
pub fn is_birthday_today(birth_date: NaiveDate, today: NaiveDate) -> bool {
    birth_date.month() == today.month() && birth_date.day() == today.day()
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(StatsError::DateFormat { value: raw.to_string() });
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| StatsError::DateFormat { value: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn account(value: Value) -> AccountData {
        let files = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => panic!("fixture must be an object"),
        };
        AccountData::new(files)
    }

    #[test]
    fn missing_file_is_an_error() {
        let data = account(json!({"Identity": {"displayName": "dj"}}));
        let err = data.lookup("Userdata", "firstName").unwrap_err();
        assert!(matches!(err, StatsError::MissingFile(ref f) if f == "Userdata"));
    }

    #[test]
    fn null_file_is_an_error() {
        let data = account(json!({"Userdata": null}));
        assert!(matches!(data.lookup("Userdata", "firstName"), Err(StatsError::MissingFile(_))));
    }

    #[test]
    fn missing_field_is_none() {
        let data = account(json!({"Userdata": {"lastName": "Rossi"}}));
        assert_eq!(data.lookup("Userdata", "firstName").unwrap(), None);
        assert_eq!(data.lookup("Userdata", "lastName").unwrap(), Some(&json!("Rossi")));
    }

    #[test]
    fn birthday_ignores_year() {
        assert!(is_birthday_today(d(1990, 10, 19), d(2026, 10, 19)));
        assert!(!is_birthday_today(d(1990, 10, 19), d(2026, 10, 20)));
        assert!(!is_birthday_today(d(1990, 10, 19), d(2026, 11, 19)));
    }

    #[test]
    fn strict_date_parsing() {
        assert_eq!(parse_date("2001-02-03").unwrap(), d(2001, 2, 3));
        for bad in ["2001-2-3", "03/02/2001", "2001-02-30", "2001-02-03T00:00:00", "", "+2001-02-0"] {
            assert!(matches!(parse_date(bad), Err(StatsError::DateFormat { .. })), "{bad}");
        }
    }

    #[test]
    fn playlists_with_optional_description() {
        let data = account(json!({"Playlist1": {"playlists": [
            {"name": "Gym", "description": "loud"},
            {"name": "Sleep", "description": ""},
            {"name": "Road", "description": null},
        ]}}));
        let lists = data.playlists(&AccountKeys::default()).unwrap();
        assert_eq!(
            lists,
            vec![
                Playlist { name: "Gym".into(), description: Some("loud".into()) },
                Playlist { name: "Sleep".into(), description: None },
                Playlist { name: "Road".into(), description: None },
            ]
        );
    }

    #[test]
    fn summary_prefers_full_name_and_tolerates_missing_playlists() {
        let data = account(json!({
            "Identity": {"displayName": "dj"},
            "Userdata": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "creationTime": "2015-06-01",
                "birthdate": "1990-10-19"
            }
        }));
        let summary = data.summary(&AccountKeys::default(), d(2026, 10, 19)).unwrap();
        assert_eq!(summary.user_reference.as_deref(), Some("Ada Lovelace"));
        assert_eq!(summary.created_on, Some(d(2015, 6, 1)));
        assert!(summary.birthday_today);
        assert!(summary.playlists.is_empty());
    }

    #[test]
    fn summary_falls_back_to_username() {
        let data = account(json!({
            "Identity": {"displayName": "dj"},
            "Userdata": {"firstName": "Ada"}
        }));
        let summary = data.summary(&AccountKeys::default(), d(2026, 1, 1)).unwrap();
        assert_eq!(summary.user_reference.as_deref(), Some("dj"));
        assert_eq!(summary.birthday, None);
        assert!(!summary.birthday_today);
    }

    #[test]
    fn summary_rejects_malformed_birthday() {
        let data = account(json!({"Userdata": {"birthdate": "19/10/1990"}}));
        assert!(matches!(
            data.summary(&AccountKeys::default(), d(2026, 1, 1)),
            Err(StatsError::DateFormat { .. })
        ));
    }
}
