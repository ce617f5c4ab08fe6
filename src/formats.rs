//! Serde helpers for the calendar types exchanged over the API.
//!
//! Dates travel as `YYYY-MM-DD`, times of day as `HH:MM:SS` (`HH:MM` is
//! accepted on input).

pub mod iso_date {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
        Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
    }

    pub fn format(date: &Date) -> Result<String, time::error::Format> {
        date.format(format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(date).map_err(S::Error::custom)?)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
            use serde::de::Error as _;
            Option::<String>::deserialize(d)?
                .map(|raw| super::parse(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}

pub mod clock_time {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Time};

    pub fn parse(raw: &str) -> Result<Time, time::error::Parse> {
        let raw = raw.trim();
        Time::parse(raw, format_description!("[hour]:[minute]:[second]"))
            .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]")))
    }

    pub fn format(t: &Time) -> Result<String, time::error::Format> {
        t.format(format_description!("[hour]:[minute]:[second]"))
    }

    pub fn serialize<S: Serializer>(t: &Time, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(t).map_err(S::Error::custom)?)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Time;

        pub fn serialize<S: Serializer>(t: &Option<Time>, s: S) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => super::serialize(t, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Time>, D::Error> {
            use serde::de::Error as _;
            Option::<String>::deserialize(d)?
                .map(|raw| super::parse(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn clock_time_accepts_short_and_long_forms() {
        assert_eq!(clock_time::parse("15:30:00").unwrap(), time!(15:30));
        assert_eq!(clock_time::parse("09:05").unwrap(), time!(9:05));
        assert!(clock_time::parse("25:00").is_err());
        assert!(clock_time::parse("noon").is_err());
    }

    #[test]
    fn clock_time_formats_with_seconds() {
        assert_eq!(clock_time::format(&time!(9:05)).unwrap(), "09:05:00");
    }

    #[test]
    fn iso_date_parses_and_formats() {
        let d = iso_date::parse("2025-12-16").unwrap();
        assert_eq!(d, date!(2025 - 12 - 16));
        assert_eq!(iso_date::format(&d).unwrap(), "2025-12-16");
        assert!(iso_date::parse("16/12/2025").is_err());
        assert!(iso_date::parse("2025-02-30").is_err());
    }
}
