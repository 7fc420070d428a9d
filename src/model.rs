use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Authenticated identity as returned by the backend and kept in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// A user together with the bearer credential that authenticates them.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Online,
    Offline,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Online => "online",
            Mode::Offline => "offline",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Mode::Online),
            "offline" => Ok(Mode::Offline),
            other => Err(format!("unknown mode '{}': expected online or offline", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(Language::English),
            "hindi" => Ok(Language::Hindi),
            "marathi" => Ok(Language::Marathi),
            other => Err(format!(
                "unknown language '{}': expected English, Hindi or Marathi",
                other
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course offering as seen by the client. `id` always holds the backend's
/// native identifier; see [`WireBatch`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub duration: String,
    pub mode: Mode,
    pub price: f64,
    pub thumbnail_url: String,
    pub total_slots: u32,
    pub filled_slots: u32,
    pub language: Language,
    pub registered_user_ids: Vec<String>,
}

impl Batch {
    pub fn is_full(&self) -> bool {
        self.filled_slots >= self.total_slots
    }

    /// Enrolling is offered exactly while seats remain.
    pub fn can_enroll(&self) -> bool {
        !self.is_full()
    }

    pub fn seats_left(&self) -> u32 {
        self.total_slots.saturating_sub(self.filled_slots)
    }

    /// Enrollment progress in `0.0..=1.0`; a batch with no capacity reads as full.
    pub fn fill_ratio(&self) -> f64 {
        if self.total_slots == 0 {
            return 1.0;
        }
        f64::from(self.filled_slots) / f64::from(self.total_slots)
    }

    /// Calendar day of `start_date`; the backend may send a full timestamp.
    pub fn start_day(&self) -> Option<NaiveDate> {
        parse_day(&self.start_date)
    }
}

pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Batch record exactly as the backend serializes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBatch {
    #[serde(rename = "_id")]
    pub backend_id: String,
    pub batch_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mode: Mode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_slots: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filled_slots: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: Language,
    #[serde(default, deserialize_with = "null_as_default")]
    pub registered_users: Vec<String>,
}

impl WireBatch {
    /// Copy the backend identifier into `id` and enforce the slot invariant.
    pub fn normalize(self) -> Batch {
        let filled_slots = if self.filled_slots > self.total_slots {
            warn!(
                id = %self.backend_id,
                filled = self.filled_slots,
                total = self.total_slots,
                "backend reported more filled slots than capacity; clamping"
            );
            self.total_slots
        } else {
            self.filled_slots
        };
        Batch {
            id: self.backend_id,
            name: self.batch_name,
            description: self.description,
            start_date: self.start_date,
            duration: self.duration,
            mode: self.mode,
            price: self.price,
            thumbnail_url: self.thumbnail,
            total_slots: self.total_slots,
            filled_slots,
            language: self.language,
            registered_user_ids: self.registered_users,
        }
    }
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

/// Local record of a learner's enrollment. The backend exposes no endpoint
/// for these, so they are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub batch_id: String,
    pub enrollment_date: DateTime<Utc>,
    pub status: EnrollmentStatus,
}

impl Enrollment {
    pub fn new_active(user_id: &str, batch_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            batch_id: batch_id.to_string(),
            enrollment_date: Utc::now(),
            status: EnrollmentStatus::Active,
        }
    }
}
