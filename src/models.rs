use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SubscriptionTier::Free => "Free",
                SubscriptionTier::Premium => "Premium",
            }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub subscription_tier: SubscriptionTier,
}

impl User {
    pub fn is_premium(&self) -> bool {
        self.subscription_tier == SubscriptionTier::Premium
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub address: Option<String>,
    pub name: String,
}

/// A logged piece of maintenance work. Either `task_id` points into the
/// catalog (and `is_catalog_task` is set), or `custom_task_label` holds
/// whatever the user typed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: String,
    pub property_id: String,
    pub task_id: Option<String>,
    pub custom_task_label: Option<String>,
    pub date: NaiveDate,
    pub cost: Option<f64>,
    pub photo_ref: Option<String>,
    pub is_catalog_task: bool,
}

/// A [`MaintenanceLog`] that has not been given an id yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceLog {
    pub property_id: String,
    pub task_id: Option<String>,
    pub custom_task_label: Option<String>,
    pub date: NaiveDate,
    pub cost: Option<f64>,
    pub photo_ref: Option<String>,
    pub is_catalog_task: bool,
}

impl NewMaintenanceLog {
    pub fn catalog(
        property_id: impl Into<String>,
        task_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            task_id: Some(task_id.into()),
            custom_task_label: None,
            date,
            cost: None,
            photo_ref: None,
            is_catalog_task: true,
        }
    }

    pub fn custom(
        property_id: impl Into<String>,
        label: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            task_id: None,
            custom_task_label: Some(label.into()),
            date,
            cost: None,
            photo_ref: None,
            is_catalog_task: false,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Exactly one of a catalog task id or a non-blank custom label.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| {
            v.as_deref().is_some_and(|v| !v.trim().is_empty())
        };
        filled(&self.task_id) != filled(&self.custom_task_label)
    }

    pub(crate) fn into_log(self, id: String) -> MaintenanceLog {
        MaintenanceLog {
            id,
            property_id: self.property_id,
            task_id: self.task_id,
            custom_task_label: self.custom_task_label,
            date: self.date,
            cost: self.cost,
            photo_ref: self.photo_ref,
            is_catalog_task: self.is_catalog_task,
        }
    }
}

/// Only yearly reminders exist so far.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Yearly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Yearly => write!(f, "Yearly"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub property_id: String,
    pub task_label: String,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewReminder {
    pub property_id: String,
    pub task_label: String,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
}

impl NewReminder {
    pub fn yearly(
        property_id: impl Into<String>,
        task_label: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            task_label: task_label.into(),
            start_date,
            frequency: Frequency::Yearly,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.task_label.trim().is_empty()
    }

    pub(crate) fn into_reminder(self, id: String) -> Reminder {
        Reminder {
            id,
            property_id: self.property_id,
            task_label: self.task_label,
            start_date: self.start_date,
            frequency: self.frequency,
        }
    }
}

/// Preloaded maintenance task with the home value it is estimated to add.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogTask {
    pub id: &'static str,
    pub name: &'static str,
    pub value_range_min: f64,
    pub value_range_max: f64,
    pub tip: &'static str,
}

impl CatalogTask {
    pub fn value_range(&self) -> ValueRange {
        ValueRange {
            min: self.value_range_min,
            max: self.value_range_max,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl std::ops::Add for ValueRange {
    type Output = ValueRange;
    fn add(self, rhs: Self) -> Self::Output {
        ValueRange {
            min: self.min + rhs.min,
            max: self.max + rhs.max,
        }
    }
}

impl std::iter::Sum for ValueRange {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ValueRange::default(), |acc, v| acc + v)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Both parts are finite and inside the usual WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Normalized address candidate. `raw_source` is whatever the provider sent
/// for this record, kept around for callers that want more detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub raw_source: serde_json::Value,
}

impl Suggestion {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
