//! In-memory home-maintenance data for one session: the user, their
//! properties, and the logs and reminders attached to those properties.
//!
//! Nothing here does I/O. A `Store` is built once when a session starts
//! and handed to whatever needs it; dropping it drops the data.

use crate::{
    catalog,
    config::{
        ADDRESS_MAX_LEN, DEFAULT_PROPERTY_NAME, DEFAULT_USER_EMAIL,
        DEFAULT_USER_ID, MILESTONE_TARGET,
    },
    models::{
        MaintenanceLog, NewMaintenanceLog, NewReminder, Property, Reminder,
        SubscriptionTier, User, ValueRange,
    },
    subscription::SubscriptionPolicy,
};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Store {
    user: User,
    properties: Vec<Property>,
    logs: Vec<MaintenanceLog>,
    reminders: Vec<Reminder>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(User {
            id: DEFAULT_USER_ID.to_string(),
            email: DEFAULT_USER_EMAIL.to_string(),
            subscription_tier: SubscriptionTier::Free,
        })
    }
}

impl Store {
    /// A store for `user` with their one default property, which has no
    /// address until setup gives it one.
    pub fn new(user: User) -> Self {
        let home = Property {
            id: "property1".to_string(),
            owner_id: user.id.clone(),
            address: None,
            name: DEFAULT_PROPERTY_NAME.to_string(),
        };
        Self {
            user,
            properties: vec![home],
            logs: vec![],
            reminders: vec![],
        }
    }

    /// The default store plus a couple of logs and a reminder, so that a
    /// fresh dashboard has something on it.
    pub fn with_demo_data() -> Self {
        let mut store = Self::default();
        let home = store.default_property().id.clone();
        // These dates are constants, so they are always valid.
        let date = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
        };
        store.add_log(
            NewMaintenanceLog::catalog(&home, "task1", date(2025, 4, 15))
                .with_cost(25.0),
        );
        store.add_log(
            NewMaintenanceLog::catalog(&home, "task2", date(2025, 3, 20))
                .with_cost(0.0),
        );
        store.add_reminder(NewReminder::yearly(
            &home,
            "Replace HVAC Air Filter",
            date(2025, 7, 1),
        ));
        store
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn logs(&self) -> &[MaintenanceLog] {
        &self.logs
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn policy(&self) -> SubscriptionPolicy {
        SubscriptionPolicy::for_store(self)
    }

    pub fn can_add_log(&self) -> bool {
        self.policy().can_add_log()
    }

    pub fn can_add_reminder(&self) -> bool {
        self.policy().can_add_reminder()
    }

    pub fn upgrade_to_premium(&mut self) {
        info!(user_id = %self.user.id, "upgrading user to premium");
        self.user.subscription_tier = SubscriptionTier::Premium;
    }

    /// The primary property. Free users only ever have this one.
    pub fn default_property(&self) -> &Property {
        // There is always at least one property; `remove_property` refuses
        // to remove the last.
        &self.properties[0]
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// Returns `None` when the user's tier does not allow another property.
    pub fn create_property(
        &mut self,
        address: Option<String>,
        name: impl Into<String>,
    ) -> Option<&Property> {
        if !self.policy().can_add_property() {
            debug!(
                tier = %self.user.subscription_tier,
                count = self.properties.len(),
                "refusing to create property over quota"
            );
            return None;
        }
        let id = self.next_property_id();
        info!(%id, "creating property");
        self.properties.push(Property {
            id,
            owner_id: self.user.id.clone(),
            address,
            name: name.into(),
        });
        self.properties.last()
    }

    /// Returns `None` if there is no property with this id.
    pub fn update_property(
        &mut self,
        id: &str,
        address: Option<String>,
        name: impl Into<String>,
    ) -> Option<&Property> {
        let property = self.properties.iter_mut().find(|p| p.id == id)?;
        property.address = address;
        property.name = name.into();
        Some(&*property)
    }

    /// The last remaining property can never be removed.
    pub fn remove_property(&mut self, id: &str) -> bool {
        if self.properties.len() == 1 {
            return false;
        }
        match self.properties.iter().position(|p| p.id == id) {
            Some(idx) => {
                info!(%id, "removing property");
                self.properties.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Set the address and name of the primary property. `name` defaults to
    /// "My Home".
    pub fn update_home(
        &mut self,
        address: Option<String>,
        name: Option<&str>,
    ) -> &Property {
        let home = &mut self.properties[0];
        home.address = address;
        home.name = name.unwrap_or(DEFAULT_PROPERTY_NAME).to_string();
        home
    }

    /// What the setup form does with whatever the user typed into the
    /// address field.
    pub fn setup_home(&mut self, raw_address: &str) -> &Property {
        self.update_home(normalize_address_input(raw_address), None)
    }

    /// No quota or field checks; [`Store::log_task`] is the checked path.
    pub fn add_log(&mut self, entry: NewMaintenanceLog) -> &MaintenanceLog {
        let id = format!("log{}", self.logs.len() + 1);
        debug!(%id, property_id = %entry.property_id, "adding log");
        self.logs.push(entry.into_log(id));
        &self.logs[self.logs.len() - 1]
    }

    /// No quota or field checks; [`Store::set_reminder`] is the checked
    /// path.
    pub fn add_reminder(&mut self, entry: NewReminder) -> &Reminder {
        let id = format!("reminder{}", self.reminders.len() + 1);
        debug!(%id, property_id = %entry.property_id, "adding reminder");
        self.reminders.push(entry.into_reminder(id));
        &self.reminders[self.reminders.len() - 1]
    }

    /// Submit a log the way the log-task form does: nothing happens when
    /// the user is over quota or the entry names no task (or both kinds).
    /// `is_catalog_task` follows whether a task id was given.
    pub fn log_task(
        &mut self,
        mut entry: NewMaintenanceLog,
    ) -> Option<&MaintenanceLog> {
        if !self.can_add_log() {
            debug!(
                tier = %self.user.subscription_tier,
                count = self.logs.len(),
                "refusing to log task over quota"
            );
            return None;
        }
        if !entry.is_complete() {
            debug!("refusing to log task without exactly one task");
            return None;
        }
        entry.is_catalog_task = entry.task_id.is_some();
        Some(self.add_log(entry))
    }

    /// Submit a reminder the way the add-reminder form does: nothing happens
    /// when the user is over quota or the task is blank.
    pub fn set_reminder(&mut self, entry: NewReminder) -> Option<&Reminder> {
        if !self.can_add_reminder() {
            debug!(
                tier = %self.user.subscription_tier,
                count = self.reminders.len(),
                "refusing to set reminder over quota"
            );
            return None;
        }
        if !entry.is_complete() {
            debug!("refusing to set reminder without a task");
            return None;
        }
        Some(self.add_reminder(entry))
    }

    pub fn logs_for_property<'a>(
        &'a self,
        property_id: &'a str,
    ) -> impl Iterator<Item = &'a MaintenanceLog> + 'a {
        self.logs.iter().filter(move |l| l.property_id == property_id)
    }

    pub fn reminders_for_property<'a>(
        &'a self,
        property_id: &'a str,
    ) -> impl Iterator<Item = &'a Reminder> + 'a {
        self.reminders
            .iter()
            .filter(move |r| r.property_id == property_id)
    }

    /// Sum of the catalog value ranges over every catalog log. Custom tasks,
    /// and task ids that are not in the catalog, add nothing.
    pub fn calculate_total_value(&self) -> ValueRange {
        self.logs
            .iter()
            .filter(|log| log.is_catalog_task)
            .filter_map(|log| log.task_id.as_deref())
            .map(|task_id| {
                catalog::task_by_id(task_id)
                    .map(|task| task.value_range())
                    .unwrap_or_default()
            })
            .sum()
    }

    /// Property ids follow the collection length, skipping any that are
    /// still taken after an earlier removal.
    fn next_property_id(&self) -> String {
        let mut n = self.properties.len() + 1;
        loop {
            let id = format!("property{n}");
            if self.property(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }
}

/// Percent of the way to the value milestone, using the middle of the
/// range, floored and clamped to 0..=100.
pub fn milestone_progress(total: ValueRange) -> u8 {
    let average = (total.min + total.max) / 2.0;
    let pct = (average / MILESTONE_TARGET * 100.0).floor();
    if pct.is_nan() {
        0
    } else {
        pct.clamp(0.0, 100.0) as u8
    }
}

/// Trim, treat blank as "no address", and cap the length the way the setup
/// form's input does.
pub fn normalize_address_input(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(ADDRESS_MAX_LEN).collect())
    }
}
