use super::{
    catalog,
    config::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_ZOOM, TILE_URL_TEMPLATE},
    lookup::LookupState,
    models::{Coordinates, MaintenanceLog, Reminder, ValueRange},
    store::{milestone_progress, Store},
};
use ammonia::clean;
use std::fmt::Write;

pub trait Component {
    /// Render the component to a HTML string. By convention, the
    /// implementation should sanitize all string properties at render-time
    fn render(&self) -> String;
}

/// Greys out its children behind an upgrade prompt for free users.
pub struct PremiumFeature<'a> {
    pub children: Box<dyn Component + 'a>,
    pub is_premium: bool,
    pub blurred: bool,
    pub label: &'a str,
}
impl Component for PremiumFeature<'_> {
    fn render(&self) -> String {
        let children = self.children.render();
        if self.is_premium {
            return format!("<div>{children}</div>");
        }
        let backdrop = if self.blurred {
            "bg-white/80 backdrop-blur-[2px]"
        } else {
            "bg-white/95"
        };
        let label = clean(self.label);
        format!(
            r#"
            <div class="relative">
                <div class="absolute inset-0 z-10 flex flex-col items-center justify-center {backdrop}">
                    <p class="text-sm font-medium">{label}</p>
                    <button class="mt-2 rounded border px-2 py-1 text-sm">Upgrade</button>
                </div>
                <div class="opacity-40 pointer-events-none">
                    {children}
                </div>
            </div>
            "#
        )
    }
}

struct ValueContent {
    total: ValueRange,
}
impl Component for ValueContent {
    fn render(&self) -> String {
        let min = catalog::format_dollars(self.total.min);
        let max = catalog::format_dollars(self.total.max);
        let progress = milestone_progress(self.total);
        format!(
            r#"
            <div class="p-4 rounded-lg bg-white border shadow-sm">
                <div class="mb-4">
                    <h3 class="text-lg font-semibold">Value Added</h3>
                    <p class="text-3xl font-bold">${min} - ${max}</p>
                </div>
                <div class="flex items-center justify-between">
                    <span class="text-sm">Milestone: $10,000</span>
                    <span class="text-sm font-medium">{progress}%</span>
                </div>
                <progress class="w-full h-2" max="100" value="{progress}"></progress>
            </div>
            "#
        )
    }
}

/// Estimated value added so far, and progress toward the milestone. Value
/// tracking is a premium feature.
pub struct ValueDisplay {
    pub total: ValueRange,
    pub is_premium: bool,
}
impl Component for ValueDisplay {
    fn render(&self) -> String {
        PremiumFeature {
            children: Box::new(ValueContent { total: self.total }),
            is_premium: self.is_premium,
            blurred: true,
            label: "Unlock Value Tracking",
        }
        .render()
    }
}

pub struct SuggestionList<'a> {
    pub state: &'a LookupState,
}
impl Component for SuggestionList<'_> {
    fn render(&self) -> String {
        if self.state.loading {
            return r#"<p class="text-sm">Searching...</p>"#.to_string();
        }
        if let Some(error) = &self.state.error {
            return format!(
                r#"<p class="text-sm text-red-600">{}</p>"#,
                clean(error)
            );
        }
        if self.state.suggestions.is_empty() {
            return "".to_string();
        }
        let items = self.state.suggestions.iter().enumerate().fold(
            String::new(),
            |mut acc, (idx, s)| {
                let _ = write!(
                    acc,
                    r#"
                    <li
                        class="cursor-pointer px-2 py-1 hover:bg-gray-100"
                        data-index="{idx}"
                        data-lat="{lat}"
                        data-lon="{lon}"
                    >{label}</li>
                    "#,
                    lat = s.latitude,
                    lon = s.longitude,
                    label = clean(&s.label)
                );
                acc
            },
        );
        format!(r#"<ul class="rounded border bg-white shadow">{items}</ul>"#)
    }
}

/// The slippy-map tile containing `coordinates` at `zoom`.
pub fn tile_for(coordinates: Coordinates, zoom: u8) -> (u32, u32) {
    let n = 2f64.powi(i32::from(zoom));
    let max = n - 1.0;
    let x = ((coordinates.longitude + 180.0) / 360.0 * n).floor();
    let lat = coordinates.latitude.to_radians();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI)
        / 2.0
        * n)
        .floor();
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

pub fn tile_url(coordinates: Coordinates, zoom: u8) -> String {
    let (x, y) = tile_for(coordinates, zoom);
    TILE_URL_TEMPLATE
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

/// Static, non-interactive map preview around an address.
pub struct MiniMap<'a> {
    pub coordinates: Coordinates,
    pub label: Option<&'a str>,
    pub zoom: u8,
    pub height: u32,
}
impl<'a> MiniMap<'a> {
    pub fn new(coordinates: Coordinates, label: Option<&'a str>) -> Self {
        Self {
            coordinates,
            label,
            zoom: DEFAULT_MAP_ZOOM,
            height: DEFAULT_MAP_HEIGHT,
        }
    }
}
impl Component for MiniMap<'_> {
    fn render(&self) -> String {
        // A zero coordinate means we never got a real location.
        if self.coordinates.latitude == 0.0
            || self.coordinates.longitude == 0.0
            || !self.coordinates.is_valid()
        {
            return "".to_string();
        }
        let src = tile_url(self.coordinates, self.zoom);
        let height = self.height;
        let caption = match self.label {
            Some(label) => format!(
                r#"<figcaption class="p-1 text-xs truncate">{}</figcaption>"#,
                clean(label)
            ),
            None => "".to_string(),
        };
        format!(
            r#"
            <figure class="rounded-lg shadow border overflow-hidden" style="height: {height}px">
                <img class="w-full h-full object-cover" src="{src}" alt="Map preview" loading="lazy" />
                {caption}
            </figure>
            "#
        )
    }
}

pub struct MaintenanceLogItem<'a> {
    pub log: &'a MaintenanceLog,
    /// Value ranges are only shown to premium users.
    pub show_value: bool,
}
impl Component for MaintenanceLogItem<'_> {
    fn render(&self) -> String {
        let log = self.log;
        let task = log.task_id.as_deref().and_then(catalog::task_by_id);
        let name = match task {
            Some(task) => clean(task.name),
            None => clean(log.custom_task_label.as_deref().unwrap_or("")),
        };
        let date = log.date.format("%m/%d/%y");
        let cost = match log.cost {
            Some(cost) if cost != 0.0 => format!(
                "<span>Cost: ${}</span>",
                catalog::format_dollars(cost)
            ),
            _ => "".to_string(),
        };
        let value = if self.show_value && log.is_catalog_task {
            let text = catalog::task_value_text(log.task_id.as_deref());
            if text.is_empty() {
                text
            } else {
                format!(
                    r#"<span class="rounded border px-1 text-xs">Added {text}</span>"#
                )
            }
        } else {
            "".to_string()
        };
        format!(
            r#"
            <div class="rounded border p-4">
                <div class="flex items-center gap-2">
                    <span class="text-sm text-gray-500">{date}</span>
                    <h3 class="font-medium">{name}</h3>
                </div>
                <div class="flex items-center gap-2 text-sm">{cost}{value}</div>
            </div>
            "#
        )
    }
}

/// Everything about one logged task: what it was, when, what it cost, and
/// for catalog tasks the value it added and a tip.
pub struct TaskDetail<'a> {
    pub log: &'a MaintenanceLog,
}
impl Component for TaskDetail<'_> {
    fn render(&self) -> String {
        let log = self.log;
        let task = log.task_id.as_deref().and_then(catalog::task_by_id);
        let name = match task {
            Some(task) => clean(task.name),
            None => clean(log.custom_task_label.as_deref().unwrap_or("")),
        };
        let date = log.date.format("%B %-d, %Y");
        let value = match task {
            Some(task) => format!(
                r#"<p class="rounded border p-3 text-sm font-medium">Added ${} - ${} in home value</p>"#,
                catalog::format_dollars(task.value_range_min),
                catalog::format_dollars(task.value_range_max)
            ),
            None => "".to_string(),
        };
        let cost = match log.cost {
            Some(cost) => format!(
                r#"
                <div>
                    <p class="text-sm text-gray-500">Cost</p>
                    <p class="text-lg font-medium">${}</p>
                </div>
                "#,
                catalog::format_dollars(cost)
            ),
            None => "".to_string(),
        };
        let tip = match task {
            Some(task) => format!(
                r#"
                <div>
                    <p class="text-sm text-gray-500">Maintenance Tip</p>
                    <p>{}</p>
                </div>
                "#,
                clean(task.tip)
            ),
            None => "".to_string(),
        };
        format!(
            r#"
            <div class="rounded-lg border bg-white p-6 space-y-6">
                <div>
                    <h2 class="text-2xl font-bold">{name}</h2>
                    <p class="text-gray-500">{date}</p>
                </div>
                {value}
                {cost}
                {tip}
            </div>
            "#
        )
    }
}

pub struct ReminderItem<'a> {
    pub reminder: &'a Reminder,
}
impl Component for ReminderItem<'_> {
    fn render(&self) -> String {
        let task = clean(&self.reminder.task_label);
        let due = self.reminder.start_date.format("%m/%d/%Y");
        let frequency = self.reminder.frequency;
        format!(
            r#"
            <div class="rounded border border-l-4 p-4">
                <h3 class="font-medium">{task}</h3>
                <div class="flex items-center gap-2 text-sm text-gray-500">
                    <span>Due: {due}</span>
                    <span>{frequency}</span>
                </div>
            </div>
            "#
        )
    }
}

/// The home screen: value summary, then the history and reminders for the
/// primary property.
pub struct Dashboard<'a> {
    pub store: &'a Store,
}
impl Component for Dashboard<'_> {
    fn render(&self) -> String {
        let store = self.store;
        let home = store.default_property();
        let is_premium = store.user().is_premium();
        let address = match &home.address {
            Some(address) => {
                format!(r#"<p class="text-gray-500">{}</p>"#, clean(address))
            }
            None => "".to_string(),
        };
        let value = ValueDisplay {
            total: store.calculate_total_value(),
            is_premium,
        }
        .render();
        let logs = store
            .logs_for_property(&home.id)
            .map(|log| {
                MaintenanceLogItem {
                    log,
                    show_value: is_premium,
                }
                .render()
            })
            .collect::<Vec<String>>()
            .join("");
        let logs = if logs.is_empty() {
            r#"<p class="text-gray-500">No maintenance logs yet</p>"#.to_string()
        } else {
            logs
        };
        let reminders = store
            .reminders_for_property(&home.id)
            .map(|reminder| ReminderItem { reminder }.render())
            .collect::<Vec<String>>()
            .join("");
        let reminders = if reminders.is_empty() {
            r#"<p class="text-gray-500">No reminders set</p>"#.to_string()
        } else {
            reminders
        };
        let details = store.policy().details();
        let quota = if details.is_limited {
            format!(
                r#"<p class="text-xs">{} free logs and {} free reminders left</p>"#,
                details.logs_remaining, details.reminders_remaining
            )
        } else {
            "".to_string()
        };
        format!(
            r#"
            <main class="container px-4 py-6">
                <h1 class="text-2xl font-bold">Home Maintenance Tracker</h1>
                {address}
                {value}
                {quota}
                <h2 class="mt-6 text-lg font-medium">History</h2>
                <div class="space-y-4">{logs}</div>
                <h2 class="mt-6 text-lg font-medium">Reminders</h2>
                <div class="space-y-4">{reminders}</div>
            </main>
            "#
        )
    }
}
