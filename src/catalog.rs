//! The preloaded maintenance task catalog. Values are estimates of the home
//! value each task adds, in dollars.

use crate::models::CatalogTask;

pub static MAINTENANCE_TASKS: [CatalogTask; 10] = [
    CatalogTask {
        id: "task1",
        name: "Replace HVAC Air Filter",
        value_range_min: 100.0,
        value_range_max: 200.0,
        tip: "For optimal performance, use a high-quality filter rated MERV 11 or higher.",
    },
    CatalogTask {
        id: "task2",
        name: "Clean Gutters",
        value_range_min: 200.0,
        value_range_max: 500.0,
        tip: "Install gutter guards to reduce the frequency of cleaning needed.",
    },
    CatalogTask {
        id: "task3",
        name: "Seal Deck",
        value_range_min: 500.0,
        value_range_max: 1000.0,
        tip: "Apply sealer on a dry day when temperatures are between 50-90°F.",
    },
    CatalogTask {
        id: "task4",
        name: "Repaint Exterior",
        value_range_min: 2000.0,
        value_range_max: 5000.0,
        tip: "Choose quality paint with high UV resistance for longer-lasting results.",
    },
    CatalogTask {
        id: "task5",
        name: "Service HVAC System",
        value_range_min: 300.0,
        value_range_max: 700.0,
        tip: "Regular maintenance can extend your system's life by 5+ years.",
    },
    CatalogTask {
        id: "task6",
        name: "Fix Plumbing Leak",
        value_range_min: 150.0,
        value_range_max: 400.0,
        tip: "Check under sinks monthly for early detection of slow leaks.",
    },
    CatalogTask {
        id: "task7",
        name: "Replace Water Heater",
        value_range_min: 800.0,
        value_range_max: 1500.0,
        tip: "Consider a tankless model for better efficiency and longer lifespan.",
    },
    CatalogTask {
        id: "task8",
        name: "Update Kitchen Faucet",
        value_range_min: 200.0,
        value_range_max: 600.0,
        tip: "Look for touchless features for better hygiene and convenience.",
    },
    CatalogTask {
        id: "task9",
        name: "Replace Dishwasher",
        value_range_min: 500.0,
        value_range_max: 1200.0,
        tip: "Energy Star models can save you $35+ per year on utility bills.",
    },
    CatalogTask {
        id: "task10",
        name: "Install Smart Thermostat",
        value_range_min: 200.0,
        value_range_max: 500.0,
        tip: "Can save up to 10-15% on heating and cooling costs annually.",
    },
];

pub fn task_by_id(id: &str) -> Option<&'static CatalogTask> {
    MAINTENANCE_TASKS.iter().find(|t| t.id == id)
}

/// e.g, `$2,000-$5,000`. Empty when there is no task id, or it is not in
/// the catalog.
pub fn task_value_text(task_id: Option<&str>) -> String {
    match task_id.and_then(task_by_id) {
        Some(task) => format!(
            "${}-${}",
            format_dollars(task.value_range_min),
            format_dollars(task.value_range_max)
        ),
        None => "".to_string(),
    }
}

/// Group the whole-dollar part with commas; keep cents only when there are
/// some.
pub fn format_dollars(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}
