use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// The address pieces a provider gave us, already pulled out of its own
/// format. Any of them may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

impl AddressParts {
    fn is_empty(&self) -> bool {
        self.street.is_none() && self.locality.is_none()
    }
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

fn tidy(part: Option<&str>) -> Option<String> {
    let part = whitespace().replace_all(part?.trim(), " ");
    (!part.is_empty()).then(|| part.into_owned())
}

/// Whether `number` shows up in `street` as a word of its own, so `12` is
/// found in `12 Elm St` but not in `Route 120`.
fn street_has_number(street: &str, number: &str) -> bool {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(number)))
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(street))
        .unwrap_or(false)
}

/// Build a label like `12 Elm St, Springfield, IL 62704` from structured
/// parts, falling back to the provider's own display string when there is
/// no street or locality to work with. A part that repeats a whole earlier
/// segment is skipped, so `New York, New York` comes out as `New York`,
/// while `Springfield` still follows `Springfield Avenue`.
pub fn compose_label(
    parts: &AddressParts,
    display_name: Option<&str>,
) -> Option<String> {
    if parts.is_empty() {
        return tidy(display_name);
    }

    let mut segments: Vec<String> = vec![];
    let repeats = |segments: &[String], part: &str| {
        let part = part.to_lowercase();
        segments.iter().any(|s| s.to_lowercase() == part)
    };

    let street = tidy(parts.street.as_deref());
    let house_number = tidy(parts.house_number.as_deref());
    if let Some(street) = street {
        segments.push(match house_number {
            Some(n) if !street_has_number(&street, &n) => format!("{n} {street}"),
            _ => street,
        });
    }

    if let Some(locality) = tidy(parts.locality.as_deref()) {
        if !repeats(&segments, &locality) {
            segments.push(locality);
        }
    }

    let region: Vec<String> = [parts.state.as_deref(), parts.postcode.as_deref()]
        .into_iter()
        .filter_map(tidy)
        .filter(|part| !repeats(&segments, part))
        .collect();
    if !region.is_empty() {
        segments.push(region.join(" "));
    }

    if segments.is_empty() {
        tidy(display_name)
    } else {
        Some(segments.join(", "))
    }
}
