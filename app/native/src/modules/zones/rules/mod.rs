//! Rule store: zone definitions and process → zone routing rules.
//!
//! # Rule Model
//!
//! Every rule is a [`RoutingRule`] `{process_name, title_filter, zone_id}`.
//! A rule without a title filter matches every window of the process; a rule
//! with a filter only matches windows whose title contains it.
//!
//! # Matching Behavior
//!
//! - `process_name`: case-insensitive exact match
//! - `title_filter`: case-insensitive substring match, ignored when empty
//! - A matching title-refined rule wins over a process-only rule
//!
//! # Examples
//!
//! ```text
//! // Rule: process = "notepad"
//! // Matches: every Notepad window
//!
//! // Rule: process = "chrome", title = "YouTube"
//! // Matches: Chrome windows with "youtube" anywhere in the title
//! ```

use crate::config::{TitleRule, ZoneDefinition, default_zone_name};

/// A single routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    /// Process name as configured (original casing kept for persistence).
    pub process_name: String,

    /// Optional title substring.
    pub title_filter: Option<String>,

    /// Target zone.
    pub zone_id: u32,

    // Cached lowercase versions for fast matching
    process_lower: String,
    title_lower: Option<String>,
}

impl RoutingRule {
    /// Create a rule. An empty or whitespace-only filter means "any title".
    #[must_use]
    pub fn new(process_name: impl Into<String>, title_filter: Option<&str>, zone_id: u32) -> Self {
        let process_name = process_name.into();
        let title_filter = title_filter
            .map(str::trim)
            .filter(|filter| !filter.is_empty())
            .map(str::to_string);
        Self {
            process_lower: process_name.to_lowercase(),
            title_lower: title_filter.as_ref().map(|t| t.to_lowercase()),
            process_name,
            title_filter,
            zone_id,
        }
    }

    /// Returns true if the rule is refined by a title filter.
    #[must_use]
    pub const fn has_title_filter(&self) -> bool { self.title_filter.is_some() }

    /// Returns true if the rule is for `process_name` (case-insensitive).
    #[must_use]
    pub fn is_for_process(&self, process_name: &str) -> bool {
        self.process_lower == process_name.to_lowercase()
    }

    /// Checks the rule against a window's process name and optional title.
    ///
    /// A title-refined rule never matches when no title is given.
    #[must_use]
    pub fn matches(&self, process_name: &str, title: Option<&str>) -> bool {
        if !self.is_for_process(process_name) {
            return false;
        }
        match (&self.title_lower, title) {
            (None, _) => true,
            (Some(filter), Some(title)) => title.to_lowercase().contains(filter.as_str()),
            (Some(_), None) => false,
        }
    }
}

/// A zone's persisted identity, independent of its current rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLabel {
    pub zone_id: u32,
    pub display_name: String,
}

/// Zone definitions and routing rules.
///
/// State is private; every mutation goes through the update operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    zones: Vec<ZoneLabel>,
    rules: Vec<RoutingRule>,
}

impl RuleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Build a store from persisted definitions and title rules.
    ///
    /// Duplicate process names across zones are resolved in favor of the
    /// lowest zone id so the one-zone-per-process invariant holds on load.
    #[must_use]
    pub fn from_config(definitions: &[ZoneDefinition], title_rules: &[TitleRule]) -> Self {
        let mut store = Self::new();

        let mut sorted: Vec<&ZoneDefinition> = definitions.iter().collect();
        sorted.sort_by_key(|def| def.zone_id);
        for def in sorted {
            if store.zones.iter().any(|zone| zone.zone_id == def.zone_id) {
                tracing::warn!(zone_id = def.zone_id, "rules: duplicate zone definition ignored");
                continue;
            }
            store.zones.push(ZoneLabel {
                zone_id: def.zone_id,
                display_name: def.display_name.clone(),
            });
            for process in &def.process_names {
                if store.find_zone_for_process(process, None).is_some() {
                    tracing::warn!(
                        process = %process,
                        zone_id = def.zone_id,
                        "rules: process already bound to another zone, ignoring"
                    );
                    continue;
                }
                store.rules.push(RoutingRule::new(process.clone(), None, def.zone_id));
            }
        }

        for rule in title_rules {
            if rule.title_contains.trim().is_empty() {
                store.assign_process_to_zone(&rule.process_name, rule.zone_id);
            } else {
                store.push_title_rule(RoutingRule::new(
                    rule.process_name.trim(),
                    Some(&rule.title_contains),
                    rule.zone_id,
                ));
            }
        }
        store
    }

    /// Convert back to the persisted shape.
    ///
    /// Process-only rules become their zone's `process_names`; title-refined
    /// rules are returned separately.
    #[must_use]
    pub fn to_config(&self) -> (Vec<ZoneDefinition>, Vec<TitleRule>) {
        let definitions = self
            .zones
            .iter()
            .map(|zone| ZoneDefinition {
                zone_id: zone.zone_id,
                display_name: zone.display_name.clone(),
                process_names: self
                    .rules
                    .iter()
                    .filter(|rule| rule.zone_id == zone.zone_id && !rule.has_title_filter())
                    .map(|rule| rule.process_name.clone())
                    .collect(),
            })
            .collect();

        let title_rules = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.title_filter.as_ref().map(|filter| TitleRule {
                    process_name: rule.process_name.clone(),
                    title_contains: filter.clone(),
                    zone_id: rule.zone_id,
                })
            })
            .collect();

        (definitions, title_rules)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Finds the zone for a window.
    ///
    /// Title-refined rules are checked first, then process-only rules. Within
    /// each group the first rule in insertion order wins.
    #[must_use]
    pub fn find_zone_for_process(&self, process_name: &str, title: Option<&str>) -> Option<u32> {
        self.rules
            .iter()
            .filter(|rule| rule.has_title_filter())
            .chain(self.rules.iter().filter(|rule| !rule.has_title_filter()))
            .find(|rule| rule.matches(process_name, title))
            .map(|rule| rule.zone_id)
    }

    /// All rules in insertion order.
    #[must_use]
    pub fn rules(&self) -> &[RoutingRule] { &self.rules }

    /// All zone definitions, sorted by id.
    #[must_use]
    pub fn definitions(&self) -> &[ZoneLabel] { &self.zones }

    /// Returns true if a definition exists for `zone_id`.
    #[must_use]
    pub fn has_zone(&self, zone_id: u32) -> bool { self.zones.iter().any(|z| z.zone_id == zone_id) }

    /// Display name for a zone, falling back to `Zone {id}`.
    #[must_use]
    pub fn display_name(&self, zone_id: u32) -> String {
        self.zones
            .iter()
            .find(|zone| zone.zone_id == zone_id)
            .map_or_else(|| default_zone_name(zone_id), |zone| zone.display_name.clone())
    }

    /// Process names routed into `zone_id` without a title filter.
    #[must_use]
    pub fn processes_for_zone(&self, zone_id: u32) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.zone_id == zone_id && !rule.has_title_filter())
            .map(|rule| rule.process_name.as_str())
            .collect()
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Binds `process_name` to `zone_id`.
    ///
    /// Every existing rule for the process is removed first, in every zone,
    /// including title-refined ones. The new rule is only added if `zone_id`
    /// has a definition. Returns `true` if the new binding was added.
    pub fn assign_process_to_zone(&mut self, process_name: &str, zone_id: u32) -> bool {
        let process_name = process_name.trim();
        if process_name.is_empty() {
            return false;
        }

        self.remove_process(process_name);

        if !self.has_zone(zone_id) {
            tracing::debug!(
                process = %process_name,
                zone_id,
                "rules: target zone has no definition, binding dropped"
            );
            return false;
        }

        self.rules.push(RoutingRule::new(process_name, None, zone_id));
        tracing::debug!(process = %process_name, zone_id, "rules: process bound to zone");
        true
    }

    /// Adds a title-refined rule, replacing one with the same process and filter.
    ///
    /// An empty filter is the same as [`Self::assign_process_to_zone`]. Like
    /// it, a zone without a definition is rejected.
    pub fn add_title_rule(&mut self, process_name: &str, title_filter: &str, zone_id: u32) -> bool {
        let rule = RoutingRule::new(process_name.trim(), Some(title_filter), zone_id);
        if !rule.has_title_filter() {
            return self.assign_process_to_zone(process_name, zone_id);
        }
        if !self.has_zone(zone_id) {
            tracing::debug!(
                process = %rule.process_name,
                zone_id,
                "rules: target zone has no definition, title rule dropped"
            );
            return false;
        }
        self.push_title_rule(rule)
    }

    /// Stores a titled rule, replacing one with the same process and filter.
    fn push_title_rule(&mut self, rule: RoutingRule) -> bool {
        if rule.process_name.is_empty() {
            return false;
        }
        self.rules.retain(|existing| {
            !(existing.process_lower == rule.process_lower && existing.title_lower == rule.title_lower)
        });
        self.rules.push(rule);
        true
    }

    /// Removes every rule for `process_name`. Returns `true` if any was removed.
    pub fn remove_process(&mut self, process_name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| !rule.is_for_process(process_name));
        self.rules.len() != before
    }

    /// Renames a zone. Blank names are rejected.
    pub fn rename_zone(&mut self, zone_id: u32, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.zones.iter_mut().find(|zone| zone.zone_id == zone_id) {
            Some(zone) => {
                zone.display_name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Adds default definitions for zone ids `1..=zone_count` that lack one.
    ///
    /// Existing definitions are never removed, even if the layout no longer
    /// produces their id. Returns the number of definitions added.
    pub fn ensure_zones(&mut self, zone_count: usize) -> usize {
        let total = u32::try_from(zone_count.max(1)).unwrap_or(u32::MAX);
        let mut added = 0;
        for zone_id in 1..=total {
            if !self.has_zone(zone_id) {
                self.zones.push(ZoneLabel {
                    zone_id,
                    display_name: default_zone_name(zone_id),
                });
                added += 1;
            }
        }
        self.zones.sort_by_key(|zone| zone.zone_id);
        added
    }
}
