//! Static per-kind operation metadata.
//!
//! One entry per wire-level operation the frontend can issue. The table
//! drives both engines: `requires_profile` decides whether a request must
//! name a profile (equivalently, whether it touches the filter at all), and
//! `match_arity` is present exactly for the mutating kinds, giving the
//! number of leading arguments that identify "the same logical setting" for
//! change-log compaction. Every mutating kind takes `match_arity + 1`
//! arguments, the last one being the value.

use thiserror::Error;

use lootfilter_changelog::KindArity;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),
}

/// Metadata for one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub requires_profile: bool,
    /// `Some(n)` iff the operation mutates the filter.
    pub match_arity: Option<usize>,
}

impl OpInfo {
    pub fn is_mutating(&self) -> bool {
        self.match_arity.is_some()
    }
}

/// Kind that replays the whole change log against a freshly fetched filter.
pub const REPLAY_ALL: &str = "import_downloaded_filter";

/// Kind that runs every call listed in the request input file.
pub const RUN_BATCH: &str = "run_batch";

const fn query(requires_profile: bool) -> OpInfo {
    OpInfo {
        requires_profile,
        match_arity: None,
    }
}

const fn mutator(match_arity: usize) -> OpInfo {
    OpInfo {
        requires_profile: true,
        match_arity: Some(match_arity),
    }
}

static OPERATIONS: &[(&str, OpInfo)] = &[
    // Profiles
    ("is_first_launch", query(false)),
    ("get_all_profile_names", query(false)),
    ("create_new_profile", query(false)),
    ("set_active_profile", query(false)),
    // General
    (REPLAY_ALL, query(true)),
    (RUN_BATCH, query(true)),
    ("get_rule_matching_item", query(true)),
    ("set_rule_visibility", mutator(2)),
    // Currency
    ("set_currency_to_tier", mutator(1)),
    ("get_tier_of_currency", query(true)),
    ("get_all_currency_tiers", query(true)),
    ("set_currency_tier_min_visible_stack_size", mutator(1)),
    ("get_currency_tier_min_visible_stack_size", query(true)),
    // Archnemesis
    ("set_archnemesis_mod_tier", mutator(1)),
    ("get_all_archnemesis_mod_tiers", query(true)),
    // Essences
    ("get_all_essence_tier_visibilities", query(true)),
    ("set_hide_essences_above_tier", mutator(0)),
    ("get_hide_essences_above_tier", query(true)),
    // Divination cards
    ("get_all_div_card_tier_visibilities", query(true)),
    ("set_hide_div_cards_above_tier", mutator(0)),
    ("get_hide_div_cards_above_tier", query(true)),
    // Unique items
    ("get_all_unique_item_tier_visibilities", query(true)),
    ("set_hide_unique_items_above_tier", mutator(0)),
    ("get_hide_unique_items_above_tier", query(true)),
    // Unique maps
    ("get_all_unique_map_tier_visibilities", query(true)),
    ("set_hide_unique_maps_above_tier", mutator(0)),
    ("get_hide_unique_maps_above_tier", query(true)),
    // Blight oils
    ("set_lowest_visible_oil", mutator(0)),
    ("get_lowest_visible_oil", query(true)),
    // Gem and flask quality
    ("set_gem_min_quality", mutator(0)),
    ("get_gem_min_quality", query(true)),
    ("set_flask_min_quality", mutator(0)),
    ("get_flask_min_quality", query(true)),
    // Maps
    ("set_hide_maps_below_tier", mutator(0)),
    ("get_hide_maps_below_tier", query(true)),
    // Flask types
    ("set_flask_visibility", mutator(1)),
    ("set_high_ilvl_flask_visibility", mutator(1)),
    ("get_flask_visibility", query(true)),
    ("get_all_flask_visibilities", query(true)),
    // RGB items
    ("set_rgb_item_max_size", mutator(0)),
    ("get_rgb_item_max_size", query(true)),
    // Chaos recipe
    ("set_chaos_recipe_enabled_for", mutator(1)),
    ("is_chaos_recipe_enabled_for", query(true)),
    ("get_all_chaos_recipe_statuses", query(true)),
];

/// Looks up the metadata for a kind.
pub fn lookup(kind: &str) -> Result<OpInfo, RegistryError> {
    OPERATIONS
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, info)| *info)
        .ok_or_else(|| RegistryError::UnknownOperation(kind.to_string()))
}

/// Arity source backed by the static table, for the change-log crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registry;

impl KindArity for Registry {
    fn match_arity(&self, kind: &str) -> Option<usize> {
        lookup(kind).ok().and_then(|info| info.match_arity)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
