//! Item catalog for rewards and curse consumables.
//!
//! Loot tiers roll 60% common / 25% uncommon / 15% rare.

use phf::phf_map;
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    /// Curse consumables, never rolled as loot
    Special,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemInfo {
    pub display_name: &'static str,
    pub rarity: Rarity,
    pub lore: &'static [&'static str],
}

impl ItemInfo {
    const fn new(display_name: &'static str, rarity: Rarity, lore: &'static [&'static str]) -> Self {
        Self {
            display_name,
            rarity,
            lore,
        }
    }
}

pub const ANTIDOTE: &str = "curse_antidote";
pub const UNDO_POTION: &str = "undo_potion";
pub const CURSE_TRIGGER: &str = "curse_trigger";
pub const CURSED_BOOK: &str = "cursed_book";

pub static ITEMS: phf::Map<&'static str, ItemInfo> = phf_map! {
    // Common
    "bread" => ItemInfo::new("Bread", Rarity::Common, &[]),
    "cooked_beef" => ItemInfo::new("Steak", Rarity::Common, &[]),
    "golden_apple" => ItemInfo::new("Golden Apple", Rarity::Common, &[]),
    // Uncommon
    "enchanted_book" => ItemInfo::new("Enchanted Book", Rarity::Uncommon, &[]),
    "diamond" => ItemInfo::new("Diamond", Rarity::Uncommon, &[]),
    "iron_ingot" => ItemInfo::new("Iron Ingot", Rarity::Uncommon, &[]),
    // Rare
    "totem_of_undying" => ItemInfo::new("Totem of Undying", Rarity::Rare, &[]),
    "netherite_ingot" => ItemInfo::new("Netherite Ingot", Rarity::Rare, &[]),
    "dragon_egg" => ItemInfo::new("Dragon Egg", Rarity::Rare, &[]),
    // Curse consumables
    "curse_antidote" => ItemInfo::new(
        "Curse Antidote",
        Rarity::Special,
        &["Ends the current curse", "Use wisely!"],
    ),
    "undo_potion" => ItemInfo::new(
        "Undo Potion",
        Rarity::Special,
        &["Reverses damage from last round", "Very rare!"],
    ),
    "curse_trigger" => ItemInfo::new(
        "Curse Trigger",
        Rarity::Special,
        &["Drink at night to start The Curse", "Beware the undead plague!"],
    ),
    "cursed_book" => ItemInfo::new(
        "ZP25",
        Rarity::Special,
        &["A tome bound in rotting leather", "Whoever holds it at night invites the plague"],
    ),
};

const COMMON_LOOT: &[&str] = &["bread", "cooked_beef", "golden_apple"];
const UNCOMMON_LOOT: &[&str] = &["enchanted_book", "diamond", "iron_ingot"];
const RARE_LOOT: &[&str] = &["totem_of_undying", "netherite_ingot", "dragon_egg"];

pub fn lookup(key: &str) -> Option<&'static ItemInfo> {
    ITEMS.get(key)
}

pub fn display_name(key: &str) -> &str {
    ITEMS.get(key).map(|info| info.display_name).unwrap_or(key)
}

/// Pick a loot tier from a uniform roll in `[0, 1)`.
pub fn rarity_for_roll(roll: f64) -> Rarity {
    if roll < 0.6 {
        Rarity::Common
    } else if roll < 0.85 {
        Rarity::Uncommon
    } else {
        Rarity::Rare
    }
}

fn table(rarity: Rarity) -> &'static [&'static str] {
    match rarity {
        Rarity::Common => COMMON_LOOT,
        Rarity::Uncommon => UNCOMMON_LOOT,
        Rarity::Rare | Rarity::Special => RARE_LOOT,
    }
}

/// Draw one loot item key.
pub fn roll_loot<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let rarity = rarity_for_roll(rng.r#gen::<f64>());
    table(rarity).choose(rng).copied().unwrap_or("bread")
}

// ─────────────────────────────────────────────────────────────────────────────
// Consumable Classification
// ─────────────────────────────────────────────────────────────────────────────

/// What a consumed item means to the curse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Trigger,
    Antidote,
    Undo,
    Other,
}

impl ItemKind {
    /// Classify a consumed potion by display name and bad-omen effect.
    /// Trigger wins over the other names.
    pub fn classify(display_name: &str, has_bad_omen: bool) -> Self {
        if display_name.contains("Bad Omen") || display_name.contains("Curse Trigger") || has_bad_omen {
            ItemKind::Trigger
        } else if display_name.contains("Curse Antidote") {
            ItemKind::Antidote
        } else if display_name.contains("Undo Potion") {
            ItemKind::Undo
        } else {
            ItemKind::Other
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            CURSE_TRIGGER => ItemKind::Trigger,
            ANTIDOTE => ItemKind::Antidote,
            UNDO_POTION => ItemKind::Undo,
            _ => ItemKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rarity_thresholds() {
        assert_eq!(rarity_for_roll(0.0), Rarity::Common);
        assert_eq!(rarity_for_roll(0.599), Rarity::Common);
        assert_eq!(rarity_for_roll(0.6), Rarity::Uncommon);
        assert_eq!(rarity_for_roll(0.849), Rarity::Uncommon);
        assert_eq!(rarity_for_roll(0.85), Rarity::Rare);
    }

    #[test]
    fn rolled_loot_is_always_in_the_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let key = roll_loot(&mut rng);
            let info = lookup(key).expect("loot key in catalog");
            assert_ne!(info.rarity, Rarity::Special);
        }
    }

    #[test]
    fn classify_prefers_trigger() {
        assert_eq!(ItemKind::classify("Curse Trigger", false), ItemKind::Trigger);
        assert_eq!(ItemKind::classify("Potion of Bad Omen", false), ItemKind::Trigger);
        assert_eq!(ItemKind::classify("Curse Antidote", true), ItemKind::Trigger);
        assert_eq!(ItemKind::classify("Curse Antidote", false), ItemKind::Antidote);
        assert_eq!(ItemKind::classify("Undo Potion", false), ItemKind::Undo);
        assert_eq!(ItemKind::classify("Water Bottle", false), ItemKind::Other);
    }

    #[test]
    fn special_items_have_lore() {
        assert_eq!(display_name(CURSED_BOOK), "ZP25");
        assert_eq!(lookup(ANTIDOTE).map(|i| i.lore.len()), Some(2));
        assert_eq!(display_name("unknown_thing"), "unknown_thing");
    }
}
