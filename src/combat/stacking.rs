//! Stat stacking: `base × (1 + modifier) + flat` per stat.
//!
//! Modifier contributions are stored as fractions; [StatContribution::percent]
//! converts from the percent units used everywhere else.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadoutStat {
    Attack,
    DamageBonus,
    CritDamage,
    DefenseIgnore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackCategory {
    Base,
    Modifier,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatContribution {
    pub stat: LoadoutStat,
    pub category: StackCategory,
    pub value: f64,
    /// Where the value came from (e.g. "weapon", "role").
    pub source: &'static str,
}

impl StatContribution {
    pub fn base(stat: LoadoutStat, value: f64, source: &'static str) -> Self {
        Self {
            stat,
            category: StackCategory::Base,
            value,
            source,
        }
    }

    /// Percentage modifier, e.g. `percent(Attack, 15.0, ..)` for +15%.
    pub fn percent(stat: LoadoutStat, pct: f64, source: &'static str) -> Self {
        Self {
            stat,
            category: StackCategory::Modifier,
            value: pct * 0.01,
            source,
        }
    }

    pub fn flat(stat: LoadoutStat, value: f64, source: &'static str) -> Self {
        Self {
            stat,
            category: StackCategory::Flat,
            value,
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub base: f64,
    pub modifier: f64,
    pub flat: f64,
}

impl CategoryTotals {
    pub fn apply(&mut self, category: StackCategory, value: f64) {
        match category {
            StackCategory::Base => self.base += value,
            StackCategory::Modifier => self.modifier += value,
            StackCategory::Flat => self.flat += value,
        }
    }

    pub fn compose(self) -> f64 {
        self.base * (1.0 + self.modifier) + self.flat
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatStacking {
    totals: BTreeMap<LoadoutStat, CategoryTotals>,
    contributions: Vec<StatContribution>,
}

impl StatStacking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, contribution: StatContribution) {
        self.totals
            .entry(contribution.stat)
            .or_default()
            .apply(contribution.category, contribution.value);
        self.contributions.push(contribution);
    }

    pub fn add_many<I>(&mut self, contributions: I)
    where
        I: IntoIterator<Item = StatContribution>,
    {
        for contribution in contributions {
            self.add(contribution);
        }
    }

    pub fn totals_for(&self, stat: LoadoutStat) -> CategoryTotals {
        self.totals.get(&stat).copied().unwrap_or_default()
    }

    /// Composed value for `stat`; 0 when nothing contributed to it.
    pub fn composed(&self, stat: LoadoutStat) -> f64 {
        self.totals_for(stat).compose()
    }

    pub fn contributions(&self) -> &[StatContribution] {
        &self.contributions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_modifier_flat_compose() {
        let mut stacking = StatStacking::new();
        stacking.add_many([
            StatContribution::base(LoadoutStat::Attack, 1000.0, "doll"),
            StatContribution::base(LoadoutStat::Attack, 300.0, "weapon"),
            StatContribution::percent(LoadoutStat::Attack, 50.0, "doll"),
            StatContribution::flat(LoadoutStat::Attack, 5.0, "misc"),
        ]);
        let totals = stacking.totals_for(LoadoutStat::Attack);
        assert_eq!(totals.base, 1300.0);
        assert!((totals.modifier - 0.5).abs() < 1e-12);
        assert!((stacking.composed(LoadoutStat::Attack) - 1955.0).abs() < 1e-9);
        assert_eq!(stacking.contributions().len(), 4);
    }

    #[test]
    fn untouched_stat_composes_to_zero() {
        let stacking = StatStacking::new();
        assert_eq!(stacking.composed(LoadoutStat::CritDamage), 0.0);
    }
}
