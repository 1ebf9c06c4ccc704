use std::{collections::BTreeMap, fmt, str::FromStr};

/// Reward tiers keyed by the exact cumulative point total that unlocks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneTable {
    tiers: BTreeMap<i64, String>,
}

impl Default for MilestoneTable {
    fn default() -> Self {
        MilestoneTable::new([(5, "Bronze"), (10, "Silver"), (20, "Gold"), (50, "Platinum")])
    }
}

impl MilestoneTable {
    pub fn new<I, S>(tiers: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        MilestoneTable {
            tiers: tiers
                .into_iter()
                .map(|(threshold, label)| (threshold, label.into()))
                .collect(),
        }
    }

    /// Exact match only: a total that skips a threshold does not unlock it.
    pub fn label_at(&self, points: i64) -> Option<&str> {
        self.tiers.get(&points).map(String::as_str)
    }

    fn threshold_of(&self, label: &str) -> Option<i64> {
        self.tiers
            .iter()
            .find(|(_, tier)| tier.as_str() == label)
            .map(|(threshold, _)| *threshold)
    }

    /// The milestone newly unlocked by reaching `new_points`, if any.
    ///
    /// Milestones never move backwards: a user who spent points and lands on
    /// a lower threshold again keeps the higher tier.
    pub fn unlocked(&self, current: Option<&str>, new_points: i64) -> Option<&str> {
        let label = self.label_at(new_points)?;
        match current.and_then(|current| self.threshold_of(current)) {
            Some(held) if held >= new_points => None,
            _ => Some(label),
        }
    }
}

impl fmt::Display for MilestoneTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .tiers
            .iter()
            .map(|(threshold, label)| format!("{threshold}:{label}"))
            .collect();
        f.write_str(&rendered.join(","))
    }
}

/// Parses `"5:Bronze,10:Silver"`.
impl FromStr for MilestoneTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tiers = BTreeMap::new();
        for entry in s.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (threshold, label) = entry
                .split_once(':')
                .ok_or_else(|| format!("expected threshold:label, got {entry:?}"))?;
            let threshold: i64 = threshold
                .trim()
                .parse()
                .map_err(|_| format!("invalid threshold {threshold:?}"))?;
            let label = label.trim();
            if threshold <= 0 || label.is_empty() {
                return Err(format!("invalid milestone {entry:?}"));
            }
            if tiers.insert(threshold, label.to_string()).is_some() {
                return Err(format!("duplicate threshold {threshold}"));
            }
        }
        if tiers.is_empty() {
            return Err("at least one milestone is required".to_string());
        }
        Ok(MilestoneTable { tiers })
    }
}
