//! Size by book-to-market bucket definitions.

use std::collections::BTreeSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Size leg of the 2x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SizeLeg {
    /// Bottom market-cap decile.
    #[display("small")]
    Small,
    /// Top market-cap decile.
    #[display("big")]
    Big,
}

/// Book-to-market leg of the 2x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ValueLeg {
    /// Lowest book-to-market tercile.
    #[display("growth")]
    Growth,
    /// Middle book-to-market band.
    #[display("neutral")]
    Neutral,
    /// Highest book-to-market tercile.
    #[display("value")]
    Value,
}

/// One of the six Fama-French sub-portfolios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Small growth.
    SmallGrowth,
    /// Small neutral.
    SmallNeutral,
    /// Small value.
    SmallValue,
    /// Big growth.
    BigGrowth,
    /// Big neutral.
    BigNeutral,
    /// Big value.
    BigValue,
}

impl Bucket {
    /// All buckets in canonical order.
    pub const ALL: [Self; 6] = [
        Self::SmallGrowth,
        Self::SmallNeutral,
        Self::SmallValue,
        Self::BigGrowth,
        Self::BigNeutral,
        Self::BigValue,
    ];

    /// Size leg of this bucket.
    #[must_use]
    pub const fn size(&self) -> SizeLeg {
        match self {
            Self::SmallGrowth | Self::SmallNeutral | Self::SmallValue => SizeLeg::Small,
            Self::BigGrowth | Self::BigNeutral | Self::BigValue => SizeLeg::Big,
        }
    }

    /// Book-to-market leg of this bucket.
    #[must_use]
    pub const fn value(&self) -> ValueLeg {
        match self {
            Self::SmallGrowth | Self::BigGrowth => ValueLeg::Growth,
            Self::SmallNeutral | Self::BigNeutral => ValueLeg::Neutral,
            Self::SmallValue | Self::BigValue => ValueLeg::Value,
        }
    }

    /// Column name of the bucket's synthetic price and return series.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::SmallGrowth => "sg",
            Self::SmallNeutral => "sn",
            Self::SmallValue => "sv",
            Self::BigGrowth => "bg",
            Self::BigNeutral => "bn",
            Self::BigValue => "bv",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.size(), self.value())
    }
}

/// Symbol sets for the six buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAssignment {
    small_growth: BTreeSet<Symbol>,
    small_neutral: BTreeSet<Symbol>,
    small_value: BTreeSet<Symbol>,
    big_growth: BTreeSet<Symbol>,
    big_neutral: BTreeSet<Symbol>,
    big_value: BTreeSet<Symbol>,
}

impl BucketAssignment {
    /// Create an empty assignment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbols held by a bucket.
    #[must_use]
    pub const fn get(&self, bucket: Bucket) -> &BTreeSet<Symbol> {
        match bucket {
            Bucket::SmallGrowth => &self.small_growth,
            Bucket::SmallNeutral => &self.small_neutral,
            Bucket::SmallValue => &self.small_value,
            Bucket::BigGrowth => &self.big_growth,
            Bucket::BigNeutral => &self.big_neutral,
            Bucket::BigValue => &self.big_value,
        }
    }

    /// Replace the symbols held by a bucket.
    pub fn set(&mut self, bucket: Bucket, symbols: BTreeSet<Symbol>) {
        let slot = match bucket {
            Bucket::SmallGrowth => &mut self.small_growth,
            Bucket::SmallNeutral => &mut self.small_neutral,
            Bucket::SmallValue => &mut self.small_value,
            Bucket::BigGrowth => &mut self.big_growth,
            Bucket::BigNeutral => &mut self.big_neutral,
            Bucket::BigValue => &mut self.big_value,
        };
        *slot = symbols;
    }

    /// Iterate buckets with their symbol sets in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &BTreeSet<Symbol>)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }

    /// Buckets that ended up with no symbols.
    #[must_use]
    pub fn empty_buckets(&self) -> Vec<Bucket> {
        self.iter().filter(|(_, s)| s.is_empty()).map(|(b, _)| b).collect()
    }

    /// Buckets that contain `symbol`.
    #[must_use]
    pub fn buckets_of(&self, symbol: &Symbol) -> Vec<Bucket> {
        self.iter().filter(|(_, s)| s.contains(symbol)).map(|(b, _)| b).collect()
    }
}
