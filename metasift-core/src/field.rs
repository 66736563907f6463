//! Static field table used by arbitration.
//!
//! Each [`MovieInfo`] field is listed once with its merge policy and a pair
//! of accessors, so the merge loop and the required-field check never need
//! to know field names.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::MovieInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Dvdid,
    Cid,
    Url,
    Title,
    OriTitle,
    Plot,
    Cover,
    BigCover,
    Genre,
    GenreId,
    Score,
    Actress,
    ActressPics,
    Director,
    Duration,
    Producer,
    Publisher,
    Serial,
    Uncensored,
    PublishDate,
    PreviewPics,
    PreviewVideo,
    Magnet,
}

impl Field {
    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dvdid => "dvdid",
            Self::Cid => "cid",
            Self::Url => "url",
            Self::Title => "title",
            Self::OriTitle => "ori_title",
            Self::Plot => "plot",
            Self::Cover => "cover",
            Self::BigCover => "big_cover",
            Self::Genre => "genre",
            Self::GenreId => "genre_id",
            Self::Score => "score",
            Self::Actress => "actress",
            Self::ActressPics => "actress_pics",
            Self::Director => "director",
            Self::Duration => "duration",
            Self::Producer => "producer",
            Self::Publisher => "publisher",
            Self::Serial => "serial",
            Self::Uncensored => "uncensored",
            Self::PublishDate => "publish_date",
            Self::PreviewPics => "preview_pics",
            Self::PreviewVideo => "preview_video",
            Self::Magnet => "magnet",
        }
    }

    pub fn all() -> impl Iterator<Item = Field> {
        FIELD_TABLE.iter().map(|spec| spec.field)
    }

    pub fn spec(&self) -> &'static FieldSpec {
        // The table lists fields in declaration order.
        &FIELD_TABLE[*self as usize]
    }

    /// Whether `info` has a non-empty value for this field.
    pub fn is_set(&self, info: &MovieInfo) -> bool {
        (self.spec().is_set)(info)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct FieldParseError(pub String);

impl std::fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown field: '{}'", self.0)
    }
}

impl std::error::Error for FieldParseError {}

impl std::str::FromStr for Field {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Field::all()
            .find(|f| f.name() == lower)
            .ok_or_else(|| FieldParseError(s.to_string()))
    }
}

/// Emptiness test per value type.
pub trait FieldValue {
    fn has_value(&self) -> bool;
}

impl FieldValue for Option<String> {
    fn has_value(&self) -> bool {
        self.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

impl FieldValue for Option<u32> {
    fn has_value(&self) -> bool {
        self.is_some_and(|v| v > 0)
    }
}

/// For the tri-state flag only `None` is empty; `Some(false)` is an answer.
impl FieldValue for Option<bool> {
    fn has_value(&self) -> bool {
        self.is_some()
    }
}

impl FieldValue for Option<NaiveDate> {
    fn has_value(&self) -> bool {
        self.is_some()
    }
}

impl<T> FieldValue for Vec<T> {
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> FieldValue for BTreeMap<K, V> {
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

/// Which accumulated cover list a field feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverList {
    Covers,
    BigCovers,
}

pub type UrlAccessor = fn(&MovieInfo) -> Option<&str>;

#[derive(Debug, Clone, Copy)]
pub enum MergePolicy {
    /// Highest-priority non-empty value wins.
    FirstNonEmpty,
    /// First-writer-wins where only "unknown" can be overwritten.
    TriState,
    /// Collect every distinct value into an ordered list.
    Accumulate { list: CoverList, url: UrlAccessor },
}

/// One row of the field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub policy: MergePolicy,
    pub is_set: fn(&MovieInfo) -> bool,
    /// Copy the field from the second record into the first.
    pub adopt: fn(&mut MovieInfo, &MovieInfo),
}

fn cover_url(info: &MovieInfo) -> Option<&str> {
    info.cover.as_deref().filter(|s| !s.trim().is_empty())
}

fn big_cover_url(info: &MovieInfo) -> Option<&str> {
    info.big_cover.as_deref().filter(|s| !s.trim().is_empty())
}

macro_rules! field_table {
    ($($variant:ident => $member:ident : $policy:expr),* $(,)?) => {
        static FIELD_TABLE: &[FieldSpec] = &[
            $(FieldSpec {
                field: Field::$variant,
                policy: $policy,
                is_set: |info| info.$member.has_value(),
                adopt: |dst, src| dst.$member = src.$member.clone(),
            },)*
        ];
    };
}

use MergePolicy::{FirstNonEmpty, TriState};

field_table! {
    Dvdid => dvdid: FirstNonEmpty,
    Cid => cid: FirstNonEmpty,
    Url => url: FirstNonEmpty,
    Title => title: FirstNonEmpty,
    OriTitle => ori_title: FirstNonEmpty,
    Plot => plot: FirstNonEmpty,
    Cover => cover: MergePolicy::Accumulate { list: CoverList::Covers, url: cover_url },
    BigCover => big_cover: MergePolicy::Accumulate { list: CoverList::BigCovers, url: big_cover_url },
    Genre => genre: FirstNonEmpty,
    GenreId => genre_id: FirstNonEmpty,
    Score => score: FirstNonEmpty,
    Actress => actress: FirstNonEmpty,
    ActressPics => actress_pics: FirstNonEmpty,
    Director => director: FirstNonEmpty,
    Duration => duration: FirstNonEmpty,
    Producer => producer: FirstNonEmpty,
    Publisher => publisher: FirstNonEmpty,
    Serial => serial: FirstNonEmpty,
    Uncensored => uncensored: TriState,
    PublishDate => publish_date: FirstNonEmpty,
    PreviewPics => preview_pics: FirstNonEmpty,
    PreviewVideo => preview_video: FirstNonEmpty,
    Magnet => magnet: FirstNonEmpty,
}

/// The full field table in declaration order.
pub fn field_table() -> &'static [FieldSpec] {
    FIELD_TABLE
}
