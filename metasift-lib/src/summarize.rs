//! Arbitration: merge per-source records into one final record.
//!
//! Records are merged in configured priority order using the static field
//! table. A few fields get special handling on top of that: a designated
//! genre source, accumulated cover lists, the watermarked-cover policy,
//! catalog-number voting and alias normalization.

use metasift_core::field::{CoverList, MergePolicy, field_table};
use metasift_core::{Field, FinalRecord, MovieInfo, MovieItem, PartialRecord};

use crate::alias::AliasMap;
use crate::config::{Config, CoverPolicy};
use crate::error::SummarizeError;

/// Genre added to items with burned-in subtitles.
pub const HARD_SUB_GENRE: &str = "内嵌字幕";
/// Genre added to uncensored leaks.
pub const UNCENSORED_LEAK_GENRE: &str = "无码流出/破解";

const NAME_DELIMITERS: &[char] = &[
    ' ', '\u{3000}', ',', '，', '、', '&', '＆', '·', '・', ';', '；', '/', '-',
];

/// Merge `records` for `item` with a one-off [`Summarizer`].
pub fn summarize(
    config: &Config,
    aliases: &AliasMap,
    item: &MovieItem,
    records: &[PartialRecord],
) -> Result<FinalRecord, SummarizeError> {
    Summarizer::new(config, aliases).summarize(item, records)
}

pub struct Summarizer<'a> {
    config: &'a Config,
    aliases: &'a AliasMap,
}

impl<'a> Summarizer<'a> {
    pub fn new(config: &'a Config, aliases: &'a AliasMap) -> Self {
        Self { config, aliases }
    }

    /// Merge `records` for `item` into a final record.
    ///
    /// Only successful records are considered. Their order does not matter:
    /// they are ranked by the configured source order for the item's
    /// identifier kind.
    pub fn summarize(
        &self,
        item: &MovieItem,
        records: &[PartialRecord],
    ) -> Result<FinalRecord, SummarizeError> {
        let crawler = &self.config.crawler;
        let ranked = self.rank(item, records);
        if ranked.is_empty() {
            log::error!("{}: no source produced data", item.id);
            return Err(SummarizeError::NoData);
        }

        let cleaned: Vec<(&str, MovieInfo)> = ranked
            .into_iter()
            .map(|rec| {
                let mut info = rec.info.clone();
                if self.config.summarizer.remove_trailing_actor_name
                    && let Some(title) = &info.title
                {
                    info.title = Some(strip_trailing_actresses(title, &info.actress));
                }
                (rec.source.as_str(), info)
            })
            .collect();

        let mut merged = MovieInfo::seeded(&item.id);

        if let Some(source) = &crawler.genre_source
            && let Some((_, info)) = cleaned.iter().find(|(name, _)| *name == source.as_str())
            && !info.genre.is_empty()
        {
            merged.genre = info.genre.clone();
        }

        let mut covers: Vec<String> = Vec::new();
        let mut big_covers: Vec<String> = Vec::new();
        for (name, info) in &cleaned {
            let mut absorbed = Vec::new();
            for spec in field_table() {
                match spec.policy {
                    MergePolicy::FirstNonEmpty | MergePolicy::TriState => {
                        if !(spec.is_set)(&merged) && (spec.is_set)(info) {
                            (spec.adopt)(&mut merged, info);
                            absorbed.push(spec.field.name());
                        }
                    }
                    MergePolicy::Accumulate { list, url } => {
                        let target = match list {
                            CoverList::Covers => &mut covers,
                            CoverList::BigCovers => &mut big_covers,
                        };
                        if let Some(u) = url(info)
                            && !target.iter().any(|c| c == u)
                        {
                            target.push(u.to_string());
                            absorbed.push(spec.field.name());
                        }
                    }
                }
            }
            if !absorbed.is_empty() {
                log::debug!("{}: took [{}] from '{}'", item.id, absorbed.join(" "), name);
            }
        }

        if crawler.respect_site_id {
            self.apply_site_id(item, &cleaned, &mut merged);
        }

        if let Some(source) = &crawler.watermarked_cover_source
            && let Some((_, info)) = cleaned.iter().find(|(name, _)| *name == source.as_str())
            && let Some(marked) = info.cover.as_deref()
        {
            apply_cover_policy(&mut covers, marked, crawler.watermarked_cover);
        }

        merged.cover = covers.first().cloned();
        merged.big_cover = big_covers.first().cloned();

        if item.hard_sub && !merged.genre.iter().any(|g| g == HARD_SUB_GENRE) {
            merged.genre.push(HARD_SUB_GENRE.to_string());
        }
        if item.uncensored && !merged.genre.iter().any(|g| g == UNCENSORED_LEAK_GENRE) {
            merged.genre.push(UNCENSORED_LEAK_GENRE.to_string());
        }

        if crawler.normalize_actress_name && !merged.actress_pics.is_empty() {
            merged.actress = merged
                .actress
                .iter()
                .map(|a| self.aliases.resolve(a).to_string())
                .collect();
            merged.actress_pics = std::mem::take(&mut merged.actress_pics)
                .into_iter()
                .map(|(name, url)| (self.aliases.resolve(&name).to_string(), url))
                .collect();
        }

        let missing: Vec<Field> = crawler
            .required_keys
            .iter()
            .copied()
            .filter(|f| !f.is_set(&merged))
            .collect();
        if !missing.is_empty() {
            let err = SummarizeError::MissingFields(missing);
            log::error!("{}: {}", item.id, err);
            return Err(err);
        }

        let mut record = FinalRecord::new(item.id.clone(), merged);
        record.covers = covers;
        record.big_covers = big_covers;
        Ok(record)
    }

    /// Successful records, highest priority first.
    fn rank<'r>(&self, item: &MovieItem, records: &'r [PartialRecord]) -> Vec<&'r PartialRecord> {
        let order = self.config.crawler.selection.for_kind(item.id.kind());
        let mut ranked: Vec<&PartialRecord> = records.iter().filter(|r| r.is_success()).collect();
        ranked.sort_by_key(|r| {
            order
                .iter()
                .position(|name| *name == r.source)
                .unwrap_or(usize::MAX)
        });
        ranked
    }

    /// Replace the catalog number with the one most titled sources agree on.
    fn apply_site_id(&self, item: &MovieItem, cleaned: &[(&str, MovieInfo)], merged: &mut MovieInfo) {
        let by_dvdid = item.id.dvdid().is_some();
        let mut tally: Vec<(&str, usize)> = Vec::new();
        for (_, info) in cleaned {
            if !info.has_title() {
                continue;
            }
            let value = if by_dvdid { &info.dvdid } else { &info.cid };
            let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match tally.iter_mut().find(|(v, _)| *v == value) {
                Some((_, count)) => *count += 1,
                None => tally.push((value, 1)),
            }
        }

        // Strictly greater keeps the earliest value on ties.
        let mut best: Option<(&str, usize)> = None;
        for &(value, count) in &tally {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        if let Some((value, count)) = best {
            log::debug!("{}: site id {} backed by {} source(s)", item.id, value, count);
            if by_dvdid {
                merged.dvdid = Some(value.to_string());
            } else {
                merged.cid = Some(value.to_string());
            }
        }
    }
}

fn apply_cover_policy(covers: &mut Vec<String>, marked: &str, policy: CoverPolicy) {
    match policy {
        CoverPolicy::Yes => {}
        CoverPolicy::No => covers.retain(|c| c != marked),
        CoverPolicy::Fallback => {
            if let Some(pos) = covers.iter().position(|c| c == marked) {
                let url = covers.remove(pos);
                covers.push(url);
            }
        }
    }
}

/// Strip actress names (and the separators between them) from the end of a
/// title. The longest matching name is removed first. A title that would
/// become empty is returned unchanged.
pub fn strip_trailing_actresses(title: &str, actresses: &[String]) -> String {
    let mut rest = title.trim_end();
    loop {
        let hit = actresses
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty() && rest.ends_with(name))
            .filter(|name| {
                let before = &rest[..rest.len() - name.len()];
                before.is_empty() || before.ends_with(NAME_DELIMITERS)
            })
            .max_by_key(|name| name.chars().count());
        let Some(name) = hit else { break };
        rest = rest[..rest.len() - name.len()].trim_end_matches(NAME_DELIMITERS);
    }

    if rest.trim().is_empty() {
        title.to_string()
    } else {
        rest.to_string()
    }
}

#[cfg(test)]
#[path = "tests/summarize_tests.rs"]
mod tests;
