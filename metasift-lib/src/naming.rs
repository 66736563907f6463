//! Name/path generation under a path-length budget.
//!
//! Titles are cut back clause by clause (at punctuation) until the longest
//! generated path fits. If even one clause of each title is too long, the
//! titles are hard-truncated so a plan is always produced.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use metasift_core::util::{replace_illegal_chars, strip_newlines};
use metasift_core::{FinalRecord, IdKind, MovieItem, NamePlan};
use regex::Regex;

use crate::config::{Config, SummarizerConfig};
use crate::error::NamingError;
use crate::template::NameVars;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{P}+").expect("punctuation regex should compile"));

/// Path length limit, counted in characters or in UTF-8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBudget {
    pub maximum: usize,
    pub by_byte: bool,
}

impl LengthBudget {
    pub fn measure(&self, s: &str) -> usize {
        if self.by_byte {
            s.len()
        } else {
            s.chars().count()
        }
    }

    /// Units left after `path`. Negative when over budget.
    pub fn remaining(&self, path: &str) -> i64 {
        self.maximum as i64 - self.measure(path) as i64
    }

    /// Drop at least `units` from the end of `s`.
    fn cut(&self, s: &str, units: usize) -> String {
        let mut removed = 0;
        let mut end = s.len();
        for (idx, c) in s.char_indices().rev() {
            if removed >= units {
                break;
            }
            removed += if self.by_byte { c.len_utf8() } else { 1 };
            end = idx;
        }
        s[..end].to_string()
    }
}

/// Split text into clauses, each ending with its run of punctuation.
///
/// Always yields at least one segment; empty input gives one empty segment.
/// Cloning the iterator restarts from the clone point.
pub fn clauses(text: &str) -> Clauses<'_> {
    Clauses {
        text,
        start: 0,
        done: false,
    }
}

#[derive(Debug, Clone)]
pub struct Clauses<'t> {
    text: &'t str,
    start: usize,
    done: bool,
}

impl<'t> Iterator for Clauses<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        if self.done {
            return None;
        }
        match PUNCTUATION.find_at(self.text, self.start) {
            Some(m) => {
                let seg = &self.text[self.start..m.end()];
                self.start = m.end();
                self.done = self.start == self.text.len();
                Some(seg)
            }
            None => {
                self.done = true;
                Some(&self.text[self.start..])
            }
        }
    }
}

/// Lexically normalize a path: drop `.` and resolve `..` where possible.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn legalize(path: &Path) -> PathBuf {
    PathBuf::from(strip_newlines(&path.to_string_lossy()))
}

/// Builds naming plans from final records.
pub struct NameGenerator<'a> {
    config: &'a SummarizerConfig,
    root: PathBuf,
}

impl<'a> NameGenerator<'a> {
    /// Relative output folders are resolved against the current directory.
    pub fn new(config: &'a Config) -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            config: &config.summarizer,
            root,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn budget(&self) -> LengthBudget {
        LengthBudget {
            maximum: self.config.path.length_maximum,
            by_byte: self.config.path.length_by_byte,
        }
    }

    /// Substitution values for `record`, already made filename-safe.
    pub fn vars(&self, record: &FinalRecord) -> NameVars {
        let info = &record.info;
        let defaults = &self.config.defaults;
        let or_default = |value: &Option<String>, default: &str| -> String {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let num = info
            .dvdid
            .clone()
            .or_else(|| info.cid.clone())
            .unwrap_or_else(|| record.id.num().to_string());

        let max = self.config.path.max_actress_count;
        let actress = if info.actress.is_empty() {
            defaults.actress.clone()
        } else if info.actress.len() > max {
            log::debug!("Too many actresses, keeping the first {}: {}", max, info.actress.join(","));
            let mut kept: Vec<&str> = info.actress[..max].iter().map(String::as_str).collect();
            kept.push("…");
            kept.join(",")
        } else {
            info.actress.join(",")
        };

        let labels = &self.config.censor_labels;
        let censor = match info.uncensored {
            Some(true) => labels.uncensored.clone(),
            Some(false) => labels.censored.clone(),
            None => labels.unknown.clone(),
        };

        let title = or_default(&info.title, &defaults.title);
        let rawtitle = info
            .ori_title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title.clone());
        let date = info
            .publish_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let year = info
            .publish_date
            .map(|d| d.format("%Y").to_string())
            .unwrap_or_default();

        let mut vars = NameVars::new();
        vars.insert("label", label_of(record.id.kind(), &num));
        vars.insert("num", num);
        vars.insert("title", title);
        vars.insert("rawtitle", rawtitle);
        vars.insert("actress", actress);
        vars.insert("score", info.score.clone().unwrap_or_default());
        vars.insert("censor", censor);
        vars.insert("serial", or_default(&info.serial, &defaults.serial));
        vars.insert("director", or_default(&info.director, &defaults.director));
        vars.insert("producer", or_default(&info.producer, &defaults.producer));
        vars.insert("publisher", or_default(&info.publisher, &defaults.publisher));
        vars.insert("date", date);
        vars.insert("year", year);
        vars.insert("genre", info.genre.join(","));

        for value in vars.values_mut() {
            *value = strip_newlines(&replace_illegal_chars(value));
        }
        vars
    }

    /// Produce the naming plan for `item` and store it, with the derived
    /// label and NFO title, on `record`.
    pub fn generate(
        &self,
        item: &MovieItem,
        record: &mut FinalRecord,
    ) -> Result<NamePlan, NamingError> {
        let vars = self.vars(record);
        record.label = vars.get("label").cloned();
        record.nfo_title = Some(self.config.nfo.title_pattern.render(&vars));

        let mut names = vars.clone();
        if let Some(num) = names.get_mut("num") {
            num.push_str(item.attr_str());
        }

        let plan = if self.config.move_files {
            self.search(item, &mut names)
        } else {
            let (dir, base) = self.in_place_location(item)?;
            self.plan(dir, base, &names)
        };

        for key in ["title", "rawtitle"] {
            if vars.get(key) != names.get(key) {
                log::info!(
                    "{}: shortened {} to: {}",
                    record.id,
                    key,
                    names.get(key).map(String::as_str).unwrap_or_default()
                );
            }
        }
        record.names = Some(plan.clone());
        Ok(plan)
    }

    /// Longest title clauses whose output path fits the budget, falling
    /// back to hard truncation.
    fn search(&self, item: &MovieItem, names: &mut NameVars) -> NamePlan {
        let full_title = names.get("title").cloned().unwrap_or_default();
        let full_rawtitle = names.get("rawtitle").cloned().unwrap_or_default();
        let title_parts: Vec<&str> = clauses(&full_title).collect();
        let raw_parts: Vec<&str> = clauses(&full_rawtitle).collect();

        let ext = item.longest_ext();
        let budget = self.budget();
        let mut remaining = 0;

        for raw_end in (1..=raw_parts.len()).rev() {
            names.insert("rawtitle", replace_illegal_chars(&raw_parts[..raw_end].concat()));
            for title_end in (1..=title_parts.len()).rev() {
                names.insert("title", replace_illegal_chars(&title_parts[..title_end].concat()));
                let (dir, base) = self.templated_location(names);
                let long_path = dir.join(format!("{}{}", base, ext));
                remaining = budget.remaining(&long_path.to_string_lossy());
                if remaining > 0 {
                    return self.plan(dir, base, names);
                }
            }
        }

        // Nothing fits even with one clause each: cut both titles so the
        // last candidate would have one unit to spare.
        let over = (1 - remaining).max(0) as usize;
        for key in ["title", "rawtitle"] {
            if let Some(value) = names.get(key) {
                let cut = budget.cut(value, over);
                names.insert(key, cut);
            }
        }
        log::warn!(
            "Output path exceeds {} units even with the shortest titles, truncating",
            budget.maximum
        );
        let (dir, base) = self.templated_location(names);
        self.plan(dir, base, names)
    }

    fn templated_location(&self, names: &NameVars) -> (PathBuf, String) {
        let folder = self.config.path.output_folder_pattern.render(names);
        let dir = self.root.join(normalize_path(Path::new(folder.trim())));
        let base = self.config.path.basename_pattern.render(names);
        let base = normalize_path(Path::new(base.trim()))
            .to_string_lossy()
            .trim()
            .to_string();
        (dir, base)
    }

    fn in_place_location(&self, item: &MovieItem) -> Result<(PathBuf, String), NamingError> {
        let first = item.files.first().ok_or(NamingError::NoMediaFile)?;
        let stem = first
            .file_stem()
            .ok_or_else(|| NamingError::BadFileName(first.clone()))?
            .to_string_lossy()
            .into_owned();
        let dir = match first.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => self.root.clone(),
        };
        Ok((dir, stem))
    }

    fn plan(&self, save_dir: PathBuf, basename: String, names: &NameVars) -> NamePlan {
        let nfo = format!("{}.nfo", self.config.nfo.basename_pattern.render(names));
        let fanart = format!("{}.jpg", self.config.fanart.basename_pattern.render(names));
        let poster = format!("{}.jpg", self.config.cover.basename_pattern.render(names));
        NamePlan {
            nfo_file: legalize(&save_dir.join(nfo)),
            fanart_file: legalize(&save_dir.join(fanart)),
            poster_file: legalize(&save_dir.join(poster)),
            save_dir: legalize(&save_dir),
            basename: strip_newlines(&basename),
        }
    }
}

/// Naming plan for `item`, with output folders relative to the current
/// directory.
pub fn generate_names(
    config: &Config,
    item: &MovieItem,
    record: &mut FinalRecord,
) -> Result<NamePlan, NamingError> {
    NameGenerator::new(config).generate(item, record)
}

/// The alphabetic prefix of a catalog number, uppercased.
fn label_of(kind: IdKind, num: &str) -> String {
    if kind == IdKind::Fc2 {
        return "FC2".to_string();
    }
    num.trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_uppercase()
}

/// Picture path next to the fanart, with the extension taken from `url`.
pub fn picture_path_for(fanart: &Path, url: &str) -> PathBuf {
    let ext = metasift_core::util::url_extension(url);
    fanart.with_extension(ext.trim_start_matches('.'))
}

#[cfg(test)]
#[path = "tests/naming_tests.rs"]
mod tests;
