use super::*;

use chrono::NaiveDate;
use metasift_core::{Identifier, MovieInfo};

use crate::template::Template;

fn record(id: Identifier, title: &str) -> FinalRecord {
    let info = MovieInfo {
        title: Some(title.to_string()),
        ..MovieInfo::seeded(&id)
    };
    FinalRecord::new(id, info)
}

fn flat_config(folder: &str, maximum: usize, by_byte: bool) -> Config {
    let mut config = Config::default();
    let path = &mut config.summarizer.path;
    path.output_folder_pattern = Template::parse(folder).unwrap();
    path.length_maximum = maximum;
    path.length_by_byte = by_byte;
    config
}

fn abc() -> Identifier {
    Identifier::normal("ABC-123")
}

#[test]
fn clauses_end_with_punctuation() {
    assert_eq!(clauses("").collect::<Vec<_>>(), vec![""]);
    assert_eq!(clauses("plain").collect::<Vec<_>>(), vec!["plain"]);
    assert_eq!(clauses("a,b").collect::<Vec<_>>(), vec!["a,", "b"]);
    assert_eq!(clauses("a, b!").collect::<Vec<_>>(), vec!["a,", " b!"]);
    assert_eq!(clauses("wait...what").collect::<Vec<_>>(), vec!["wait...", "what"]);
    assert_eq!(clauses("日本語。テスト").collect::<Vec<_>>(), vec!["日本語。", "テスト"]);
}

#[test]
fn clauses_restart_from_a_clone() {
    let mut iter = clauses("one, two, three");
    assert_eq!(iter.next(), Some("one,"));
    let rest: Vec<_> = iter.clone().collect();
    assert_eq!(rest, vec![" two,", " three"]);
    assert_eq!(iter.collect::<Vec<_>>(), rest);
}

#[test]
fn longest_fitting_title_is_kept() {
    // "/r/" + title + "/ABC-123.mp4": 33 units for the full title.
    let config = flat_config("{title}", 30, false);
    let item = MovieItem::new(abc()).with_files(["/media/ABC-123.mp4"]);
    let mut rec = record(abc(), "Alpha, Beta, Gamma");

    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();

    assert_eq!(plan.save_dir, PathBuf::from("/r/Alpha, Beta,"));
    assert_eq!(plan.basename, "ABC-123");
    assert_eq!(plan.nfo_file, PathBuf::from("/r/Alpha, Beta,/movie.nfo"));
    assert_eq!(plan.poster_file, PathBuf::from("/r/Alpha, Beta,/poster.jpg"));
    assert_eq!(plan.fanart_file, PathBuf::from("/r/Alpha, Beta,/fanart.jpg"));
    assert_eq!(rec.names, Some(plan));
}

#[test]
fn full_title_used_when_it_fits() {
    let config = flat_config("{title}", 250, false);
    let item = MovieItem::new(abc()).with_files(["/media/ABC-123.mp4"]);
    let mut rec = record(abc(), "Alpha, Beta, Gamma");
    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(plan.save_dir, PathBuf::from("/r/Alpha, Beta, Gamma"));
}

#[test]
fn bytes_and_chars_budget_differently() {
    // 18 chars but 32 bytes with the full title.
    let item = MovieItem::new(abc());

    let by_char = flat_config("{title}", 25, false);
    let mut rec = record(abc(), "日本語。テスト");
    let plan = NameGenerator::new(&by_char)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(plan.save_dir, PathBuf::from("/r/日本語。テスト"));

    let by_byte = flat_config("{title}", 25, true);
    let mut rec = record(abc(), "日本語。テスト");
    let plan = NameGenerator::new(&by_byte)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(plan.save_dir, PathBuf::from("/r/日本語。"));
}

#[test]
fn deep_root_still_produces_a_plan() {
    let config = flat_config("{title}", 50, false);
    let root = format!("/{}", "d".repeat(300));
    let item = MovieItem::new(abc()).with_files(["/media/ABC-123.mp4"]);
    let mut rec = record(abc(), "Some rather long title, with clauses");

    let plan = NameGenerator::new(&config)
        .with_root(&root)
        .generate(&item, &mut rec)
        .unwrap();

    assert!(plan.save_dir.starts_with(&root));
    assert_eq!(plan.basename, "ABC-123");
    assert!(rec.names.is_some());
}

#[test]
fn unbroken_long_title_is_cut_to_fit() {
    // "/r/" + 40 units + "/ABC-123.mp4" is 55; the cut leaves one to spare.
    let config = flat_config("{title}", 30, false);
    let item = MovieItem::new(abc()).with_files(["/media/ABC-123.mp4"]);
    let mut rec = record(abc(), &"x".repeat(40));

    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();

    assert_eq!(plan.save_dir, PathBuf::from(format!("/r/{}", "x".repeat(14))));
    assert_eq!(plan.basename, "ABC-123");
    let full = plan.save_dir.join("ABC-123.mp4");
    assert_eq!(full.to_string_lossy().chars().count(), 29);
}

#[test]
fn no_line_breaks_in_names() {
    let config = Config::default();
    let item = MovieItem::new(abc()).with_files(["/media/ABC-123.mp4"]);
    let mut rec = record(abc(), "Line\nBreak\r\nTitle");
    rec.info.actress = vec!["Jane\nDoe".into()];
    rec.info.serial = Some("S\n1".into());

    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();

    for path in [&plan.save_dir, &plan.nfo_file, &plan.poster_file, &plan.fanart_file] {
        let s = path.to_string_lossy();
        assert!(!s.contains('\n') && !s.contains('\r'), "{s}");
    }
    assert!(!plan.basename.contains('\n'));
    assert!(plan.save_dir.to_string_lossy().contains("JaneDoe"));
}

#[test]
fn illegal_characters_become_fullwidth() {
    let config = flat_config("{title}", 250, false);
    let item = MovieItem::new(abc());
    let mut rec = record(abc(), "What? A/B");
    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(plan.save_dir, PathBuf::from("/r/What？ A／B"));
}

#[test]
fn in_place_uses_first_file() {
    let mut config = Config::default();
    config.summarizer.move_files = false;
    let item = MovieItem::new(abc()).with_files(["/media/sub/ABC-123-cd1.mp4", "/other/x.mp4"]);
    let mut rec = record(abc(), "Title");

    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(plan.save_dir, PathBuf::from("/media/sub"));
    assert_eq!(plan.basename, "ABC-123-cd1");
    assert_eq!(plan.nfo_file, PathBuf::from("/media/sub/movie.nfo"));

    let bare = MovieItem::new(abc());
    let mut rec = record(abc(), "Title");
    assert_eq!(
        generate_names(&config, &bare, &mut rec),
        Err(NamingError::NoMediaFile)
    );
}

#[test]
fn actress_list_is_capped() {
    let mut config = Config::default();
    config.summarizer.path.max_actress_count = 2;
    let generator = NameGenerator::new(&config);

    let mut rec = record(abc(), "T");
    rec.info.actress = vec!["A".into(), "B".into(), "C".into()];
    assert_eq!(generator.vars(&rec)["actress"], "A,B,…");

    rec.info.actress.truncate(2);
    assert_eq!(generator.vars(&rec)["actress"], "A,B");

    rec.info.actress.clear();
    assert_eq!(generator.vars(&rec)["actress"], "#未知女优");
}

#[test]
fn vars_fill_defaults_and_dates() {
    let config = Config::default();
    let generator = NameGenerator::new(&config);
    let mut rec = record(abc(), "  ");
    rec.info.publish_date = NaiveDate::from_ymd_opt(2020, 1, 2);
    rec.info.uncensored = Some(false);
    rec.info.ori_title = Some("元の題".into());

    let vars = generator.vars(&rec);
    assert_eq!(vars["title"], "#未知标题");
    assert_eq!(vars["rawtitle"], "元の題");
    assert_eq!(vars["date"], "2020-01-02");
    assert_eq!(vars["year"], "2020");
    assert_eq!(vars["censor"], "有码");
    assert_eq!(vars["serial"], "#未知系列");
    assert_eq!(vars["num"], "ABC-123");

    rec.info.publish_date = None;
    rec.info.uncensored = None;
    let vars = generator.vars(&rec);
    assert_eq!(vars["date"], "");
    assert_eq!(vars["censor"], "打码情况未知");
}

#[test]
fn label_and_nfo_title_are_recorded() {
    let config = Config::default();
    let item = MovieItem::new(abc()).with_files(["/media/ABC-123.mp4"]);
    let mut rec = record(abc(), "Foo");
    NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(rec.label.as_deref(), Some("ABC"));
    assert_eq!(rec.nfo_title.as_deref(), Some("ABC-123 Foo"));

    let fc2: Identifier = "FC2-PPV-123456".parse().unwrap();
    let rec = record(fc2, "Foo");
    assert_eq!(NameGenerator::new(&config).vars(&rec)["label"], "FC2");

    let rec = record(Identifier::cid("118abp00123"), "Foo");
    let vars = NameGenerator::new(&config).vars(&rec);
    assert_eq!(vars["num"], "ABP-123");
    assert_eq!(vars["label"], "ABP");
}

#[test]
fn attributes_suffix_the_number() {
    let config = Config::default();
    let mut item = MovieItem::new(abc()).with_files(["/media/ABC-123.mkv"]);
    item.hard_sub = true;
    let mut rec = record(abc(), "Foo");
    let plan = NameGenerator::new(&config)
        .with_root("/r")
        .generate(&item, &mut rec)
        .unwrap();
    assert_eq!(plan.basename, "ABC-123-C");
    assert!(plan.save_dir.ends_with("[ABC-123-C] Foo"));
    // The NFO title keeps the bare number.
    assert_eq!(rec.nfo_title.as_deref(), Some("ABC-123 Foo"));
}

#[test]
fn picture_extension_follows_url() {
    let fanart = Path::new("/out/fanart.jpg");
    assert_eq!(
        picture_path_for(fanart, "http://x/a.PNG?w=1"),
        PathBuf::from("/out/fanart.png")
    );
    assert_eq!(
        picture_path_for(fanart, "http://x/noext"),
        PathBuf::from("/out/fanart.jpg")
    );
}

#[test]
fn cut_respects_units() {
    let chars = LengthBudget { maximum: 10, by_byte: false };
    let bytes = LengthBudget { maximum: 10, by_byte: true };
    assert_eq!(chars.cut("日本語", 1), "日本");
    assert_eq!(bytes.cut("日本語", 1), "日本");
    assert_eq!(bytes.cut("日本語", 4), "日");
    assert_eq!(chars.cut("ab", 5), "");
    assert_eq!(chars.remaining("abc"), 7);
    assert_eq!(bytes.remaining("日本語日"), -2);
}
