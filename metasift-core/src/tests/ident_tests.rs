use super::*;

#[test]
fn kind_names_round_trip() {
    for &kind in IdKind::all() {
        let parsed: IdKind = kind.short_name().parse().unwrap();
        assert_eq!(parsed, kind, "round-trip failed for {:?}", kind);
    }
    assert!("dvd".parse::<IdKind>().is_err());
}

#[test]
fn normal_ids_are_uppercased() {
    let id: Identifier = "abc-123".parse().unwrap();
    assert_eq!(id, Identifier::Normal("ABC-123".into()));
    assert_eq!(id.kind(), IdKind::Normal);
    assert_eq!(id.num(), "ABC-123");
    assert!(id.content_id().is_none());
    assert!(id.fallback_normal().is_none());
}

#[test]
fn fc2_variants() {
    for input in ["FC2-123456", "fc2ppv-123456", "FC2-PPV-123456", "fc2 123456"] {
        let id: Identifier = input.parse().unwrap();
        assert_eq!(id, Identifier::Fc2("FC2-123456".into()), "input {input}");
    }
    assert!("fc2-abc".parse::<Identifier>().is_err());
}

#[test]
fn cid_prefixes() {
    let a: Identifier = "cid:118ABP00123".parse().unwrap();
    let b: Identifier = "cid=118abp00123".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.kind(), IdKind::Cid);
    assert_eq!(a.content_id(), Some("118abp00123"));
    assert_eq!(a.dvdid(), Some("ABP-123"));
    assert_eq!(a.num(), "ABP-123");
    assert!("cid:".parse::<Identifier>().is_err());
}

#[test]
fn cid_without_normal_shape() {
    let id = Identifier::cid("h_1234xyz");
    assert_eq!(id.dvdid(), None);
    assert_eq!(id.num(), "h_1234xyz");
    assert!(id.fallback_normal().is_none());
}

#[test]
fn derive_dvdid_shapes() {
    assert_eq!(derive_dvdid("118abp00123").as_deref(), Some("ABP-123"));
    assert_eq!(derive_dvdid("ipx00001").as_deref(), Some("IPX-001"));
    assert_eq!(derive_dvdid("ssis1234").as_deref(), Some("SSIS-1234"));
    assert_eq!(derive_dvdid("mide00123a").as_deref(), Some("MIDE-123"));
    assert_eq!(derive_dvdid("abc"), None);
    assert_eq!(derive_dvdid("a123"), None);
    assert_eq!(derive_dvdid("abc123xy"), None);
}

#[test]
fn fallback_and_without_fallback() {
    let id = Identifier::cid("118abp00123");
    assert_eq!(id.fallback_normal(), Some(Identifier::Normal("ABP-123".into())));
    let bare = id.without_fallback();
    assert_eq!(bare.dvdid(), None);
    assert_eq!(bare.content_id(), Some("118abp00123"));
}

#[test]
fn shop_prefixes() {
    let g: Identifier = "getchu:4012345".parse().unwrap();
    assert_eq!(g, Identifier::Getchu("GETCHU-4012345".into()));
    let y: Identifier = "GYUTTO:243".parse().unwrap();
    assert_eq!(y.kind(), IdKind::Gyutto);
    assert_eq!(y.num(), "GYUTTO-243");
    assert!("getchu:".parse::<Identifier>().is_err());
}

#[test]
fn rejects_blank_and_whitespace() {
    assert!("".parse::<Identifier>().is_err());
    assert!("   ".parse::<Identifier>().is_err());
    assert!("ABC 123".parse::<Identifier>().is_err());
}

#[test]
fn serde_goes_through_strings() {
    let ids = vec![
        Identifier::normal("ABC-123"),
        Identifier::cid("118abp00123"),
        "fc2-99".parse().unwrap(),
        "getchu:77".parse().unwrap(),
    ];
    let json = serde_json::to_string(&ids).unwrap();
    assert_eq!(
        json,
        r#"["ABC-123","cid:118abp00123","FC2-99","getchu:77"]"#
    );
    let back: Vec<Identifier> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ids);
}

#[test]
fn display_shows_both_ids() {
    assert_eq!(Identifier::cid("118abp00123").to_string(), "ABP-123 (cid:118abp00123)");
    assert_eq!(Identifier::cid("h_99").to_string(), "cid:h_99");
    assert_eq!(Identifier::normal("abc-1").to_string(), "ABC-1");
}

#[test]
fn settled_content_id_survives_a_reload() {
    let settled = Identifier::cid("118abp00123").without_fallback();
    let json = serde_json::to_string(&settled).unwrap();
    assert_eq!(json, r#"{"cid":"118abp00123","dvdid":null}"#);

    let back: Identifier = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settled);
    assert!(back.fallback_normal().is_none());
    assert_eq!(back.num(), "118abp00123");
}
