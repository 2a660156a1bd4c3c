use std::path::PathBuf;

use loadout::classdef::{parse_universe, resolve, resolve_text, FieldValue, ResolvedUniverse};
use loadout::settings::ParseSettings;
use loadout::source::load_universe_file;
use loadout::{ConfigError, Slot};

fn example_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("example_loadout.hpp")
}

fn example_universe() -> ResolvedUniverse {
    let text = load_universe_file(example_path()).expect("example file should load");
    resolve_text(&text, &ParseSettings::default()).expect("example file should resolve")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn example_declares_three_classes_in_order() {
    let universe = example_universe();
    let names: Vec<_> = universe.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["baseMan", "rm", "ar"]);
    assert_eq!(
        universe.get("ar").unwrap().lineage,
        strings(&["ar", "rm", "baseMan"])
    );
}

#[test]
fn ar_vest_is_its_own_declaration_not_rms() {
    let universe = example_universe();
    assert_eq!(
        universe.get("ar").unwrap().slot(Slot::Vest),
        strings(&[
            "milgp_v_mmac_hgunner_belt_cb",
            "milgp_v_mmac_hgunner_belt_rgr",
            "milgp_v_mmac_hgunner_belt_khk",
        ])
        .as_slice()
    );
    assert_eq!(
        universe.get("rm").unwrap().slot(Slot::Vest)[0],
        "milgp_v_mmac_assaulter_belt_cb"
    );
}

#[test]
fn ar_magazines_expand_to_nine_entries_in_order() {
    let universe = example_universe();
    let magazines = universe.get("ar").unwrap().slot(Slot::Magazines);
    assert_eq!(magazines.len(), 2 + 2 + 2 + 3);
    assert_eq!(
        magazines,
        strings(&[
            "SmokeShell",
            "SmokeShell",
            "rhs_mag_m67",
            "rhs_mag_m67",
            "11Rnd_45ACP_Mag",
            "11Rnd_45ACP_Mag",
            "sps_200Rnd_556x45_M855A1_Mixed_KAC_Box",
            "sps_200Rnd_556x45_M855A1_Mixed_KAC_Box",
            "sps_200Rnd_556x45_M855A1_Mixed_KAC_Box",
        ])
        .as_slice()
    );
}

#[test]
fn ar_linked_items_pass_through_from_base_man() {
    let universe = example_universe();
    let expected = strings(&["ItemWatch", "ItemMap", "ItemCompass"]);
    assert_eq!(universe.get("ar").unwrap().slot(Slot::LinkedItems), expected.as_slice());
    assert_eq!(universe.get("rm").unwrap().slot(Slot::LinkedItems), expected.as_slice());
}

#[test]
fn ar_inherits_rm_items_and_keeps_own_scalars() {
    let universe = example_universe();
    let ar = universe.get("ar").unwrap();
    let rm = universe.get("rm").unwrap();
    assert_eq!(ar.display_name(), "Automatic Rifleman");
    assert_eq!(ar.slot(Slot::Items), rm.slot(Slot::Items));
    assert_eq!(rm.slot(Slot::Items).len(), 1 + 10 + 5 + 5 + 4 + 2 + 2 + 2);
    assert_eq!(ar.slot(Slot::Uniform).len(), 10);
    assert_eq!(ar.slot(Slot::Backpack), strings(&["B_Carryall_cbr"]).as_slice());
    assert_eq!(ar.code(), "");
}

#[test]
fn override_law_holds_for_every_field_of_every_child() {
    let text = load_universe_file(example_path()).unwrap();
    let parsed = parse_universe(&text, &ParseSettings::default()).unwrap();
    let universe = resolve(&parsed).unwrap();

    for record in parsed.records() {
        let Some(parent_name) = record.parent.as_deref() else {
            continue;
        };
        let child = universe.get(&record.name).unwrap();
        let parent = universe.get(parent_name).unwrap();
        for (field, value) in &child.fields {
            match record.fields.get(field) {
                Some(own) => assert_eq!(value, own, "{}.{field} should be its own", record.name),
                None => assert_eq!(
                    Some(value),
                    parent.fields.get(field),
                    "{}.{field} should be inherited",
                    record.name
                ),
            }
        }
    }
}

#[test]
fn resolution_is_idempotent() {
    assert_eq!(example_universe(), example_universe());
    let first = example_universe();
    let second = example_universe();
    assert_eq!(
        serde_json::to_string(&first.table()).unwrap(),
        serde_json::to_string(&second.table()).unwrap()
    );
}

#[test]
fn macro_expansion_matches_literal_repetition() {
    let with_macro = resolve_text(
        r#"class a { items[] = {"first", LIST_20("x"), "last"}; };"#,
        &ParseSettings::default(),
    )
    .unwrap();
    let literal_body = std::iter::repeat("\"x\"").take(20).collect::<Vec<_>>().join(", ");
    let literal = resolve_text(
        &format!(r#"class a {{ items[] = {{"first", {literal_body}, "last"}}; }};"#),
        &ParseSettings::default(),
    )
    .unwrap();
    assert_eq!(with_macro, literal);
    assert_eq!(with_macro.get("a").unwrap().slot(Slot::Items).len(), 22);
}

#[test]
fn mutual_inheritance_fails_with_cycle() {
    let err = resolve_text("class A : B {};\nclass B : A {};", &ParseSettings::default()).unwrap_err();
    match err {
        ConfigError::InheritanceCycle { path } => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"A".to_string()) && path.contains(&"B".to_string()));
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn broken_universe_returns_no_partial_result() {
    let result = resolve_text(
        r#"
        class ok { vest[] = {"v"}; };
        class broken : ok { items[] = {LIST_0("x")}; };
        "#,
        &ParseSettings::default(),
    );
    assert!(matches!(result, Err(ConfigError::MacroSyntax { .. })));
}

#[test]
fn runaway_nested_macros_fail_instead_of_exhausting_memory() {
    let result = resolve_text(
        r#"class a { items[] = { LIST_65535(LIST_65535("x")) }; };"#,
        &ParseSettings::default(),
    );
    assert!(matches!(result, Err(ConfigError::MacroSyntax { .. })));

    let depth = 200_000;
    let text = format!(
        "class a {{ items[] = {{ {}\"x\"{} }}; }};",
        "LIST_1(".repeat(depth),
        ")".repeat(depth)
    );
    assert!(matches!(
        resolve_text(&text, &ParseSettings::default()),
        Err(ConfigError::MacroSyntax { .. })
    ));
}

#[test]
fn case_sensitive_setting_rejects_mismatched_parent_spelling() {
    let text = "class Base {}; class kid : base {};";
    assert!(resolve_text(text, &ParseSettings::default()).is_ok());
    let strict = ParseSettings {
        case_sensitive: true,
    };
    assert!(matches!(
        resolve_text(text, &strict),
        Err(ConfigError::UnknownParent { .. })
    ));
}

#[test]
fn extra_fields_survive_resolution() {
    let universe = resolve_text(
        r#"class a { rank = "CORPORAL"; }; class b : a {};"#,
        &ParseSettings::default(),
    )
    .unwrap();
    assert_eq!(
        universe.get("b").unwrap().fields.get("rank"),
        Some(&FieldValue::Scalar("CORPORAL".into()))
    );
}
