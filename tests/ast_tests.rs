//! Tests for manifest AST deserialisation.

use rstest::rstest;
use tsukuru::ast::{Recipe, StringOrList, TaskManifest};
use tsukuru::manifest;

fn manifest_yaml(body: &str) -> String {
    format!("version: \"1.0.0\"\n{body}")
}

#[rstest]
fn parses_minimal_manifest() {
    let manifest = manifest::from_str(&manifest_yaml(
        "targets:\n  - name: hello\n    command: echo hi\n",
    ))
    .expect("parse");
    assert_eq!(manifest.version.to_string(), "1.0.0");
    assert_eq!(manifest.targets.len(), 1);
    assert_eq!(manifest.targets[0].name, "hello");
    assert_eq!(
        manifest.targets[0].recipe,
        Recipe::Command {
            command: "echo hi".into()
        }
    );
}

#[rstest]
fn parses_script_recipe() {
    let manifest = manifest::from_str(&manifest_yaml(
        "targets:\n  - name: setup\n    script: |\n      echo one\n      echo two\n",
    ))
    .expect("parse");
    let Recipe::Script { script } = &manifest.targets[0].recipe else {
        panic!("expected script recipe, got {:?}", manifest.targets[0].recipe);
    };
    assert!(script.contains("echo one"));
    assert!(script.contains("echo two"));
}

#[rstest]
fn target_without_recipe_is_aggregate() {
    let manifest =
        manifest::from_str(&manifest_yaml("targets:\n  - name: all\n    deps: hello\n"))
            .expect("parse");
    assert_eq!(manifest.targets[0].recipe, Recipe::None);
}

#[rstest]
fn command_and_script_are_mutually_exclusive() {
    let err = manifest::from_str(&manifest_yaml(
        "targets:\n  - name: bad\n    command: echo hi\n    script: echo hi\n",
    ))
    .expect_err("exclusive");
    let msg = format!("{err:?}");
    assert!(msg.contains("mutually exclusive"), "{msg}");
}

#[rstest]
#[case("deps: hello\n", StringOrList::String("hello".into()))]
#[case(
    "deps:\n      - hello\n      - world\n",
    StringOrList::List(vec!["hello".into(), "world".into()])
)]
fn deps_accept_scalar_or_sequence(#[case] deps: &str, #[case] expected: StringOrList) {
    let yaml = manifest_yaml(&format!(
        "targets:\n  - name: all\n    {deps}    command: echo hi\n"
    ));
    let manifest = manifest::from_str(&yaml).expect("parse");
    assert_eq!(manifest.targets[0].deps, expected);
}

#[rstest]
fn phony_defaults_to_false() {
    let manifest = manifest::from_str(&manifest_yaml(
        "targets:\n  - name: hello\n    command: echo hi\n",
    ))
    .expect("parse");
    assert!(!manifest.targets[0].phony);

    let manifest = manifest::from_str(&manifest_yaml(
        "targets:\n  - name: hello\n    phony: true\n    command: echo hi\n",
    ))
    .expect("parse");
    assert!(manifest.targets[0].phony);
}

#[rstest]
fn missing_version_is_rejected() {
    let err = serde_yml::from_str::<TaskManifest>("targets:\n  - name: hello\n    command: echo\n")
        .expect_err("version required");
    assert!(format!("{err}").contains("version"), "{err}");
}

#[rstest]
fn unknown_target_keys_are_rejected() {
    let err = manifest::from_str(&manifest_yaml(
        "targets:\n  - name: hello\n    phoney: true\n    command: echo hi\n",
    ))
    .expect_err("typo field");
    let msg = format!("{err:?}");
    assert!(msg.contains("unknown target fields"), "{msg}");
    assert!(msg.contains("phoney"), "{msg}");
}

#[rstest]
fn unknown_top_level_keys_are_rejected() {
    let err = manifest::from_str(&manifest_yaml(
        "bogus: true\ntargets:\n  - name: hello\n    command: echo hi\n",
    ))
    .expect_err("unknown field");
    assert!(format!("{err:?}").contains("bogus"), "{err:?}");
}
