use hf_project::schema::*;
use hf_project::{load_json, load_yaml, save_json, save_yaml, validate_project};
use std::path::Path;

fn demo_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/small_office.yaml")
}

#[test]
fn roundtrip_yaml_empty_project() {
    let project = Project {
        version: LATEST_VERSION,
        name: "Empty Project".to_string(),
        zones: vec![],
        air_loops: vec![],
        plant_loops: vec![],
    };

    validate_project(&project).unwrap();

    let temp_dir = std::env::temp_dir();
    let path = temp_dir.join("hf_project_roundtrip_empty.yaml");

    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn demo_recipe_loads() {
    let project = load_yaml(&demo_path()).unwrap();
    assert_eq!(project.name, "Small office");
    assert_eq!(project.zones.len(), 3);
    assert!(project.zones[2].plenum);

    let air_loop = &project.air_loops[0];
    assert_eq!(air_loop.supply[0].kind, EquipmentKind::CoilHeatingWater);
    assert_eq!(air_loop.supply[1].kind, EquipmentKind::FanVariableVolume);
    let branch = &air_loop.branches[0];
    assert_eq!(branch.zone.as_deref(), Some("z1"));
    assert_eq!(
        branch.terminal.as_ref().map(|t| t.kind),
        Some(TerminalKindDef::SeriesPiuReheat)
    );
    assert_eq!(branch.return_plenum.as_deref(), Some("ceiling"));
    assert_eq!(branch.supply_plenum, None);
    assert_eq!(project.plant_loops[0].demand, vec!["hc".to_string()]);
}

#[test]
fn roundtrip_yaml_demo_recipe() {
    let project = load_yaml(&demo_path()).unwrap();

    let path = std::env::temp_dir().join("hf_project_roundtrip_office.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_demo_recipe() {
    let project = load_yaml(&demo_path()).unwrap();

    let path = std::env::temp_dir().join("hf_project_roundtrip_office.json");
    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(project, loaded);

    // Kinds are written inline next to the id
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["air_loops"][0]["supply"][1]["type"], "FanVariableVolume");
    assert!(raw["zones"][0].get("plenum").is_none());
}

#[test]
fn save_rejects_invalid_project() {
    let mut project = load_yaml(&demo_path()).unwrap();
    project.air_loops[0].branches[1].zone = Some("z1".to_string());

    let path = std::env::temp_dir().join("hf_project_invalid.yaml");
    let result = save_yaml(&path, &project);
    assert!(matches!(
        result,
        Err(hf_project::ProjectError::Validation(
            hf_project::ValidationError::DuplicateId { .. }
        ))
    ));
}
