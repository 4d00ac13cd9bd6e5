use std::{fs, path::PathBuf};

use ecsim::{
    components::{Camera, Name, Projectile, Transform},
    Entity, Registry, Scenario, ScenarioLoader,
};
use tempfile::tempdir;

fn fixture_loader() -> ScenarioLoader {
    ScenarioLoader::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios"))
}

fn find_named(registry: &Registry, name: &str) -> Entity {
    registry
        .entity_container::<Name>()
        .into_iter()
        .find(|&e| registry.get_component::<Name>(e).unwrap().0 == name)
        .unwrap_or_else(|| panic!("no entity named {name}"))
}

fn run_fixture(ticks: Option<u64>) -> (Registry, ecsim::RunReport) {
    let scenario = fixture_loader().load("drop_test.yaml").unwrap();
    let mut registry = scenario.build_registry().unwrap();
    let mut engine = scenario.engine_builder().build();
    let report = engine.run(&mut registry, scenario.ticks(ticks)).unwrap();
    (registry, report)
}

#[test]
fn drop_test_runs_to_completion() {
    let (registry, report) = run_fixture(None);

    assert_eq!(report.scenario, "drop_test");
    assert_eq!(report.seed, 7);
    assert_eq!(report.ticks, 240);
    assert_eq!(report.final_entity_count, registry.entity_count());
    assert!(report.component_types.iter().any(|name| name.ends_with("Transform")));

    // bodies, launcher and camera stay; only projectiles come and go
    assert!(registry.entity_count() >= 5);
    assert!(!registry.entity_container::<Projectile>().is_empty());

    let ball = find_named(&registry, "ball");
    let ball_position = registry.get_component::<Transform>(ball).unwrap().position;
    assert!(ball_position.y > -0.5, "ball sank to {ball_position}");
}

#[test]
fn camera_ends_at_ball_plus_offset() {
    let (registry, _) = run_fixture(Some(60));
    let ball = find_named(&registry, "ball");
    let ball_position = registry.get_component::<Transform>(ball).unwrap().position;

    let cameras = registry.collect_linked::<(Camera, Transform)>();
    assert_eq!(cameras.len(), 1);
    let camera = registry.get_component::<Camera>(cameras[0]).unwrap();
    assert_eq!(camera.target, Some(ball));
    let eye = registry.get_component::<Transform>(cameras[0]).unwrap().position;
    assert_eq!(eye, ball_position + camera.offset);
}

#[test]
fn identical_seeds_give_identical_runs() {
    let (first, _) = run_fixture(Some(120));
    let (second, _) = run_fixture(Some(120));

    assert_eq!(first.entities(), second.entities());
    assert_eq!(
        first.entity_container::<Projectile>(),
        second.entity_container::<Projectile>()
    );
    for entity in first.entity_container::<Transform>() {
        assert_eq!(
            first.get_component::<Transform>(entity).unwrap(),
            second.get_component::<Transform>(entity).unwrap(),
            "{entity} diverged"
        );
    }
}

#[test]
fn hook_sees_every_tick_in_order() {
    let scenario = fixture_loader().load("drop_test.yaml").unwrap();
    let mut registry = scenario.build_registry().unwrap();
    let mut engine = scenario.engine_builder().build();

    let mut seen = Vec::new();
    let report = engine
        .run_with_hook(&mut registry, 25, |stats| {
            assert_eq!(stats.system_times.len(), 5);
            seen.push(stats.tick);
        })
        .unwrap();

    assert_eq!(seen, (1..=25).collect::<Vec<_>>());
    assert_eq!(report.ticks, 25);
    assert_eq!(engine.current_tick(), 25);
}

#[test]
fn camera_drops_target_when_its_index_is_reused() {
    let text = r#"
name: lost_target
seed: 5
bodies:
  - name: ball
    position: [0.0, 1.0, 0.0]
launchers:
  - position: [100.0, 1.0, 0.0]
    direction: [1.0, 0.0, 0.0]
camera:
  target: ball
  offset: [0.0, 0.0, -4.0]
"#;
    let scenario = Scenario::from_yaml(text).unwrap();
    let mut registry = scenario.build_registry().unwrap();
    let mut engine = scenario.engine_builder().build();

    let ball = find_named(&registry, "ball");
    let camera = registry.entity_container::<Camera>()[0];
    let eye_before = registry.get_component::<Transform>(camera).unwrap().position;
    registry.destroy_entity(ball).unwrap();

    // the launcher fires on the first tick, before the camera runs
    engine.tick(&mut registry).unwrap();

    let shot = registry.entity_container::<Projectile>()[0];
    assert_eq!(shot.raw(), ball.raw());
    assert_ne!(shot, ball);
    let eye = registry.get_component::<Transform>(camera).unwrap().position;
    assert_eq!(eye, eye_before);
}

#[test]
fn entity_limit_skips_shots_instead_of_failing() {
    let text = r#"
name: crowded
seed: 3
max_entities: 3
bodies:
  - name: floor
    position: [0.0, -10.0, 0.0]
    radius: 10.0
    static: true
  - name: ball
    position: [0.0, 2.0, 0.0]
launchers:
  - position: [0.0, 5.0, 0.0]
    direction: [1.0, 0.0, 0.0]
    cooldown_ticks: 0
"#;
    let scenario = Scenario::from_yaml(text).unwrap();
    let mut registry = scenario.build_registry().unwrap();
    let mut engine = scenario.engine_builder().build();

    let report = engine.run(&mut registry, 10).unwrap();
    assert_eq!(report.final_entity_count, 3);
    assert!(registry.entity_container::<Projectile>().is_empty());
}

#[test]
fn loader_reads_from_base_dir() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("tiny.yaml"),
        "name: tiny\nseed: 11\nticks: 4\nbodies:\n  - name: a\n    position: [0.0, 3.0, 0.0]\n",
    )
    .unwrap();

    let scenario = ScenarioLoader::new(dir.path()).load("tiny.yaml").unwrap();
    assert_eq!(scenario.name, "tiny");
    assert_eq!(scenario.ticks(None), 4);

    let missing = ScenarioLoader::new(dir.path()).load("absent.yaml").unwrap_err();
    assert!(missing.to_string().contains("Failed to read scenario file"));

    fs::write(dir.path().join("broken.yaml"), "name: [unclosed\n").unwrap();
    let broken = ScenarioLoader::new(dir.path()).load("broken.yaml").unwrap_err();
    assert!(broken.to_string().contains("Failed to parse"));
}
