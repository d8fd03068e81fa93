use gl_project::*;

fn sample() -> ScenarioFile {
    ScenarioFile {
        version: 1,
        name: "Ramp Scenario".to_string(),
        pipes: vec![PipeDef {
            id: "p1".to_string(),
            cells: 4,
            length_m: 50.0,
            diameter_m: 0.1,
            friction_factor: 0.02,
            temperature_k: 288.15,
            scale: ScaleDef {
                area: 1.0,
                compressibility: 1.1,
                friction: 0.9,
            },
            port_variant: PortVariantDef::Compressible,
            initial: InitialDef::Explicit {
                pressure_pa: vec![3.0e5, 2.9e5, 2.8e5, 2.7e5, 2.6e5],
                mass_flow_kgps: vec![0.1; 4],
            },
        }],
        boundaries: vec![
            BoundaryDef {
                at: PipeEndDef {
                    pipe_id: "p1".to_string(),
                    end: EndDef::Inlet,
                },
                drive: DriveDef::MassFlow {
                    schedule: ScheduleDef::Ramp {
                        start_s: 0.0,
                        end_s: 1.0,
                        from: 0.1,
                        to: 0.3,
                    },
                },
            },
            BoundaryDef {
                at: PipeEndDef {
                    pipe_id: "p1".to_string(),
                    end: EndDef::Outlet,
                },
                drive: DriveDef::Pressure {
                    schedule: ScheduleDef::Step {
                        at_s: 0.5,
                        before: 2.6e5,
                        after: 2.5e5,
                    },
                },
            },
        ],
        junctions: vec![],
        run: RunDef {
            dt_s: 0.002,
            t_end_s: 1.5,
            record_every: 5,
            integrator: IntegratorDef::ForwardEuler,
        },
    }
}

#[test]
fn roundtrip_yaml_scenario() {
    let scenario = sample();
    let path = std::env::temp_dir().join("gl_project_roundtrip.yaml");
    save_yaml(&path, &scenario).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_json_scenario() {
    let scenario = sample();
    let path = std::env::temp_dir().join("gl_project_roundtrip.json");
    save_json(&path, &scenario).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(scenario, loaded);
}

#[test]
fn defaults_fill_missing_sections() {
    let yaml = r#"
version: 1
name: Minimal
pipes:
  - id: a
    cells: 3
    length_m: 30.0
    diameter_m: 0.1
    friction_factor: 0.02
    temperature_k: 300.0
    initial: { type: Uniform, pressure_pa: 200000.0 }
boundaries:
  - at: { pipe_id: a, end: inlet }
    drive: { type: Closed }
  - at: { pipe_id: a, end: outlet }
    drive: { type: Pressure, schedule: { type: Constant, value: 200000.0 } }
"#;
    let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();
    validate_scenario(&scenario).unwrap();
    assert_eq!(scenario.run, RunDef::default());
    assert_eq!(scenario.pipes[0].scale, ScaleDef::default());
    assert_eq!(scenario.pipes[0].port_variant, PortVariantDef::Insulated);
    assert!(scenario.junctions.is_empty());
}

#[test]
fn invalid_scenario_is_not_saved() {
    let mut scenario = sample();
    scenario.pipes[0].diameter_m = 0.0;
    let path = std::env::temp_dir().join("gl_project_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &scenario),
        Err(ProjectError::Validation(_))
    ));
}
