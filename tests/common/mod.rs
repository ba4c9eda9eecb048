use std::sync::{Arc, RwLock};

use liquidplay::{settings::PhysicsSettings, BodyEditorLoader, Group, Scene};
use tokio::runtime::Runtime;

/*
    Shared setup for the integration tests
*/

#[allow(dead_code)]
pub const BODIES: &str = r#"{
    "rigidBodies": [
        {
            "name": "crate",
            "origin": { "x": 0.5, "y": 0.5 },
            "polygons": [
                [ { "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 }, { "x": 1.0, "y": 1.0 }, { "x": 0.0, "y": 1.0 } ]
            ]
        },
        {
            "name": "broken",
            "origin": { "x": 0.0, "y": 0.0 },
            "polygons": [
                [ { "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 } ]
            ]
        }
    ]
}"#;

#[allow(dead_code)]
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Couldn't build test runtime")
}

/// Scene with 10 stage units per meter and a rapier world. Keep the runtime alive for as long as the scene.
#[allow(dead_code)]
pub fn util_setup_with(settings: PhysicsSettings) -> (Runtime, Scene) {
    let rt = runtime();
    let editor = BodyEditorLoader::from_json(BODIES).expect("Couldn't parse test bodies");
    let scene = Scene::rapier(Box::new(editor), settings, rt.handle().clone());
    (rt, scene)
}

#[allow(dead_code)]
pub fn util_setup() -> (Runtime, Scene) {
    util_setup_with(PhysicsSettings {
        ui_per_meter: 10.0,
        ..Default::default()
    })
}

#[allow(dead_code)]
pub fn group(name: &str) -> Arc<RwLock<Group>> {
    Arc::new(RwLock::new(Group::new(name)))
}
