use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use cgmath::Vector2;
use log::debug;
use serde::Deserialize;

use crate::physics::{BodyHandle, FixtureDef, PhysicsWorld, Shape};

use super::BodyEditor;


// Document layout written by the Physics Body Editor tool.

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "rigidBodies", default)]
    rigid_bodies: Vec<RawRigidBody>,
}

#[derive(Deserialize)]
struct RawRigidBody {
    name: String,
    #[serde(rename = "imagePath", default)]
    image_path: Option<String>,
    origin: RawVec,
    #[serde(default)]
    polygons: Vec<Vec<RawVec>>,
    #[serde(default)]
    circles: Vec<RawCircle>,
}

#[derive(Deserialize, Clone, Copy)]
struct RawVec {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct RawCircle {
    cx: f32,
    cy: f32,
    r: f32,
}

impl From<RawVec> for Vector2<f32> {
    fn from(v: RawVec) -> Self {
        Vector2::new(v.x, v.y)
    }
}


#[derive(Debug, Clone)]
pub struct CircleModel {
    pub center: Vector2<f32>,
    pub radius: f32,
}

/// One named shape. Coordinates are normalized to the shape's width.
#[derive(Debug, Clone)]
pub struct RigidBodyModel {
    pub name: String,
    pub image_path: Option<String>,
    pub origin: Vector2<f32>,
    pub polygons: Vec<Vec<Vector2<f32>>>,
    pub circles: Vec<CircleModel>,
}


pub struct BodyEditorLoader {
    models: HashMap<String, RigidBodyModel>,
}

impl BodyEditorLoader {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let document: RawDocument = serde_json::from_str(json).context("parsing body editor document")?;

        let models = document
            .rigid_bodies
            .into_iter()
            .map(|raw| {
                let model = RigidBodyModel {
                    name: raw.name.clone(),
                    image_path: raw.image_path,
                    origin: raw.origin.into(),
                    polygons: raw
                        .polygons
                        .into_iter()
                        .map(|polygon| polygon.into_iter().map(Vector2::from).collect())
                        .collect(),
                    circles: raw
                        .circles
                        .into_iter()
                        .map(|c| CircleModel { center: Vector2::new(c.cx, c.cy), radius: c.r })
                        .collect(),
                };
                (raw.name, model)
            })
            .collect::<HashMap<_, _>>();

        debug!("body editor: loaded {} shapes", models.len());
        Ok(Self { models })
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading body editor file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn model(&self, name: &str) -> anyhow::Result<&RigidBodyModel> {
        self.models
            .get(name)
            .ok_or_else(|| anyhow!("body '{name}' was not found"))
    }

    pub fn image_path(&self, name: &str) -> anyhow::Result<Option<&str>> {
        Ok(self.model(name)?.image_path.as_deref())
    }
}

impl BodyEditor for BodyEditorLoader {
    fn origin(&self, name: &str, scale: f32) -> anyhow::Result<Vector2<f32>> {
        Ok(self.model(name)?.origin * scale)
    }

    fn attach_fixture(
        &self,
        world: &mut dyn PhysicsWorld,
        body: BodyHandle,
        name: &str,
        fixture_def: &FixtureDef,
        scale: f32,
    ) -> anyhow::Result<()> {
        let model = self.model(name)?;
        let origin = model.origin * scale;

        for polygon in &model.polygons {
            let vertices = polygon.iter().map(|v| *v * scale - origin).collect();
            let def = FixtureDef {
                shape: Some(Shape::Polygon { vertices }),
                ..fixture_def.clone()
            };
            world.create_fixture(body, &def)
                .with_context(|| format!("attaching polygon of '{name}'"))?;
        }

        for circle in &model.circles {
            let def = FixtureDef {
                shape: Some(Shape::Circle {
                    center: circle.center * scale - origin,
                    radius: circle.radius * scale,
                }),
                ..fixture_def.clone()
            };
            world.create_fixture(body, &def)
                .with_context(|| format!("attaching circle of '{name}'"))?;
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDef, RapierWorld};

    const DOCUMENT: &str = r#"{
        "rigidBodies": [
            {
                "name": "crate",
                "imagePath": "images/crate.png",
                "origin": { "x": 0.5, "y": 0.25 },
                "polygons": [
                    [ { "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 }, { "x": 1.0, "y": 0.5 } ],
                    [ { "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.5 }, { "x": 0.0, "y": 0.5 } ]
                ],
                "circles": [ { "cx": 0.5, "cy": 0.5, "r": 0.25 } ]
            }
        ],
        "dynamicObjects": []
    }"#;

    #[test]
    fn origin_is_scaled() {
        let loader = BodyEditorLoader::from_json(DOCUMENT).unwrap();

        assert_eq!(loader.origin("crate", 4.0).unwrap(), Vector2::new(2.0, 1.0));
        assert_eq!(loader.image_path("crate").unwrap(), Some("images/crate.png"));
    }

    #[test]
    fn unknown_names_fail() {
        let loader = BodyEditorLoader::from_json(DOCUMENT).unwrap();
        let err = loader.origin("barrel", 1.0).unwrap_err();

        assert!(err.to_string().contains("barrel"));
    }

    #[test]
    fn fixtures_are_offset_by_origin() {
        let loader = BodyEditorLoader::from_json(DOCUMENT).unwrap();
        let mut world = RapierWorld::new(Vector2::new(0.0, 0.0));
        let body = world.create_body(&BodyDef::default());
        let def = FixtureDef { density: 3.0, ..Default::default() };

        loader.attach_fixture(&mut world, body, "crate", &def, 2.0).unwrap();

        let fixtures = world.fixtures_of(body);
        assert_eq!(fixtures.len(), 3);
        assert!(fixtures.iter().all(|f| f.density == 3.0));
        match fixtures[0].shape.as_ref().unwrap() {
            Shape::Polygon { vertices } => {
                assert_eq!(vertices[0], Vector2::new(-1.0, -0.5));
                assert_eq!(vertices[1], Vector2::new(1.0, -0.5));
            }
            other => panic!("expected polygon, got {other:?}"),
        }
        match fixtures[2].shape.as_ref().unwrap() {
            Shape::Circle { center, radius } => {
                assert_eq!(*center, Vector2::new(0.0, 0.5));
                assert_eq!(*radius, 0.5);
            }
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(BodyEditorLoader::from_json("{ \"rigidBodies\": [ { \"name\": 1 } ] }").is_err());
    }
}
