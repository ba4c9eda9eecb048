use cgmath::Vector2;

use crate::physics::{BodyHandle, FixtureDef, PhysicsWorld};

pub mod loader;

pub use loader::BodyEditorLoader;


/// Source of named shapes drawn in an external body editor.
pub trait BodyEditor {
    /// Offset between the body origin and the lower-left corner of the shape, scaled.
    /// Fails when `name` is unknown.
    fn origin(&self, name: &str, scale: f32) -> anyhow::Result<Vector2<f32>>;

    /// Creates on `body` every fixture that makes up the shape `name`.
    fn attach_fixture(
        &self,
        world: &mut dyn PhysicsWorld,
        body: BodyHandle,
        name: &str,
        fixture_def: &FixtureDef,
        scale: f32,
    ) -> anyhow::Result<()>;
}
