use cgmath::{Vector2, Zero};

use super::Actor;


/// Plain transform-holding actor.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub position: Vector2<f32>,
    pub size: Vector2<f32>,
    pub origin: Vector2<f32>,
    pub rotation: f32,
    disposed: bool,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector2::zero(),
            size: Vector2::zero(),
            origin: Vector2::zero(),
            rotation: 0.0,
            disposed: false,
        }
    }
}

impl Actor for Group {
    fn set_bounds(&mut self, position: Vector2<f32>, size: Vector2<f32>) {
        self.position = position;
        self.size = size;
    }

    fn set_position(&mut self, position: Vector2<f32>) {
        self.position = position;
    }

    fn set_origin(&mut self, origin: Vector2<f32>) {
        self.origin = origin;
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
