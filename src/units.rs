use cgmath::{Deg, Rad, Vector2};


/// Conversion between stage units (pixels) and physics units (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    ui_per_meter: f32,
}

impl Units {
    pub fn new(ui_per_meter: f32) -> Self {
        Self { ui_per_meter }
    }

    pub fn ui_per_meter(&self) -> f32 {
        self.ui_per_meter
    }

    pub fn to_b2(&self, value: f32) -> f32 {
        value / self.ui_per_meter
    }

    pub fn to_ui(&self, value: f32) -> f32 {
        value * self.ui_per_meter
    }

    pub fn vec_to_b2(&self, v: Vector2<f32>) -> Vector2<f32> {
        v / self.ui_per_meter
    }

    pub fn vec_to_ui(&self, v: Vector2<f32>) -> Vector2<f32> {
        v * self.ui_per_meter
    }
}

pub fn rad_to_deg(radians: f32) -> f32 {
    Deg::from(Rad(radians)).0
}
