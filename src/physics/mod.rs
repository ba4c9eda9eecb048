use cgmath::{Vector2, Zero};

pub mod rapier;

pub use rapier::RapierWorld;


/// Handle of a body living in a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u32);

/// Handle of a fixture attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixtureHandle(u32);

/// Handle of a joint between two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JointHandle(u32);

/// Handle of a particle system (liquid, smoke, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleSystemHandle(u32);

macro_rules! impl_handle {
    ($t:ty) => {
        impl $t {
            pub fn new(id: u32) -> Self {
                Self(id)
            }

            pub fn id(&self) -> u32 {
                self.0
            }
        }
    };
}

impl_handle!(BodyHandle);
impl_handle!(FixtureHandle);
impl_handle!(JointHandle);
impl_handle!(ParticleSystemHandle);


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    #[default]
    Static,
    Kinematic,
    Dynamic,
}


/// Blueprint consumed by [`PhysicsWorld::create_body`].
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vector2<f32>,
    pub angle: f32,
    pub linear_velocity: Vector2<f32>,
    pub angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub bullet: bool,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vector2::zero(),
            angle: 0.0,
            linear_velocity: Vector2::zero(),
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            fixed_rotation: false,
            bullet: false,
        }
    }
}

impl BodyDef {
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            ..Default::default()
        }
    }

    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Default::default()
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Convex polygon, vertices in body-local physics units.
    Polygon { vertices: Vec<Vector2<f32>> },
    Circle { center: Vector2<f32>, radius: f32 },
}

impl Shape {
    /// Axis-aligned box centered on the body origin.
    pub fn boxed(half_width: f32, half_height: f32) -> Self {
        Shape::Polygon {
            vertices: vec![
                Vector2::new(-half_width, -half_height),
                Vector2::new(half_width, -half_height),
                Vector2::new(half_width, half_height),
                Vector2::new(-half_width, half_height),
            ],
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub category_bits: u16,
    pub mask_bits: u16,
    pub group_index: i16,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xFFFF,
            group_index: 0,
        }
    }
}


/// Blueprint consumed by [`PhysicsWorld::create_fixture`]. The shape is set by
/// whoever attaches the fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDef {
    pub shape: Option<Shape>,
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,
    pub is_sensor: bool,
    pub filter: Filter,
}

impl Default for FixtureDef {
    fn default() -> Self {
        Self {
            shape: None,
            friction: 0.2,
            restitution: 0.0,
            density: 0.0,
            is_sensor: false,
            filter: Filter::default(),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    Distance { length: f32, frequency_hz: f32, damping_ratio: f32 },
    Revolute { reference_angle: f32 },
    Rope { max_length: f32 },
    Weld,
}


#[derive(Debug, Clone, PartialEq)]
pub struct JointDef {
    pub kind: JointKind,
    pub local_anchor_a: Vector2<f32>,
    pub local_anchor_b: Vector2<f32>,
    pub collide_connected: bool,
}

impl JointDef {
    pub fn new(kind: JointKind) -> Self {
        Self {
            kind,
            local_anchor_a: Vector2::zero(),
            local_anchor_b: Vector2::zero(),
            collide_connected: false,
        }
    }
}


/// Contact between two bodies as reported by the collision system.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub normal: Vector2<f32>,
    pub points: Vec<Vector2<f32>>,
}

impl Contact {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Self {
        Self {
            body_a,
            body_b,
            normal: Vector2::zero(),
            points: Vec::new(),
        }
    }
}


/// What a world step reports for each touching pair of bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactEvent {
    Begin(Contact),
    End(Contact),
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector2<f32>,
    /// Radians.
    pub angle: f32,
}


/// The simulation a body wrapper delegates to.
pub trait PhysicsWorld {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;

    /// Fails when the body is unknown or the fixture has no valid shape.
    fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> anyhow::Result<FixtureHandle>;

    /// Removes the body together with its fixtures and joints.
    fn destroy_body(&mut self, body: BodyHandle);

    fn create_joint(&mut self, body_a: BodyHandle, body_b: BodyHandle, def: &JointDef) -> anyhow::Result<JointHandle>;

    fn destroy_joint(&mut self, joint: JointHandle);

    /// Joints attached to `body`, in creation order.
    fn joints_of(&self, body: BodyHandle) -> Vec<JointHandle>;

    fn body_transform(&self, body: BodyHandle) -> Option<Transform>;

    /// Advances the simulation and returns the contacts that began or ended, in order.
    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) -> Vec<ContactEvent>;
}
