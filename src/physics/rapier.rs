use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, bail};
use cgmath::Vector2;
use log::trace;
use rapier2d::prelude::{
    nalgebra, ActiveEvents, CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, CollisionEvent,
    ContactPair, DefaultBroadPhase, EventHandler, FixedJointBuilder, GenericJoint, Group,
    ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, InteractionGroups, IslandManager,
    LockedAxes, MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryPipeline, Real,
    RevoluteJointBuilder, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
    RopeJointBuilder, SpringJointBuilder,
};

use super::{
    BodyDef, BodyHandle, BodyType, Contact, ContactEvent, FixtureDef, FixtureHandle, JointDef,
    JointHandle, JointKind, PhysicsWorld, Shape, Transform,
};


const MAX_POLYGON_VERTICES: usize = 8;
// Massless dynamic bodies would ignore gravity.
const FALLBACK_DENSITY: f32 = 1.0;


fn to_na(v: Vector2<f32>) -> nalgebra::Vector2<Real> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn to_point(v: Vector2<f32>) -> nalgebra::Point2<Real> {
    nalgebra::Point2::new(v.x, v.y)
}

fn from_na(v: &nalgebra::Vector2<Real>) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}


// ---------------------------------------------------
// Contact collection
// ---------------------------------------------------

/// Turns rapier collision events into [`ContactEvent`]s keyed by our body handles.
struct ContactCollector {
    events: Mutex<Vec<ContactEvent>>,
}

impl ContactCollector {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, event: ContactEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }

    fn drain(&self) -> Vec<ContactEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn owner(bodies: &RigidBodySet, colliders: &ColliderSet, collider: ColliderHandle) -> Option<BodyHandle> {
    let parent = colliders.get(collider)?.parent()?;
    Some(BodyHandle::new(bodies.get(parent)?.user_data as u32))
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let (c1, c2, started) = match event {
            CollisionEvent::Started(c1, c2, _) => (c1, c2, true),
            CollisionEvent::Stopped(c1, c2, _) => (c1, c2, false),
        };

        // Removed colliders no longer resolve.
        let (Some(a), Some(b)) = (owner(bodies, colliders, c1), owner(bodies, colliders, c2)) else {
            trace!("rapier: dropped collision event between {:?} and {:?}", c1, c2);
            return;
        };

        let mut contact = Contact::new(a, b);
        if let Some(pair) = contact_pair {
            let sign = if pair.collider1 == c1 { 1.0 } else { -1.0 };
            if let Some(manifold) = pair.manifolds.first() {
                contact.normal = from_na(&manifold.data.normal) * sign;
                contact.points = manifold
                    .data
                    .solver_contacts
                    .iter()
                    .map(|c| Vector2::new(c.point.x, c.point.y))
                    .collect();
            }
        }

        self.push(if started { ContactEvent::Begin(contact) } else { ContactEvent::End(contact) });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}


// ---------------------------------------------------
// World
// ---------------------------------------------------

struct RapierFixture {
    body: BodyHandle,
    def: FixtureDef,
}

struct RapierJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    joint: ImpulseJointHandle,
}

/// [`PhysicsWorld`] backed by rapier2d. Handles are handed out in creation order
/// and the owning [`BodyHandle`] rides along in each rigid body's `user_data`.
pub struct RapierWorld {
    gravity: nalgebra::Vector2<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: ContactCollector,

    next_id: u32,
    bodies: BTreeMap<BodyHandle, RigidBodyHandle>,
    fixtures: BTreeMap<FixtureHandle, RapierFixture>,
    joints: BTreeMap<JointHandle, RapierJoint>,
}

impl RapierWorld {
    pub fn new(gravity: Vector2<f32>) -> Self {
        Self {
            gravity: to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: ContactCollector::new(),
            next_id: 1,
            bodies: BTreeMap::new(),
            fixtures: BTreeMap::new(),
            joints: BTreeMap::new(),
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Definitions of the fixtures attached to `body`, in attachment order.
    pub fn fixtures_of(&self, body: BodyHandle) -> Vec<&FixtureDef> {
        self.fixtures
            .values()
            .filter(|f| f.body == body)
            .map(|f| &f.def)
            .collect()
    }
}

fn collider_builder(shape: &Shape) -> anyhow::Result<ColliderBuilder> {
    match shape {
        Shape::Polygon { vertices } => {
            if vertices.len() < 3 || vertices.len() > MAX_POLYGON_VERTICES {
                bail!(
                    "polygon needs 3 to {} vertices, got {}",
                    MAX_POLYGON_VERTICES,
                    vertices.len()
                );
            }
            let points: Vec<_> = vertices.iter().map(|v| to_point(*v)).collect();
            ColliderBuilder::convex_hull(&points).ok_or_else(|| anyhow!("polygon has no area"))
        }
        Shape::Circle { center, radius } => {
            if *radius <= 0.0 {
                bail!("circle radius must be positive, got {radius}");
            }
            Ok(ColliderBuilder::ball(*radius).translation(to_na(*center)))
        }
    }
}

fn generic_joint(def: &JointDef) -> GenericJoint {
    let (anchor_a, anchor_b) = (to_point(def.local_anchor_a), to_point(def.local_anchor_b));

    let mut joint: GenericJoint = match def.kind {
        JointKind::Distance { length, frequency_hz, damping_ratio } if frequency_hz > 0.0 => {
            let omega = 2.0 * std::f32::consts::PI * frequency_hz;
            SpringJointBuilder::new(length, omega * omega, 2.0 * damping_ratio * omega)
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .build()
                .into()
        }
        // A stiff distance joint only bounds the separation.
        JointKind::Distance { length, .. } => RopeJointBuilder::new(length)
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .build()
            .into(),
        JointKind::Rope { max_length } => RopeJointBuilder::new(max_length)
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .build()
            .into(),
        JointKind::Revolute { .. } => RevoluteJointBuilder::new()
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .build()
            .into(),
        JointKind::Weld => FixedJointBuilder::new()
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .build()
            .into(),
    };
    joint.set_contacts_enabled(def.collide_connected);
    joint
}


impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let handle = BodyHandle::new(self.next_id());
        let body_type = match def.body_type {
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
            BodyType::Dynamic => RigidBodyType::Dynamic,
        };

        let rb = RigidBodyBuilder::new(body_type)
            .translation(to_na(def.position))
            .rotation(def.angle)
            .linvel(to_na(def.linear_velocity))
            .angvel(def.angular_velocity)
            .linear_damping(def.linear_damping)
            .angular_damping(def.angular_damping)
            .gravity_scale(def.gravity_scale)
            .locked_axes(if def.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(def.bullet)
            .user_data(handle.id() as u128)
            .build();

        let rb = self.rigid_bodies.insert(rb);
        self.bodies.insert(handle, rb);
        handle
    }

    fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> anyhow::Result<FixtureHandle> {
        let Some(&parent) = self.bodies.get(&body) else {
            bail!("cannot attach a fixture to unknown body {:?}", body);
        };
        let shape = def.shape.as_ref().ok_or_else(|| anyhow!("fixture definition has no shape"))?;
        let builder = collider_builder(shape)?;

        let dynamic = self.rigid_bodies.get(parent).is_some_and(|rb| rb.is_dynamic());
        let density = if dynamic && def.density <= 0.0 { FALLBACK_DENSITY } else { def.density };
        // group_index has no rapier counterpart.
        let groups = InteractionGroups::new(
            Group::from_bits_truncate(def.filter.category_bits.into()),
            Group::from_bits_truncate(def.filter.mask_bits.into()),
        );

        let collider = builder
            .friction(def.friction)
            .restitution(def.restitution)
            .density(density)
            .sensor(def.is_sensor)
            .collision_groups(groups)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders.insert_with_parent(collider, parent, &mut self.rigid_bodies);

        let handle = FixtureHandle::new(self.next_id());
        self.fixtures.insert(handle, RapierFixture { body, def: def.clone() });
        Ok(handle)
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        let Some(rb) = self.bodies.remove(&body) else {
            return;
        };
        self.rigid_bodies.remove(
            rb,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.fixtures.retain(|_, f| f.body != body);
        self.joints.retain(|_, j| j.body_a != body && j.body_b != body);
        trace!("rapier: destroyed body {:?}", body);
    }

    fn create_joint(&mut self, body_a: BodyHandle, body_b: BodyHandle, def: &JointDef) -> anyhow::Result<JointHandle> {
        if body_a == body_b {
            bail!("a joint needs two distinct bodies");
        }
        let (Some(&a), Some(&b)) = (self.bodies.get(&body_a), self.bodies.get(&body_b)) else {
            bail!("cannot join unknown bodies {:?} and {:?}", body_a, body_b);
        };

        let joint = self.impulse_joints.insert(a, b, generic_joint(def), true);
        let handle = JointHandle::new(self.next_id());
        self.joints.insert(handle, RapierJoint { body_a, body_b, joint });
        Ok(handle)
    }

    fn destroy_joint(&mut self, joint: JointHandle) {
        if let Some(j) = self.joints.remove(&joint) {
            self.impulse_joints.remove(j.joint, true);
        }
    }

    fn joints_of(&self, body: BodyHandle) -> Vec<JointHandle> {
        self.joints
            .iter()
            .filter(|(_, j)| j.body_a == body || j.body_b == body)
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn body_transform(&self, body: BodyHandle) -> Option<Transform> {
        let rb = self.rigid_bodies.get(*self.bodies.get(&body)?)?;
        Some(Transform {
            position: from_na(rb.translation()),
            angle: rb.rotation().angle(),
        })
    }

    // The solver has no separate position pass, so position iterations are unused.
    fn step(&mut self, dt: f32, velocity_iterations: u32, _position_iterations: u32) -> Vec<ContactEvent> {
        self.integration_parameters.dt = dt;
        if let Some(iterations) = NonZeroUsize::new(velocity_iterations as usize) {
            self.integration_parameters.num_solver_iterations = iterations;
        }

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );

        self.collector.drain()
    }
}
