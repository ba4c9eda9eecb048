pub mod launcher;
pub mod settings;
pub mod units;
pub mod registry;
pub mod physics;
pub mod editor;
pub mod stage;
pub mod body;
pub mod joint;
pub mod scene;


pub use body::{BodyCell, BodyId, CancelToken, EntityBody, TaskScope};
pub use editor::{BodyEditor, BodyEditorLoader};
pub use joint::{EntityJoint, JointCell, JointWrapper};
pub use physics::{
    BodyDef, BodyHandle, BodyType, Contact, ContactEvent, FixtureDef, JointDef, JointHandle, JointKind,
    ParticleSystemHandle, PhysicsWorld, RapierWorld, Shape,
};
pub use scene::Scene;
pub use settings::Settings;
pub use stage::{Actor, Group, SharedActor, Stage};
pub use units::Units;
