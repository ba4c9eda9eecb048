use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Context;
use log::{debug, info, trace};

use crate::{
    body::EntityBody,
    editor::BodyEditorLoader,
    joint::EntityJoint,
    physics::{BodyDef, FixtureDef, JointDef, JointKind},
    scene::Scene,
    settings::Settings,
    stage::Group,
};


const DEFAULT_BODIES: &str = include_str!("../assets/bodies.json");
const FRAME_TIME: f32 = 1.0 / 60.0;


pub struct LaunchOptions {
    pub settings: Option<String>,
    pub bodies: Option<String>,
    pub frames: u32,
    pub write_settings: Option<String>,
}


fn load_editor(options: &LaunchOptions, settings: &Settings) -> anyhow::Result<BodyEditorLoader> {
    match options.bodies.as_ref().or(settings.bodies.as_ref()) {
        Some(path) => BodyEditorLoader::from_file(path),
        None => BodyEditorLoader::from_json(DEFAULT_BODIES),
    }
}

fn actor(name: &str) -> Arc<RwLock<Group>> {
    Arc::new(RwLock::new(Group::new(name)))
}


pub fn run(options: LaunchOptions) -> anyhow::Result<()> {

    env_logger::init();

    if let Some(path) = &options.write_settings {
        Settings::default().save_to_file(path)?;
        info!("default settings written to {path}");
        return Ok(());
    }

    let settings = match &options.settings {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::default(),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("liquidplay")
        .thread_stack_size(3 * 1024 * 1024)
        .enable_all()
        .build()
        .context("building the task runtime")?;

    let editor = load_editor(&options, &settings)?;
    let mut scene = Scene::rapier(Box::new(editor), settings.physics.clone(), runtime.handle().clone());
    let (width, height) = (settings.stage.width, settings.stage.height);

    let ground = EntityBody::with_actor("ground", BodyDef::default(), FixtureDef { friction: 0.8, ..Default::default() }, actor("ground"));
    ground.borrow_mut().create_box(&mut scene, 0.0, 0.0, width, 20.0)?;
    ground.borrow_mut().set_id("ground");

    let crate_actor = actor("crate");
    let crate_body = EntityBody::with_actor("crate", BodyDef::dynamic(), FixtureDef { density: 1.0, ..Default::default() }, crate_actor.clone());
    crate_body.borrow_mut().create(&mut scene, width / 2.0, height - 100.0, 50.0, 50.0)?;
    crate_body.borrow_mut().set_id("crate");

    let ball = EntityBody::with_actor("ball", BodyDef::dynamic(), FixtureDef { density: 0.5, restitution: 0.6, ..Default::default() }, actor("ball"));
    ball.borrow_mut().create(&mut scene, width / 2.0 + 80.0, height - 100.0, 30.0, 30.0)?;
    ball.borrow_mut().set_id("ball");

    let tether = EntityJoint::new(JointDef::new(JointKind::Distance { length: 8.0, frequency_hz: 4.0, damping_ratio: 0.5 }));
    tether.borrow_mut().on_destroy(|joint| debug!("tether {:?} released", joint));
    tether.borrow_mut().create(&mut scene, &crate_body, &ball)?;

    let rendered = Rc::new(Cell::new(0u32));
    {
        let rendered = rendered.clone();
        crate_body.borrow_mut().on_render(move |_| rendered.set(rendered.get() + 1));
    }
    crate_body.borrow_mut().on_begin_contact(|other, _| {
        info!("crate touched '{}'", other.borrow().id());
    });
    ground.borrow_mut().on_begin_contact(|other, contact| {
        info!("ground hit by '{}' at {:?}", other.borrow().id(), contact.points);
    });

    crate_body.borrow_mut().spawn(|token| async move {
        let mut beats = 0u32;
        while !token.is_cancelled() {
            tokio::time::sleep(Duration::from_millis(250)).await;
            beats += 1;
            trace!("crate heartbeat {beats}");
        }
    });

    let started = instant::Instant::now();
    for frame in 0..options.frames {
        scene.step(FRAME_TIME);
        scene.render(FRAME_TIME);

        if frame % 60 == 0 {
            if let Ok(a) = crate_actor.read() {
                debug!("frame {frame}: crate at {:?}, {:.1} degrees", a.position, a.rotation);
            }
        }
    }
    let elapsed = started.elapsed();

    for body in [&crate_body, &ball, &ground] {
        body.borrow_mut().destroy(&mut scene);
    }

    info!(
        "{} frames in {:?}, crate rendered {} times, {} bodies and {} joints left",
        options.frames,
        elapsed,
        rendered.get(),
        scene.body_count(),
        scene.joint_count(),
    );

    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}

