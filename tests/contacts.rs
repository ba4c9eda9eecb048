mod common;

use std::cell::RefCell;
use std::rc::Rc;

use liquidplay::{BodyCell, BodyDef, BodyHandle, Contact, EntityBody, FixtureDef, ParticleSystemHandle, Scene};

use common::{group, util_setup};


fn live_body(scene: &mut Scene, id: &str, x: f32) -> BodyCell {
    let body = EntityBody::new("crate", BodyDef::dynamic(), FixtureDef::default());
    body.borrow_mut().create_box(scene, x, 0.0, 10.0, 10.0).unwrap();
    body.borrow_mut().set_id(id);
    body
}

fn handle(body: &BodyCell) -> BodyHandle {
    body.borrow().body().unwrap()
}

fn record(body: &BodyCell, log: &Rc<RefCell<Vec<String>>>, tag: &'static str) {
    let me = body.borrow().id().to_owned();
    let begin_log = log.clone();
    let begin_me = me.clone();
    body.borrow_mut().on_begin_contact(move |other, _| {
        begin_log.borrow_mut().push(format!("{tag} begin {begin_me}<-{}", other.borrow().id()));
    });
    let end_log = log.clone();
    body.borrow_mut().on_end_contact(move |other, _| {
        end_log.borrow_mut().push(format!("{tag} end {me}<-{}", other.borrow().id()));
    });
}


#[test]
fn contacts_reach_both_sides() {
    let (_rt, mut scene) = util_setup();
    let a = live_body(&mut scene, "a", 0.0);
    let b = live_body(&mut scene, "b", 20.0);
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&a, &log, "x");
    record(&b, &log, "x");

    let contact = Contact::new(handle(&a), handle(&b));
    scene.begin_contact(&contact);
    scene.end_contact(&contact);

    assert_eq!(*log.borrow(), vec!["x begin a<-b", "x begin b<-a", "x end a<-b", "x end b<-a"]);
}

#[test]
fn contact_callbacks_run_in_registration_order_with_duplicates() {
    let (_rt, mut scene) = util_setup();
    let a = live_body(&mut scene, "a", 0.0);
    let b = live_body(&mut scene, "b", 20.0);
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&a, &log, "first");
    record(&a, &log, "second");
    record(&a, &log, "first");

    scene.begin_contact(&Contact::new(handle(&b), handle(&a)));

    assert_eq!(*log.borrow(), vec!["first begin a<-b", "second begin a<-b", "first begin a<-b"]);
}

#[test]
fn callbacks_receive_the_contact() {
    let (_rt, mut scene) = util_setup();
    let a = live_body(&mut scene, "a", 0.0);
    let b = live_body(&mut scene, "b", 20.0);
    let seen = Rc::new(RefCell::new(None));
    {
        let seen = seen.clone();
        a.borrow_mut().on_begin_contact(move |_, contact| *seen.borrow_mut() = Some(contact.clone()));
    }

    let mut contact = Contact::new(handle(&a), handle(&b));
    contact.points.push(cgmath::Vector2::new(1.5, 0.5));
    scene.begin_contact(&contact);

    assert_eq!(seen.borrow().as_ref(), Some(&contact));
}

#[test]
fn particle_contacts_reach_the_body() {
    let (_rt, mut scene) = util_setup();
    let a = live_body(&mut scene, "a", 0.0);
    let hits = Rc::new(RefCell::new(Vec::new()));
    {
        let hits = hits.clone();
        a.borrow_mut().on_begin_particle_contact(move |system, index| hits.borrow_mut().push((system, index)));
    }

    let water = ParticleSystemHandle::new(7);
    scene.begin_particle_contact(water, 3, handle(&a));
    scene.begin_particle_contact(water, 9, handle(&a));
    scene.begin_particle_contact(water, 1, BodyHandle::new(9999));

    assert_eq!(*hits.borrow(), vec![(water, 3), (water, 9)]);
}

#[test]
fn unknown_or_destroyed_bodies_are_skipped() {
    let (_rt, mut scene) = util_setup();
    let a = live_body(&mut scene, "a", 0.0);
    let b = live_body(&mut scene, "b", 20.0);
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&a, &log, "x");
    let b_handle = handle(&b);

    scene.begin_contact(&Contact::new(handle(&a), BodyHandle::new(9999)));
    assert!(log.borrow().is_empty());

    b.borrow_mut().destroy(&mut scene);
    assert!(scene.body_of(b_handle).is_none());

    scene.begin_contact(&Contact::new(handle(&a), b_handle));
    assert!(log.borrow().is_empty());
}

#[test]
fn dropped_wrappers_leave_the_side_table() {
    let (_rt, mut scene) = util_setup();
    let a = live_body(&mut scene, "a", 0.0);
    let b = live_body(&mut scene, "b", 20.0);
    let b_handle = handle(&b);

    assert!(Rc::ptr_eq(&scene.body_of(b_handle).unwrap(), &b));

    drop(b);
    assert!(scene.body_of(b_handle).is_none());
    assert_eq!(scene.live_bodies().len(), 1);
    assert_eq!(scene.body_count(), 1);
    assert!(Rc::ptr_eq(&scene.live_bodies()[0], &a));
}

#[test]
fn the_world_step_reports_contacts() {
    let (_rt, mut scene) = util_setup();
    let ground = EntityBody::new("ground", BodyDef::default(), FixtureDef::default());
    ground.borrow_mut().create_box(&mut scene, 0.0, 0.0, 100.0, 10.0).unwrap();
    ground.borrow_mut().set_id("ground");

    let actor = group("crate");
    let falling = EntityBody::with_actor("crate", BodyDef::dynamic(), FixtureDef::default(), actor.clone());
    falling.borrow_mut().create_box(&mut scene, 45.0, 15.0, 10.0, 10.0).unwrap();
    falling.borrow_mut().set_id("crate");

    let log = Rc::new(RefCell::new(Vec::new()));
    record(&ground, &log, "x");

    for _ in 0..120 {
        scene.step(1.0 / 60.0);
        scene.render(1.0 / 60.0);
    }

    assert_eq!(log.borrow().first().map(String::as_str), Some("x begin ground<-crate"));
    let y = actor.read().unwrap().position.y;
    assert!(y > 9.0 && y < 15.0, "crate should rest on the ground, got y = {y}");
}
