//! Behavioural tests for the server bootstrap sequence.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::BootstrapError;

use super::support::{self, HealthEvent, TestWorld, test_config};

#[fixture]
fn world() -> RefCell<TestWorld> {
    support::world()
}

#[given("a healthy configuration loader")]
fn given_healthy_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_config(test_config(5));
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_failing_loader();
}

#[given("a configuration with a zero deadline")]
fn given_zero_deadline(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_config(test_config(0));
}

#[given("an empty indicator registry")]
fn given_empty_registry(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_indicators(0);
}

#[when("the server bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(
        world.bootstrap_error().is_none(),
        "bootstrap error: {:?}",
        world.bootstrap_error()
    );
    assert!(world.server_built(), "server should have been built");
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<TestWorld>) {
    assert!(
        world.borrow().bootstrap_error().is_some(),
        "bootstrap succeeded unexpectedly"
    );
}

#[then("bootstrap fails with an invalid configuration")]
fn then_bootstrap_rejects_config(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(
        matches!(
            world.bootstrap_error(),
            Some(BootstrapError::InvalidConfiguration { .. })
        ),
        "unexpected outcome: {:?}",
        world.bootstrap_error()
    );
}

#[then("bootstrap fails without indicators")]
fn then_bootstrap_rejects_registry(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(
        matches!(
            world.bootstrap_error(),
            Some(BootstrapError::Indicators { .. })
        ),
        "unexpected outcome: {:?}",
        world.bootstrap_error()
    );
}

#[then("the reporter recorded server start")]
fn then_reporter_start(world: &RefCell<TestWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .events()
            .contains(&HealthEvent::ServerStarting),
        "server start event missing"
    );
}

#[then("the reporter recorded server failure")]
fn then_reporter_failure(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    let failed = events
        .iter()
        .any(|event| matches!(event, HealthEvent::ServerFailed(_)));
    assert!(failed, "server failure event missing: {events:?}");
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap succeeds with a healthy configuration"
)]
fn bootstrap_succeeds(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap fails when configuration cannot load"
)]
fn bootstrap_fails_on_loader_error(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap rejects a zero deadline"
)]
fn bootstrap_rejects_zero_deadline(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap refuses to start without indicators"
)]
fn bootstrap_rejects_empty_registry(#[from(world)] world: RefCell<TestWorld>) {
    drop(world);
}
