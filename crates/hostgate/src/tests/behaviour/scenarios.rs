//! Scenario bindings for the gateway feature files.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::GatewayWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<GatewayWorld> {
    super::world()
}

#[scenario(
    path = "tests/features/http_gateway.feature",
    name = "Unknown paths are not found"
)]
fn unknown_paths_are_not_found(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/http_gateway.feature",
    name = "A subscribe path without an upgrade is not found"
)]
fn subscribe_without_upgrade(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/http_gateway.feature",
    name = "Unsupported methods are rejected"
)]
fn unsupported_methods(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/http_gateway.feature",
    name = "Unknown addons are reported in the payload"
)]
fn unknown_addons(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/http_gateway.feature",
    name = "The controller reports the current input method"
)]
fn controller_current_input_method(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/http_gateway.feature",
    name = "Writing back a configuration changes nothing"
)]
fn write_back_is_a_no_op(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_subscription.feature",
    name = "Named subscriptions receive their events in order"
)]
fn named_subscriptions(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_subscription.feature",
    name = "Two named events register two watchers"
)]
fn two_named_events(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_subscription.feature",
    name = "A bare subscription watches every event"
)]
fn bare_subscription(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_subscription.feature",
    name = "Disconnecting unregisters the watchers"
)]
fn disconnect_unregisters(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/gateway_reload.feature",
    name = "Moving to a new port frees the old one"
)]
fn move_to_new_port(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/gateway_reload.feature",
    name = "Switching from a unix socket to TCP removes the socket file"
)]
fn unix_to_tcp(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/gateway_reload.feature",
    name = "An empty write restarts on the same endpoint"
)]
fn empty_write_restarts(world: RefCell<GatewayWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/gateway_reload.feature",
    name = "A reload disconnects subscribers"
)]
fn reload_disconnects_subscribers(world: RefCell<GatewayWorld>) {
    drop(world);
}
