//! Step definitions shared by the gateway feature files.

mod scenarios;

use std::cell::RefCell;
use std::net::TcpListener;
use std::time::Duration;

use hostgate_config::BindEndpoint;
use rstest_bdd_macros::{given, then, when};
use serde_json::{Map, Value, json};

use super::support::{
    GatewayHarness, HttpReply, Subscriber, Target, focus_in, focus_out, free_port, send_request,
    strip_quotes, switch_input_method,
};
use crate::events::EventKind;

/// Scenario world: one gateway, the last response and an optional subscriber.
#[derive(Default)]
pub(crate) struct GatewayWorld {
    gateway: Option<GatewayHarness>,
    reply: Option<HttpReply>,
    snapshot: Option<Value>,
    subscriber: Option<Subscriber>,
    previous_target: Option<Target>,
    requested_port: Option<u16>,
}

impl GatewayWorld {
    fn gateway(&self) -> &GatewayHarness {
        self.gateway.as_ref().expect("gateway started")
    }

    fn gateway_mut(&mut self) -> &mut GatewayHarness {
        self.gateway.as_mut().expect("gateway started")
    }

    fn reply(&self) -> &HttpReply {
        self.reply.as_ref().expect("a request was sent")
    }

    fn send(&mut self, method: &str, path: &str, body: &str) {
        let reply = send_request(self.gateway().target(), method, path, body);
        self.reply = Some(reply);
    }

    fn post_gateway_patch(&mut self, patch: &Value) {
        self.previous_target = Some(self.gateway().target().clone());
        self.send("POST", "/config/addon/beast", &patch.to_string());
    }

    fn subscriber(&mut self) -> &mut Subscriber {
        self.subscriber.as_mut().expect("subscriber connected")
    }
}

pub(crate) fn world() -> RefCell<GatewayWorld> {
    RefCell::new(GatewayWorld::default())
}

/// Collects the `"Value"` of every option into a patch of the same shape.
fn values_of(tree: &Value) -> Value {
    let mut patch = Map::new();
    for child in tree["Children"].as_array().into_iter().flatten() {
        let Some(option) = child["Option"].as_str() else {
            continue;
        };
        if let Some(value) = child.get("Value") {
            patch.insert(option.to_owned(), value.clone());
        } else if child.get("Children").is_some() {
            patch.insert(option.to_owned(), values_of(child));
        }
    }
    Value::Object(patch)
}

fn event_kind(name: &str) -> EventKind {
    strip_quotes(name).parse().expect("known event name")
}

// -- gateway ---------------------------------------------------------------

#[given("a gateway listening on TCP")]
fn given_tcp_gateway(world: &RefCell<GatewayWorld>) {
    world.borrow_mut().gateway = Some(GatewayHarness::tcp());
}

#[given("a gateway listening on a unix socket")]
fn given_unix_gateway(world: &RefCell<GatewayWorld>) {
    world.borrow_mut().gateway = Some(GatewayHarness::unix());
}

// -- HTTP ------------------------------------------------------------------

#[when("a client sends {method} {path}")]
fn when_client_sends(world: &RefCell<GatewayWorld>, method: String, path: String) {
    world.borrow_mut().send(&method, strip_quotes(&path), "");
}

#[when("a client writes back the values of {path}")]
fn when_client_writes_back(world: &RefCell<GatewayWorld>, path: String) {
    let path = strip_quotes(&path);
    let mut world = world.borrow_mut();
    world.send("GET", path, "");
    let tree = world.reply().json();
    world.send("POST", path, &values_of(&tree).to_string());
    world.snapshot = Some(tree);
}

#[then("the response status is {status}")]
fn then_status(world: &RefCell<GatewayWorld>, status: u16) {
    assert_eq!(world.borrow().reply().status, status);
}

#[then("the response body reports a missing file")]
fn then_body_missing_file(world: &RefCell<GatewayWorld>) {
    let world = world.borrow();
    assert_eq!(world.reply().body, "File not found\r\n");
    assert_eq!(world.reply().header("Content-Type"), Some("text/plain"));
}

#[then("the response body mentions {text}")]
fn then_body_mentions(world: &RefCell<GatewayWorld>, text: String) {
    let world = world.borrow();
    let body = &world.reply().body;
    assert!(body.contains(strip_quotes(&text)), "unexpected body: {body}");
}

#[then("the response reports that addon {name} does not exist")]
fn then_unknown_addon(world: &RefCell<GatewayWorld>, name: String) {
    let expected = format!("Addon \"{}\" does not exist", strip_quotes(&name));
    assert_eq!(world.borrow().reply().json(), json!({ "ERROR": expected }));
}

#[then("the response field {field} is {value}")]
fn then_response_field(world: &RefCell<GatewayWorld>, field: String, value: String) {
    let json = world.borrow().reply().json();
    assert_eq!(json[strip_quotes(&field)], strip_quotes(&value));
}

#[then("the write succeeds")]
fn then_write_succeeds(world: &RefCell<GatewayWorld>) {
    let world = world.borrow();
    assert_eq!(world.reply().status, 200);
    assert_eq!(world.reply().json(), json!({}));
}

#[then("reading {path} again returns the same configuration")]
fn then_same_configuration(world: &RefCell<GatewayWorld>, path: String) {
    let mut world = world.borrow_mut();
    world.send("GET", strip_quotes(&path), "");
    let current = world.reply().json();
    assert_eq!(Some(&current), world.snapshot.as_ref());
}

// -- subscriptions -----------------------------------------------------------

#[given("a subscriber to {path}")]
fn given_subscriber(world: &RefCell<GatewayWorld>, path: String) {
    let mut world = world.borrow_mut();
    let subscriber = Subscriber::connect(world.gateway().target(), strip_quotes(&path));
    world.subscriber = Some(subscriber);
}

#[when("the host emits focus in for {program}")]
fn when_focus_in(world: &RefCell<GatewayWorld>, program: String) {
    world.borrow().gateway().emit(focus_in(strip_quotes(&program)));
}

#[when("the host emits focus out for {program}")]
fn when_focus_out(world: &RefCell<GatewayWorld>, program: String) {
    world.borrow().gateway().emit(focus_out(strip_quotes(&program)));
}

#[when("the host emits a switch to {input_method} for {program}")]
fn when_switch(world: &RefCell<GatewayWorld>, input_method: String, program: String) {
    world.borrow().gateway().emit(switch_input_method(
        strip_quotes(&program),
        strip_quotes(&input_method),
    ));
}

#[when("the subscriber disconnects")]
fn when_subscriber_disconnects(world: &RefCell<GatewayWorld>) {
    if let Some(subscriber) = world.borrow_mut().subscriber.take() {
        subscriber.close();
    }
}

#[then("the subscriber receives {event} for {program}")]
fn then_subscriber_receives(world: &RefCell<GatewayWorld>, event: String, program: String) {
    let message = world.borrow_mut().subscriber().next_event();
    assert_eq!(message["event"], strip_quotes(&event));
    assert_eq!(message["params"]["program"], strip_quotes(&program));
    assert_eq!(message["params"]["uuid"], "ab".repeat(16));
}

#[then("the subscriber receives nothing else")]
fn then_subscriber_silent(world: &RefCell<GatewayWorld>) {
    assert!(
        world
            .borrow_mut()
            .subscriber()
            .stays_silent(Duration::from_millis(300))
    );
}

#[then("{event} has {count} watcher")]
fn then_watcher_singular(world: &RefCell<GatewayWorld>, event: String, count: usize) {
    assert_watchers(world, &event, count);
}

#[then("{event} has {count} watchers")]
fn then_watcher_plural(world: &RefCell<GatewayWorld>, event: String, count: usize) {
    assert_watchers(world, &event, count);
}

fn assert_watchers(world: &RefCell<GatewayWorld>, event: &str, count: usize) {
    let kind = event_kind(event);
    let world = world.borrow();
    let gateway = world.gateway();
    assert!(
        gateway.wait_until(|gateway| gateway.watcher_count(kind) == count),
        "expected {count} watchers for {kind}, found {}",
        gateway.watcher_count(kind)
    );
}

#[then("the subscriber is disconnected")]
fn then_subscriber_disconnected(world: &RefCell<GatewayWorld>) {
    assert!(world.borrow_mut().subscriber().closed_by_server());
}

// -- reload ------------------------------------------------------------------

#[when("a client moves the gateway to a new TCP port")]
fn when_move_to_new_port(world: &RefCell<GatewayWorld>) {
    let port = free_port();
    let mut world = world.borrow_mut();
    world.requested_port = Some(port);
    world.post_gateway_patch(&json!({
        "Communication": "TCP",
        "TCP": { "Port": port.to_string() },
    }));
}

#[when("a client posts an empty patch to the gateway addon")]
fn when_post_empty_patch(world: &RefCell<GatewayWorld>) {
    world.borrow_mut().post_gateway_patch(&json!({}));
}

#[then("the gateway answers on the new endpoint")]
fn then_answers_on_new_endpoint(world: &RefCell<GatewayWorld>) {
    let mut world = world.borrow_mut();
    let port = world.requested_port.expect("a port was requested");
    let target = world.gateway_mut().refresh_target().clone();
    let Target::Tcp(addr) = target else {
        panic!("expected a TCP endpoint, got {target:?}");
    };
    assert_eq!(addr.port(), port);
    assert_eq!(
        world.gateway().store().load().expect("saved settings").endpoint(),
        BindEndpoint::tcp(port),
    );
    world.send("GET", "/controller/current_input_method", "");
    assert_eq!(world.reply().status, 200);
}

#[then("the gateway answers on the same endpoint")]
fn then_answers_on_same_endpoint(world: &RefCell<GatewayWorld>) {
    let mut world = world.borrow_mut();
    let target = world.gateway_mut().refresh_target().clone();
    assert_eq!(Some(&target), world.previous_target.as_ref());
    world.send("GET", "/config/global", "");
    assert_eq!(world.reply().status, 200);
}

#[then("the old port is free")]
fn then_old_port_free(world: &RefCell<GatewayWorld>) {
    let world = world.borrow();
    let Some(Target::Tcp(addr)) = world.previous_target.as_ref() else {
        panic!("previous endpoint was not TCP");
    };
    TcpListener::bind(addr).expect("old port can be bound again");
}

#[then("the old socket file is gone")]
fn then_old_socket_gone(world: &RefCell<GatewayWorld>) {
    let world = world.borrow();
    let Some(Target::Unix(path)) = world.previous_target.as_ref() else {
        panic!("previous endpoint was not a unix socket");
    };
    assert!(!path.exists());
    assert_eq!(path, &world.gateway().path("run/gateway.sock"));
}
