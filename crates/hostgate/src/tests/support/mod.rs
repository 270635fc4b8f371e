//! Shared harness for the end-to-end suites.

mod client;
mod harness;

pub(crate) use self::client::{HttpReply, Subscriber, send_raw, send_request};
pub(crate) use self::harness::{
    GatewayHarness, Target, focus_in, focus_out, free_port, switch_input_method,
};

#[rustfmt::skip]
pub(crate) fn strip_quotes(value: &str) -> &str { value.trim_matches('"') }
