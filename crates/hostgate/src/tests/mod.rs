//! End-to-end suites exercising the gateway over real sockets.

mod behaviour;
mod support;
