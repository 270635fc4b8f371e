//! Route classification for gateway requests.

use hyper::Method;

const SUBSCRIBE_PREFIX: &str = "/subscribe";
const CONFIG_PREFIX: &str = "/config/";
const CONTROLLER_PREFIX: &str = "/controller/";

/// Where a request goes, decided from its method, path and upgrade headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route<'a> {
    /// WebSocket upgrade to an event subscription.
    Subscribe,
    /// Configuration read or write for the path as given.
    Config,
    /// Controller call; carries the path after `/controller/`.
    Controller(&'a str),
    /// No handler for the path.
    NotFound,
    /// Methods other than GET and POST.
    InvalidMethod,
}

/// Classifies a request. Upgrades to `/subscribe` win over everything else,
/// then methods other than GET and POST are rejected, then the path prefix
/// decides.
pub(crate) fn classify<'a>(method: &Method, path: &'a str, upgrade: bool) -> Route<'a> {
    if upgrade && path.starts_with(SUBSCRIBE_PREFIX) {
        return Route::Subscribe;
    }
    if method != Method::GET && method != Method::POST {
        return Route::InvalidMethod;
    }
    if path.starts_with(CONFIG_PREFIX) {
        return Route::Config;
    }
    if let Some(rest) = path.strip_prefix(CONTROLLER_PREFIX) {
        return Route::Controller(rest);
    }
    Route::NotFound
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Method::GET, "/subscribe", true, Route::Subscribe)]
    #[case(Method::GET, "/subscribe/input_context_focus_in", true, Route::Subscribe)]
    #[case(Method::GET, "/subscribe", false, Route::NotFound)]
    #[case(Method::GET, "/config/global", false, Route::Config)]
    #[case(Method::GET, "/config/global?x", false, Route::Config)]
    #[case(Method::GET, "/controller/current_input_method?x", false, Route::Controller("current_input_method?x"))]
    #[case(Method::POST, "/config/addon/beast", false, Route::Config)]
    #[case(Method::GET, "/config", false, Route::NotFound)]
    #[case(Method::POST, "/controller/current_input_method", false, Route::Controller("current_input_method"))]
    #[case(Method::GET, "/controller/", false, Route::Controller(""))]
    #[case(Method::GET, "/nonexistent", false, Route::NotFound)]
    #[case(Method::PUT, "/config/addon/beast", false, Route::InvalidMethod)]
    #[case(Method::DELETE, "/nonexistent", false, Route::InvalidMethod)]
    #[case(Method::GET, "/config/global", true, Route::Config)]
    fn requests_are_classified(
        #[case] method: Method,
        #[case] path: &str,
        #[case] upgrade: bool,
        #[case] expected: Route<'static>,
    ) {
        assert_eq!(classify(&method, path, upgrade), expected);
    }
}
