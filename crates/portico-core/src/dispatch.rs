//! Status-code dispatch table
//!
//! After a response is decoded, its status code is looked up in a
//! [`StatusDispatcher`]. A registered handler decides the verdict for its
//! code; unhandled codes fall back to a fixed rule: anything at or above
//! 300 escalates to an error, anything below passes.

use std::collections::HashMap;
use std::fmt;

use reqwest::StatusCode;

use crate::context::ExchangeContext;
use crate::error::{Error, Result};

/// Handler invoked with the exchange context of a completed exchange.
/// Returning an error fails the whole execution.
pub type ContextHandler = Box<dyn Fn(&ExchangeContext) -> Result<()> + Send + Sync>;

/// Lookup table from status code to handler.
///
/// Each instance starts with a built-in handler for 401 that raises
/// [`Error::Unauthorized`]. Registration is expected to finish before the
/// dispatcher is shared; the table itself is not synchronized.
pub struct StatusDispatcher {
    handlers: HashMap<StatusCode, ContextHandler>,
}

impl StatusDispatcher {
    /// Dispatcher seeded with the built-in 401 handler.
    pub fn new() -> Self {
        let mut dispatcher = Self {
            handlers: HashMap::new(),
        };
        dispatcher.register(StatusCode::UNAUTHORIZED, |context| {
            Err(Error::unauthorized(context.clone()))
        });
        dispatcher
    }

    /// Register `handler` for `code`. The last registration for a code
    /// wins, including over the built-in 401 handler.
    pub fn register<F>(&mut self, code: StatusCode, handler: F)
    where
        F: Fn(&ExchangeContext) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(code, Box::new(handler));
    }

    /// Remove the handler for `code`, restoring fallback behavior for it.
    /// Returns whether a handler was present.
    pub fn unregister(&mut self, code: StatusCode) -> bool {
        self.handlers.remove(&code).is_some()
    }

    /// Run the handler registered for `code`, or the fallback rule.
    pub fn dispatch(&self, code: StatusCode, context: &ExchangeContext) -> Result<()> {
        match self.handlers.get(&code) {
            Some(handler) => handler(context),
            None => Self::fallback(code, context),
        }
    }

    fn fallback(code: StatusCode, context: &ExchangeContext) -> Result<()> {
        if code.as_u16() >= 300 {
            Err(Error::error_status(context.clone()))
        } else {
            Ok(())
        }
    }
}

impl Default for StatusDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatusDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<u16> = self.handlers.keys().map(|code| code.as_u16()).collect();
        codes.sort_unstable();
        f.debug_struct("StatusDispatcher")
            .field("codes", &codes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;
    use crate::response::Response;

    fn context_with_status(status: StatusCode) -> ExchangeContext {
        let request = RequestBuilder::get()
            .uri("https://api.example.com/items")
            .build()
            .unwrap()
            .snapshot();
        let response = Response::new(status, Vec::new(), "body".to_string());
        ExchangeContext::new(request, response)
    }

    #[test]
    fn test_success_codes_pass() {
        let dispatcher = StatusDispatcher::new();
        let context = context_with_status(StatusCode::OK);
        assert!(dispatcher.dispatch(StatusCode::OK, &context).is_ok());

        // 299 is unusual but still below the error threshold.
        let code = StatusCode::from_u16(299).unwrap();
        let context = context_with_status(code);
        assert!(dispatcher.dispatch(code, &context).is_ok());
    }

    #[test]
    fn test_unauthorized_uses_builtin_handler() {
        let dispatcher = StatusDispatcher::new();
        let context = context_with_status(StatusCode::UNAUTHORIZED);
        let err = dispatcher
            .dispatch(StatusCode::UNAUTHORIZED, &context)
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));
        assert!(err.exchange_context().is_some());
    }

    #[test]
    fn test_error_codes_fall_back_to_response_error() {
        let dispatcher = StatusDispatcher::new();
        let context = context_with_status(StatusCode::NOT_FOUND);
        let err = dispatcher
            .dispatch(StatusCode::NOT_FOUND, &context)
            .unwrap_err();
        assert!(matches!(err, Error::Response { .. }));
        assert!(err
            .to_string()
            .contains("An error HTTP response code was received from server."));
    }

    #[test]
    fn test_redirect_codes_escalate() {
        let dispatcher = StatusDispatcher::new();
        let context = context_with_status(StatusCode::MOVED_PERMANENTLY);
        assert!(dispatcher
            .dispatch(StatusCode::MOVED_PERMANENTLY, &context)
            .is_err());
    }

    #[test]
    fn test_registered_handler_overrides_builtin() {
        let mut dispatcher = StatusDispatcher::new();
        dispatcher.register(StatusCode::UNAUTHORIZED, |_context| Ok(()));
        let context = context_with_status(StatusCode::UNAUTHORIZED);
        assert!(dispatcher
            .dispatch(StatusCode::UNAUTHORIZED, &context)
            .is_ok());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut dispatcher = StatusDispatcher::new();
        dispatcher.register(StatusCode::NOT_FOUND, |_context| Ok(()));
        dispatcher.register(StatusCode::NOT_FOUND, |context| {
            Err(Error::error_status(context.clone()))
        });
        let context = context_with_status(StatusCode::NOT_FOUND);
        assert!(dispatcher
            .dispatch(StatusCode::NOT_FOUND, &context)
            .is_err());
    }

    #[test]
    fn test_unregister_restores_fallback() {
        let mut dispatcher = StatusDispatcher::new();
        assert!(dispatcher.unregister(StatusCode::UNAUTHORIZED));
        assert!(!dispatcher.unregister(StatusCode::UNAUTHORIZED));

        // Without the built-in handler, 401 follows the >= 300 rule.
        let context = context_with_status(StatusCode::UNAUTHORIZED);
        let err = dispatcher
            .dispatch(StatusCode::UNAUTHORIZED, &context)
            .unwrap_err();
        assert!(matches!(err, Error::Response { .. }));
    }

    #[test]
    fn test_handler_can_capture_state() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let seen = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = StatusDispatcher::new();
        let counter = Arc::clone(&seen);
        dispatcher.register(StatusCode::CONFLICT, move |_context| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let context = context_with_status(StatusCode::CONFLICT);
        dispatcher.dispatch(StatusCode::CONFLICT, &context).unwrap();
        dispatcher.dispatch(StatusCode::CONFLICT, &context).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
