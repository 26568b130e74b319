//! Integration tests for [`handler_chain::CompositeHandler`] first-match dispatch.
//!
//! Covers: at most one callback per update, registration order as priority, unmatched
//! updates being dropped without error, and callback/trigger errors propagating.

mod common;

use std::sync::{Arc, Mutex};

use common::mock_bot::MockBot;
use common::*;
use dbot_core::{Bot, DbotError, DispatchOutcome, Handler, InlineKeyboardButton, Update};
use handler_chain::{CallbackHandler, CompositeHandler, MessageContext, TextContext};
use serde_json::json;

fn bot() -> Arc<dyn Bot> {
    MockBot::new()
}

/// **Test: `/start` goes to the command handler, plain text to the echo handler, a query to neither.**
///
/// **Setup:** command("start") registered before text().
/// **Expected:** each update invokes exactly the expected callback; the query is Unhandled.
#[tokio::test]
async fn test_start_then_echo_scenario() {
    let start = Counter::new();
    let echo = Counter::new();

    let composite = {
        let (start, echo) = (start.clone(), echo.clone());
        CompositeHandler::new()
            .on_command("start", move |_ctx: MessageContext| {
                let start = start.clone();
                async move {
                    start.hit();
                    Ok(())
                }
            })
            .on_text(move |_ctx: TextContext| {
                let echo = echo.clone();
                async move {
                    echo.hit();
                    Ok(())
                }
            })
    };

    let outcome = composite.dispatch(message_update(1, "/start"), bot()).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!((start.get(), echo.get()), (1, 0));

    let outcome = composite.dispatch(message_update(2, "hello"), bot()).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!((start.get(), echo.get()), (1, 1));

    let outcome = composite.dispatch(button_update(3, "x"), bot()).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Unhandled);
    assert_eq!((start.get(), echo.get()), (1, 1));
}

/// Composite of two handlers matching every text message, recording which one fired.
fn overlapping(specific_first: bool, fired: Arc<Mutex<Vec<&'static str>>>) -> CompositeHandler {
    let specific = {
        let fired = fired.clone();
        Arc::new(CallbackHandler::exact_text("ping", move |_ctx: TextContext| {
            let fired = fired.clone();
            async move {
                fired.lock().unwrap().push("specific");
                Ok(())
            }
        })) as Arc<dyn Handler>
    };
    let catch_all = Arc::new(CallbackHandler::text(move |_ctx: TextContext| {
        let fired = fired.clone();
        async move {
            fired.lock().unwrap().push("catch_all");
            Ok(())
        }
    })) as Arc<dyn Handler>;

    if specific_first {
        CompositeHandler::new()
            .add_handler(specific)
            .add_handler(catch_all)
    } else {
        CompositeHandler::new()
            .add_handler(catch_all)
            .add_handler(specific)
    }
}

/// **Test: registration order decides which of two matching handlers fires.**
#[tokio::test]
async fn test_registration_order_is_priority() {
    let fired = Arc::new(Mutex::new(Vec::new()));
    overlapping(true, fired.clone())
        .dispatch(message_update(1, "ping"), bot())
        .await
        .unwrap();
    assert_eq!(*fired.lock().unwrap(), vec!["specific"]);

    let fired = Arc::new(Mutex::new(Vec::new()));
    overlapping(false, fired.clone())
        .dispatch(message_update(1, "ping"), bot())
        .await
        .unwrap();
    assert_eq!(*fired.lock().unwrap(), vec!["catch_all"]);
}

/// **Test: a button-specific handler registered after the catch-all query handler never fires.**
#[tokio::test]
async fn test_catch_all_query_shadows_later_specific_button() {
    let button = InlineKeyboardButton::new("A", "btn:a");
    let fired = Arc::new(Mutex::new(Vec::new()));

    let (f1, f2) = (fired.clone(), fired.clone());
    let composite = CompositeHandler::new()
        .on_any_query(move |_ctx| {
            let fired = f1.clone();
            async move {
                fired.lock().unwrap().push("any");
                Ok(())
            }
        })
        .on_query(&button, move |_ctx| {
            let fired = f2.clone();
            async move {
                fired.lock().unwrap().push("a");
                Ok(())
            }
        });

    composite.dispatch(button_update(1, "btn:a"), bot()).await.unwrap();
    assert_eq!(*fired.lock().unwrap(), vec!["any"]);
}

/// **Test: whatever the update, no more than one callback runs per dispatch.**
#[tokio::test]
async fn test_at_most_one_callback_per_dispatch() {
    let calls = Counter::new();
    let mut composite = CompositeHandler::new();
    for _ in 0..3 {
        let calls = calls.clone();
        composite = composite.on_text(move |_ctx| {
            let calls = calls.clone();
            async move {
                calls.hit();
                Ok(())
            }
        });
    }
    let calls_q = calls.clone();
    composite = composite.on_any_query(move |_ctx| {
        let calls = calls_q.clone();
        async move {
            calls.hit();
            Ok(())
        }
    });

    let updates: Vec<Update> = vec![
        message_update(1, "hello"),
        message_update(2, "/cmd"),
        button_update(3, "x"),
        media_update(4),
        other_update(5),
    ];
    for update in updates {
        let before = calls.get();
        composite.dispatch(update, bot()).await.unwrap();
        assert!(calls.get() - before <= 1);
    }
    assert_eq!(calls.get(), 2);
}

/// **Test: an update nobody matches is dropped without error.**
#[tokio::test]
async fn test_unmatched_update_is_noop() {
    let mock = MockBot::new();
    let composite = CompositeHandler::new().on_command("start", |ctx: MessageContext| async move {
        ctx.reply("hi", None).await?;
        Ok(())
    });

    for update in [message_update(1, "hello"), button_update(2, "x"), other_update(3)] {
        let outcome = composite.dispatch(update, mock.clone()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Unhandled);
    }
    assert!(mock.calls().is_empty());

    let empty = CompositeHandler::new();
    assert!(empty.is_empty());
    let outcome = empty.dispatch(message_update(4, "x"), bot()).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Unhandled);
}

/// **Test: callback errors come back from dispatch unchanged.**
#[tokio::test]
async fn test_callback_error_propagates() {
    let composite = CompositeHandler::new().on_command("fail", |_ctx: MessageContext| async move {
        Err(DbotError::Platform("broken".to_string()))
    });

    let err = composite
        .dispatch(message_update(1, "/fail"), bot())
        .await
        .unwrap_err();
    assert!(matches!(err, DbotError::Platform(ref s) if s == "broken"));
}

/// **Test: a callback asking for a field its update lacks surfaces a field access error.**
#[tokio::test]
async fn test_field_access_error_from_callback_propagates() {
    let composite = CompositeHandler::new().on_command("start", |ctx: MessageContext| async move {
        ctx.query()?;
        Ok(())
    });

    let err = composite
        .dispatch(message_update(1, "/start"), bot())
        .await
        .unwrap_err();
    assert!(matches!(err, DbotError::FieldAccess(ref e) if e.field == "callback_query"));
}

/// **Test: malformed callback data stops dispatch with a callback data error.**
#[tokio::test]
async fn test_malformed_callback_data_fails_dispatch() {
    let calls = Counter::new();
    let c = calls.clone();
    let composite = CompositeHandler::new().on_any_query(move |_ctx| {
        let c = c.clone();
        async move {
            c.hit();
            Ok(())
        }
    });

    let err = composite
        .dispatch(query_update(1, json!([1, 2])), bot())
        .await
        .unwrap_err();
    assert!(matches!(err, DbotError::CallbackData(ref e) if e.found == "array"));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_update_kinds_union() {
    let button = InlineKeyboardButton::new("A", "a");
    let composite = CompositeHandler::new()
        .on_command("start", |_ctx| async { Ok(()) })
        .on_query(&button, |_ctx| async { Ok(()) });
    let kinds: Vec<&str> = composite.update_kinds().unwrap().into_iter().collect();
    assert_eq!(kinds, vec!["callback_query", "message"]);

    let with_filter = composite.add_handler(Arc::new(CallbackHandler::new(
        handler_chain::Trigger::filter(|_| true),
        |_ctx: handler_chain::Context| async { Ok(()) },
    )));
    assert!(with_filter.update_kinds().is_none());
}
