//! Integration tests for the query auto-answer: every dispatched query ends up answered
//! exactly once, whether or not the callback answered it.

mod common;

use common::mock_bot::{BotCall, MockBot};
use common::*;
use dbot_core::{DbotError, Handler, HandlerError, InlineKeyboardButton};
use handler_chain::{CallbackHandler, CompositeHandler, QueryContext};

fn empty_answer(query_id: &str) -> BotCall {
    BotCall::Answer {
        query_id: query_id.to_string(),
        text: String::new(),
        show_alert: false,
    }
}

/// **Test: a callback that never answers gets one empty answer after it returns.**
#[tokio::test]
async fn test_unanswered_query_is_answered_once() {
    let mock = MockBot::new();
    let button = InlineKeyboardButton::new("A", "btn:a");
    let calls = Counter::new();
    let c = calls.clone();
    let composite = CompositeHandler::new().on_query(&button, move |_ctx| {
        let c = c.clone();
        async move {
            c.hit();
            Ok(())
        }
    });

    composite
        .dispatch(button_update(1, "btn:a"), mock.clone())
        .await
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(mock.answers(), vec![empty_answer("query-1")]);
}

/// **Test: a callback that answers itself is not answered again.**
#[tokio::test]
async fn test_answered_query_is_not_answered_again() {
    let mock = MockBot::new();
    let button = InlineKeyboardButton::new("A", "btn:a");
    let composite =
        CompositeHandler::new().on_query(&button, |ctx: QueryContext| async move {
            ctx.answer("Done!", false).await?;
            ctx.edit("You pressed A", None).await?;
            Ok(())
        });

    composite
        .dispatch(button_update(2, "btn:a"), mock.clone())
        .await
        .unwrap();

    assert_eq!(
        mock.answers(),
        vec![BotCall::Answer {
            query_id: "query-2".to_string(),
            text: "Done!".to_string(),
            show_alert: false,
        }]
    );
    assert_eq!(mock.calls().len(), 2);
}

/// **Test: a failing callback still leaves the query answered, and its error is returned.**
#[tokio::test]
async fn test_failing_callback_still_answers_query() {
    let mock = MockBot::new();
    let composite = CompositeHandler::new().on_any_query(|_ctx| async move {
        Err(DbotError::from(HandlerError::Unauthorized))
    });

    let err = composite
        .dispatch(button_update(3, "x"), mock.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, DbotError::Handler(HandlerError::Unauthorized)));
    assert_eq!(mock.answers(), vec![empty_answer("query-3")]);
}

/// **Test: with auto-answer turned off, the framework sends nothing on its own.**
#[tokio::test]
async fn test_auto_answer_opt_out() {
    let mock = MockBot::new();
    let handler = CallbackHandler::any_query(|_ctx| async { Ok(()) }).auto_answer(false);

    handler
        .handle(button_update(4, "x"), mock.clone())
        .await
        .unwrap();

    assert!(mock.answers().is_empty());
}

/// **Test: message handlers never answer anything.**
#[tokio::test]
async fn test_message_handlers_do_not_answer() {
    let mock = MockBot::new();
    let composite = CompositeHandler::new().on_text(|_ctx| async { Ok(()) });

    composite
        .dispatch(message_update(5, "hi"), mock.clone())
        .await
        .unwrap();

    assert!(mock.calls().is_empty());
}
