//! Demo handler set used by `dbot run` and `dbot replay`: a welcome keyboard, button
//! presses that edit the keyboard message, and an echo for everything else.

use dbot_core::{InlineKeyboardButton, InlineKeyboardMarkup};
use handler_chain::{CompositeHandler, MessageContext, QueryContext, TextContext};

fn yes_button() -> InlineKeyboardButton {
    InlineKeyboardButton::new("Yes", "vote:yes")
}

fn no_button() -> InlineKeyboardButton {
    InlineKeyboardButton::new("No", "vote:no")
}

fn vote_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_row([yes_button(), no_button()])
}

pub fn demo_handlers() -> CompositeHandler {
    CompositeHandler::new()
        .on_command("start", |ctx: MessageContext| async move {
            ctx.reply("Welcome! Do you like this bot?", Some(&vote_keyboard()))
                .await?;
            Ok(())
        })
        .on_command("help", |ctx: MessageContext| async move {
            ctx.send("/start shows a keyboard; any other text is echoed back.", None)
                .await?;
            Ok(())
        })
        .on_query(&yes_button(), |ctx: QueryContext| async move {
            ctx.answer("Thanks!", false).await?;
            ctx.edit("You voted yes", None).await?;
            Ok(())
        })
        // Answered automatically after the callback returns.
        .on_any_query(|ctx: QueryContext| async move {
            let choice = ctx.data()?.unwrap_or("nothing").to_string();
            ctx.edit(&format!("You picked {}", choice), None).await?;
            Ok(())
        })
        .on_text(|ctx: TextContext| async move {
            ctx.reply(ctx.text(), None).await?;
            Ok(())
        })
}
